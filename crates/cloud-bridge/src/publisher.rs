use async_trait::async_trait;

use crate::{BridgeError, CloudEvent};

/// Capability to emit cloud events, narrow so tests can record instead of
/// talking to a live bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, event: CloudEvent) -> Result<(), BridgeError>;
}

/// Connection to the NATS bus, usable as publisher and as subscriber
/// factory.
pub struct NatsBridge {
    client: async_nats::Client,
    url: String,
    queue_group: String,
}

impl NatsBridge {
    pub async fn connect(url: &str, queue_group: &str) -> Result<Self, BridgeError> {
        let client = async_nats::connect(url)
            .await
            .map_err(|e| BridgeError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            url: url.to_string(),
            queue_group: queue_group.to_string(),
        })
    }

    /// The bus url, doubling as the `source` attribute of emitted events.
    pub fn source_url(&self) -> &str {
        &self.url
    }

    /// Subscribes to a topic within the configured queue group, so that
    /// replicas of the connector share the subscription.
    pub async fn subscribe(&self, topic: &str) -> Result<async_nats::Subscriber, BridgeError> {
        self.client
            .queue_subscribe(topic.to_string(), self.queue_group.clone())
            .await
            .map_err(|e| BridgeError::Subscribe(e.to_string()))
    }
}

#[async_trait]
impl EventPublisher for NatsBridge {
    async fn publish(&self, topic: &str, event: CloudEvent) -> Result<(), BridgeError> {
        let payload =
            serde_json::to_vec(&event).map_err(|e| BridgeError::Publish(e.to_string()))?;

        self.client
            .publish(topic.to_string(), payload.into())
            .await
            .map_err(|e| BridgeError::Publish(e.to_string()))?;

        tracing::info!(topic, event_type = %event.event_type, "published cloud event");
        Ok(())
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Publisher that records events instead of emitting them.
    #[derive(Default)]
    pub struct MockPublisher {
        events: Mutex<Vec<(String, CloudEvent)>>,
    }

    impl MockPublisher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn published(&self) -> Vec<(String, CloudEvent)> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventPublisher for MockPublisher {
        async fn publish(&self, topic: &str, event: CloudEvent) -> Result<(), BridgeError> {
            self.events.lock().unwrap().push((topic.to_string(), event));
            Ok(())
        }
    }
}
