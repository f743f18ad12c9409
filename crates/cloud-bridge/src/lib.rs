//! Bridge between the mediation core and the cloud-event bus.
//!
//! Inbound bus events become synthetic forward messages (handled by the
//! routing protocol); outbound forwards for registered recipients leave as
//! cloud events on the mediatee's topic.

mod events;
mod publisher;
mod template;

pub use events::{CloudEvent, ConnectorMessage, InvitationNotify};
pub use publisher::{EventPublisher, NatsBridge};
pub use template::render_properties;

#[cfg(any(test, feature = "test-utils"))]
pub use publisher::tests::MockPublisher;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("bus connection failure: {0}")]
    Connection(String),
    #[error("publish failure: {0}")]
    Publish(String),
    #[error("subscribe failure: {0}")]
    Subscribe(String),
    #[error("malformed event payload: {0}")]
    MalformedPayload(String),
}

/// Topic used when a mediatee carries none, which is the norm for
/// http-forwarded mediatees.
pub const DEFAULT_HTTP_TOPIC: &str = "default-http";

/// Suffix of the topic carrying invitation notifications.
pub const INVITATION_TOPIC_SUFFIX: &str = "-invitation";

pub fn effective_topic(topic: &str) -> &str {
    if topic.is_empty() {
        DEFAULT_HTTP_TOPIC
    } else {
        topic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_topic_falls_back_for_empty_topics() {
        assert_eq!(effective_topic(""), DEFAULT_HTTP_TOPIC);
        assert_eq!(effective_topic("device-42"), "device-42");
    }
}
