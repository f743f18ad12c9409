use base64::{engine::general_purpose::STANDARD, Engine};
use cloud_bridge::{BridgeError, CloudEvent, ConnectorMessage, NatsBridge};
use didcomm::{Attachment, Message};
use futures::StreamExt;
use serde_json::json;
use shared::{constants::MEDIATE_FORWARD_2_0, state::AppState};
use std::sync::Arc;
use uuid::Uuid;

use crate::handler;

/// Long-lived bus subscriber: every received event is wrapped as a
/// synthetic forward and pushed through the routing pipeline as the
/// outbound variant.
///
/// Runs until the subscription ends; intended to be spawned as a task and
/// aborted on shutdown.
pub async fn listen_for_cloud_events(
    state: Arc<AppState>,
    bridge: Arc<NatsBridge>,
) -> Result<(), BridgeError> {
    let topic = state.config.bus_topic.clone();
    let mut subscriber = bridge.subscribe(&topic).await?;

    tracing::info!(topic, "receiving cloud events");

    while let Some(event) = subscriber.next().await {
        let message = match parse_event(&event.payload) {
            Ok(message) => message,
            Err(err) => {
                tracing::error!("dropping malformed bus event: {err}");
                continue;
            }
        };

        let forward = into_synthetic_forward(state.mediator_did(), &message);

        match handler::handle_forward(Arc::clone(&state), forward, false).await {
            Ok(_) => {}
            Err(err) => tracing::error!("unable to forward bus event: {err}"),
        }
    }

    tracing::info!(topic, "cloud event subscription closed");
    Ok(())
}

fn parse_event(payload: &[u8]) -> Result<ConnectorMessage, BridgeError> {
    let event: CloudEvent = serde_json::from_slice(payload)
        .map_err(|e| BridgeError::MalformedPayload(e.to_string()))?;

    serde_json::from_value(event.data).map_err(|e| BridgeError::MalformedPayload(e.to_string()))
}

/// Builds the synthetic forward carrying the event's payload as a single
/// base64 attachment addressed to the registered recipient DID.
pub fn into_synthetic_forward(mediator_did: &str, content: &ConnectorMessage) -> Message {
    let attachment = Attachment::base64(
        STANDARD.encode(serde_json::to_vec(&content.payload).unwrap_or_default()),
    )
    .finalize();

    Message::build(
        Uuid::new_v4().to_string(),
        MEDIATE_FORWARD_2_0.to_string(),
        json!({"next": content.did}),
    )
    .to(mediator_did.to_owned())
    .attachments(vec![attachment])
    .finalize()
}
