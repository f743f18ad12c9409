use didcomm::{Message, MessageBuilder};
use serde::Deserialize;
use shared::{constants::TRUST_PING_RESPONSE_2_0, state::AppState};
use std::sync::Arc;
use uuid::Uuid;

use crate::{error::TrustPingError, model::TrustPingResponse};

#[derive(Deserialize)]
struct TrustPingBody {
    response_requested: bool,
}

/// Answers a trust ping with a `ping-response` threading back the ping id,
/// or with nothing when no response was requested.
pub async fn handle_trust_ping(
    state: Arc<AppState>,
    message: Message,
) -> Result<Option<Message>, TrustPingError> {
    let mediator_did = state.mediator_did();
    let sender_did = message
        .from
        .as_ref()
        .ok_or(TrustPingError::MissingSenderDID)?;

    let body: TrustPingBody = serde_json::from_value(message.body.clone())
        .map_err(|e| TrustPingError::MalformedRequest(e.to_string()))?;

    if !body.response_requested {
        return Ok(None);
    }

    let id = Uuid::new_v4().to_string();
    let response_builder: MessageBuilder = TrustPingResponse {
        id: id.as_str(),
        type_: TRUST_PING_RESPONSE_2_0,
        thid: message.id.as_str(),
    }
    .into();

    let response = response_builder
        .to(sender_did.to_owned())
        .from(mediator_did.to_owned())
        .finalize();

    Ok(Some(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::{constants::TRUST_PING_2_0, utils::tests_utils::tests as global};

    #[tokio::test]
    async fn test_request_trust_ping_response() {
        let state = global::setup();

        let request = Message::build(
            "id_trust_ping".to_owned(),
            TRUST_PING_2_0.to_owned(),
            json!({"response_requested": true}),
        )
        .to(global::_mediator_did(&state))
        .from(global::_edge_did())
        .finalize();

        let response = handle_trust_ping(Arc::clone(&state), request)
            .await
            .unwrap()
            .expect("Response should not be None");

        assert_eq!(response.type_, TRUST_PING_RESPONSE_2_0);
        assert_eq!(response.from.unwrap(), global::_mediator_did(&state));
        assert_eq!(response.to.unwrap(), vec![global::_edge_did()]);
        assert_eq!(response.thid.unwrap(), "id_trust_ping");
        assert_eq!(response.body, json!({}));
    }

    #[tokio::test]
    async fn test_request_trust_ping_no_response() {
        let state = global::setup();

        let request = Message::build(
            "id_trust_ping".to_owned(),
            TRUST_PING_2_0.to_owned(),
            json!({"response_requested": false}),
        )
        .to(global::_mediator_did(&state))
        .from(global::_edge_did())
        .finalize();

        let response = handle_trust_ping(Arc::clone(&state), request).await.unwrap();

        assert_eq!(response, None);
    }

    #[tokio::test]
    async fn test_request_trust_ping_with_malformed_body() {
        let state = global::setup();

        let request = Message::build(
            "id_trust_ping".to_owned(),
            TRUST_PING_2_0.to_owned(),
            json!({}),
        )
        .to(global::_mediator_did(&state))
        .from(global::_edge_did())
        .finalize();

        let err = handle_trust_ping(Arc::clone(&state), request).await.unwrap_err();
        assert!(matches!(err, TrustPingError::MalformedRequest(_)));
    }

    #[tokio::test]
    async fn test_request_trust_ping_with_missing_sender_did() {
        let state = global::setup();

        let request = Message::build(
            "id_trust_ping".to_owned(),
            TRUST_PING_2_0.to_owned(),
            json!({"response_requested": true}),
        )
        .to(global::_mediator_did(&state))
        .finalize();

        let err = handle_trust_ping(Arc::clone(&state), request).await.unwrap_err();
        assert_eq!(err, TrustPingError::MissingSenderDID);
    }
}
