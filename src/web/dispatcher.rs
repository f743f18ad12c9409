use chrono::Utc;
use didcomm::{Message, PackEncryptedOptions, UnpackOptions};
use shared::{
    constants::{
        COORDINATE_MEDIATION_PREFIX, MESSAGE_PICKUP_PREFIX, ROUTING_PREFIX, TRUST_PING_PREFIX,
    },
    problem_report,
    state::AppState,
};
use std::sync::Arc;

/// Failures the dispatcher cannot answer with a packed problem report on
/// the regular path.
#[derive(Debug)]
pub(crate) enum DispatchError {
    /// The inbound message could not be unpacked; carries the plain-packed
    /// problem report for a 400 response.
    UnpackingFailed(String),
    /// Even the degraded plain packing of an error report failed.
    Fatal(String),
}

/// Processes one inbound DIDComm wire message and returns the packed
/// response, if the protocol produces one.
///
/// The pipeline: unpack, blocklist, time-skew checks, then type-URI prefix
/// dispatch. Handler errors become problem reports on the same transport.
pub(crate) async fn process_didcomm_message(
    state: Arc<AppState>,
    payload: &str,
    bearer: Option<&str>,
) -> Result<Option<String>, DispatchError> {
    let message = match unpack(&state, payload).await {
        Ok(message) => message,
        Err(err) => {
            tracing::error!("failed to unpack message: {err}");
            let report = problem_report::message_not_unpackable();
            let packed = pack_plain(&state, report, "").await?;
            return Err(DispatchError::UnpackingFailed(packed));
        }
    };

    let sender_did = message.from.clone().unwrap_or_default();
    let now = Utc::now().timestamp() as u64;

    let blocked = state
        .repository
        .is_blocked(&sender_did)
        .await
        .map_err(|e| DispatchError::Fatal(e.to_string()))?;

    let response = if blocked {
        tracing::info!("DID is blocked");
        Some(problem_report::did_blocked())
    } else if message.created_time.is_some_and(|t| t > now) {
        tracing::warn!("received message with creation time in the future");
        Some(problem_report::wrong_creation_time())
    } else if message.expires_time.is_some_and(|t| t < now) {
        tracing::warn!("received expired message");
        Some(problem_report::message_expired())
    } else {
        dispatch(Arc::clone(&state), message, bearer).await
    };

    match response {
        Some(response) => Ok(Some(pack_response(&state, response, &sender_did).await?)),
        None => Ok(None),
    }
}

/// Routes the unpacked message to its protocol handler by type-URI prefix.
/// A handler error is rendered as its problem report.
async fn dispatch(
    state: Arc<AppState>,
    message: Message,
    bearer: Option<&str>,
) -> Option<Message> {
    let type_ = message.type_.clone();

    let outcome = if type_.starts_with(COORDINATE_MEDIATION_PREFIX) {
        mediator_coordination::handle_coordination_message(state, message, bearer)
            .await
            .map_err(|e| {
                tracing::error!("unable to handle coordinate mediation: {e}");
                e.into_problem_report()
            })
    } else if type_.starts_with(TRUST_PING_PREFIX) {
        trust_ping::handle_trust_ping(state, message).await.map_err(|e| {
            tracing::error!("unable to handle trust ping: {e}");
            e.into_problem_report()
        })
    } else if type_.starts_with(ROUTING_PREFIX) {
        forward::handle_routing_message(state, message).await.map_err(|e| {
            tracing::error!("unable to handle routing: {e}");
            e.into_problem_report()
        })
    } else if type_.starts_with(MESSAGE_PICKUP_PREFIX) {
        pickup::handle_pickup_message(state, message).await.map_err(|e| {
            tracing::error!("unable to handle message pickup: {e}");
            e.into_problem_report()
        })
    } else {
        tracing::warn!(type_, "message type not handled");
        Err(problem_report::unknown_message_type())
    };

    match outcome {
        Ok(response) => response,
        Err(report) => Some(report),
    }
}

async fn unpack(state: &AppState, payload: &str) -> didcomm::error::Result<Message> {
    let (message, _metadata) = Message::unpack(
        payload,
        &state.did_resolver,
        &state.secrets_resolver,
        &UnpackOptions {
            expect_decrypt_by_all_keys: true,
            unwrap_re_wrapping_forward: true,
            ..UnpackOptions::default()
        },
    )
    .await?;

    Ok(message)
}

/// Packs an outgoing response addressed back at the sender: authcrypt when
/// so configured and a sender is known, plain otherwise. A packing failure
/// degrades to a plain-packed internal error report.
async fn pack_response(
    state: &AppState,
    response: Message,
    to: &str,
) -> Result<String, DispatchError> {
    let response = readdress(state, response, to);

    if state.config.is_message_encrypted && !to.is_empty() {
        let packed = response
            .pack_encrypted(
                to,
                Some(state.mediator_did()),
                None,
                &state.did_resolver,
                &state.secrets_resolver,
                &PackEncryptedOptions::default(),
            )
            .await;

        match packed {
            Ok((packed, _metadata)) => Ok(packed),
            Err(err) => {
                tracing::error!("unable to pack encrypted message: {err}");
                let report = problem_report::internal_server_error();
                pack_plain(state, report, to).await
            }
        }
    } else {
        match response.pack_plaintext(&state.did_resolver).await {
            Ok(packed) => Ok(packed),
            Err(err) => {
                tracing::error!("unable to pack plain message: {err}");
                let report = problem_report::internal_server_error();
                pack_plain(state, report, to).await
            }
        }
    }
}

async fn pack_plain(
    state: &AppState,
    report: Message,
    to: &str,
) -> Result<String, DispatchError> {
    readdress(state, report, to)
        .pack_plaintext(&state.did_resolver)
        .await
        .map_err(|e| DispatchError::Fatal(e.to_string()))
}

fn readdress(state: &AppState, response: Message, to: &str) -> Message {
    Message {
        to: Some(vec![to.to_string()]),
        from: Some(state.mediator_did().to_owned()),
        created_time: Some(Utc::now().timestamp() as u64),
        ..response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use shared::{
        constants::{TRUST_PING_2_0, TRUST_PING_RESPONSE_2_0},
        utils::tests_utils::tests as global,
    };

    async fn packed_ping(state: &AppState, response_requested: bool) -> String {
        let ping = Message::build(
            "id_trust_ping".to_owned(),
            TRUST_PING_2_0.to_owned(),
            json!({"response_requested": response_requested}),
        )
        .to(global::_mediator_did(state))
        .from(global::_edge_did())
        .finalize();

        global::_edge_pack_message(
            state,
            &ping,
            Some(global::_edge_did()),
            global::_mediator_did(state),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_roundtrip_over_authcrypt() {
        let state = global::setup();

        let packed = packed_ping(&state, true).await;
        let response = process_didcomm_message(Arc::clone(&state), &packed, None)
            .await
            .unwrap()
            .expect("Response should not be None");

        let response = global::_edge_unpack_message(&state, &response).await.unwrap();
        assert_eq!(response.type_, TRUST_PING_RESPONSE_2_0);
        assert_eq!(response.from.unwrap(), global::_mediator_did(&state));
        assert_eq!(response.to.unwrap(), vec![global::_edge_did()]);
        assert!(response.created_time.is_some());
    }

    #[tokio::test]
    async fn test_no_response_sentinel_yields_empty_answer() {
        let state = global::setup();

        let packed = packed_ping(&state, false).await;
        let response = process_didcomm_message(Arc::clone(&state), &packed, None).await.unwrap();

        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_unpackable_garbage_yields_plain_problem_report() {
        let state = global::setup();

        let err = process_didcomm_message(Arc::clone(&state), "not didcomm", None)
            .await
            .unwrap_err();

        let DispatchError::UnpackingFailed(packed) = err else {
            panic!("expected unpacking failure");
        };

        let report: Value = serde_json::from_str(&packed).unwrap();
        assert_eq!(report["body"]["code"], "e.p.msg.not_unpackable");
        assert_eq!(report["from"], global::_mediator_did(&state));
        assert_eq!(report["to"], json!([""]));
    }

    #[tokio::test]
    async fn test_blocked_sender_is_refused() {
        let state = global::setup();
        state.repository.block(&global::_edge_did()).await.unwrap();

        let packed = packed_ping(&state, true).await;
        let response = process_didcomm_message(Arc::clone(&state), &packed, None)
            .await
            .unwrap()
            .unwrap();

        let response = global::_edge_unpack_message(&state, &response).await.unwrap();
        assert_eq!(response.body["code"], "e.p.did.blocked");
    }

    #[tokio::test]
    async fn test_message_from_the_future_is_refused() {
        let state = global::setup();

        let ping = Message::build(
            "id_trust_ping".to_owned(),
            TRUST_PING_2_0.to_owned(),
            json!({"response_requested": true}),
        )
        .to(global::_mediator_did(&state))
        .from(global::_edge_did())
        .created_time(Utc::now().timestamp() as u64 + 3600)
        .finalize();

        let packed = global::_edge_pack_message(
            &state,
            &ping,
            Some(global::_edge_did()),
            global::_mediator_did(&state),
        )
        .await
        .unwrap();

        let response = process_didcomm_message(Arc::clone(&state), &packed, None)
            .await
            .unwrap()
            .unwrap();

        let response = global::_edge_unpack_message(&state, &response).await.unwrap();
        assert_eq!(response.body["code"], "e.p.msg.creation_time");
    }

    #[tokio::test]
    async fn test_unknown_message_type_is_reported() {
        let state = global::setup();

        let message = Message::build(
            "id_unknown".to_owned(),
            "https://didcomm.org/basicmessage/2.0/message".to_owned(),
            json!({"content": "hello"}),
        )
        .to(global::_mediator_did(&state))
        .from(global::_edge_did())
        .finalize();

        let packed = global::_edge_pack_message(
            &state,
            &message,
            Some(global::_edge_did()),
            global::_mediator_did(&state),
        )
        .await
        .unwrap();

        let response = process_didcomm_message(Arc::clone(&state), &packed, None)
            .await
            .unwrap()
            .unwrap();

        let response = global::_edge_unpack_message(&state, &response).await.unwrap();
        assert_eq!(response.body["code"], "e.p.msg.unknown_type");
    }
}
