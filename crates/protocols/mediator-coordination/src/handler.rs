use cloud_bridge::{CloudEvent, InvitationNotify, INVITATION_TOPIC_SUFFIX};
use database::Repository;
use did_utils::{
    crypto::{Ed25519KeyPair, Generate, PublicKeyFormat, ToMultikey, X25519KeyPair},
    didcore::{Service, ServiceEndpoint, DIDCOMM_MESSAGING_SERVICE_TYPE},
    jwk::Jwk,
    methods::{DidPeer, Purpose, PurposedKey},
};
use didcomm::Message;
use keystore::{SecretMaterial, SecretType};
use mongodb::bson::DateTime;
use serde_json::json;
use shared::{
    constants::{
        MEDIATE_DENY_3_0, MEDIATE_GRANT_3_0, MEDIATE_REQUEST_3_0, RECIPIENT_3_0,
        RECIPIENT_QUERY_3_0, RECIPIENT_UPDATE_3_0, RECIPIENT_UPDATE_RESPONSE_3_0,
    },
    repository::entity::Mediatee,
    state::AppState,
    utils::jwt,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::MediationError,
    model::{
        MediationDenyBody, MediationGrantBody, OutgoingPagination, RecipientDid,
        RecipientQueryBody, RecipientQueryResponseBody, RecipientUpdateAction,
        RecipientUpdateBody, RecipientUpdateConfirmation, RecipientUpdateResponseBody,
        RecipientUpdateResult,
    },
};

/// Dispatches a coordinate-mediation 3.0 message to its handler.
pub async fn handle_coordination_message(
    state: Arc<AppState>,
    message: Message,
    bearer: Option<&str>,
) -> Result<Option<Message>, MediationError> {
    match message.type_.as_str() {
        MEDIATE_REQUEST_3_0 => process_mediate_request(state, &message, bearer).await,
        RECIPIENT_UPDATE_3_0 => process_recipient_update(state, &message).await,
        RECIPIENT_QUERY_3_0 => process_recipient_query(state, &message).await,
        _ => Err(MediationError::UnknownMessageType),
    }
}

/// Grants a mediation to the sender of a `mediate-request`, provided its
/// bearer token traces back to a pending invitation.
async fn process_mediate_request(
    state: Arc<AppState>,
    message: &Message,
    bearer: Option<&str>,
) -> Result<Option<Message>, MediationError> {
    let mediator_did = state.mediator_did();
    let sender_did = sender_did(message)?;

    let invitation_id = match jwt::verify_invitation_token(
        bearer.unwrap_or_default(),
        &state.diddoc,
        &state.keystore,
    )
    .await
    {
        Ok(invitation_id) => invitation_id,
        Err(err) => {
            tracing::info!("sending mediate-deny: {err}");
            return Ok(Some(
                Message::build(
                    Uuid::new_v4().to_string(),
                    MEDIATE_DENY_3_0.to_string(),
                    json!(MediationDenyBody {
                        comment: String::from("Mediatee cant be registered."),
                    }),
                )
                .to(sender_did.to_owned())
                .from(mediator_did.to_owned())
                .finalize(),
            ));
        }
    };

    if state
        .repository
        .is_mediated(sender_did)
        .await
        .map_err(internal)?
    {
        return Err(MediationError::AlreadyMediated);
    }

    let pending = state
        .repository
        .mediatee(&invitation_id)
        .await
        .map_err(internal)?
        .ok_or(MediationError::InvitationNotFound)?;

    if pending.protocol != state.config.forward_protocol.as_str() {
        return Err(MediationError::ProtocolNotSupported);
    }

    let routing_did = new_routing_did(&state).await?;

    tracing::info!("sending mediate-grant");
    state
        .repository
        .mediatee_repository
        .store(Mediatee {
            id: None,
            remote_did: sender_did.to_string(),
            routing_key: routing_did.clone(),
            protocol: pending.protocol.clone(),
            topic: pending.topic.clone(),
            event_type: pending.event_type.clone(),
            properties: pending.properties.clone(),
            recipient_dids: vec![],
            group: pending.group.clone(),
            added: Some(DateTime::now()),
        })
        .await
        .map_err(internal)?;

    state
        .repository
        .delete_mediatee(&invitation_id)
        .await
        .map_err(internal)?;

    // The mediation is committed; a lost notification must not turn the
    // grant into an error.
    let notify = InvitationNotify {
        invitation_id: invitation_id.clone(),
        did: routing_did.clone(),
    };
    let topic = format!("{}{}", state.config.bus_topic, INVITATION_TOPIC_SUFFIX);
    let event = CloudEvent::new(&state.config.bus_url, &pending.event_type, json!(notify));
    if let Err(err) = state.publisher.publish(&topic, event).await {
        tracing::error!("failed to publish invitation notification: {err}");
    }

    Ok(Some(
        Message::build(
            Uuid::new_v4().to_string(),
            MEDIATE_GRANT_3_0.to_string(),
            json!(MediationGrantBody {
                routing_did: vec![routing_did],
            }),
        )
        .to(sender_did.to_owned())
        .from(mediator_did.to_owned())
        .finalize(),
    ))
}

/// Mints a fresh `did:peer:2` routing key: generates both key pairs,
/// resolves the address once and registers the secrets under the resolved
/// verification-method ids, so later resolver callbacks find them.
pub async fn new_routing_did(state: &AppState) -> Result<String, MediationError> {
    let auth_keys = Ed25519KeyPair::new().map_err(internal)?;
    let agreem_keys = X25519KeyPair::new().map_err(internal)?;

    let auth_multikey = auth_keys.to_multikey();
    let agreem_multikey = agreem_keys.to_multikey();

    let auth_jwk: Jwk = auth_keys.try_into().map_err(internal)?;
    let agreem_jwk: Jwk = agreem_keys.try_into().map_err(internal)?;

    let keys = vec![
        PurposedKey {
            purpose: Purpose::Encryption,
            public_key_multibase: agreem_multikey.clone(),
        },
        PurposedKey {
            purpose: Purpose::Verification,
            public_key_multibase: auth_multikey.clone(),
        },
    ];

    let services = vec![Service {
        id: String::from("#service"),
        service_type: String::from(DIDCOMM_MESSAGING_SERVICE_TYPE),
        service_endpoint: ServiceEndpoint {
            uri: state.config.public_url.clone(),
            accept: Some(vec![String::from("didcomm/v2")]),
            routing_keys: vec![],
        },
    }];

    let did = DidPeer::create_did_peer_2(&keys, &services).map_err(internal)?;

    let diddoc = DidPeer::with_format(PublicKeyFormat::Jwk)
        .expand(&did)
        .map_err(internal)?;

    for method in diddoc.verification_method.as_deref().unwrap_or_default() {
        let fragment = method.id.trim_start_matches('#');
        let kid = format!("{did}#{fragment}");

        let jwk = if fragment == agreem_multikey {
            &agreem_jwk
        } else if fragment == auth_multikey {
            &auth_jwk
        } else {
            continue;
        };

        state
            .keystore
            .store(
                &kid,
                SecretType::JsonWebKey2020,
                SecretMaterial::Jwk {
                    private_key_jwk: jwk.clone(),
                },
            )
            .await
            .map_err(internal)?;
    }

    Ok(did)
}

/// Applies `recipient-update` entries against the sender's mediation.
async fn process_recipient_update(
    state: Arc<AppState>,
    message: &Message,
) -> Result<Option<Message>, MediationError> {
    let mediator_did = state.mediator_did();
    let sender_did = sender_did(message)?;

    let body: RecipientUpdateBody = serde_json::from_value(message.body.clone())
        .map_err(|e| MediationError::UnexpectedMessageFormat(e.to_string()))?;

    let mediatee = state
        .repository
        .mediatee(sender_did)
        .await
        .map_err(internal)?
        .ok_or(MediationError::UncoordinatedSender)?;

    let current = &mediatee.recipient_dids;
    let mut confirmations: Vec<RecipientUpdateConfirmation> = vec![];
    let mut to_add = vec![];
    let mut to_remove = vec![];

    for update in body.updates {
        let result = match &update.action {
            RecipientUpdateAction::Add => {
                if current.contains(&update.recipient_did) {
                    RecipientUpdateResult::NoChanges
                } else {
                    to_add.push(update.recipient_did.clone());
                    RecipientUpdateResult::Success
                }
            }
            RecipientUpdateAction::Remove => {
                if current.contains(&update.recipient_did) {
                    to_remove.push(update.recipient_did.clone());
                    RecipientUpdateResult::Success
                } else {
                    RecipientUpdateResult::ClientError
                }
            }
            RecipientUpdateAction::Unknown(action) => {
                tracing::warn!("recipient-update: unknown update action {action}");
                continue;
            }
        };

        confirmations.push(RecipientUpdateConfirmation {
            recipient_did: update.recipient_did,
            action: update.action,
            result,
        });
    }

    let mut updated = current.clone();

    for key in to_add {
        // A recipient DID belongs to at most one mediation.
        let taken = state
            .repository
            .is_recipient_did_registered(&key)
            .await
            .map_err(internal)?;

        if taken {
            tracing::warn!("recipient DID already registered under another mediation");
            retract_confirmation(&mut confirmations, &key);
            continue;
        }

        if !updated.contains(&key) {
            updated.push(key);
        }
    }

    for key in to_remove {
        updated.retain(|k| k != &key);
    }

    state
        .repository
        .mediatee_repository
        .update(Mediatee {
            recipient_dids: updated,
            ..mediatee
        })
        .await
        .map_err(internal)?;

    Ok(Some(
        Message::build(
            Uuid::new_v4().to_string(),
            RECIPIENT_UPDATE_RESPONSE_3_0.to_string(),
            json!(RecipientUpdateResponseBody {
                updated: confirmations
            }),
        )
        .to(sender_did.to_owned())
        .from(mediator_did.to_owned())
        .finalize(),
    ))
}

/// Answers a `recipient-query` with a page of the sender's registered
/// recipient DIDs.
async fn process_recipient_query(
    state: Arc<AppState>,
    message: &Message,
) -> Result<Option<Message>, MediationError> {
    let mediator_did = state.mediator_did();
    let sender_did = sender_did(message)?;

    let body: RecipientQueryBody = serde_json::from_value(message.body.clone())
        .map_err(|e| MediationError::UnexpectedMessageFormat(e.to_string()))?;

    let mediatee = state
        .repository
        .mediatee(sender_did)
        .await
        .map_err(internal)?
        .ok_or(MediationError::UncoordinatedSender)?;

    let dids = &mediatee.recipient_dids;
    let (offset, count, remaining) =
        calculate_pagination(body.paginate.limit, body.paginate.offset, dids.len());

    let page = dids[offset..offset + count]
        .iter()
        .map(|did| RecipientDid {
            recipient_did: did.clone(),
        })
        .collect();

    Ok(Some(
        Message::build(
            Uuid::new_v4().to_string(),
            RECIPIENT_3_0.to_string(),
            json!(RecipientQueryResponseBody {
                dids: page,
                pagination: OutgoingPagination {
                    count,
                    offset,
                    remaining,
                },
            }),
        )
        .to(sender_did.to_owned())
        .from(mediator_did.to_owned())
        .finalize(),
    ))
}

fn calculate_pagination(limit: usize, incoming_offset: usize, size: usize) -> (usize, usize, usize) {
    // Off-range offsets yield an empty page.
    if incoming_offset >= size {
        return (0, 0, 0);
    }

    let offset = if incoming_offset + limit > size {
        0
    } else {
        incoming_offset
    };

    let count = limit.min(size);

    let remaining = if limit >= size {
        0
    } else {
        size - offset - limit
    };

    (offset, count, remaining)
}

fn retract_confirmation(confirmations: &mut Vec<RecipientUpdateConfirmation>, recipient_did: &str) {
    if let Some(pos) = confirmations
        .iter()
        .position(|c| c.recipient_did == recipient_did)
    {
        confirmations.remove(pos);
    }
}

#[inline]
fn sender_did(message: &Message) -> Result<&str, MediationError> {
    message
        .from
        .as_deref()
        .ok_or(MediationError::MissingSenderDID)
}

#[inline]
fn internal<E: ToString>(err: E) -> MediationError {
    MediationError::InternalError(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloud_bridge::MockPublisher;
    use serde_json::json;
    use shared::utils::tests_utils::tests as global;

    async fn setup_with_pending_invitation() -> (Arc<AppState>, String, String, Arc<MockPublisher>)
    {
        let mut state = (*global::setup()).clone();
        let publisher = Arc::new(MockPublisher::new());
        state.publisher = publisher.clone();
        let state = Arc::new(state);

        let invitation_id = Uuid::new_v4().to_string();
        state
            .repository
            .mediatee_repository
            .store(Mediatee {
                remote_did: invitation_id.clone(),
                protocol: "nats".to_string(),
                topic: "t1".to_string(),
                event_type: "demo".to_string(),
                group: "g".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let token = jwt::sign_invitation_token(&state.diddoc, &state.keystore, &invitation_id, 5)
            .await
            .unwrap();

        (state, invitation_id, token, publisher)
    }

    fn mediate_request(state: &AppState) -> Message {
        Message::build(
            "id_mediate_request".to_owned(),
            MEDIATE_REQUEST_3_0.to_owned(),
            json!({}),
        )
        .to(global::_mediator_did(state))
        .from(global::_edge_did())
        .finalize()
    }

    async fn granted_state() -> (Arc<AppState>, String) {
        let (state, _, token, _) = setup_with_pending_invitation().await;
        let response = handle_coordination_message(
            Arc::clone(&state),
            mediate_request(&state),
            Some(&token),
        )
        .await
        .unwrap()
        .unwrap();

        let routing_did = response.body["routing_did"][0].as_str().unwrap().to_string();
        (state, routing_did)
    }

    #[tokio::test]
    async fn test_mediate_request_grants_and_commits() {
        let (state, invitation_id, token, publisher) = setup_with_pending_invitation().await;

        let response = handle_coordination_message(
            Arc::clone(&state),
            mediate_request(&state),
            Some(&format!("Bearer {token}")),
        )
        .await
        .unwrap()
        .expect("Response should not be None");

        assert_eq!(response.type_, MEDIATE_GRANT_3_0);
        let routing_did = response.body["routing_did"][0].as_str().unwrap();
        assert!(routing_did.starts_with("did:peer:2."));

        // the mediatee inherited the invitation's bus parameters
        let mediatee = state
            .repository
            .mediatee(&global::_edge_did())
            .await
            .unwrap()
            .expect("mediatee should be committed");
        assert_eq!(mediatee.routing_key, routing_did);
        assert_eq!(mediatee.topic, "t1");
        assert_eq!(mediatee.event_type, "demo");
        assert_eq!(mediatee.group, "g");
        assert!(mediatee.recipient_dids.is_empty());

        // the pending invitation is gone
        assert!(state.repository.mediatee(&invitation_id).await.unwrap().is_none());

        // every verification method of the routing DID has its secret
        let diddoc = DidPeer::with_format(PublicKeyFormat::Jwk).expand(routing_did).unwrap();
        for method in diddoc.verification_method.as_deref().unwrap_or_default() {
            let kid = format!("{routing_did}{}", method.id);
            assert!(
                state.keystore.retrieve(&kid).await.unwrap().is_some(),
                "missing secret for {kid}"
            );
        }

        // the grant was notified on the invitation topic
        let published = publisher.published();
        assert_eq!(published.len(), 1);
        let (topic, event) = &published[0];
        assert_eq!(topic, "connector-invitation");
        assert_eq!(event.event_type, "demo");
        assert_eq!(
            event.data,
            json!({"invitationId": invitation_id, "did": routing_did})
        );
    }

    #[tokio::test]
    async fn test_mediate_request_with_invalid_token_is_denied() {
        let (state, _, _, _) = setup_with_pending_invitation().await;

        let response = handle_coordination_message(
            Arc::clone(&state),
            mediate_request(&state),
            Some("Bearer not.a.token"),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(response.type_, MEDIATE_DENY_3_0);
        assert_eq!(response.body, json!({"comment": "Mediatee cant be registered."}));

        // nothing was committed
        assert!(state.repository.mediatee(&global::_edge_did()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mediate_request_for_already_mediated_sender() {
        let (state, _, token, _) = setup_with_pending_invitation().await;

        handle_coordination_message(Arc::clone(&state), mediate_request(&state), Some(&token))
            .await
            .unwrap();

        // a second round needs a fresh pending invitation to get past the
        // token check
        let invitation_id = Uuid::new_v4().to_string();
        state
            .repository
            .mediatee_repository
            .store(Mediatee {
                remote_did: invitation_id.clone(),
                protocol: "nats".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let token = jwt::sign_invitation_token(&state.diddoc, &state.keystore, &invitation_id, 5)
            .await
            .unwrap();

        let err = handle_coordination_message(
            Arc::clone(&state),
            mediate_request(&state),
            Some(&token),
        )
        .await
        .unwrap_err();

        assert_eq!(err, MediationError::AlreadyMediated);
    }

    #[tokio::test]
    async fn test_mediate_request_rejects_mismatched_forward_protocol() {
        let (state, invitation_id, token, _) = setup_with_pending_invitation().await;

        // rewrite the pending invitation to the http protocol while the
        // connector runs in nats mode
        let pending = state.repository.mediatee(&invitation_id).await.unwrap().unwrap();
        state
            .repository
            .mediatee_repository
            .update(Mediatee {
                protocol: "http".to_string(),
                ..pending
            })
            .await
            .unwrap();

        let err = handle_coordination_message(
            Arc::clone(&state),
            mediate_request(&state),
            Some(&token),
        )
        .await
        .unwrap_err();

        assert_eq!(err, MediationError::ProtocolNotSupported);
    }

    #[tokio::test]
    async fn test_recipient_update_and_query_roundtrip() {
        let (state, _) = granted_state().await;

        let update = Message::build(
            "id_recipient_update".to_owned(),
            RECIPIENT_UPDATE_3_0.to_owned(),
            json!({
                "updates": [
                    {"recipient_did": "did:peer:2.Ez6LSr1", "action": "add"},
                    {"recipient_did": "did:peer:2.Ez6LSr2", "action": "add"},
                    {"recipient_did": "did:peer:2.Ez6LSr3", "action": "add"},
                ]
            }),
        )
        .to(global::_mediator_did(&state))
        .from(global::_edge_did())
        .finalize();

        let response = handle_coordination_message(Arc::clone(&state), update, None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(response.type_, RECIPIENT_UPDATE_RESPONSE_3_0);
        assert_eq!(
            response.body,
            json!({
                "updated": [
                    {"recipient_did": "did:peer:2.Ez6LSr1", "action": "add", "result": "success"},
                    {"recipient_did": "did:peer:2.Ez6LSr2", "action": "add", "result": "success"},
                    {"recipient_did": "did:peer:2.Ez6LSr3", "action": "add", "result": "success"},
                ]
            })
        );

        let query = Message::build(
            "id_recipient_query".to_owned(),
            RECIPIENT_QUERY_3_0.to_owned(),
            json!({"paginate": {"limit": 2, "offset": 1}}),
        )
        .to(global::_mediator_did(&state))
        .from(global::_edge_did())
        .finalize();

        let response = handle_coordination_message(Arc::clone(&state), query, None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(response.type_, RECIPIENT_3_0);
        assert_eq!(
            response.body,
            json!({
                "dids": [
                    {"recipient_did": "did:peer:2.Ez6LSr2"},
                    {"recipient_did": "did:peer:2.Ez6LSr3"},
                ],
                "pagination": {"count": 2, "offset": 1, "remaining": 0}
            })
        );
    }

    #[tokio::test]
    async fn test_recipient_update_is_idempotent() {
        let (state, _) = granted_state().await;

        let body = json!({
            "updates": [
                {"recipient_did": "did:peer:2.Ez6LSr1", "action": "add"},
                {"recipient_did": "did:peer:2.Ez6LSr2", "action": "remove"},
            ]
        });

        let build = |id: &str| {
            Message::build(id.to_owned(), RECIPIENT_UPDATE_3_0.to_owned(), body.clone())
                .to(global::_mediator_did(&state))
                .from(global::_edge_did())
                .finalize()
        };

        let first = handle_coordination_message(Arc::clone(&state), build("u1"), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            first.body["updated"],
            json!([
                {"recipient_did": "did:peer:2.Ez6LSr1", "action": "add", "result": "success"},
                {"recipient_did": "did:peer:2.Ez6LSr2", "action": "remove", "result": "client_error"},
            ])
        );

        let second = handle_coordination_message(Arc::clone(&state), build("u2"), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            second.body["updated"],
            json!([
                {"recipient_did": "did:peer:2.Ez6LSr1", "action": "add", "result": "no_changes"},
                {"recipient_did": "did:peer:2.Ez6LSr2", "action": "remove", "result": "client_error"},
            ])
        );
    }

    #[tokio::test]
    async fn test_recipient_update_drops_unknown_actions() {
        let (state, _) = granted_state().await;

        let update = Message::build(
            "id_recipient_update".to_owned(),
            RECIPIENT_UPDATE_3_0.to_owned(),
            json!({
                "updates": [
                    {"recipient_did": "did:peer:2.Ez6LSr1", "action": "flush"},
                    {"recipient_did": "did:peer:2.Ez6LSr2", "action": "add"},
                ]
            }),
        )
        .to(global::_mediator_did(&state))
        .from(global::_edge_did())
        .finalize();

        let response = handle_coordination_message(Arc::clone(&state), update, None)
            .await
            .unwrap()
            .unwrap();

        // the unknown action is not echoed
        assert_eq!(
            response.body["updated"],
            json!([
                {"recipient_did": "did:peer:2.Ez6LSr2", "action": "add", "result": "success"},
            ])
        );
    }

    #[tokio::test]
    async fn test_recipient_update_rejects_recipient_of_other_mediation() {
        let (state, _) = granted_state().await;

        state
            .repository
            .mediatee_repository
            .store(Mediatee {
                remote_did: "did:peer:2.Ez6LSother".to_string(),
                routing_key: "did:peer:2.Ez6LSrouting2".to_string(),
                protocol: "nats".to_string(),
                recipient_dids: vec!["did:peer:2.Ez6LSshared".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();

        let update = Message::build(
            "id_recipient_update".to_owned(),
            RECIPIENT_UPDATE_3_0.to_owned(),
            json!({
                "updates": [
                    {"recipient_did": "did:peer:2.Ez6LSshared", "action": "add"},
                    {"recipient_did": "did:peer:2.Ez6LSr1", "action": "add"},
                ]
            }),
        )
        .to(global::_mediator_did(&state))
        .from(global::_edge_did())
        .finalize();

        let response = handle_coordination_message(Arc::clone(&state), update, None)
            .await
            .unwrap()
            .unwrap();

        // the entry taken by another mediation is retracted from the echo
        assert_eq!(
            response.body["updated"],
            json!([
                {"recipient_did": "did:peer:2.Ez6LSr1", "action": "add", "result": "success"},
            ])
        );

        let mediatee = state.repository.mediatee(&global::_edge_did()).await.unwrap().unwrap();
        assert_eq!(mediatee.recipient_dids, vec!["did:peer:2.Ez6LSr1"]);
    }

    #[tokio::test]
    async fn test_recipient_query_for_uncoordinated_sender() {
        let state = global::setup();

        let query = Message::build(
            "id_recipient_query".to_owned(),
            RECIPIENT_QUERY_3_0.to_owned(),
            json!({}),
        )
        .to(global::_mediator_did(&state))
        .from(global::_edge_did())
        .finalize();

        let err = handle_coordination_message(Arc::clone(&state), query, None)
            .await
            .unwrap_err();
        assert_eq!(err, MediationError::UncoordinatedSender);
    }

    #[test]
    fn test_calculate_pagination() {
        // (limit, offset, size) -> (offset, count, remaining)
        assert_eq!(calculate_pagination(2, 1, 3), (1, 2, 0));
        assert_eq!(calculate_pagination(2, 0, 5), (0, 2, 3));
        assert_eq!(calculate_pagination(5, 0, 3), (0, 3, 0));
        assert_eq!(calculate_pagination(3, 2, 5), (2, 3, 0));
        // an overrunning window falls back to the start of the list
        assert_eq!(calculate_pagination(3, 3, 5), (0, 3, 2));

        // offset at or past the end yields an empty page
        assert_eq!(calculate_pagination(2, 7, 3), (0, 0, 0));
        assert_eq!(calculate_pagination(2, 3, 3), (0, 0, 0));
        assert_eq!(calculate_pagination(0, 0, 0), (0, 0, 0));
    }
}
