use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use cloud_bridge::{effective_topic, render_properties, CloudEvent};
use didcomm::{
    did::{DIDResolver, ServiceKind},
    Attachment, AttachmentData, Message, PackEncryptedOptions,
};
use serde::Deserialize;
use serde_json::Value;
use shared::{
    constants::{DIDCOMM_ENCRYPTED_MIME_TYPE, DIDCOMM_PLAIN_MIME_TYPE, MEDIATE_FORWARD_2_0},
    repository::entity::Mediatee,
    state::AppState,
};
use std::sync::Arc;

use crate::error::ForwardError;

/// Entry point for routing 2.0 messages arriving over the wire.
pub async fn handle_routing_message(
    state: Arc<AppState>,
    message: Message,
) -> Result<Option<Message>, ForwardError> {
    match message.type_.as_str() {
        MEDIATE_FORWARD_2_0 => mediator_forward_process(state, message).await,
        _ => Err(ForwardError::UnknownMessageType),
    }
}

#[derive(Deserialize)]
struct ForwardBody {
    next: String,
}

/// Handles a forward that arrived over the wire (the inbound variant).
pub async fn mediator_forward_process(
    state: Arc<AppState>,
    message: Message,
) -> Result<Option<Message>, ForwardError> {
    handle_forward(state, message, true).await
}

/// Handles a synthetic forward re-entering from the bus (the outbound
/// variant).
pub async fn outbound_forward_process(
    state: Arc<AppState>,
    message: Message,
) -> Result<Option<Message>, ForwardError> {
    handle_forward(state, message, false).await
}

/// The forward decision tree. `inbound` tells whether the message came in
/// over the wire or re-entered from the bus as a synthetic forward.
pub(crate) async fn handle_forward(
    state: Arc<AppState>,
    message: Message,
    inbound: bool,
) -> Result<Option<Message>, ForwardError> {
    if let Some(expires_time) = message.expires_time {
        if expires_time < Utc::now().timestamp() as u64 {
            return Err(ForwardError::MessageExpired);
        }
    }

    let body: ForwardBody = serde_json::from_value(message.body.clone())
        .map_err(|_| ForwardError::MalformedBody)?;
    let next = body.next;

    let attachments = message.attachments.as_deref().unwrap_or_default();
    let [attachment] = attachments else {
        return Err(ForwardError::ExactlyOneAttachmentRequired);
    };

    // Next is itself a mediated party: park for pickup.
    if state.repository.is_mediated(&next).await.map_err(internal)? {
        tracing::debug!("next is a mediated party, parking message in outbox");
        park(&state, &next, attachment).await?;
        return Ok(None);
    }

    if !state
        .repository
        .is_recipient_did_registered(&next)
        .await
        .map_err(internal)?
    {
        return Err(ForwardError::CouldNotForward);
    }

    let mediatee = state
        .repository
        .mediatee_by_recipient_did(&next)
        .await
        .map_err(internal)?
        .ok_or(ForwardError::CouldNotForward)?;

    if inbound {
        // Device-to-cloud: the attachment's payload leaves as a cloud
        // event on the mediatee's topic.
        let payload = decode_attachment_json(attachment)?;
        publish_to_bus(&state, &mediatee, &next, &payload).await?;
        Ok(None)
    } else {
        // Cloud-to-device: deliver to the remote DID's endpoint if it has
        // one, otherwise park for pickup.
        match didcomm_endpoint(&state, &mediatee.remote_did).await? {
            Some(endpoint) => {
                tracing::debug!("endpoint found within remote did, posting directly");
                forward_to_endpoint(&state, &message, &mediatee.remote_did, &endpoint).await?;
                Ok(None)
            }
            None => {
                tracing::debug!("no service found in remote did, parking message in outbox");
                park(&state, &next, attachment).await?;
                Ok(None)
            }
        }
    }
}

async fn park(
    state: &AppState,
    recipient_did: &str,
    attachment: &Attachment,
) -> Result<(), ForwardError> {
    state
        .repository
        .add_message(recipient_did, attachment)
        .await
        .map_err(internal)?;
    Ok(())
}

fn decode_attachment_json(attachment: &Attachment) -> Result<Value, ForwardError> {
    let AttachmentData::Base64 { value } = &attachment.data else {
        return Err(ForwardError::CouldNotForward);
    };

    let decoded = STANDARD
        .decode(&value.base64)
        .map_err(|_| ForwardError::CouldNotForward)?;

    serde_json::from_slice(&decoded).map_err(|_| ForwardError::CouldNotForward)
}

async fn publish_to_bus(
    state: &AppState,
    mediatee: &Mediatee,
    recipient_did: &str,
    payload: &Value,
) -> Result<(), ForwardError> {
    // The routing key and both party DIDs are available to the property
    // templates alongside the payload fields.
    let mut properties = mediatee.properties.clone();
    properties.insert("routingKey".to_string(), mediatee.routing_key.clone());
    properties.insert("remoteDid".to_string(), mediatee.remote_did.clone());
    properties.insert("recipientDid".to_string(), recipient_did.to_string());

    let data = render_properties(&properties, payload);
    let event = CloudEvent::new(&state.config.bus_url, &mediatee.event_type, data);

    state
        .publisher
        .publish(effective_topic(&mediatee.topic), event)
        .await
        .map_err(|e| ForwardError::InternalError(e.to_string()))
}

/// Resolves the remote DID and returns its DIDCommMessaging endpoint URI,
/// if it advertises one.
async fn didcomm_endpoint(
    state: &AppState,
    remote_did: &str,
) -> Result<Option<String>, ForwardError> {
    let diddoc = state
        .did_resolver
        .resolve(remote_did)
        .await
        .map_err(|_| ForwardError::CouldNotForward)?
        .ok_or(ForwardError::CouldNotForward)?;

    Ok(diddoc
        .service
        .into_iter()
        .find_map(|service| match service.service_endpoint {
            ServiceKind::DIDCommMessaging { value } => Some(value.uri),
            _ => None,
        }))
}

async fn forward_to_endpoint(
    state: &AppState,
    message: &Message,
    remote_did: &str,
    endpoint: &str,
) -> Result<(), ForwardError> {
    let message = Message {
        from: Some(state.mediator_did().to_owned()),
        to: Some(vec![remote_did.to_owned()]),
        created_time: Some(Utc::now().timestamp() as u64),
        ..message.clone()
    };

    let (packed, content_type) = if state.config.is_message_encrypted {
        let (packed, _) = message
            .pack_encrypted(
                remote_did,
                Some(state.mediator_did()),
                None,
                &state.did_resolver,
                &state.secrets_resolver,
                &PackEncryptedOptions::default(),
            )
            .await
            .map_err(internal)?;
        (packed, DIDCOMM_ENCRYPTED_MIME_TYPE)
    } else {
        let packed = message
            .pack_plaintext(&state.did_resolver)
            .await
            .map_err(internal)?;
        (packed, DIDCOMM_PLAIN_MIME_TYPE)
    };

    let response = reqwest::Client::new()
        .post(endpoint)
        .header(reqwest::header::CONTENT_TYPE, content_type)
        .body(packed)
        .send()
        .await
        .map_err(|_| ForwardError::CouldNotForward)?;

    if !response.status().is_success() {
        return Err(ForwardError::RecipientDenied);
    }

    Ok(())
}

#[inline]
fn internal<E: ToString>(err: E) -> ForwardError {
    ForwardError::InternalError(err.to_string())
}
