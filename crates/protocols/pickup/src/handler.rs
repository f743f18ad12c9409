use database::Repository;
use didcomm::{Message, MessageBuilder};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use shared::{
    constants::{
        DELIVERY_REQUEST_3_0, LIVE_MODE_CHANGE_3_0, MESSAGE_DELIVERY_3_0, MESSAGE_RECEIVED_3_0,
        STATUS_REQUEST_3_0, STATUS_RESPONSE_3_0,
    },
    midlw::transport_return_route_is_decorated_all,
    problem_report,
    state::AppState,
};
use std::{str::FromStr, sync::Arc};

use crate::{
    error::PickupError,
    model::{BodyDeliveryResponse, BodyStatusResponse, DeliveryResponse, StatusResponse},
};

/// Dispatches a message-pickup 3.0 message to its handler.
///
/// Every pickup operation requires the `return_route: all` decoration, as
/// responses only make sense on the same transport connection.
pub async fn handle_pickup_message(
    state: Arc<AppState>,
    message: Message,
) -> Result<Option<Message>, PickupError> {
    if !transport_return_route_is_decorated_all(&message) {
        return Err(PickupError::ReturnRouteAllMissing);
    }

    match message.type_.as_str() {
        STATUS_REQUEST_3_0 => handle_status_request(state, message).await,
        DELIVERY_REQUEST_3_0 => handle_delivery_request(state, message).await,
        MESSAGE_RECEIVED_3_0 => handle_messages_received(state, message).await,
        LIVE_MODE_CHANGE_3_0 => handle_live_delivery_change(state, message).await,
        _ => Err(PickupError::UnknownMessageType),
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StatusRequestBody {
    recipient_did: String,
}

async fn handle_status_request(
    state: Arc<AppState>,
    message: Message,
) -> Result<Option<Message>, PickupError> {
    let sender_did = sender_did(&message)?;
    let body: StatusRequestBody = parse_body(&message)?;

    ensure_recipient_is_owned(&state, &body.recipient_did, sender_did).await?;

    let message_count = state
        .repository
        .messages_count_for_recipient(&body.recipient_did)
        .await
        .map_err(|e| PickupError::InternalError(e.to_string()))?;

    let response_builder: MessageBuilder = StatusResponse {
        id: message.id.as_str(),
        type_: STATUS_RESPONSE_3_0,
        body: BodyStatusResponse {
            recipient_did: Some(&body.recipient_did),
            message_count: Some(message_count),
            ..Default::default()
        },
    }
    .into();

    Ok(Some(finalize(response_builder, &state, sender_did)))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DeliveryRequestBody {
    recipient_did: String,
    limit: usize,
}

async fn handle_delivery_request(
    state: Arc<AppState>,
    message: Message,
) -> Result<Option<Message>, PickupError> {
    let sender_did = sender_did(&message)?;
    let body: DeliveryRequestBody = parse_body(&message)?;

    ensure_recipient_is_owned(&state, &body.recipient_did, sender_did).await?;

    let attachments = state
        .repository
        .messages_for_recipient(&body.recipient_did, body.limit)
        .await
        .map_err(|e| PickupError::InternalError(e.to_string()))?;

    let response_builder: MessageBuilder = DeliveryResponse {
        id: message.id.as_str(),
        type_: MESSAGE_DELIVERY_3_0,
        body: BodyDeliveryResponse {
            recipient_did: &body.recipient_did,
        },
        attachments,
    }
    .into();

    Ok(Some(finalize(response_builder, &state, sender_did)))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MessagesReceivedBody {
    message_id_list: Vec<String>,
}

async fn handle_messages_received(
    state: Arc<AppState>,
    message: Message,
) -> Result<Option<Message>, PickupError> {
    let sender_did = sender_did(&message)?;
    let body: MessagesReceivedBody = parse_body(&message)?;

    let mut message_ids = Vec::with_capacity(body.message_id_list.len());
    for id in &body.message_id_list {
        // Unparseable ids cannot reference any outbox row, hence cannot
        // belong to the sender.
        let message_id =
            ObjectId::from_str(id).map_err(|_| PickupError::RemoteDidMessageMismatch)?;

        // Rows that are gone already (double acknowledgement) are skipped;
        // rows that exist must belong to a mediation owned by the sender.
        let row = state
            .repository
            .message_repository
            .find_one(message_id)
            .await
            .map_err(|e| PickupError::InternalError(e.to_string()))?;

        if let Some(row) = row {
            let owned = state
                .repository
                .recipient_and_remote_did_belong_together(&row.recipient_did, sender_did)
                .await
                .map_err(|e| PickupError::InternalError(e.to_string()))?;

            if !owned {
                return Err(PickupError::RemoteDidMessageMismatch);
            }
        }

        message_ids.push(message_id);
    }

    let delete_count = state
        .repository
        .delete_messages_by_ids(&message_ids)
        .await
        .map_err(|e| PickupError::InternalError(e.to_string()))?;

    let response_builder: MessageBuilder = StatusResponse {
        id: message.id.as_str(),
        type_: STATUS_RESPONSE_3_0,
        body: BodyStatusResponse {
            delete_count: Some(delete_count),
            ..Default::default()
        },
    }
    .into();

    Ok(Some(finalize(response_builder, &state, sender_did)))
}

async fn handle_live_delivery_change(
    state: Arc<AppState>,
    message: Message,
) -> Result<Option<Message>, PickupError> {
    let sender_did = sender_did(&message)?;

    // Live mode is out of scope, whatever the requested change.
    let report = problem_report::live_mode_not_supported();
    Ok(Some(
        Message::build(message.id.clone(), report.type_.clone(), report.body.clone())
            .to(sender_did.to_owned())
            .from(state.mediator_did().to_owned())
            .finalize(),
    ))
}

async fn ensure_recipient_is_owned(
    state: &AppState,
    recipient_did: &str,
    sender_did: &str,
) -> Result<(), PickupError> {
    state
        .repository
        .recipient_and_remote_did_belong_together(recipient_did, sender_did)
        .await
        .map_err(|e| PickupError::InternalError(e.to_string()))?
        .then_some(())
        .ok_or(PickupError::RecipientRemoteDidMismatch)
}

fn finalize(builder: MessageBuilder, state: &AppState, sender_did: &str) -> Message {
    builder
        .to(sender_did.to_owned())
        .from(state.mediator_did().to_owned())
        .finalize()
}

fn parse_body<'a, T: Deserialize<'a>>(message: &'a Message) -> Result<T, PickupError> {
    T::deserialize(&message.body).map_err(|e| PickupError::MalformedRequest(e.to_string()))
}

#[inline]
fn sender_did(message: &Message) -> Result<&str, PickupError> {
    message.from.as_deref().ok_or(PickupError::MissingSenderDID)
}
