use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use database::Repository;
use didcomm::{Message, UnpackOptions};
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared::{
    constants::{MEDIATE_DENY_3_0, MEDIATE_GRANT_3_0, MEDIATE_REQUEST_3_0},
    repository::entity::Mediatee,
    state::AppState,
};
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

use crate::web::{error::Error, invitation::MediateeBase};

/// Wire form of a mediatee on the admin facade.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConnectionDto {
    remote_did: String,
    routing_key: String,
    protocol: String,
    topic: String,
    event_type: String,
    properties: HashMap<String, String>,
    recipient_dids: Vec<String>,
    group: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    added: Option<String>,
}

impl From<Mediatee> for ConnectionDto {
    fn from(mediatee: Mediatee) -> Self {
        Self {
            remote_did: mediatee.remote_did,
            routing_key: mediatee.routing_key,
            protocol: mediatee.protocol,
            topic: mediatee.topic,
            event_type: mediatee.event_type,
            properties: mediatee.properties,
            recipient_dids: mediatee.recipient_dids,
            group: mediatee.group,
            added: mediatee
                .added
                .and_then(|added| added.try_to_rfc3339_string().ok()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListParams {
    group: Option<String>,
}

/// `GET /admin/connections[?group]`
pub(crate) async fn get_connections(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ConnectionDto>>, Error> {
    let mediatees = state.repository.mediatees(params.group.as_deref()).await?;
    Ok(Json(mediatees.into_iter().map(Into::into).collect()))
}

/// `GET /admin/connections/:did`
pub(crate) async fn get_connection(
    State(state): State<Arc<AppState>>,
    Path(did): Path<String>,
) -> Result<Json<ConnectionDto>, Error> {
    let mediatee = state
        .repository
        .mediatee(&did)
        .await?
        .ok_or(Error::ConnectionNotFound)?;

    Ok(Json(mediatee.into()))
}

/// `PUT /admin/connections/:did`
pub(crate) async fn update_connection(
    State(state): State<Arc<AppState>>,
    Path(did): Path<String>,
    Json(base): Json<MediateeBase>,
) -> Result<Json<ConnectionDto>, Error> {
    let mediatee = state
        .repository
        .mediatee(&did)
        .await?
        .ok_or(Error::ConnectionNotFound)?;

    let updated = state
        .repository
        .mediatee_repository
        .update(Mediatee {
            protocol: base.protocol,
            topic: base.topic,
            event_type: base.event_type,
            properties: base.properties,
            group: base.group,
            ..mediatee
        })
        .await?;

    Ok(Json(updated.into()))
}

/// `DELETE /admin/connections/:did`
pub(crate) async fn delete_connection(
    State(state): State<Arc<AppState>>,
    Path(did): Path<String>,
) -> Result<StatusCode, Error> {
    if state.repository.mediatee(&did).await?.is_none() {
        return Err(Error::ConnectionNotFound);
    }

    state.repository.delete_mediatee(&did).await?;
    Ok(StatusCode::OK)
}

/// `POST /admin/connections/block/:did`
pub(crate) async fn block_connection(
    State(state): State<Arc<AppState>>,
    Path(did): Path<String>,
) -> Result<StatusCode, Error> {
    state.repository.block(&did).await?;
    Ok(StatusCode::OK)
}

/// `POST /admin/connections/unblock/:did`
pub(crate) async fn unblock_connection(
    State(state): State<Arc<AppState>>,
    Path(did): Path<String>,
) -> Result<StatusCode, Error> {
    state.repository.unblock(&did).await?;
    Ok(StatusCode::OK)
}

/// `GET /admin/connections/isblocked/:did`
pub(crate) async fn is_blocked(
    State(state): State<Arc<AppState>>,
    Path(did): Path<String>,
) -> Result<Json<Value>, Error> {
    let blocked = state.repository.is_blocked(&did).await?;
    Ok(Json(json!({"blocked": blocked})))
}

#[derive(Debug, Deserialize)]
pub(crate) struct AcceptInvitation {
    invitation: String,

    #[serde(flatten)]
    base: MediateeBase,
}

/// `POST /admin/connections/accept` — the connector acting as mediatee:
/// redeems another mediator's out-of-band invitation and records the
/// resulting relationship.
pub(crate) async fn accept_connection(
    State(state): State<Arc<AppState>>,
    Json(accept): Json<AcceptInvitation>,
) -> Result<impl IntoResponse, Error> {
    if accept.invitation.is_empty()
        || accept.base.topic.is_empty()
        || accept.base.event_type.is_empty()
        || accept.base.group.is_empty()
    {
        return Err(Error::BadRequest("missing invitation parameters".to_owned()));
    }

    if accept.base.protocol != state.config.forward_protocol.as_str() {
        return Err(Error::ProtocolNotSupported);
    }

    let url = url::Url::parse(&accept.invitation)
        .map_err(|e| Error::BadRequest(format!("invalid invitation url: {e}")))?;

    let oob = url
        .query_pairs()
        .find(|(key, _)| key == "_oob")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| Error::BadRequest("invitation carries no _oob part".to_owned()))?;

    let packed = URL_SAFE_NO_PAD
        .decode(oob.as_bytes())
        .map_err(|e| Error::BadRequest(format!("undecodable invitation: {e}")))?;
    let packed = String::from_utf8(packed)
        .map_err(|e| Error::BadRequest(format!("undecodable invitation: {e}")))?;

    let (invitation, _) = Message::unpack(
        &packed,
        &state.did_resolver,
        &state.secrets_resolver,
        &UnpackOptions::default(),
    )
    .await
    .map_err(|e| Error::BadRequest(format!("unreadable invitation: {e}")))?;

    let inviter_did = invitation
        .from
        .clone()
        .ok_or_else(|| Error::BadRequest("invitation carries no sender".to_owned()))?;
    let bearer = invitation
        .body
        .get("auth")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::BadRequest("invitation carries no auth token".to_owned()))?;

    if state.repository.is_mediated(&inviter_did).await? {
        return Err(Error::BadRequest("connection already exists".to_owned()));
    }

    // Our own peer DID for this relationship.
    let own_did = mediator_coordination::new_routing_did(&state).await.map_err(|err| {
        tracing::error!("failed to generate peer did: {err}");
        Error::InternalServer
    })?;

    let connect_url = {
        let mut endpoint = url.clone();
        endpoint.set_query(None);
        format!("{}/message/receive", endpoint.as_str().trim_end_matches('/'))
    };

    let routing_did = request_mediation(&connect_url, &own_did, &inviter_did, bearer).await?;

    state
        .repository
        .mediatee_repository
        .store(Mediatee {
            id: None,
            remote_did: inviter_did,
            routing_key: String::new(),
            protocol: accept.base.protocol,
            topic: accept.base.topic,
            event_type: accept.base.event_type,
            properties: accept.base.properties,
            recipient_dids: vec![routing_did.clone()],
            group: accept.base.group,
            added: Some(DateTime::now()),
        })
        .await?;

    Ok(Json(json!(routing_did)))
}

/// Plays the mediatee side of coordinate-mediation against a remote
/// mediator and returns the granted routing DID.
async fn request_mediation(
    connect_url: &str,
    own_did: &str,
    mediator_did: &str,
    bearer: &str,
) -> Result<String, Error> {
    let now = Utc::now().timestamp();
    let request = json!({
        "id": Uuid::new_v4().to_string(),
        "type": MEDIATE_REQUEST_3_0,
        "body": {},
        "from": own_did,
        "to": [mediator_did],
        "created_time": now,
        "expires_time": now + 3600,
    });

    let response = reqwest::Client::new()
        .post(connect_url)
        .bearer_auth(bearer)
        .json(&request)
        .send()
        .await
        .map_err(|e| Error::BadRequest(format!("mediator unreachable: {e}")))?;

    if !response.status().is_success() {
        return Err(Error::BadRequest(format!(
            "mediation request failed with status {}",
            response.status()
        )));
    }

    let response: Value = response
        .json()
        .await
        .map_err(|e| Error::BadRequest(format!("unreadable mediation response: {e}")))?;

    match response.get("type").and_then(Value::as_str) {
        Some(MEDIATE_GRANT_3_0) => response["body"]["routing_did"][0]
            .as_str()
            .map(ToString::to_string)
            .ok_or_else(|| Error::BadRequest("grant carries no routing did".to_owned())),
        Some(MEDIATE_DENY_3_0) => Err(Error::BadRequest("mediation request was denied".to_owned())),
        _ => Err(Error::BadRequest("unexpected mediation response".to_owned())),
    }
}
