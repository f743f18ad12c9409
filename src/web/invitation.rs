use axum::{extract::State, response::IntoResponse};
use database::Repository;
use mongodb::bson::DateTime;
use serde::Deserialize;
use shared::{repository::entity::Mediatee, state::AppState, utils::jwt};
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

use crate::web::error::Error;

/// Mediatee parameters submitted when creating an invitation; the future
/// mediatee inherits them at grant time.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MediateeBase {
    pub(crate) protocol: String,

    #[serde(default)]
    pub(crate) topic: String,

    #[serde(default)]
    pub(crate) event_type: String,

    #[serde(default)]
    pub(crate) properties: HashMap<String, String>,

    #[serde(default)]
    pub(crate) group: String,
}

/// `POST /admin/invitation` — creates a pending invitation and returns the
/// out-of-band URL a mediatee redeems with `mediate-request`.
pub(crate) async fn create_invitation(
    State(state): State<Arc<AppState>>,
    axum::Json(base): axum::Json<MediateeBase>,
) -> Result<impl IntoResponse, Error> {
    if base.protocol != state.config.forward_protocol.as_str() {
        return Err(Error::ProtocolNotSupported);
    }

    // The invitation id stands in for the remote DID until the grant.
    let invitation_id = Uuid::new_v4().to_string();

    if state.repository.is_blocked(&invitation_id).await? {
        return Err(Error::DidBlocked);
    }

    state
        .repository
        .mediatee_repository
        .store(Mediatee {
            id: None,
            remote_did: invitation_id.clone(),
            routing_key: String::new(),
            protocol: base.protocol,
            topic: base.topic,
            event_type: base.event_type,
            properties: base.properties,
            recipient_dids: vec![],
            group: base.group,
            added: Some(DateTime::now()),
        })
        .await?;

    let token = jwt::sign_invitation_token(
        &state.diddoc,
        &state.keystore,
        &invitation_id,
        state.config.token_expiration_minutes,
    )
    .await
    .map_err(|err| {
        tracing::error!("failed to sign invitation token: {err}");
        Error::InternalServer
    })?;

    let url = out_of_band::build_invitation_url(&state, &token)
        .await
        .map_err(|err| {
            tracing::error!("failed to build invitation: {err}");
            Error::InternalServer
        })?;

    Ok(url)
}
