use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use didcomm::Message;
use serde_json::json;
use shared::{constants::OOB_INVITATION_2_0, state::AppState};
use thiserror::Error;
use uuid::Uuid;

use crate::model::InvitationBody;

#[derive(Debug, Error, PartialEq)]
pub enum OobError {
    #[error("could not pack invitation: {0}")]
    PackingFailure(String),
}

/// Builds the plain out-of-band invitation message carrying the bearer
/// token.
pub fn build_invitation(state: &AppState, bearer: &str) -> Message {
    Message::build(
        Uuid::new_v4().to_string(),
        OOB_INVITATION_2_0.to_string(),
        json!(InvitationBody::request_mediate(&state.config.label, bearer)),
    )
    .from(state.mediator_did().to_owned())
    .finalize()
}

/// Packs the invitation and wraps it into the out-of-band URL form
/// `<base_url>?_oob=<base64url(packed)>`.
pub async fn build_invitation_url(state: &AppState, bearer: &str) -> Result<String, OobError> {
    let invitation = build_invitation(state, bearer);

    let packed = invitation
        .pack_plaintext(&state.did_resolver)
        .await
        .map_err(|e| OobError::PackingFailure(e.to_string()))?;

    let encoded = URL_SAFE_NO_PAD.encode(packed);
    Ok(format!("{}?_oob={}", state.config.public_url, encoded))
}
