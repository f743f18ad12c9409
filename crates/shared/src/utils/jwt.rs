//! Invitation tokens: compact EdDSA JWTs signed with the connector's own
//! authentication key.

use chrono::{Duration, Utc};
use did_utils::{
    didcore::Document,
    jws::{make_compact_jws, verify_compact_jws, JwsHeader},
};
use keystore::Keystore;
use serde_json::json;
use thiserror::Error;

use crate::utils::resolvers::secret_jwk;

#[derive(Debug, Error, PartialEq)]
pub enum JwtError {
    #[error("no auth key found")]
    NoAuthKey,
    #[error("no secret found")]
    SecretNotFound,
    #[error("token could not be signed")]
    SigningFailed,
    #[error("token not valid")]
    TokenNotValid,
    #[error("token expired")]
    TokenExpired,
    #[error("keystore failure: {0}")]
    Keystore(String),
}

/// Signs `{exp, invitationId}` claims with the first authentication key of
/// the given DID document.
pub async fn sign_invitation_token(
    diddoc: &Document,
    keystore: &Keystore,
    invitation_id: &str,
    expiration_minutes: i64,
) -> Result<String, JwtError> {
    let kid = first_authentication_kid(diddoc)?;
    let jwk = load_signing_jwk(keystore, &kid).await?;

    let exp = (Utc::now() + Duration::minutes(expiration_minutes)).timestamp();
    let payload = json!({
        "exp": exp,
        "invitationId": invitation_id,
    });

    let header = JwsHeader {
        kid: Some(kid),
        ..Default::default()
    };

    make_compact_jws(&header, payload, &jwk).map_err(|_| JwtError::SigningFailed)
}

/// Verifies an invitation token against the given DID document and returns
/// the `invitationId` claim.
///
/// An optional `Bearer ` prefix is tolerated; any algorithm other than
/// EdDSA is rejected by the JWS layer.
pub async fn verify_invitation_token(
    token: &str,
    diddoc: &Document,
    keystore: &Keystore,
) -> Result<String, JwtError> {
    let token = token
        .split_once("Bearer")
        .map(|(_, rest)| rest)
        .unwrap_or(token)
        .trim();

    let kid = first_authentication_kid(diddoc)?;
    let jwk = load_signing_jwk(keystore, &kid).await?.to_public();

    let payload = verify_compact_jws(token, &jwk).map_err(|_| JwtError::TokenNotValid)?;

    let exp = payload
        .get("exp")
        .and_then(|v| v.as_i64())
        .ok_or(JwtError::TokenNotValid)?;
    if exp < Utc::now().timestamp() {
        return Err(JwtError::TokenExpired);
    }

    payload
        .get("invitationId")
        .and_then(|v| v.as_str())
        .map(ToString::to_string)
        .ok_or(JwtError::TokenNotValid)
}

fn first_authentication_kid(diddoc: &Document) -> Result<String, JwtError> {
    let kid = diddoc
        .authentication
        .as_deref()
        .unwrap_or_default()
        .first()
        .map(|entry| entry.id())
        .ok_or(JwtError::NoAuthKey)?;

    Ok(if kid.starts_with('#') {
        format!("{}{}", diddoc.id, kid)
    } else {
        kid.to_string()
    })
}

async fn load_signing_jwk(
    keystore: &Keystore,
    kid: &str,
) -> Result<did_utils::jwk::Jwk, JwtError> {
    let secret = keystore
        .retrieve(kid)
        .await
        .map_err(|e| JwtError::Keystore(e.to_string()))?
        .ok_or(JwtError::SecretNotFound)?;

    secret_jwk(&secret).map_err(|_| JwtError::SecretNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::tests_utils::tests;

    #[tokio::test]
    async fn test_sign_then_verify_roundtrip() {
        let state = tests::setup();

        let token =
            sign_invitation_token(&state.diddoc, &state.keystore, "inv-42", 5).await.unwrap();

        let invitation_id = verify_invitation_token(&token, &state.diddoc, &state.keystore)
            .await
            .unwrap();
        assert_eq!(invitation_id, "inv-42");

        // the Authorization header shape is equally accepted
        let invitation_id =
            verify_invitation_token(&format!("Bearer {token}"), &state.diddoc, &state.keystore)
                .await
                .unwrap();
        assert_eq!(invitation_id, "inv-42");
    }

    #[tokio::test]
    async fn test_verify_rejects_expired_tokens() {
        let state = tests::setup();

        let token =
            sign_invitation_token(&state.diddoc, &state.keystore, "inv-42", -1).await.unwrap();

        let err = verify_invitation_token(&token, &state.diddoc, &state.keystore)
            .await
            .unwrap_err();
        assert_eq!(err, JwtError::TokenExpired);
    }

    #[tokio::test]
    async fn test_verify_rejects_garbage() {
        let state = tests::setup();

        let err = verify_invitation_token("Bearer not.a.token", &state.diddoc, &state.keystore)
            .await
            .unwrap_err();
        assert_eq!(err, JwtError::TokenNotValid);
    }
}
