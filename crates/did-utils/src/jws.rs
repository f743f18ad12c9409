//! Compact JSON Web Signatures over Ed25519, enough for the connector's
//! invitation tokens.

use multibase::Base::Base64Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    crypto::{CoreSign, Ed25519KeyPair},
    jwk::Jwk,
};

#[derive(Debug, Error, PartialEq)]
pub enum JwsError {
    #[error("invalid format")]
    InvalidFormat,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid signing key")]
    InvalidSigningKey,
    #[error("missing private key")]
    MissingPrivateKey,
    #[error("signing error")]
    SigningError,
    #[error("unsupported algorithm")]
    UnsupportedAlgorithm,
    #[error("serialization error")]
    SerializationError,
    #[error("deserialization error")]
    DeserializationError,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub enum JwsAlg {
    #[default]
    EdDSA,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct JwsHeader {
    /// Payload type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    /// Signature key id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Signature algorithm
    pub alg: JwsAlg,
}

/// Issues a compact JSON Web Signature.
pub fn make_compact_jws(header: &JwsHeader, payload: Value, jwk: &Jwk) -> Result<String, JwsError> {
    let encoded_header = {
        let header_json = serde_json::to_string(header).map_err(|_| JwsError::SerializationError)?;
        Base64Url.encode(header_json)
    };

    let encoded_payload = {
        let payload_json =
            serde_json::to_string(&payload).map_err(|_| JwsError::SerializationError)?;
        Base64Url.encode(payload_json)
    };

    let phrase = format!("{encoded_header}.{encoded_payload}");

    if jwk.crv.to_ascii_lowercase() != "ed25519" {
        return Err(JwsError::InvalidSigningKey);
    }

    let keypair: Ed25519KeyPair = jwk.clone().try_into().map_err(|_| JwsError::InvalidSigningKey)?;
    if keypair.secret_key.is_none() {
        return Err(JwsError::MissingPrivateKey);
    }

    let signature = keypair
        .sign(phrase.as_bytes())
        .map_err(|_| JwsError::SigningError)?;
    let encoded_signature = Base64Url.encode(signature);

    Ok(format!("{phrase}.{encoded_signature}"))
}

/// Verifies a compact JSON Web Signature and returns its decoded payload.
pub fn verify_compact_jws(jws: &str, jwk: &Jwk) -> Result<Value, JwsError> {
    let parts: Vec<_> = jws.split('.').collect();
    if parts.len() != 3 {
        return Err(JwsError::InvalidFormat);
    }

    let header_decoded = String::from_utf8(
        Base64Url.decode(parts[0]).map_err(|_| JwsError::InvalidFormat)?,
    )
    .map_err(|_| JwsError::InvalidFormat)?;
    let header: JwsHeader =
        serde_json::from_str(&header_decoded).map_err(|_| JwsError::UnsupportedAlgorithm)?;

    match header.alg {
        JwsAlg::EdDSA => (),
    }

    let phrase = format!("{}.{}", parts[0], parts[1]);
    let signature = Base64Url
        .decode(parts[2])
        .map_err(|_| JwsError::InvalidSignature)?;

    let keypair: Ed25519KeyPair = jwk.clone().try_into().map_err(|_| JwsError::InvalidSigningKey)?;
    keypair
        .verify(phrase.as_bytes(), &signature)
        .map_err(|_| JwsError::InvalidSignature)?;

    let payload = Base64Url
        .decode(parts[1])
        .map_err(|_| JwsError::InvalidFormat)?;
    serde_json::from_slice(&payload).map_err(|_| JwsError::DeserializationError)
}
