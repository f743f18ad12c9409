//! A compact JSON Web Key model covering the OKP keys (Ed25519, X25519)
//! the connector deals in, as defined in [RFC 8037].
//!
//! [RFC 8037]: https://www.rfc-editor.org/rfc/rfc8037

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

use crate::crypto::{Error as CryptoError, BYTES_LENGTH_32};

/// An octet key pair CFRG-curve JSON Web Key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// The key type, always `OKP` here.
    pub kty: String,

    /// The CFRG curve, `Ed25519` or `X25519`.
    pub crv: String,

    /// The public key, base64url-encoded without padding.
    pub x: String,

    /// The private key, base64url-encoded without padding.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub d: Option<String>,
}

impl Jwk {
    /// Builds a public OKP key on the given curve.
    pub fn okp(crv: &str, public_key: &[u8]) -> Self {
        Jwk {
            kty: String::from("OKP"),
            crv: crv.to_string(),
            x: URL_SAFE_NO_PAD.encode(public_key),
            d: None,
        }
    }

    /// Builds a full OKP key pair on the given curve.
    pub fn okp_private(crv: &str, public_key: &[u8], private_key: &[u8]) -> Self {
        Jwk {
            d: Some(URL_SAFE_NO_PAD.encode(private_key)),
            ..Jwk::okp(crv, public_key)
        }
    }

    /// Returns the key with any private information removed.
    pub fn to_public(&self) -> Self {
        Jwk {
            d: None,
            ..self.clone()
        }
    }

    /// Decodes the public key bytes.
    pub fn public_key_bytes(&self) -> Result<[u8; BYTES_LENGTH_32], CryptoError> {
        decode_key_field(&self.x)
    }

    /// Decodes the private key bytes, if present.
    pub fn private_key_bytes(&self) -> Result<Option<[u8; BYTES_LENGTH_32]>, CryptoError> {
        self.d.as_deref().map(decode_key_field).transpose()
    }
}

fn decode_key_field(field: &str) -> Result<[u8; BYTES_LENGTH_32], CryptoError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(field)
        .map_err(|_| CryptoError::InvalidPublicKey)?;
    bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength)
}
