use multibase::Base::Base58Btc;
use thiserror::Error;

use crate::{
    crypto::Error as CryptoError,
    jwk::Jwk,
};

/// Supported cryptographic algorithms.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Algorithm {
    Ed25519,
    X25519,
}

use Algorithm::*;

// Multicodec prefixes as registered for the did:peer method:
// https://identity.foundation/peer-did-method-spec/#method-2-multiple-inception-key-without-doc
impl Algorithm {
    /// Returns the multicodec prefix of the algorithm's public keys.
    pub fn multicodec_prefix(&self) -> [u8; 2] {
        match self {
            Ed25519 => [0xed, 0x01],
            X25519 => [0xec, 0x01],
        }
    }

    /// Returns the multicodec prefix of the algorithm's private keys.
    pub fn private_multicodec_prefix(&self) -> [u8; 2] {
        match self {
            Ed25519 => [0x80, 0x26],
            X25519 => [0x82, 0x26],
        }
    }

    /// Returns the corresponding `Algorithm` variant from a public-key
    /// multicodec prefix.
    pub fn from_multicodec_prefix(prefix: &[u8; 2]) -> Option<Self> {
        match prefix {
            [0xed, 0x01] => Some(Ed25519),
            [0xec, 0x01] => Some(X25519),
            _ => None,
        }
    }

    /// Returns the corresponding `Algorithm` variant from a private-key
    /// multicodec prefix.
    pub fn from_private_multicodec_prefix(prefix: &[u8; 2]) -> Option<Self> {
        match prefix {
            [0x80, 0x26] => Some(Ed25519),
            [0x82, 0x26] => Some(X25519),
            _ => None,
        }
    }

    /// Returns the length of the algorithm's public keys.
    pub fn public_key_length(&self) -> usize {
        match self {
            Ed25519 => 32,
            X25519 => 32,
        }
    }

    /// Builds a public JSON Web Key from raw public key bytes.
    pub fn build_jwk(&self, raw_public_key_bytes: &[u8]) -> Result<Jwk, CryptoError> {
        if raw_public_key_bytes.len() != self.public_key_length() {
            return Err(CryptoError::InvalidKeyLength);
        }

        Ok(match self {
            Ed25519 => Jwk::okp("Ed25519", raw_public_key_bytes),
            X25519 => Jwk::okp("X25519", raw_public_key_bytes),
        })
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum DecodeMultikeyError {
    #[error("error to multibase decode")]
    MultibaseDecodeError,
    #[error("not multibase-encoded in Base58")]
    NotBase58MultibaseEncoded,
    #[error("assumed multicodec too short")]
    MulticodecTooShort,
    #[error("unknown algorithm")]
    UnknownAlgorithm,
}

/// Decodes algorithm and public key bytes from a multibase-encoded multikey.
pub fn decode_multikey(multikey: &str) -> Result<(Algorithm, Vec<u8>), DecodeMultikeyError> {
    decode(multikey, Algorithm::from_multicodec_prefix)
}

/// Decodes algorithm and private key bytes from a multibase-encoded
/// private multikey.
pub fn decode_private_multikey(
    multikey: &str,
) -> Result<(Algorithm, Vec<u8>), DecodeMultikeyError> {
    decode(multikey, Algorithm::from_private_multicodec_prefix)
}

fn decode(
    multikey: &str,
    alg_from_prefix: fn(&[u8; 2]) -> Option<Algorithm>,
) -> Result<(Algorithm, Vec<u8>), DecodeMultikeyError> {
    let (base, multicodec) =
        multibase::decode(multikey).map_err(|_| DecodeMultikeyError::MultibaseDecodeError)?;

    if base != Base58Btc {
        return Err(DecodeMultikeyError::NotBase58MultibaseEncoded);
    }

    if multicodec.len() < 2 {
        return Err(DecodeMultikeyError::MulticodecTooShort);
    }

    let prefix: &[u8; 2] = &multicodec[..2].try_into().unwrap();
    let raw_key_bytes = &multicodec[2..];

    let alg = alg_from_prefix(prefix).ok_or(DecodeMultikeyError::UnknownAlgorithm)?;

    Ok((alg, raw_key_bytes.to_vec()))
}
