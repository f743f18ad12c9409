use crate::{
    crypto::{
        ed25519::Ed25519KeyPair,
        errors::Error as CryptoError,
        traits::{Generate, KeyMaterial},
        x25519::X25519KeyPair,
    },
    jwk::Jwk,
};

/// Key format to use when expanding a DID into a DID document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PublicKeyFormat {
    #[default]
    Multikey,
    Jwk,
}

impl TryFrom<Ed25519KeyPair> for Jwk {
    type Error = CryptoError;

    fn try_from(keypair: Ed25519KeyPair) -> Result<Self, Self::Error> {
        Ok(Jwk::okp_private(
            "Ed25519",
            &keypair.public_key_bytes()?,
            &keypair.private_key_bytes()?,
        ))
    }
}

impl TryFrom<Jwk> for Ed25519KeyPair {
    type Error = CryptoError;

    fn try_from(jwk: Jwk) -> Result<Self, Self::Error> {
        if jwk.crv != "Ed25519" {
            return Err(CryptoError::InvalidCurve);
        }

        match jwk.private_key_bytes()? {
            Some(bytes) => Ed25519KeyPair::from_secret_key(&bytes),
            None => Ed25519KeyPair::from_public_key(&jwk.public_key_bytes()?),
        }
    }
}

impl TryFrom<X25519KeyPair> for Jwk {
    type Error = CryptoError;

    fn try_from(keypair: X25519KeyPair) -> Result<Self, Self::Error> {
        Ok(Jwk::okp_private(
            "X25519",
            &keypair.public_key_bytes()?,
            &keypair.private_key_bytes()?,
        ))
    }
}

impl TryFrom<Jwk> for X25519KeyPair {
    type Error = CryptoError;

    fn try_from(jwk: Jwk) -> Result<Self, Self::Error> {
        if jwk.crv != "X25519" {
            return Err(CryptoError::InvalidCurve);
        }

        match jwk.private_key_bytes()? {
            Some(bytes) => X25519KeyPair::from_secret_key(&bytes),
            None => X25519KeyPair::from_public_key(&jwk.public_key_bytes()?),
        }
    }
}
