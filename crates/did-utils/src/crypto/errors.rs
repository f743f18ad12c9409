use thiserror::Error;

/// Errors arising from key material handling.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("can not retrieve signature")]
    CanNotRetrieveSignature,
    #[error("invalid curve")]
    InvalidCurve,
    #[error("invalid key length")]
    InvalidKeyLength,
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("invalid secret key")]
    InvalidSecretKey,
    #[error("invalid seed")]
    InvalidSeed,
    #[error("signature error")]
    SignatureError,
    #[error("unsupported algorithm")]
    Unsupported,
    #[error("verification error")]
    VerificationError,
}
