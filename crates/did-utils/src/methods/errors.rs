use thiserror::Error;

/// Errors from generating or expanding `did:peer` addresses.
#[derive(Debug, Error, PartialEq)]
pub enum DidPeerError {
    #[error("did method not supported")]
    MethodNotSupported,
    #[error("empty arguments")]
    EmptyArguments,
    #[error("invalid purpose code")]
    InvalidPurposeCode,
    #[error("unexpected purpose")]
    UnexpectedPurpose,
    #[error("malformed peer did")]
    MalformedPeerDid,
    #[error("did parse error")]
    DidParseError,
    #[error("key material error")]
    KeyMaterialError,
    #[error("serde error: {0}")]
    SerdeError(String),
}

impl From<serde_json::Error> for DidPeerError {
    fn from(err: serde_json::Error) -> Self {
        DidPeerError::SerdeError(err.to_string())
    }
}
