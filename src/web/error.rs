use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced over the admin JSON facade.
#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("invalid request. {0}")]
    BadRequest(String),

    #[error("unknown connection")]
    ConnectionNotFound,

    #[error("DID is blocked")]
    DidBlocked,

    #[error("protocol not supported")]
    ProtocolNotSupported,

    #[error("internal server error")]
    InternalServer,
}

impl From<database::RepositoryError> for Error {
    fn from(err: database::RepositoryError) -> Self {
        tracing::error!("repository failure: {err}");
        Error::InternalServer
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status_code = match self {
            Error::BadRequest(_) | Error::ProtocolNotSupported => StatusCode::BAD_REQUEST,
            Error::ConnectionNotFound => StatusCode::NOT_FOUND,
            Error::DidBlocked => StatusCode::LOCKED,
            Error::InternalServer => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status_code, body).into_response()
    }
}
