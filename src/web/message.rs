use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use shared::state::AppState;
use std::sync::Arc;

use crate::web::dispatcher::{self, DispatchError};

/// `POST /message/receive` — the DIDComm wire entry point.
///
/// Returns the packed response message, an empty body for the no-response
/// sentinel, or 400 with a plain problem report when unpacking fails.
pub(crate) async fn receive_message(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);

    match dispatcher::process_didcomm_message(state, &body, bearer.as_deref()).await {
        Ok(Some(packed)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            packed,
        )
            .into_response(),
        Ok(None) => (StatusCode::OK, String::new()).into_response(),
        Err(DispatchError::UnpackingFailed(packed)) => (
            StatusCode::BAD_REQUEST,
            [(header::CONTENT_TYPE, "application/json")],
            packed,
        )
            .into_response(),
        Err(DispatchError::Fatal(err)) => {
            tracing::error!("failed to process message: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
