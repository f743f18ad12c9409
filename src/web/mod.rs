mod connection;
mod dispatcher;
mod error;
mod invitation;
mod message;

use axum::{
    http::{Method, StatusCode},
    routing::{get, post},
    Router,
};
use shared::state::AppState;
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn routes(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        // DIDComm wire entry point
        .route("/message/receive", post(message::receive_message))
        // Administration
        .route("/admin/invitation", post(invitation::create_invitation))
        .route("/admin/connections", get(connection::get_connections))
        .route(
            "/admin/connections/:did",
            get(connection::get_connection)
                .put(connection::update_connection)
                .delete(connection::delete_connection),
        )
        .route("/admin/connections/block/:did", post(connection::block_connection))
        .route("/admin/connections/unblock/:did", post(connection::unblock_connection))
        .route("/admin/connections/isblocked/:did", get(connection::is_blocked))
        .route("/admin/connections/accept", post(connection::accept_connection))
        // Health
        .route("/health", get(|| async { StatusCode::OK }))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(cors)
        .with_state(state)
}
