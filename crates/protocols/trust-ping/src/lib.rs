//! Trust-ping 2.0.
//!
//! See <https://identity.foundation/didcomm-messaging/spec/#trust-ping-protocol-20>

mod error;
mod handler;
mod model;

pub use error::TrustPingError;
pub use handler::handle_trust_ping;
