//! Coordinate-mediation 3.0: granting mediations and maintaining
//! recipient-DID registrations.
//!
//! See <https://didcomm.org/coordinate-mediation/3.0/>

mod error;
mod handler;
mod model;

pub use error::MediationError;
pub use handler::{handle_coordination_message, new_routing_did};
