//! Out-of-band 2.0 invitations carrying the bearer token a mediatee needs
//! for its later `mediate-request`.
//!
//! See <https://identity.foundation/didcomm-messaging/spec/#invitation>

mod handler;
mod model;

pub use handler::{build_invitation, build_invitation_url, OobError};
