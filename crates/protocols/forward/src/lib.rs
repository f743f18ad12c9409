//! Routing 2.0: accepting forwards on behalf of mediatees and moving them
//! onward, into the outbox, onto the bus or to a remote endpoint.
//!
//! See <https://identity.foundation/didcomm-messaging/spec/#routing-protocol-20>

mod error;
mod handler;
mod listener;

pub use error::ForwardError;
pub use handler::{handle_routing_message, mediator_forward_process, outbound_forward_process};
pub use listener::{into_synthetic_forward, listen_for_cloud_events};
