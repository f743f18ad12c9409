//! Message-pickup 3.0: draining the outbox of parked attachments.
//!
//! See <https://didcomm.org/messagepickup/3.0/>

mod error;
mod handler;
mod model;

pub use error::PickupError;
pub use handler::handle_pickup_message;
