use didcomm::Message;
use shared::problem_report;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PickupError {
    #[error("Missing sender DID")]
    MissingSenderDID,

    #[error("Header return_route must be set to all")]
    ReturnRouteAllMissing,

    #[error("Recipient DID and remote DID do not belong together")]
    RecipientRemoteDidMismatch,

    #[error("Remote DID does not belong to message")]
    RemoteDidMessageMismatch,

    #[error("Malformed request. {0}")]
    MalformedRequest(String),

    #[error("Unknown message type")]
    UnknownMessageType,

    #[error("{0}")]
    InternalError(String),
}

impl PickupError {
    /// The problem report returned to the sender for this error.
    pub fn into_problem_report(self) -> Message {
        match self {
            PickupError::ReturnRouteAllMissing => problem_report::return_route_all_missing(),
            PickupError::RecipientRemoteDidMismatch => {
                problem_report::recipient_remote_did_mismatch()
            }
            PickupError::RemoteDidMessageMismatch => problem_report::remote_did_message_mismatch(),
            PickupError::UnknownMessageType => problem_report::unknown_message_type(),
            PickupError::MissingSenderDID
            | PickupError::MalformedRequest(_)
            | PickupError::InternalError(_) => problem_report::internal_server_error(),
        }
    }
}
