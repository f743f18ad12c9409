use didcomm::Message;
use shared::problem_report;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MediationError {
    #[error("Missing sender DID")]
    MissingSenderDID,

    #[error("Unknown message type")]
    UnknownMessageType,

    #[error("Sender is not mediated")]
    UncoordinatedSender,

    #[error("Connection already exists")]
    AlreadyMediated,

    #[error("Invitation not found")]
    InvitationNotFound,

    #[error("Protocol not supported")]
    ProtocolNotSupported,

    #[error("Unexpected message format. {0}")]
    UnexpectedMessageFormat(String),

    #[error("{0}")]
    InternalError(String),
}

impl MediationError {
    /// The problem report returned to the sender for this error.
    pub fn into_problem_report(self) -> Message {
        match self {
            MediationError::AlreadyMediated
            | MediationError::InvitationNotFound
            | MediationError::UncoordinatedSender => problem_report::invalid_request(),
            MediationError::UnknownMessageType => problem_report::unknown_message_type(),
            MediationError::MissingSenderDID
            | MediationError::ProtocolNotSupported
            | MediationError::UnexpectedMessageFormat(_)
            | MediationError::InternalError(_) => problem_report::internal_server_error(),
        }
    }
}
