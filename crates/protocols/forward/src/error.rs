use didcomm::Message;
use shared::problem_report;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ForwardError {
    #[error("Unknown message type")]
    UnknownMessageType,

    #[error("Message has expired")]
    MessageExpired,

    #[error("Malformed forward body")]
    MalformedBody,

    #[error("Message must have exactly one attachment")]
    ExactlyOneAttachmentRequired,

    #[error("Message could not be forwarded")]
    CouldNotForward,

    #[error("Forwarded message was not accepted by the next recipient")]
    RecipientDenied,

    #[error("{0}")]
    InternalError(String),
}

impl ForwardError {
    /// The problem report returned to the sender for this error.
    pub fn into_problem_report(self) -> Message {
        match self {
            ForwardError::UnknownMessageType => problem_report::unknown_message_type(),
            ForwardError::MessageExpired => problem_report::message_expired(),
            ForwardError::MalformedBody
            | ForwardError::ExactlyOneAttachmentRequired
            | ForwardError::CouldNotForward => problem_report::could_not_forward(),
            ForwardError::RecipientDenied => problem_report::recipient_denied(),
            ForwardError::InternalError(_) => problem_report::internal_server_error(),
        }
    }
}
