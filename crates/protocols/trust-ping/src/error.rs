use didcomm::Message;
use shared::problem_report;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TrustPingError {
    #[error("Missing sender DID")]
    MissingSenderDID,

    #[error("Malformed request. {0}")]
    MalformedRequest(String),
}

impl TrustPingError {
    /// The problem report returned to the sender for this error.
    pub fn into_problem_report(self) -> Message {
        problem_report::internal_server_error()
    }
}
