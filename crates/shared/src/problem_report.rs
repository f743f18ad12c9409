//! DIDComm problem reports with the dotted code alphabet.
//!
//! See <https://identity.foundation/didcomm-messaging/spec/#problem-codes>

use didcomm::Message;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::constants::PROBLEM_REPORT_2_0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sorter {
    Error,
    Warning,
}

impl Sorter {
    pub fn code(&self) -> &'static str {
        match self {
            Sorter::Error => "e",
            Sorter::Warning => "w",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Protocol,
    Message,
}

impl Scope {
    pub fn code(&self) -> &'static str {
        match self {
            Scope::Protocol => "p",
            Scope::Message => "m",
        }
    }
}

#[derive(Debug, Serialize)]
struct ProblemReportBody<'a> {
    code: String,
    comment: &'a str,
}

/// Builds a problem-report message with `code` assembled from sorter,
/// scope and descriptor tokens.
pub fn problem_report(
    sorter: Sorter,
    scope: Scope,
    descriptors: &[&str],
    comment: &str,
) -> Message {
    let mut code = format!("{}.{}", sorter.code(), scope.code());
    for descriptor in descriptors {
        code.push('.');
        code.push_str(descriptor);
    }

    Message::build(
        Uuid::new_v4().to_string(),
        PROBLEM_REPORT_2_0.to_string(),
        json!(ProblemReportBody { code, comment }),
    )
    .finalize()
}

// Canonical instances referenced across the dispatcher and handlers.

pub fn message_not_unpackable() -> Message {
    problem_report(
        Sorter::Error,
        Scope::Protocol,
        &["msg", "not_unpackable"],
        "Message could not be unpacked.",
    )
}

pub fn message_expired() -> Message {
    problem_report(
        Sorter::Error,
        Scope::Protocol,
        &["msg", "expired"],
        "Message has expired.",
    )
}

pub fn wrong_creation_time() -> Message {
    problem_report(
        Sorter::Error,
        Scope::Protocol,
        &["msg", "creation_time"],
        "Message creation time lies in the future.",
    )
}

pub fn did_blocked() -> Message {
    problem_report(
        Sorter::Error,
        Scope::Protocol,
        &["did", "blocked"],
        "DID is blocked.",
    )
}

pub fn unknown_message_type() -> Message {
    problem_report(
        Sorter::Error,
        Scope::Protocol,
        &["msg", "unknown_type"],
        "Message type is not handled.",
    )
}

pub fn internal_server_error() -> Message {
    problem_report(
        Sorter::Error,
        Scope::Protocol,
        &["me"],
        "Internal server error.",
    )
}

pub fn invalid_request() -> Message {
    problem_report(
        Sorter::Error,
        Scope::Protocol,
        &["msg"],
        "Invalid request.",
    )
}

pub fn could_not_forward() -> Message {
    problem_report(
        Sorter::Error,
        Scope::Protocol,
        &["me", "forward"],
        "Message could not be forwarded.",
    )
}

pub fn recipient_denied() -> Message {
    problem_report(
        Sorter::Error,
        Scope::Protocol,
        &["me", "recipient_denied"],
        "Forwarded message was not accepted by the next recipient.",
    )
}

pub fn return_route_all_missing() -> Message {
    problem_report(
        Sorter::Error,
        Scope::Protocol,
        &["msg", "return_route_all_missing"],
        "Header return_route must be set to all.",
    )
}

pub fn recipient_remote_did_mismatch() -> Message {
    problem_report(
        Sorter::Error,
        Scope::Protocol,
        &["msg", "recipient_remote_did_mismatch"],
        "Recipient DID and remote DID do not belong together.",
    )
}

pub fn remote_did_message_mismatch() -> Message {
    problem_report(
        Sorter::Error,
        Scope::Protocol,
        &["msg", "remote_did_message_mismatch"],
        "Remote DID does not belong to message.",
    )
}

pub fn live_mode_not_supported() -> Message {
    problem_report(
        Sorter::Error,
        Scope::Message,
        &["live-mode-not-supported"],
        "Live mode is not supported",
    )
}
