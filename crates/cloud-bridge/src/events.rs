use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A cloud event in JSON format, as consumed and produced by the XFSC
/// event infrastructure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudEvent {
    pub id: String,

    pub source: String,

    #[serde(rename = "specversion")]
    pub spec_version: String,

    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(rename = "datacontenttype")]
    pub data_content_type: String,

    pub time: String,

    pub data: Value,
}

impl CloudEvent {
    pub fn new(source: &str, event_type: &str, data: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source: source.to_string(),
            spec_version: String::from("1.0"),
            event_type: event_type.to_string(),
            data_content_type: String::from("application/json"),
            time: Utc::now().to_rfc3339(),
            data,
        }
    }
}

/// Payload of a device-bound bus event: the registered recipient DID and
/// the message to forward to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorMessage {
    pub did: String,
    pub payload: Value,
}

/// Notification published on the invitation topic once a mediation has
/// been granted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationNotify {
    pub invitation_id: String,
    pub did: String,
}
