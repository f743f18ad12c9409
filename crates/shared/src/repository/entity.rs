use database::Identifiable;
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Record of a mediation relationship between a mediatee and this
/// connector.
///
/// A pending invitation reuses this shape: its `remote_did` holds the
/// invitation id (a UUID) and its `routing_key` is still empty.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Mediatee {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// The mediatee's externally-owned DID.
    pub remote_did: String,

    /// Connector-generated peer DID presented to third parties as the
    /// routable destination.
    #[serde(default)]
    pub routing_key: String,

    /// How cloud-to-device forwards leave the connector: `http` or `nats`.
    #[serde(default)]
    pub protocol: String,

    /// Bus topic for this mediatee's events.
    #[serde(default)]
    pub topic: String,

    /// Event type stamped on emitted cloud events.
    #[serde(default)]
    pub event_type: String,

    /// Property templates rendered against the forwarded payload at
    /// publish time.
    #[serde(default)]
    pub properties: HashMap<String, String>,

    /// Per-conversation peer DIDs the mediatee has registered under this
    /// mediation.
    #[serde(default)]
    pub recipient_dids: Vec<String>,

    #[serde(default)]
    pub group: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub added: Option<DateTime>,
}

/// An outbox row: an attachment parked for a registered recipient DID
/// until the mediatee picks it up.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RoutedMessage {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub recipient_did: String,

    /// The didcomm attachment in JSON form, media metadata included.
    pub attachment: Value,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub added: Option<DateTime>,
}

/// A DID refused for any new or existing mediation action.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BlockedDid {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub remote_did: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub added: Option<DateTime>,
}

/// The connector's own DID, created at first boot and never rotated.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MediatorDid {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub did: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub added: Option<DateTime>,
}

macro_rules! identifiable {
    ($($entity:ty),*) => {
        $(
            impl Identifiable for $entity {
                fn id(&self) -> Option<ObjectId> {
                    self.id
                }

                fn set_id(&mut self, id: ObjectId) {
                    self.id = Some(id);
                }
            }
        )*
    };
}

identifiable!(Mediatee, RoutedMessage, BlockedDid, MediatorDid);
