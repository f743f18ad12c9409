use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub(crate) struct MediationGrantBody {
    pub(crate) routing_did: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub(crate) struct MediationDenyBody {
    pub(crate) comment: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub(crate) struct RecipientUpdateBody {
    pub(crate) updates: Vec<RecipientUpdate>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub(crate) struct RecipientUpdate {
    pub(crate) recipient_did: String,
    pub(crate) action: RecipientUpdateAction,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum RecipientUpdateAction {
    Add,
    Remove,
    #[serde(untagged)]
    Unknown(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub(crate) struct RecipientUpdateResponseBody {
    pub(crate) updated: Vec<RecipientUpdateConfirmation>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub(crate) struct RecipientUpdateConfirmation {
    pub(crate) recipient_did: String,
    pub(crate) action: RecipientUpdateAction,
    pub(crate) result: RecipientUpdateResult,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum RecipientUpdateResult {
    Success,
    NoChanges,
    ClientError,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub(crate) struct RecipientQueryBody {
    #[serde(default)]
    pub(crate) paginate: Pagination,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub(crate) struct Pagination {
    #[serde(default)]
    pub(crate) limit: usize,

    #[serde(default)]
    pub(crate) offset: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub(crate) struct RecipientQueryResponseBody {
    pub(crate) dids: Vec<RecipientDid>,
    pub(crate) pagination: OutgoingPagination,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub(crate) struct RecipientDid {
    pub(crate) recipient_did: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub(crate) struct OutgoingPagination {
    pub(crate) count: usize,
    pub(crate) offset: usize,
    pub(crate) remaining: usize,
}
