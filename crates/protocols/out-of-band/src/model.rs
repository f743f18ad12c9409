use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub(crate) struct InvitationBody {
    pub(crate) goal_code: String,
    pub(crate) goal: String,
    pub(crate) label: String,
    pub(crate) accept: Vec<String>,
    /// Bearer token authorizing the mediate-request this invitation leads
    /// to.
    pub(crate) auth: String,
}

impl InvitationBody {
    pub(crate) fn request_mediate(label: &str, bearer: &str) -> Self {
        Self {
            goal_code: String::from("request-mediate"),
            goal: String::from("RequestMediate"),
            label: label.to_string(),
            accept: vec![String::from("didcomm/v2")],
            auth: bearer.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invitation_body_wire_shape() {
        let body = InvitationBody::request_mediate("my-connector", "ey.j.wt");

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "goal_code": "request-mediate",
                "goal": "RequestMediate",
                "label": "my-connector",
                "accept": ["didcomm/v2"],
                "auth": "ey.j.wt"
            })
        );
    }
}
