use didcomm::{Attachment, Message, MessageBuilder};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Serialize)]
pub(crate) struct StatusResponse<'a> {
    pub(crate) id: &'a str,

    #[serde(rename = "type")]
    pub(crate) type_: &'a str,

    pub(crate) body: BodyStatusResponse<'a>,
}

#[derive(Debug, Serialize, Default)]
pub(crate) struct BodyStatusResponse<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) recipient_did: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message_count: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) delete_count: Option<usize>,
}

impl<'a> From<StatusResponse<'a>> for MessageBuilder {
    fn from(value: StatusResponse<'a>) -> Self {
        Message::build(value.id.to_owned(), value.type_.to_owned(), json!(value.body))
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DeliveryResponse<'a> {
    pub(crate) id: &'a str,

    #[serde(rename = "type")]
    pub(crate) type_: &'a str,

    pub(crate) body: BodyDeliveryResponse<'a>,

    pub(crate) attachments: Vec<Attachment>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BodyDeliveryResponse<'a> {
    pub(crate) recipient_did: &'a str,
}

impl<'a> From<DeliveryResponse<'a>> for MessageBuilder {
    fn from(value: DeliveryResponse<'a>) -> Self {
        Message::build(value.id.to_owned(), value.type_.to_owned(), json!(value.body))
            .attachments(value.attachments)
    }
}
