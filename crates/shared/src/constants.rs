#![cfg_attr(rustfmt, rustfmt_skip)]

pub const COORDINATE_MEDIATION_PREFIX: &str = "https://didcomm.org/coordinate-mediation/";
pub const MEDIATE_REQUEST_3_0: &str = "https://didcomm.org/coordinate-mediation/3.0/mediate-request";
pub const MEDIATE_DENY_3_0: &str = "https://didcomm.org/coordinate-mediation/3.0/mediate-deny";
pub const MEDIATE_GRANT_3_0: &str = "https://didcomm.org/coordinate-mediation/3.0/mediate-grant";
pub const RECIPIENT_UPDATE_3_0: &str = "https://didcomm.org/coordinate-mediation/3.0/recipient-update";
pub const RECIPIENT_UPDATE_RESPONSE_3_0: &str = "https://didcomm.org/coordinate-mediation/3.0/recipient-update-response";
pub const RECIPIENT_QUERY_3_0: &str = "https://didcomm.org/coordinate-mediation/3.0/recipient-query";
pub const RECIPIENT_3_0: &str = "https://didcomm.org/coordinate-mediation/3.0/recipient";

pub const ROUTING_PREFIX: &str = "https://didcomm.org/routing/2.0/";
pub const MEDIATE_FORWARD_2_0: &str = "https://didcomm.org/routing/2.0/forward";

pub const MESSAGE_PICKUP_PREFIX: &str = "https://didcomm.org/messagepickup/3.0/";
pub const STATUS_REQUEST_3_0: &str = "https://didcomm.org/messagepickup/3.0/status-request";
pub const STATUS_RESPONSE_3_0: &str = "https://didcomm.org/messagepickup/3.0/status";
pub const DELIVERY_REQUEST_3_0: &str = "https://didcomm.org/messagepickup/3.0/delivery-request";
pub const MESSAGE_DELIVERY_3_0: &str = "https://didcomm.org/messagepickup/3.0/delivery";
pub const MESSAGE_RECEIVED_3_0: &str = "https://didcomm.org/messagepickup/3.0/messages-received";
pub const LIVE_MODE_CHANGE_3_0: &str = "https://didcomm.org/messagepickup/3.0/live-delivery-change";

pub const TRUST_PING_PREFIX: &str = "https://didcomm.org/trust-ping/";
pub const TRUST_PING_2_0: &str = "https://didcomm.org/trust-ping/2.0/ping";
pub const TRUST_PING_RESPONSE_2_0: &str = "https://didcomm.org/trust-ping/2.0/ping-response";

pub const PROBLEM_REPORT_2_0: &str = "https://didcomm.org/report-problem/2.0/problem-report";
pub const OOB_INVITATION_2_0: &str = "https://didcomm.org/out-of-band/2.0/invitation";

pub const DIDCOMM_PLAIN_MIME_TYPE: &str = "application/didcomm-plain+json";
pub const DIDCOMM_ENCRYPTED_MIME_TYPE: &str = "application/didcomm-encrypted+json";
