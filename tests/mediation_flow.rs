//! End-to-end runs over the assembled router: invitation to grant,
//! recipient bookkeeping, queued delivery and the blocklist gate.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use cloud_bridge::ConnectorMessage;
use didcomm::Message;
use didcomm_connector::web;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use shared::{
    constants::{
        DELIVERY_REQUEST_3_0, MEDIATE_GRANT_3_0, MEDIATE_REQUEST_3_0, MESSAGE_DELIVERY_3_0,
        MESSAGE_RECEIVED_3_0, RECIPIENT_3_0, RECIPIENT_QUERY_3_0, RECIPIENT_UPDATE_3_0,
        STATUS_REQUEST_3_0, STATUS_RESPONSE_3_0, TRUST_PING_2_0, TRUST_PING_RESPONSE_2_0,
    },
    state::AppState,
    utils::tests_utils::tests as global,
};
use std::sync::Arc;
use tower::ServiceExt;

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = BodyExt::collect(response.into_body()).await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn send_didcomm(
    app: &Router,
    state: &Arc<AppState>,
    message: &Message,
    bearer: Option<&str>,
) -> (StatusCode, String) {
    let packed = global::_edge_pack_message(
        state,
        message,
        Some(global::_edge_did()),
        global::_mediator_did(state),
    )
    .await
    .unwrap();

    let mut builder = Request::builder()
        .uri("/message/receive")
        .method(Method::POST)
        .header(header::CONTENT_TYPE, "application/didcomm-encrypted+json");

    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {bearer}"));
    }

    send(app, builder.body(Body::from(packed)).unwrap()).await
}

async fn unpack(state: &Arc<AppState>, packed: &str) -> Message {
    global::_edge_unpack_message(state, packed).await.unwrap()
}

/// Runs the invitation-to-grant flow and returns the granted routing DID.
async fn grant_mediation(app: &Router, state: &Arc<AppState>) -> String {
    // Request an invitation over the admin facade
    let (status, invitation_url) = send(
        app,
        Request::builder()
            .uri("/admin/invitation")
            .method(Method::POST)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({
                    "protocol": "nats",
                    "topic": "t1",
                    "eventType": "demo",
                    "properties": {},
                    "group": "g"
                })
                .to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Extract the bearer token from the out-of-band invitation
    let (_, oob) = invitation_url.split_once("?_oob=").unwrap();
    let packed = URL_SAFE_NO_PAD.decode(oob).unwrap();
    let invitation: Value = serde_json::from_slice(&packed).unwrap();
    let bearer = invitation["body"]["auth"].as_str().unwrap();

    // Redeem it with a mediate-request
    let request = Message::build(
        "id_mediate_request".to_owned(),
        MEDIATE_REQUEST_3_0.to_owned(),
        json!({}),
    )
    .to(global::_mediator_did(state))
    .from(global::_edge_did())
    .finalize();

    let (status, body) = send_didcomm(app, state, &request, Some(bearer)).await;
    assert_eq!(status, StatusCode::OK);

    let grant = unpack(state, &body).await;
    assert_eq!(grant.type_, MEDIATE_GRANT_3_0);

    grant.body["routing_did"][0].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_invitation_to_grant() {
    let state = global::setup();
    let app = web::routes(state.clone());

    let routing_did = grant_mediation(&app, &state).await;
    assert!(routing_did.starts_with("did:peer:2."));

    // the admin facade shows exactly one connection with the granted key
    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/admin/connections")
            .method(Method::GET)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let connections: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(connections.as_array().unwrap().len(), 1);
    assert_eq!(connections[0]["remoteDid"], global::_edge_did());
    assert_eq!(connections[0]["routingKey"], routing_did.as_str());
    assert_eq!(connections[0]["topic"], "t1");
}

#[tokio::test]
async fn test_recipient_update_and_query() {
    let state = global::setup();
    let app = web::routes(state.clone());
    grant_mediation(&app, &state).await;

    let update = Message::build(
        "id_recipient_update".to_owned(),
        RECIPIENT_UPDATE_3_0.to_owned(),
        json!({
            "updates": [
                {"recipient_did": "did:peer:2.Ez6LSr1", "action": "add"},
                {"recipient_did": "did:peer:2.Ez6LSr2", "action": "add"},
                {"recipient_did": "did:peer:2.Ez6LSr3", "action": "add"},
            ]
        }),
    )
    .to(global::_mediator_did(&state))
    .from(global::_edge_did())
    .finalize();

    let (status, body) = send_didcomm(&app, &state, &update, None).await;
    assert_eq!(status, StatusCode::OK);
    let response = unpack(&state, &body).await;
    assert_eq!(
        response.body["updated"][0]["result"],
        Value::from("success")
    );

    let query = Message::build(
        "id_recipient_query".to_owned(),
        RECIPIENT_QUERY_3_0.to_owned(),
        json!({"paginate": {"limit": 2, "offset": 1}}),
    )
    .to(global::_mediator_did(&state))
    .from(global::_edge_did())
    .finalize();

    let (status, body) = send_didcomm(&app, &state, &query, None).await;
    assert_eq!(status, StatusCode::OK);
    let response = unpack(&state, &body).await;

    assert_eq!(response.type_, RECIPIENT_3_0);
    assert_eq!(
        response.body,
        json!({
            "dids": [
                {"recipient_did": "did:peer:2.Ez6LSr2"},
                {"recipient_did": "did:peer:2.Ez6LSr3"},
            ],
            "pagination": {"count": 2, "offset": 1, "remaining": 0}
        })
    );
}

#[tokio::test]
async fn test_queued_delivery_roundtrip() {
    let state = global::setup();
    let app = web::routes(state.clone());
    grant_mediation(&app, &state).await;

    // register a recipient DID for the conversation
    let update = Message::build(
        "id_recipient_update".to_owned(),
        RECIPIENT_UPDATE_3_0.to_owned(),
        json!({"updates": [{"recipient_did": "did:peer:2.Ez6LSr1", "action": "add"}]}),
    )
    .to(global::_mediator_did(&state))
    .from(global::_edge_did())
    .finalize();
    send_didcomm(&app, &state, &update, None).await;

    // a cloud event for r1 re-enters as a synthetic forward; the device
    // DID has no endpoint, so the payload is parked in the outbox
    let content = ConnectorMessage {
        did: "did:peer:2.Ez6LSr1".to_string(),
        payload: json!("hello"),
    };
    let synthetic = forward::into_synthetic_forward(&global::_mediator_did(&state), &content);
    let outcome = forward::outbound_forward_process(state.clone(), synthetic).await.unwrap();
    assert!(outcome.is_none());

    // status reports one waiting message
    let status_request = Message::build(
        "id_status_request".to_owned(),
        STATUS_REQUEST_3_0.to_owned(),
        json!({"recipient_did": "did:peer:2.Ez6LSr1"}),
    )
    .header("return_route".into(), json!("all"))
    .to(global::_mediator_did(&state))
    .from(global::_edge_did())
    .finalize();

    let (_, body) = send_didcomm(&app, &state, &status_request, None).await;
    let response = unpack(&state, &body).await;
    assert_eq!(response.type_, STATUS_RESPONSE_3_0);
    assert_eq!(
        response.body,
        json!({"recipient_did": "did:peer:2.Ez6LSr1", "message_count": 1})
    );

    // delivery hands out the attachment, whose base64 decodes to the payload
    let delivery_request = Message::build(
        "id_delivery_request".to_owned(),
        DELIVERY_REQUEST_3_0.to_owned(),
        json!({"recipient_did": "did:peer:2.Ez6LSr1", "limit": 10}),
    )
    .header("return_route".into(), json!("all"))
    .to(global::_mediator_did(&state))
    .from(global::_edge_did())
    .finalize();

    let (_, body) = send_didcomm(&app, &state, &delivery_request, None).await;
    let response = unpack(&state, &body).await;
    assert_eq!(response.type_, MESSAGE_DELIVERY_3_0);

    let attachments = response.attachments.as_ref().unwrap();
    assert_eq!(attachments.len(), 1);
    let didcomm::AttachmentData::Base64 { value } = &attachments[0].data else {
        panic!("expected base64 attachment");
    };
    let decoded = base64::engine::general_purpose::STANDARD.decode(&value.base64).unwrap();
    assert_eq!(serde_json::from_slice::<Value>(&decoded).unwrap(), json!("hello"));
    let message_id = attachments[0].id.clone().unwrap();

    // acknowledging deletes exactly once
    let ack = |id: &str| {
        Message::build(
            id.to_owned(),
            MESSAGE_RECEIVED_3_0.to_owned(),
            json!({"message_id_list": [message_id]}),
        )
        .header("return_route".into(), json!("all"))
        .to(global::_mediator_did(&state))
        .from(global::_edge_did())
        .finalize()
    };

    let (_, body) = send_didcomm(&app, &state, &ack("ack-1"), None).await;
    let response = unpack(&state, &body).await;
    assert_eq!(response.body, json!({"delete_count": 1}));

    let (_, body) = send_didcomm(&app, &state, &ack("ack-2"), None).await;
    let response = unpack(&state, &body).await;
    assert_eq!(response.body, json!({"delete_count": 0}));
}

#[tokio::test]
async fn test_blocked_did_is_refused() {
    let state = global::setup();
    let app = web::routes(state.clone());
    grant_mediation(&app, &state).await;

    let (status, _) = send(
        &app,
        Request::builder()
            .uri(format!("/admin/connections/block/{}", global::_edge_did()))
            .method(Method::POST)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Request::builder()
            .uri(format!("/admin/connections/isblocked/{}", global::_edge_did()))
            .method(Method::GET)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"blocked": true}));

    // any DIDComm message from the blocked DID now elicits the report
    let ping = Message::build(
        "id_trust_ping".to_owned(),
        TRUST_PING_2_0.to_owned(),
        json!({"response_requested": true}),
    )
    .to(global::_mediator_did(&state))
    .from(global::_edge_did())
    .finalize();

    let (status, body) = send_didcomm(&app, &state, &ping, None).await;
    assert_eq!(status, StatusCode::OK);
    let response = unpack(&state, &body).await;
    assert_eq!(response.body["code"], "e.p.did.blocked");
}

#[tokio::test]
async fn test_trust_ping_over_the_wire() {
    let state = global::setup();
    let app = web::routes(state.clone());

    let ping = Message::build(
        "abc".to_owned(),
        TRUST_PING_2_0.to_owned(),
        json!({"response_requested": true}),
    )
    .to(global::_mediator_did(&state))
    .from(global::_edge_did())
    .finalize();

    let (status, body) = send_didcomm(&app, &state, &ping, None).await;
    assert_eq!(status, StatusCode::OK);
    let response = unpack(&state, &body).await;
    assert_eq!(response.type_, TRUST_PING_RESPONSE_2_0);
    assert_eq!(response.thid.as_deref(), Some("abc"));
    assert_eq!(response.body, json!({}));

    // without a requested response the body stays empty
    let ping = Message::build(
        "def".to_owned(),
        TRUST_PING_2_0.to_owned(),
        json!({"response_requested": false}),
    )
    .to(global::_mediator_did(&state))
    .from(global::_edge_did())
    .finalize();

    let (status, body) = send_didcomm(&app, &state, &ping, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_garbage_payload_is_a_bad_request() {
    let state = global::setup();
    let app = web::routes(state.clone());

    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/message/receive")
            .method(Method::POST)
            .body(Body::from("not didcomm"))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let report: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(report["body"]["code"], "e.p.msg.not_unpackable");
}

#[tokio::test]
async fn test_health() {
    let state = global::setup();
    let app = web::routes(state);

    let (status, _) = send(
        &app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
