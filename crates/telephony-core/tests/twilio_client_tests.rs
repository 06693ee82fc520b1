//! Twilio REST client tests against a mock provider API

use callcenter_admin_core::CallStatus;
use callcenter_telephony_core::{
    Error, OutboundCall, ProviderCredentials, TelephonyProvider, TwilioClient,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CALLS_PATH: &str = "/2010-04-01/Accounts/AC123/Calls.json";

fn credentials(record: bool) -> ProviderCredentials {
    ProviderCredentials {
        account_sid: "AC123".to_string(),
        auth_token: "token".to_string(),
        from_number: "+15550000000".to_string(),
        base_url: "https://cc.example.com".to_string(),
        record,
    }
}

fn outbound(to: &str) -> OutboundCall {
    OutboundCall {
        to: to.to_string(),
        from: None,
    }
}

#[tokio::test]
async fn test_place_call_posts_form_with_basic_auth() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CALLS_PATH))
        .and(header("authorization", "Basic QUMxMjM6dG9rZW4="))
        .and(body_string_contains("To=%2B15551112222"))
        .and(body_string_contains("From=%2B15550000000"))
        .and(body_string_contains(
            "Url=https%3A%2F%2Fcc.example.com%2Fapi%2Ftwilio%2Fvoice",
        ))
        .and(body_string_contains(
            "StatusCallback=https%3A%2F%2Fcc.example.com%2Fapi%2Ftwilio%2Fcall-status",
        ))
        .and(body_string_contains("StatusCallbackMethod=POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "sid": "CA0001",
            "status": "queued",
            "from": "+15550000000",
            "to": "+15551112222"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = TwilioClient::with_api_base(&server.uri()).unwrap();
    let placed = client
        .place_call(&credentials(false), &outbound("+15551112222"))
        .await
        .unwrap();

    assert_eq!(placed.sid, "CA0001");
    assert_eq!(placed.status, CallStatus::Queued);
    assert_eq!(placed.from, "+15550000000");
    assert_eq!(placed.to, "+15551112222");
}

#[tokio::test]
async fn test_recording_flag_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CALLS_PATH))
        .and(body_string_contains("Record=true"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "sid": "CA0002",
            "status": "ringing"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = TwilioClient::with_api_base(&server.uri()).unwrap();
    let placed = client
        .place_call(&credentials(true), &outbound("+15551112222"))
        .await
        .unwrap();

    assert_eq!(placed.status, CallStatus::Ringing);
    // Missing echo fields fall back to the request
    assert_eq!(placed.from, "+15550000000");
}

#[tokio::test]
async fn test_provider_error_carries_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CALLS_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": 21211,
            "message": "The 'To' number +1555 is not a valid phone number.",
            "status": 400
        })))
        .mount(&server)
        .await;

    let client = TwilioClient::with_api_base(&server.uri()).unwrap();
    let err = client
        .place_call(&credentials(false), &outbound("+1555"))
        .await
        .unwrap_err();

    match err {
        Error::Rejected { status, code, message } => {
            assert_eq!(status, 400);
            assert_eq!(code, Some(21211));
            assert!(message.contains("not a valid phone number"));
        }
        other => panic!("Expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_error_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CALLS_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let client = TwilioClient::with_api_base(&server.uri()).unwrap();
    let err = client
        .place_call(&credentials(false), &outbound("+15551112222"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Rejected { status: 503, code: None, .. }));
    assert!(!err.is_client_error());
}
