//! Integration tests for the gateway SDK

use gateway_sdk::{
    CallbackQueue, Card, Expiry, Gateway, GatewayConfig, GatewayError, UpdateSessionRequest,
    UpdateSessionResponse, USER_AGENT,
};
use mockito::{Matcher, Server};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const SESSION_PATH: &str = "/api/rest/version/39/merchant/M123/session/S456";

fn gateway_for(server: &Server) -> Gateway {
    let mut gateway = Gateway::new();
    gateway
        .set_base_url(&format!("{}/ignored/path?query=1", server.url()))
        .unwrap()
        .set_merchant_id("M123")
        .unwrap();
    gateway
}

#[tokio::test]
async fn test_update_session_success() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("PUT", SESSION_PATH)
        .match_header("user-agent", USER_AGENT)
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "apiOperation": "UPDATE_PAYER_DATA",
            "sourceOfFunds": {
                "provided": {
                    "card": {
                        "nameOnCard": "Jane Doe",
                        "number": "4111111111111111",
                        "securityCode": "123",
                        "expiry": {"month": "05", "year": "29"}
                    }
                }
            }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"session": {"id": "S456"}}).to_string())
        .expect(1)
        .create_async()
        .await;

    let gateway = gateway_for(&server);
    let response = gateway
        .update_session_with_card_info("S456", "Jane Doe", "4111111111111111", "123", "05", "29")
        .unwrap()
        .await
        .unwrap();

    assert_eq!(response.session_id(), Some("S456"));
    m.assert_async().await;
}

#[tokio::test]
async fn test_update_session_gateway_error() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("PUT", SESSION_PATH)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "result": "ERROR",
                "error": {
                    "cause": "INVALID_REQUEST",
                    "explanation": "Invalid card number",
                    "field": "sourceOfFunds.provided.card.number",
                    "validationType": "INVALID"
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let gateway = gateway_for(&server);
    let card = Card::new("Jane Doe", "4111", "123", Expiry::new("05", "29"));
    let err = gateway
        .update_session_with_card("S456", card)
        .unwrap()
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(400));
    assert_eq!(err.explanation(), Some("Invalid card number"));
    let envelope = err.error_response().unwrap();
    assert_eq!(envelope.result.as_deref(), Some("ERROR"));
    assert_eq!(
        envelope.error.as_ref().unwrap().field.as_deref(),
        Some("sourceOfFunds.provided.card.number")
    );
}

#[tokio::test]
async fn test_error_envelope_without_explanation() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("PUT", SESSION_PATH)
        .with_status(401)
        .with_body(json!({"result": "ERROR"}).to_string())
        .create_async()
        .await;

    let gateway = gateway_for(&server);
    let err = gateway
        .update_session("S456", UpdateSessionRequest::with_card(Card::default()))
        .unwrap()
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(401));
    assert_eq!(err.explanation(), None);
    assert!(err.error_response().is_some());
}

#[tokio::test]
async fn test_malformed_success_response() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("PUT", SESSION_PATH)
        .with_status(200)
        .with_body("[1, 2, 3]")
        .create_async()
        .await;

    let gateway = gateway_for(&server);
    let err = gateway
        .update_session_with_card_info("S456", "Jane Doe", "4111111111111111", "123", "05", "29")
        .unwrap()
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_call_is_not_sent_until_awaited() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("PUT", SESSION_PATH)
        .with_status(200)
        .with_body("{}")
        .expect(0)
        .create_async()
        .await;

    let gateway = gateway_for(&server);
    let call = gateway
        .update_session_with_card_info("S456", "Jane Doe", "4111111111111111", "123", "05", "29")
        .unwrap();
    drop(call);

    m.assert_async().await;
}

#[tokio::test]
async fn test_callback_delivery_success() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("PUT", SESSION_PATH)
        .with_status(200)
        .with_body(json!({"session": {"id": "S456", "updateStatus": "SUCCESS"}}).to_string())
        .create_async()
        .await;

    let gateway = gateway_for(&server);
    let mut queue = CallbackQueue::new();
    let outcomes: Arc<Mutex<Vec<Result<UpdateSessionResponse, String>>>> =
        Arc::new(Mutex::new(Vec::new()));
    let sink = outcomes.clone();

    gateway
        .update_session_with_card_info("S456", "Jane Doe", "4111111111111111", "123", "05", "29")
        .unwrap()
        .deliver(&queue, move |outcome: gateway_sdk::Result<UpdateSessionResponse>| {
            sink.lock().unwrap().push(outcome.map_err(|e| e.to_string()));
        })
        .unwrap();

    queue.dispatch_next().await;

    let outcomes = outcomes.lock().unwrap();
    assert_eq!(outcomes.len(), 1);
    let response = outcomes[0].as_ref().unwrap();
    assert_eq!(response.session_id(), Some("S456"));
}

#[tokio::test]
async fn test_callback_delivery_error() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("PUT", SESSION_PATH)
        .with_status(400)
        .with_body(json!({"error": {"explanation": "Invalid card number"}}).to_string())
        .create_async()
        .await;

    let gateway = gateway_for(&server);
    let mut queue = CallbackQueue::new();
    let outcome = Arc::new(Mutex::new(None));
    let sink = outcome.clone();

    gateway
        .update_session_with_card_info("S456", "Jane Doe", "0000", "123", "05", "29")
        .unwrap()
        .deliver(&queue, move |result: gateway_sdk::Result<UpdateSessionResponse>| {
            *sink.lock().unwrap() = Some(result);
        })
        .unwrap();

    queue.dispatch_next().await;

    let err = outcome.lock().unwrap().take().unwrap().unwrap_err();
    assert_eq!(err.status_code(), Some(400));
    assert_eq!(err.explanation(), Some("Invalid card number"));
}

#[tokio::test]
async fn test_unreachable_host_fails_within_connect_timeout() {
    let config = GatewayConfig::new()
        .with_base_url("http://10.255.255.1:9999") // Non-routable IP
        .unwrap()
        .with_merchant_id("M123")
        .unwrap()
        .with_connect_timeout(Duration::from_millis(300));
    let gateway = Gateway::with_config(config);

    let started = Instant::now();
    let err = gateway
        .update_session_with_card_info("S456", "Jane Doe", "4111111111111111", "123", "05", "29")
        .unwrap()
        .await
        .unwrap_err();

    assert!(
        matches!(err, GatewayError::Transport { .. }),
        "Expected transport failure, got: {:?}",
        err
    );
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn test_configuration_errors_are_synchronous() {
    let gateway = Gateway::new();
    let err = gateway
        .update_session_with_card_info("S456", "Jane Doe", "4111111111111111", "123", "05", "29")
        .unwrap_err();
    assert!(matches!(err, GatewayError::InvalidArgument { .. }));

    let mut gateway = Gateway::new();
    assert!(gateway.set_base_url("::not a url::").is_err());
    assert!(gateway.set_merchant_id("").is_err());
}

#[test]
fn test_endpoint_composition() {
    let config = GatewayConfig::new()
        .with_base_url("https://host.example.com/ignored/path?query=1")
        .unwrap()
        .with_merchant_id("M123")
        .unwrap()
        .with_api_version(1);

    assert_eq!(config.base_url(), Some("https://host.example.com"));
    assert_eq!(
        config.update_session_url("S456").unwrap(),
        "https://host.example.com/api/rest/version/1/merchant/M123/session/S456"
    );
}
