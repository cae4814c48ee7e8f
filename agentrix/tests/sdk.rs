//! End-to-end behaviour of the SDK against a mock API.

use std::time::Duration;

use agentrix::{
    Agentrix, AgentrixConfig, AutoPayGrantRequest, Brand, ListPayments, PaymentRequest,
};
use serde_json::json;
use wiremock::matchers::{any, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sdk(server: &MockServer) -> Agentrix {
    let config = AgentrixConfig::new("initial-key")
        .with_base_url(format!("{}/api/", server.uri()))
        .with_retries(3)
        .with_backoff_unit(Duration::from_millis(2))
        .with_webhook_secret("whsec_e2e");
    Agentrix::new(config).unwrap()
}

#[tokio::test]
async fn facades_share_one_client_and_key_rotation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/payments/pay_1"))
        .and(header("authorization", "Bearer initial-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "pay_1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/agent/auto-pay/grant"))
        .and(header("authorization", "Bearer rotated-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "grant_1" })))
        .expect(1)
        .mount(&server)
        .await;

    let sdk = sdk(&server);
    let payments = sdk.payments();
    payments.get("pay_1").await.unwrap();

    // Rotating through the SDK is visible to facades borrowed from it.
    sdk.set_api_key("rotated-key").unwrap();
    let grant = sdk.agents().get_auto_pay_grant().await.unwrap();
    assert_eq!(grant.unwrap().id.as_deref(), Some("grant_1"));
    assert_eq!(sdk.client().api_key(), "rotated-key");
}

#[tokio::test]
async fn flaky_server_recovers_within_retry_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/payments"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "payments": [{ "id": "a" }, { "id": "b" }],
            "total": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sdk = sdk(&server);
    let page = sdk.payments().list(&ListPayments::default()).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn validation_failures_never_reach_the_network() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let sdk = sdk(&server);
    let err = sdk
        .agents()
        .create_auto_pay_grant(&AutoPayGrantRequest::new("", 50.0, 500.0))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert!(err.message().contains("Agent ID"));

    assert!(sdk.payments().get("").await.unwrap_err().is_validation());
    assert!(
        sdk.payments()
            .create(&PaymentRequest::new(-5.0, "USD", "x"))
            .await
            .unwrap_err()
            .message()
            .contains("Amount")
    );
}

#[tokio::test]
async fn base_url_switch_redirects_subsequent_calls() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/payments/p"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "p" })))
        .expect(1)
        .mount(&second)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&first)
        .await;

    let sdk = sdk(&first);
    sdk.set_base_url(&format!("{}/v2/", second.uri()));
    assert_eq!(sdk.client().base_url(), format!("{}/v2", second.uri()));
    sdk.payments().get("p").await.unwrap();
}

#[test]
fn webhooks_enabled_by_secret() {
    let sdk = Agentrix::new(AgentrixConfig::new("k").with_brand(Brand::PAYMIND)).unwrap();
    assert!(sdk.webhooks().is_none());

    let sdk = Agentrix::new(
        AgentrixConfig::new("k")
            .with_brand(Brand::PAYMIND)
            .with_webhook_secret("s"),
    )
    .unwrap();
    let webhooks = sdk.webhooks().unwrap();
    assert_eq!(webhooks.signature_header(), "X-PayMind-Signature");

    let body = br#"{"id":"evt_1","type":"payment.succeeded","data":{}}"#;
    let signature = webhooks.sign(body).unwrap();
    let event = webhooks.construct_event(body, &signature).unwrap();
    assert_eq!(event.event_type.as_deref(), Some("payment.succeeded"));
    assert!(webhooks.construct_event(body, "00").is_err());
}

#[tokio::test]
async fn marketplace_shares_the_sdk_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/marketplace/products/p1"))
        .and(header("authorization", "Bearer initial-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "productId": "p1",
            "title": "Beans",
            "createdAt": 1_717_000_000,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sdk = sdk(&server);
    let product = sdk.marketplace().get_product("p1").await.unwrap();
    assert_eq!(product.title.as_deref(), Some("Beans"));
    assert_eq!(product.extra["createdAt"], 1_717_000_000);
}
