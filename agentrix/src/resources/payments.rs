use serde::Serialize;
use serde_json::Value;

use super::segment;
use crate::client::HttpClient;
use crate::error::Result;
use crate::types::{ListPayments, Page, Payment, RoutingQuery, read_partial};
use crate::validation::{validate_amount, validate_currency, validate_id, validate_payment_request};

/// Payment operations.
#[derive(Debug, Clone, Copy)]
pub struct Payments<'a> {
    client: &'a HttpClient,
}

impl<'a> Payments<'a> {
    pub(crate) const fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// Creates a payment with `POST /payments`.
    ///
    /// Accepts a [`crate::PaymentRequest`] or any value serializing to an
    /// object with `amount`, `currency` and `description`.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request if the body is
    /// malformed, otherwise the translated API failure.
    pub async fn create<R>(&self, request: &R) -> Result<Payment>
    where
        R: Serialize + ?Sized,
    {
        let body = serde_json::to_value(request)?;
        validate_payment_request(&body)?;
        let value = self.client.post("/payments", &body).await?;
        Ok(read_partial(value))
    }

    /// Fetches a payment with `GET /payments/{id}`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank id, otherwise the translated
    /// API failure.
    pub async fn get(&self, payment_id: &str) -> Result<Payment> {
        validate_id("Payment ID", payment_id)?;
        let value = self
            .client
            .get(&format!("/payments/{}", segment(payment_id)))
            .await?;
        Ok(read_partial(value))
    }

    /// Cancels a payment with `POST /payments/{id}/cancel`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank id, otherwise the translated
    /// API failure.
    pub async fn cancel(&self, payment_id: &str) -> Result<Payment> {
        validate_id("Payment ID", payment_id)?;
        let value = self
            .client
            .post_empty(&format!("/payments/{}/cancel", segment(payment_id)))
            .await?;
        Ok(read_partial(value))
    }

    /// Asks the router for a payment method with `GET /payments/routing`.
    ///
    /// Only the filters set on `query` are sent. The routing decision is
    /// returned as the API sent it.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad amount or currency, otherwise the
    /// translated API failure.
    pub async fn get_routing(&self, query: &RoutingQuery) -> Result<Value> {
        validate_amount(query.amount)?;
        validate_currency(&query.currency)?;
        self.client.get_with_query("/payments/routing", query).await
    }

    /// Lists payments with `GET /payments`.
    ///
    /// # Errors
    ///
    /// Returns the translated API failure.
    pub async fn list(&self, query: &ListPayments) -> Result<Page<Payment>> {
        let value = self.client.get_with_query("/payments", query).await?;
        Ok(Page::from_value(value, "payments"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AgentrixConfig, PaymentRequest};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> HttpClient {
        let config = AgentrixConfig::new("k")
            .with_base_url(server.uri())
            .with_retries(1)
            .with_backoff_unit(Duration::from_millis(1));
        HttpClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_create_posts_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payments"))
            .and(body_json(json!({ "amount": 100.0, "currency": "USD", "description": "Order" })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({ "id": "pay_1", "status": "pending", "amount": "100.00" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let payment = Payments::new(&client)
            .create(&PaymentRequest::new(100.0, "USD", "Order"))
            .await
            .unwrap();
        assert_eq!(payment.id.as_deref(), Some("pay_1"));
        assert_eq!(payment.amount, Some(100.0));
    }

    #[tokio::test]
    async fn test_invalid_input_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server);
        let payments = Payments::new(&client);

        let err = payments.get("").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.message(), "Payment ID is required");

        let err = payments
            .create(&json!({ "amount": -5, "currency": "USD", "description": "x" }))
            .await
            .unwrap_err();
        assert!(err.message().contains("Amount"));

        let err = payments
            .get_routing(&RoutingQuery::new(10.0, "US"))
            .await
            .unwrap_err();
        assert!(err.message().contains("Currency"));
    }

    #[tokio::test]
    async fn test_cancel_and_routing_paths() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payments/pay%2F1/cancel"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "cancelled" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/payments/routing"))
            .and(query_param("amount", "50.0"))
            .and(query_param("currency", "CNY"))
            .and(query_param("isOnChain", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "recommendedMethod": "wallet" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let payments = Payments::new(&client);
        let cancelled = payments.cancel("pay/1").await.unwrap();
        assert_eq!(cancelled.status.as_deref(), Some("cancelled"));

        let mut query = RoutingQuery::new(50.0, "CNY");
        query.is_on_chain = Some(true);
        let routing = payments.get_routing(&query).await.unwrap();
        assert_eq!(routing["recommendedMethod"], "wallet");

        let requests = server.received_requests().await.unwrap();
        let routing_request = requests.iter().find(|r| r.url.path() == "/payments/routing").unwrap();
        assert!(!routing_request.url.query().unwrap_or_default().contains("agentId"));
    }

    #[tokio::test]
    async fn test_list_returns_pagination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payments"))
            .and(query_param("status", "completed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "id": "a" }],
                "pagination": { "total": 41, "limit": 1, "offset": 0 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let query = ListPayments {
            status: Some("completed".into()),
            ..ListPayments::default()
        };
        let page = Payments::new(&client).list(&query).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.pagination.total, Some(41));
    }

    #[tokio::test]
    async fn test_create_tolerates_numeric_id_and_timestamp() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payments"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 42,
                "status": "pending",
                "createdAt": 1_700_000_000,
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/payments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [],
                "pagination": { "total": "41" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let payments = Payments::new(&client);
        let payment = payments
            .create(&PaymentRequest::new(5.0, "USD", "Order"))
            .await
            .unwrap();
        assert_eq!(payment.id.as_deref(), Some("42"));
        assert_eq!(payment.created_at.as_deref(), Some("1700000000"));

        let page = payments.list(&ListPayments::default()).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total, Some(41));
    }
}
