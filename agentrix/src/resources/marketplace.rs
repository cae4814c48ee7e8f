use super::segment;
use crate::client::HttpClient;
use crate::error::Result;
use crate::types::{
    MarketplaceOrderQuery, MarketplaceOrderRequest, MarketplaceProduct, Order, Page,
    ProductSearch, RecommendationQuery, read_partial,
};
use crate::validation::validate_id;

const PRODUCTS: &str = "/marketplace/products";
const ORDERS: &str = "/marketplace/orders";

/// Agent marketplace operations: product discovery and buyer orders.
///
/// Search ranking happens on the server; results come back in its order.
#[derive(Debug, Clone, Copy)]
pub struct Marketplace<'a> {
    client: &'a HttpClient,
}

impl<'a> Marketplace<'a> {
    pub(crate) const fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// Searches listed products with `POST /marketplace/products/search`.
    ///
    /// The echoed query and filters stay available in [`Page::raw`].
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank query, otherwise the translated
    /// API failure.
    pub async fn search_products(&self, search: &ProductSearch) -> Result<Page<MarketplaceProduct>> {
        validate_id("Search query", &search.query)?;
        let value = self
            .client
            .post(&format!("{PRODUCTS}/search"), search)
            .await?;
        Ok(Page::from_value(value, "products"))
    }

    /// Fetches a listed product with `GET /marketplace/products/{id}`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank id, otherwise the translated
    /// API failure.
    pub async fn get_product(&self, product_id: &str) -> Result<MarketplaceProduct> {
        validate_id("Product ID", product_id)?;
        let value = self
            .client
            .get(&format!("{PRODUCTS}/{}", segment(product_id)))
            .await?;
        Ok(read_partial(value))
    }

    /// Places an order with `POST /marketplace/orders`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank product or user id, otherwise
    /// the translated API failure.
    pub async fn create_order(&self, order: &MarketplaceOrderRequest) -> Result<Order> {
        validate_id("Product ID", &order.product_id)?;
        validate_id("User ID", &order.user_id)?;
        let value = self.client.post(ORDERS, order).await?;
        Ok(read_partial(value))
    }

    /// Fetches an order with `GET /marketplace/orders/{id}`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank id, otherwise the translated
    /// API failure.
    pub async fn get_order(&self, order_id: &str) -> Result<Order> {
        validate_id("Order ID", order_id)?;
        let value = self
            .client
            .get(&format!("{ORDERS}/{}", segment(order_id)))
            .await?;
        Ok(read_partial(value))
    }

    /// Lists orders with `GET /marketplace/orders`.
    ///
    /// # Errors
    ///
    /// Returns the translated API failure.
    pub async fn list_orders(&self, query: &MarketplaceOrderQuery) -> Result<Page<Order>> {
        let value = self.client.get_with_query(ORDERS, query).await?;
        Ok(Page::from_value(value, "orders"))
    }

    /// Lists products recommended for an agent with
    /// `GET /marketplace/agents/{id}/recommended`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank agent id, otherwise the
    /// translated API failure.
    pub async fn get_recommended_products(
        &self,
        agent_id: &str,
        query: &RecommendationQuery,
    ) -> Result<Vec<MarketplaceProduct>> {
        validate_id("Agent ID", agent_id)?;
        let value = self
            .client
            .get_with_query(
                &format!("/marketplace/agents/{}/recommended", segment(agent_id)),
                query,
            )
            .await?;
        Ok(Page::from_value(value, "products").items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AgentrixConfig;
    use crate::types::SearchFilters;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{any, body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> HttpClient {
        let config = AgentrixConfig::new("k")
            .with_base_url(server.uri())
            .with_retries(1)
            .with_backoff_unit(Duration::from_millis(1));
        HttpClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_blank_inputs_send_nothing() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server);
        let marketplace = Marketplace::new(&client);
        let err = marketplace
            .search_products(&ProductSearch::new("  "))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Search query is required");

        let err = marketplace
            .create_order(&MarketplaceOrderRequest::new("prod_1", ""))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "User ID is required");

        let err = marketplace
            .get_recommended_products("", &RecommendationQuery::default())
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_search_posts_filters_and_reads_products() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/marketplace/products/search"))
            .and(body_json(json!({
                "query": "coffee",
                "filters": { "priceMax": 30.0, "inStock": true },
                "limit": 5,
                "offset": 0,
                "sortBy": "price_asc",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "products": [
                    { "productId": "p1", "title": "Beans", "price": "12.5", "stock": 3 },
                    { "productId": 2, "title": "Mug" }
                ],
                "total": 2,
                "query": "coffee",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let search = ProductSearch::new("coffee")
            .with_filters(SearchFilters {
                price_max: Some(30.0),
                in_stock: Some(true),
                ..SearchFilters::default()
            })
            .with_page(5, 0)
            .with_sort_by("price_asc");
        let page = Marketplace::new(&client).search_products(&search).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].price, Some(12.5));
        assert_eq!(page.items[1].product_id.as_deref(), Some("2"));
        assert_eq!(page.pagination.total, Some(2));
        assert_eq!(page.raw["query"], "coffee");
    }

    #[tokio::test]
    async fn test_orders_and_recommendations() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/marketplace/orders"))
            .and(body_json(json!({ "productId": "p1", "userId": "u1", "quantity": 2 })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "mo_1",
                "status": "pending",
                "quantity": 2,
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/marketplace/orders"))
            .and(query_param("userId", "u1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "id": "mo_1" }],
                "pagination": { "page": 1, "total": 1 },
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/marketplace/agents/agent%2F1/recommended"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "products": [{ "productId": "p9", "availableToAgents": true }],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let marketplace = Marketplace::new(&client);
        let order = marketplace
            .create_order(&MarketplaceOrderRequest::new("p1", "u1").with_quantity(2))
            .await
            .unwrap();
        assert_eq!(order.id.as_deref(), Some("mo_1"));
        assert_eq!(order.quantity, Some(2));

        let query = MarketplaceOrderQuery {
            user_id: Some("u1".into()),
            ..MarketplaceOrderQuery::default()
        };
        let page = marketplace.list_orders(&query).await.unwrap();
        assert_eq!(page.pagination.total, Some(1));

        let recommended = marketplace
            .get_recommended_products("agent/1", &RecommendationQuery::default())
            .await
            .unwrap();
        assert_eq!(recommended.len(), 1);
        assert_eq!(recommended[0].available_to_agents, Some(true));
    }
}
