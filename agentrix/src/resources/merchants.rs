use serde::Serialize;
use serde_json::{Value, json};

use super::segment;
use crate::client::HttpClient;
use crate::error::Result;
use crate::types::{Order, OrderQuery, Page, Product, ProductQuery, ProductRequest, read_partial};
use crate::validation::{validate_amount, validate_id};

const PRODUCTS: &str = "/merchant/products";
const ORDERS: &str = "/merchant/orders";

/// Merchant operations: product catalog and orders.
#[derive(Debug, Clone, Copy)]
pub struct Merchants<'a> {
    client: &'a HttpClient,
}

impl<'a> Merchants<'a> {
    pub(crate) const fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// Creates a product.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name or non-positive price,
    /// otherwise the translated API failure.
    pub async fn create_product(&self, product: &ProductRequest) -> Result<Product> {
        validate_id("Product name", &product.name)?;
        validate_amount(product.price)?;
        let value = self.client.post(PRODUCTS, product).await?;
        Ok(read_partial(value))
    }

    /// Fetches a product.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank id, otherwise the translated
    /// API failure.
    pub async fn get_product(&self, product_id: &str) -> Result<Product> {
        validate_id("Product ID", product_id)?;
        let value = self
            .client
            .get(&format!("{PRODUCTS}/{}", segment(product_id)))
            .await?;
        Ok(read_partial(value))
    }

    /// Lists products.
    ///
    /// # Errors
    ///
    /// Returns the translated API failure.
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>> {
        let value = self.client.get_with_query(PRODUCTS, query).await?;
        Ok(Page::from_value(value, "products"))
    }

    /// Updates a product with the fields in `changes`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank id, otherwise the translated
    /// API failure.
    pub async fn update_product<C>(&self, product_id: &str, changes: &C) -> Result<Product>
    where
        C: Serialize + ?Sized,
    {
        validate_id("Product ID", product_id)?;
        let value = self
            .client
            .put(&format!("{PRODUCTS}/{}", segment(product_id)), changes)
            .await?;
        Ok(read_partial(value))
    }

    /// Deletes a product.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank id, otherwise the translated
    /// API failure.
    pub async fn delete_product(&self, product_id: &str) -> Result<Value> {
        validate_id("Product ID", product_id)?;
        self.client
            .delete(&format!("{PRODUCTS}/{}", segment(product_id)))
            .await
    }

    /// Lists orders.
    ///
    /// # Errors
    ///
    /// Returns the translated API failure.
    pub async fn list_orders(&self, query: &OrderQuery) -> Result<Page<Order>> {
        let value = self.client.get_with_query(ORDERS, query).await?;
        Ok(Page::from_value(value, "orders"))
    }

    /// Fetches an order.
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

    /// Moves an order to `status` (e.g. `shipped`).
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank id or status, otherwise the
    /// translated API failure.
    pub async fn update_order_status(&self, order_id: &str, status: &str) -> Result<Order> {
        validate_id("Order ID", order_id)?;
        validate_id("Order status", status)?;
        let value = self
            .client
            .put(
                &format!("{ORDERS}/{}/status", segment(order_id)),
                &json!({ "status": status }),
            )
            .await?;
        Ok(read_partial(value))
    }
}
