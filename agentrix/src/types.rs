//! Request and response types for the resource facades.
//!
//! The API does not publish a stable response schema, so response types are
//! partial: every field is optional, numbers may arrive as JSON numbers or
//! numeric strings, identifiers and timestamps as strings or numbers, and
//! unrecognized fields are kept in `extra`. A field of the wrong shape reads
//! as absent instead of failing the call.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use serde_with::de::DeserializeAsWrap;
use serde_with::{
    DeserializeAs, Same, SerializeAs, VecSkipError, serde_as, skip_serializing_none,
};

// ============ Requests ============

/// Body of `POST /payments`.
///
/// `amount`, `currency` and `description` are required; any other field is
/// passed through to the API unchanged.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Amount in major units.
    pub amount: f64,
    /// Three-letter currency code.
    pub currency: String,
    /// Shown to the payer.
    pub description: String,
    /// Free-form merchant metadata.
    pub metadata: Option<Value>,
    /// Any further fields accepted by the API.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaymentRequest {
    /// Creates a request with the three required fields.
    #[must_use]
    pub fn new(amount: f64, currency: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
            description: description.into(),
            metadata: None,
            extra: Map::new(),
        }
    }

    /// Attaches merchant metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Adds a pass-through field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Query of `GET /payments/routing`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingQuery {
    /// Amount to route.
    pub amount: f64,
    /// Three-letter currency code.
    pub currency: String,
    /// Whether the payer settles on-chain.
    pub is_on_chain: Option<bool>,
    /// Payer country (ISO 3166).
    pub user_country: Option<String>,
    /// Merchant country (ISO 3166).
    pub merchant_country: Option<String>,
    /// `fiat_only`, `crypto_only` or `both`.
    pub merchant_payment_config: Option<String>,
    /// `nft`, `virtual`, `service`, `product` or `physical`.
    pub order_type: Option<String>,
    /// Agent placing the payment.
    pub agent_id: Option<String>,
    /// Whether the payer has a wallet connected.
    pub wallet_connected: Option<bool>,
    /// `qr_pay`, `micro_sub`, `wallet_direct` or `standard`.
    pub scenario: Option<String>,
}

impl RoutingQuery {
    /// Creates a query with only the required fields set.
    #[must_use]
    pub fn new(amount: f64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
            ..Self::default()
        }
    }
}

/// Query of `GET /payments`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPayments {
    /// Payment status filter.
    pub status: Option<String>,
    /// Payment method filter.
    pub payment_method: Option<String>,
    /// Page size.
    pub limit: Option<u32>,
    /// Items to skip.
    pub offset: Option<u32>,
}

/// Body of `POST /agent/auto-pay/grant`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoPayGrantRequest {
    /// Agent receiving the grant.
    pub agent_id: String,
    /// Maximum amount per payment.
    pub single_limit: f64,
    /// Maximum amount per day.
    pub daily_limit: f64,
    /// Currency of both limits (default: `CNY`).
    pub currency: String,
    /// Validity in days (default: 30).
    pub expires_in_days: u32,
}

impl AutoPayGrantRequest {
    /// Default currency of a grant.
    pub const DEFAULT_CURRENCY: &'static str = "CNY";

    /// Default validity of a grant in days.
    pub const DEFAULT_EXPIRES_IN_DAYS: u32 = 30;

    /// Creates a grant request with the default currency and expiry.
    #[must_use]
    pub fn new(agent_id: impl Into<String>, single_limit: f64, daily_limit: f64) -> Self {
        Self {
            agent_id: agent_id.into(),
            single_limit,
            daily_limit,
            currency: Self::DEFAULT_CURRENCY.to_owned(),
            expires_in_days: Self::DEFAULT_EXPIRES_IN_DAYS,
        }
    }

    /// Sets the currency of the limits.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Sets the validity in days.
    #[must_use]
    pub const fn with_expires_in_days(mut self, days: u32) -> Self {
        self.expires_in_days = days;
        self
    }
}

/// Query of `GET /agent/commissions`, besides the agent id.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionQuery {
    /// Commission status filter.
    pub status: Option<String>,
    /// Inclusive start date (`YYYY-MM-DD`).
    pub start_date: Option<String>,
    /// Inclusive end date (`YYYY-MM-DD`).
    pub end_date: Option<String>,
    /// Page size.
    pub limit: Option<u32>,
    /// Items to skip.
    pub offset: Option<u32>,
}

/// Body of `POST /merchant/products`.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    /// Product name.
    pub name: String,
    /// Unit price.
    pub price: f64,
    /// Price currency.
    pub currency: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Units in stock.
    pub stock: Option<u64>,
    /// Catalog category.
    pub category: Option<String>,
    /// Any further fields accepted by the API.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProductRequest {
    /// Creates a product with a name and price.
    #[must_use]
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
            currency: None,
            description: None,
            stock: None,
            category: None,
            extra: Map::new(),
        }
    }
}

/// Query of `GET /merchant/products`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    /// Product status filter.
    pub status: Option<String>,
    /// Category filter.
    pub category: Option<String>,
    /// Free-text search.
    pub search: Option<String>,
    /// Page size.
    pub limit: Option<u32>,
    /// Items to skip.
    pub offset: Option<u32>,
}

/// Query of `GET /merchant/orders`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    /// Order status filter.
    pub status: Option<String>,
    /// Page size.
    pub limit: Option<u32>,
    /// Items to skip.
    pub offset: Option<u32>,
}

// ============ Marketplace requests ============

/// Filters narrowing a marketplace search.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    /// Lowest price.
    pub price_min: Option<f64>,
    /// Highest price.
    pub price_max: Option<f64>,
    /// Price currency.
    pub currency: Option<String>,
    /// Product category.
    pub category: Option<String>,
    /// Only products with stock left.
    pub in_stock: Option<bool>,
    /// Restrict to one merchant.
    pub merchant_id: Option<String>,
}

/// Body of `POST /marketplace/products/search`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSearch {
    /// Natural-language query.
    pub query: String,
    /// Optional filters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<SearchFilters>,
    /// Page size (default: 20).
    pub limit: u32,
    /// Items to skip (default: 0).
    pub offset: u32,
    /// `relevance` (default), `price_asc`, `price_desc` or `newest`.
    pub sort_by: String,
}

impl ProductSearch {
    /// Default page size.
    pub const DEFAULT_LIMIT: u32 = 20;

    /// Default ordering.
    pub const DEFAULT_SORT: &'static str = "relevance";

    /// Creates a search with default paging and ordering.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filters: None,
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
            sort_by: Self::DEFAULT_SORT.to_owned(),
        }
    }

    /// Sets the filters.
    #[must_use]
    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Sets the page.
    #[must_use]
    pub const fn with_page(mut self, limit: u32, offset: u32) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    /// Sets the ordering.
    #[must_use]
    pub fn with_sort_by(mut self, sort_by: impl Into<String>) -> Self {
        self.sort_by = sort_by.into();
        self
    }
}

/// Body of `POST /marketplace/orders`.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceOrderRequest {
    /// Product being bought.
    pub product_id: String,
    /// Buyer.
    pub user_id: String,
    /// Units to buy.
    pub quantity: Option<u32>,
    /// Shipping address, passed through unchanged.
    pub shipping_address: Option<Value>,
    /// Free-form metadata.
    pub metadata: Option<Value>,
}

impl MarketplaceOrderRequest {
    /// Creates an order request for one product and buyer.
    #[must_use]
    pub fn new(product_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            user_id: user_id.into(),
            quantity: None,
            shipping_address: None,
            metadata: None,
        }
    }

    /// Sets the quantity.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }
}

/// Query of `GET /marketplace/orders`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceOrderQuery {
    /// Buyer filter.
    pub user_id: Option<String>,
    /// Agent filter.
    pub agent_id: Option<String>,
    /// Status filter.
    pub status: Option<String>,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
}

/// Query of `GET /marketplace/agents/{id}/recommended`.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationQuery {
    /// Number of products (default: 10).
    pub limit: u32,
    /// Category filter.
    pub category: Option<String>,
}

impl Default for RecommendationQuery {
    fn default() -> Self {
        Self {
            limit: 10,
            category: None,
        }
    }
}

// ============ Responses ============

/// Reads a JSON string, number or boolean as text; any other value reads as
/// absent.
#[derive(Debug, Clone, Copy)]
pub struct LenientString;

impl<'de> DeserializeAs<'de, Option<String>> for LenientString {
    fn deserialize_as<D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }
}

impl SerializeAs<Option<String>> for LenientString {
    fn serialize_as<S>(source: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        source.serialize(serializer)
    }
}

/// Reads a JSON number or a numeric string; any other value reads as absent.
#[derive(Debug, Clone, Copy)]
pub struct LenientNumber;

impl<'de> DeserializeAs<'de, Option<f64>> for LenientNumber {
    fn deserialize_as<D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }
}

impl<'de> DeserializeAs<'de, Option<u64>> for LenientNumber {
    fn deserialize_as<D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }
}

impl<T: Serialize> SerializeAs<Option<T>> for LenientNumber {
    fn serialize_as<S>(source: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        source.serialize(serializer)
    }
}

/// Reads a JSON boolean or `"true"`/`"false"`; any other value reads as absent.
#[derive(Debug, Clone, Copy)]
pub struct LenientBool;

impl<'de> DeserializeAs<'de, Option<bool>> for LenientBool {
    fn deserialize_as<D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Bool(b) => Some(b),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }
}

impl SerializeAs<Option<bool>> for LenientBool {
    fn serialize_as<S>(source: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        source.serialize(serializer)
    }
}

/// Reads a 2xx body into a partial response type.
///
/// Field mismatches read as absent, and a body that is not an object reads as
/// the empty value, so a successful call is never turned into an error.
pub(crate) fn read_partial<T>(value: Value) -> T
where
    T: DeserializeOwned + Default,
{
    serde_json::from_value(value).unwrap_or_default()
}

/// A payment as returned by the API.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Payment {
    /// Payment identifier.
    #[serde_as(as = "LenientString")]
    pub id: Option<String>,
    /// Lifecycle status (e.g. `pending`, `completed`, `cancelled`).
    #[serde_as(as = "LenientString")]
    pub status: Option<String>,
    /// Amount in major units.
    #[serde_as(as = "LenientNumber")]
    pub amount: Option<f64>,
    /// Currency code.
    #[serde_as(as = "LenientString")]
    pub currency: Option<String>,
    /// Description given at creation.
    #[serde_as(as = "LenientString")]
    pub description: Option<String>,
    /// Method chosen by routing.
    #[serde_as(as = "LenientString")]
    pub payment_method: Option<String>,
    /// Creation time as sent by the API (ISO text or epoch digits).
    #[serde_as(as = "LenientString")]
    pub created_at: Option<String>,
    /// Everything else.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Pagination metadata accompanying a list.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    /// Total number of matching items.
    #[serde_as(as = "LenientNumber")]
    pub total: Option<u64>,
    /// Page size used.
    #[serde_as(as = "LenientNumber")]
    pub limit: Option<u64>,
    /// Items skipped.
    #[serde_as(as = "LenientNumber")]
    pub offset: Option<u64>,
    /// Page number, for page-based endpoints.
    #[serde_as(as = "LenientNumber")]
    pub page: Option<u64>,
}

/// One page of a list endpoint.
///
/// Items are read from `data`, `items` or the resource-named key (e.g.
/// `payments`); pagination fields from `pagination` or the top level.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items of this page.
    pub items: Vec<T>,
    /// Pagination metadata, if any was sent.
    pub pagination: Pagination,
    /// The raw response.
    pub raw: Value,
}

impl<T> Page<T>
where
    T: DeserializeOwned,
{
    /// Parses a list response; `collection` is the resource-named items key.
    ///
    /// Items that fail to decode are skipped; they stay visible in `raw`.
    #[must_use]
    pub fn from_value(raw: Value, collection: &str) -> Self {
        let items_value = match &raw {
            Value::Array(_) => Some(raw.clone()),
            Value::Object(fields) => ["data", "items", collection]
                .iter()
                .find_map(|key| fields.get(*key).filter(|v| v.is_array()).cloned()),
            _ => None,
        };
        let items = items_value
            .and_then(|value| {
                DeserializeAsWrap::<Vec<T>, VecSkipError<Same>>::deserialize(value)
                    .map(DeserializeAsWrap::into_inner)
                    .ok()
            })
            .unwrap_or_default();
        let pagination = match raw.get("pagination") {
            Some(block) if block.is_object() => read_partial(block.clone()),
            _ if raw.is_object() => read_partial(raw.clone()),
            _ => Pagination::default(),
        };
        Self {
            items,
            pagination,
            raw,
        }
    }
}

/// An auto-pay grant.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoPayGrant {
    /// Grant identifier.
    #[serde_as(as = "LenientString")]
    pub id: Option<String>,
    /// Agent holding the grant.
    #[serde_as(as = "LenientString")]
    pub agent_id: Option<String>,
    /// Maximum amount per payment.
    #[serde_as(as = "LenientNumber")]
    pub single_limit: Option<f64>,
    /// Maximum amount per day.
    #[serde_as(as = "LenientNumber")]
    pub daily_limit: Option<f64>,
    /// Amount already spent today.
    #[serde_as(as = "LenientNumber")]
    pub used_today: Option<f64>,
    /// Currency of the limits.
    #[serde_as(as = "LenientString")]
    pub currency: Option<String>,
    /// Whether the grant is active.
    #[serde_as(as = "LenientBool")]
    pub is_active: Option<bool>,
    /// Expiry time as sent by the API.
    #[serde_as(as = "LenientString")]
    pub expires_at: Option<String>,
    /// Everything else.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A merchant product.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    /// Product identifier.
    #[serde_as(as = "LenientString")]
    pub id: Option<String>,
    /// Product name.
    #[serde_as(as = "LenientString")]
    pub name: Option<String>,
    /// Unit price.
    #[serde_as(as = "LenientNumber")]
    pub price: Option<f64>,
    /// Price currency.
    #[serde_as(as = "LenientString")]
    pub currency: Option<String>,
    /// Units in stock.
    #[serde_as(as = "LenientNumber")]
    pub stock: Option<u64>,
    /// Listing status.
    #[serde_as(as = "LenientString")]
    pub status: Option<String>,
    /// Everything else.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A merchant or marketplace order.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    /// Order identifier.
    #[serde_as(as = "LenientString")]
    pub id: Option<String>,
    /// Fulfilment status.
    #[serde_as(as = "LenientString")]
    pub status: Option<String>,
    /// Order total.
    #[serde_as(as = "LenientNumber")]
    pub amount: Option<f64>,
    /// Currency code.
    #[serde_as(as = "LenientString")]
    pub currency: Option<String>,
    /// Product ordered, for single-product orders.
    #[serde_as(as = "LenientString")]
    pub product_id: Option<String>,
    /// Units ordered.
    #[serde_as(as = "LenientNumber")]
    pub quantity: Option<u64>,
    /// Buyer identifier.
    #[serde_as(as = "LenientString")]
    pub user_id: Option<String>,
    /// Payment settling the order, once created.
    #[serde_as(as = "LenientString")]
    pub payment_id: Option<String>,
    /// Creation time as sent by the API.
    #[serde_as(as = "LenientString")]
    pub created_at: Option<String>,
    /// Everything else.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A product listed on the agent marketplace.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketplaceProduct {
    /// Product identifier.
    #[serde_as(as = "LenientString")]
    pub product_id: Option<String>,
    /// Merchant selling it.
    #[serde_as(as = "LenientString")]
    pub merchant_id: Option<String>,
    /// Listing title.
    #[serde_as(as = "LenientString")]
    pub title: Option<String>,
    /// Listing description.
    #[serde_as(as = "LenientString")]
    pub description: Option<String>,
    /// Unit price.
    #[serde_as(as = "LenientNumber")]
    pub price: Option<f64>,
    /// Price currency.
    #[serde_as(as = "LenientString")]
    pub currency: Option<String>,
    /// Units in stock.
    #[serde_as(as = "LenientNumber")]
    pub stock: Option<u64>,
    /// Product category.
    #[serde_as(as = "LenientString")]
    pub category: Option<String>,
    /// Checkout link.
    #[serde_as(as = "LenientString")]
    pub pay_url: Option<String>,
    /// Commission paid to recommending agents, in percent.
    #[serde_as(as = "LenientNumber")]
    pub commission_rate: Option<f64>,
    /// Whether agents may recommend it.
    #[serde_as(as = "LenientBool")]
    pub available_to_agents: Option<bool>,
    /// Everything else.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
