#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Client SDK for the Agentrix / PayMind payments API.
//!
//! The SDK is a thin layer over JSON-over-HTTPS: one client core performs
//! authenticated requests with retry and backoff, resource facades validate
//! their inputs and map onto endpoints, and a webhook handler verifies
//! HMAC-signed notifications.
//!
//! Agentrix and PayMind share one implementation; a [`Brand`] selects the
//! default endpoint, webhook header and environment variable prefix.
//!
//! # Modules
//!
//! - [`brand`] - Product branding (default URL, signature header, env prefix)
//! - [`client`] - HTTP client core with retry policy
//! - [`config`] - SDK configuration
//! - [`error`] - Error taxonomy (validation, API, generic)
//! - [`resources`] - Payments, agents, merchants and marketplace facades
//! - [`types`] - Request and partial response types
//! - [`validation`] - Input checks run before any request
//! - [`webhook`] - Webhook signature verification
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for requests and retries

pub mod brand;
pub mod client;
pub mod config;
pub mod error;
pub mod resources;
pub mod types;
pub mod validation;
pub mod webhook;

mod sdk;

pub use brand::Brand;
pub use client::{HttpClient, RetryPolicy};
pub use config::AgentrixConfig;
pub use error::{AgentrixError, ApiError, GenericError, Result, ValidationError};
pub use resources::{Agents, Marketplace, Merchants, Payments};
pub use sdk::Agentrix;
pub use types::{
    AutoPayGrant, AutoPayGrantRequest, CommissionQuery, ListPayments, MarketplaceOrderQuery,
    MarketplaceOrderRequest, MarketplaceProduct, Order, OrderQuery, Page, Pagination, Payment,
    PaymentRequest, Product, ProductQuery, ProductRequest, ProductSearch, RecommendationQuery,
    RoutingQuery, SearchFilters,
};
pub use webhook::{WebhookEvent, WebhookHandler};

/// Current version of the SDK.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
