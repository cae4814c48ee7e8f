//! The top-level SDK object.

use crate::brand::Brand;
use crate::client::HttpClient;
use crate::config::AgentrixConfig;
use crate::error::Result;
use crate::resources::{Agents, Marketplace, Merchants, Payments};
use crate::webhook::WebhookHandler;

/// Entry point of the SDK.
///
/// Owns one [`HttpClient`]; the resource facades returned by
/// [`payments`](Self::payments), [`agents`](Self::agents),
/// [`merchants`](Self::merchants) and [`marketplace`](Self::marketplace)
/// borrow it, so every call shares the same connection pool and credentials.
///
/// # Example
///
/// ```no_run
/// use agentrix::{Agentrix, AgentrixConfig, PaymentRequest};
///
/// # async fn run() -> agentrix::Result<()> {
/// let sdk = Agentrix::new(AgentrixConfig::new("sk_test_123"))?;
/// let payment = sdk
///     .payments()
///     .create(&PaymentRequest::new(100.0, "USD", "Order #1"))
///     .await?;
/// println!("{:?}", payment.id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Agentrix {
    client: HttpClient,
    webhooks: Option<WebhookHandler>,
    brand: Brand,
}

impl Agentrix {
    /// Builds the SDK from a configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank API key.
    pub fn new(config: AgentrixConfig) -> Result<Self> {
        let client = HttpClient::new(&config)?;
        let webhooks = config
            .webhook_secret
            .map(|secret| WebhookHandler::with_brand(secret, config.brand));

        #[cfg(feature = "telemetry")]
        tracing::debug!(
            brand = config.brand.name,
            base_url = %client.base_url(),
            webhooks = webhooks.is_some(),
            "Initialized SDK"
        );

        Ok(Self {
            client,
            webhooks,
            brand: config.brand,
        })
    }

    /// Builds the SDK from `<PREFIX>_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the API key variable is missing or blank.
    pub fn from_env(brand: Brand) -> Result<Self> {
        Self::new(AgentrixConfig::from_env(brand)?)
    }

    /// Payment operations.
    #[must_use]
    pub const fn payments(&self) -> Payments<'_> {
        Payments::new(&self.client)
    }

    /// Agent operations.
    #[must_use]
    pub const fn agents(&self) -> Agents<'_> {
        Agents::new(&self.client)
    }

    /// Merchant operations.
    #[must_use]
    pub const fn merchants(&self) -> Merchants<'_> {
        Merchants::new(&self.client)
    }

    /// Agent marketplace operations.
    #[must_use]
    pub const fn marketplace(&self) -> Marketplace<'_> {
        Marketplace::new(&self.client)
    }

    /// Webhook verification, if a secret was configured.
    #[must_use]
    pub const fn webhooks(&self) -> Option<&WebhookHandler> {
        self.webhooks.as_ref()
    }

    /// The shared client core.
    #[must_use]
    pub const fn client(&self) -> &HttpClient {
        &self.client
    }

    /// The configured brand.
    #[must_use]
    pub const fn brand(&self) -> Brand {
        self.brand
    }

    /// Replaces the API key for all subsequent requests.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank key.
    pub fn set_api_key(&self, api_key: &str) -> Result<()> {
        self.client.set_api_key(api_key)
    }

    /// Replaces the base URL for all subsequent requests.
    pub fn set_base_url(&self, base_url: &str) {
        self.client.set_base_url(base_url);
    }
}
