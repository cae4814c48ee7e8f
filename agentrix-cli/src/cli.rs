//! Command-line surface.

use std::path::PathBuf;
use std::time::Duration;

use agentrix::{AgentrixConfig, Brand};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Operator tool for the Agentrix / PayMind payments API.
#[derive(Debug, Parser)]
#[command(name = "agentrix", version, about)]
pub struct Cli {
    /// Connection settings.
    #[command(flatten)]
    pub connection: Connection,

    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Which product API to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BrandArg {
    /// Agentrix.
    Agentrix,
    /// PayMind.
    Paymind,
}

impl From<BrandArg> for Brand {
    fn from(arg: BrandArg) -> Self {
        match arg {
            BrandArg::Agentrix => Self::AGENTRIX,
            BrandArg::Paymind => Self::PAYMIND,
        }
    }
}

/// Connection flags shared by every subcommand.
#[derive(Debug, Args)]
pub struct Connection {
    /// Product API.
    #[arg(long, value_enum, default_value_t = BrandArg::Agentrix, global = true)]
    pub brand: BrandArg,

    /// API key; falls back to `<PREFIX>_API_KEY`.
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Base URL; falls back to `<PREFIX>_BASE_URL`, then the brand default.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Per-attempt timeout in seconds.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Total attempts per call.
    #[arg(long, global = true)]
    pub retries: Option<u32>,
}

impl Connection {
    /// Resolves flags over `<PREFIX>_*` environment variables.
    ///
    /// Flags win over the environment. An `--api-key` flag replaces only the
    /// key: the other variables still apply.
    pub fn config(&self) -> agentrix::Result<AgentrixConfig> {
        let brand = Brand::from(self.brand);
        let mut config = match &self.api_key {
            Some(key) => AgentrixConfig::new(key.clone()).with_brand(brand).merge_env()?,
            None => AgentrixConfig::from_env(brand)?,
        };
        if let Some(url) = &self.base_url {
            config.base_url = Some(url.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = self.retries {
            config.retries = retries;
        }
        Ok(config)
    }
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Payment operations.
    #[command(subcommand)]
    Payments(PaymentsCommand),
    /// Agent operations.
    #[command(subcommand)]
    Agents(AgentsCommand),
    /// Merchant operations.
    #[command(subcommand)]
    Merchants(MerchantsCommand),
    /// Agent marketplace operations.
    #[command(subcommand)]
    Marketplace(MarketplaceCommand),
    /// Local webhook signature tools (no network).
    #[command(subcommand)]
    Webhook(WebhookCommand),
    /// Runs read-only checks against a live API.
    Smoke,
}

/// `agentrix payments ...`
#[derive(Debug, Subcommand)]
pub enum PaymentsCommand {
    /// Creates a payment.
    Create {
        /// Amount in major units.
        #[arg(long)]
        amount: f64,
        /// Three-letter currency code.
        #[arg(long)]
        currency: String,
        /// Payment description.
        #[arg(long)]
        description: String,
    },
    /// Fetches a payment.
    Get {
        /// Payment ID.
        id: String,
    },
    /// Cancels a payment.
    Cancel {
        /// Payment ID.
        id: String,
    },
    /// Lists payments.
    List {
        /// Status filter.
        #[arg(long)]
        status: Option<String>,
        /// Payment method filter.
        #[arg(long)]
        method: Option<String>,
        /// Page size.
        #[arg(long)]
        limit: Option<u32>,
        /// Items to skip.
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Asks the router which payment method to use.
    Routing {
        /// Amount in major units.
        #[arg(long)]
        amount: f64,
        /// Three-letter currency code.
        #[arg(long)]
        currency: String,
        /// Payer country.
        #[arg(long)]
        user_country: Option<String>,
        /// Merchant country.
        #[arg(long)]
        merchant_country: Option<String>,
        /// Order type.
        #[arg(long)]
        order_type: Option<String>,
        /// Agent placing the payment.
        #[arg(long)]
        agent_id: Option<String>,
    },
}

/// `agentrix agents ...`
#[derive(Debug, Subcommand)]
pub enum AgentsCommand {
    /// Creates an auto-pay grant.
    Grant {
        /// Agent receiving the grant.
        #[arg(long)]
        agent_id: String,
        /// Maximum amount per payment.
        #[arg(long)]
        single_limit: f64,
        /// Maximum amount per day.
        #[arg(long)]
        daily_limit: f64,
        /// Currency of the limits.
        #[arg(long, default_value = "CNY")]
        currency: String,
        /// Validity in days.
        #[arg(long, default_value_t = 30)]
        expires_in_days: u32,
    },
    /// Shows the current auto-pay grant.
    ShowGrant,
    /// Shows an agent's earnings.
    Earnings {
        /// Agent ID.
        id: String,
    },
    /// Lists an agent's commissions.
    Commissions {
        /// Agent ID.
        id: String,
        /// Status filter.
        #[arg(long)]
        status: Option<String>,
    },
}

/// `agentrix merchants ...`
#[derive(Debug, Subcommand)]
pub enum MerchantsCommand {
    /// Lists products.
    Products {
        /// Page size.
        #[arg(long)]
        limit: Option<u32>,
        /// Items to skip.
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Fetches a product.
    Product {
        /// Product ID.
        id: String,
    },
    /// Lists orders.
    Orders {
        /// Status filter.
        #[arg(long)]
        status: Option<String>,
    },
    /// Fetches an order.
    Order {
        /// Order ID.
        id: String,
    },
}

/// `agentrix marketplace ...`
#[derive(Debug, Subcommand)]
pub enum MarketplaceCommand {
    /// Searches listed products.
    Search {
        /// Search text.
        query: String,
        /// Category filter.
        #[arg(long)]
        category: Option<String>,
        /// Page size.
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Fetches a listed product.
    Product {
        /// Product ID.
        id: String,
    },
    /// Lists products recommended for an agent.
    Recommended {
        /// Agent ID.
        #[arg(long)]
        agent_id: String,
        /// Number of products.
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Fetches a marketplace order.
    Order {
        /// Order ID.
        id: String,
    },
}

/// `agentrix webhook ...`
#[derive(Debug, Subcommand)]
pub enum WebhookCommand {
    /// Checks a delivery's signature and prints the parsed event.
    Verify {
        /// File holding the raw request body.
        #[arg(long)]
        payload_file: PathBuf,
        /// Signature header value.
        #[arg(long)]
        signature: String,
        /// Webhook secret; falls back to `<PREFIX>_WEBHOOK_SECRET`.
        #[arg(long)]
        secret: Option<String>,
    },
    /// Prints the signature the API would send for a body.
    Sign {
        /// File holding the raw request body.
        #[arg(long)]
        payload_file: PathBuf,
        /// Webhook secret; falls back to `<PREFIX>_WEBHOOK_SECRET`.
        #[arg(long)]
        secret: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "agentrix",
            "payments",
            "get",
            "pay_1",
            "--brand",
            "paymind",
            "--api-key",
            "k",
            "--retries",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.connection.brand, BrandArg::Paymind);
        let config = cli.connection.config().unwrap();
        assert_eq!(config.brand, Brand::PAYMIND);
        assert_eq!(config.retries, 5);
        assert!(matches!(
            cli.command,
            Command::Payments(PaymentsCommand::Get { ref id }) if id == "pay_1"
        ));
    }

    #[test]
    fn test_grant_defaults() {
        let cli = Cli::try_parse_from([
            "agentrix",
            "agents",
            "grant",
            "--agent-id",
            "a1",
            "--single-limit",
            "50",
            "--daily-limit",
            "500",
        ])
        .unwrap();
        let Command::Agents(AgentsCommand::Grant {
            currency,
            expires_in_days,
            ..
        }) = cli.command
        else {
            panic!("expected agents grant");
        };
        assert_eq!(currency, "CNY");
        assert_eq!(expires_in_days, 30);
    }

    #[test]
    fn test_api_key_flag_keeps_environment_layer() {
        // SAFETY: the only other PayMind test overrides retries by flag.
        unsafe {
            std::env::set_var("PAYMIND_RETRIES", "4");
            std::env::set_var("PAYMIND_TIMEOUT_SECS", "9");
            std::env::set_var("PAYMIND_WEBHOOK_SECRET", "whsec_env");
        }
        let cli = Cli::try_parse_from([
            "agentrix",
            "--brand",
            "paymind",
            "--api-key",
            "sk_flag",
            "smoke",
        ])
        .unwrap();
        let config = cli.connection.config().unwrap();
        assert_eq!(config.api_key, "sk_flag");
        assert_eq!(config.retries, 4);
        assert_eq!(config.timeout, Duration::from_secs(9));
        assert_eq!(config.webhook_secret.as_deref(), Some("whsec_env"));

        let cli = Cli::try_parse_from([
            "agentrix",
            "--brand",
            "paymind",
            "--api-key",
            "sk_flag",
            "--timeout-secs",
            "2",
            "smoke",
        ])
        .unwrap();
        assert_eq!(cli.connection.config().unwrap().timeout, Duration::from_secs(2));
    }
}
