//! Subcommand execution.
//!
//! Every command resolves to one JSON document that `main` prints to stdout.

use std::path::Path;

use agentrix::{
    Agentrix, AutoPayGrantRequest, Brand, CommissionQuery, ListPayments, OrderQuery,
    PaymentRequest, ProductQuery, ProductSearch, RecommendationQuery, RoutingQuery,
    SearchFilters, WebhookHandler,
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::cli::{
    AgentsCommand, Command, Connection, MarketplaceCommand, MerchantsCommand, PaymentsCommand,
    WebhookCommand,
};
use crate::error::CliError;

/// Runs one subcommand.
///
/// # Errors
///
/// Returns the SDK error of the failing call, a file read error for webhook
/// payloads, or [`CliError::Smoke`] when any smoke check fails.
pub async fn execute(command: Command, connection: &Connection) -> Result<Value, CliError> {
    match command {
        Command::Webhook(webhook) => run_webhook(webhook, Brand::from(connection.brand)),
        Command::Payments(payments) => run_payments(payments, &connect(connection)?).await,
        Command::Agents(agents) => run_agents(agents, &connect(connection)?).await,
        Command::Merchants(merchants) => run_merchants(merchants, &connect(connection)?).await,
        Command::Marketplace(marketplace) => {
            run_marketplace(marketplace, &connect(connection)?).await
        }
        Command::Smoke => smoke(&connect(connection)?).await,
    }
}

fn connect(connection: &Connection) -> Result<Agentrix, CliError> {
    let sdk = Agentrix::new(connection.config()?)?;
    tracing::debug!(
        brand = sdk.brand().name,
        base_url = %sdk.client().base_url(),
        "Connected"
    );
    Ok(sdk)
}

fn render<T: Serialize>(value: &T) -> Result<Value, CliError> {
    Ok(serde_json::to_value(value)?)
}

async fn run_payments(command: PaymentsCommand, sdk: &Agentrix) -> Result<Value, CliError> {
    let payments = sdk.payments();
    match command {
        PaymentsCommand::Create {
            amount,
            currency,
            description,
        } => {
            let payment = payments
                .create(&PaymentRequest::new(amount, currency, description))
                .await?;
            tracing::info!(id = ?payment.id, status = ?payment.status, "Payment created");
            render(&payment)
        }
        PaymentsCommand::Get { id } => render(&payments.get(&id).await?),
        PaymentsCommand::Cancel { id } => {
            let payment = payments.cancel(&id).await?;
            tracing::info!(id = %id, status = ?payment.status, "Payment cancelled");
            render(&payment)
        }
        PaymentsCommand::List {
            status,
            method,
            limit,
            offset,
        } => {
            let page = payments
                .list(&ListPayments {
                    status,
                    payment_method: method,
                    limit,
                    offset,
                })
                .await?;
            tracing::debug!(items = page.items.len(), total = ?page.pagination.total, "Listed payments");
            Ok(page.raw)
        }
        PaymentsCommand::Routing {
            amount,
            currency,
            user_country,
            merchant_country,
            order_type,
            agent_id,
        } => {
            let mut query = RoutingQuery::new(amount, currency);
            query.user_country = user_country;
            query.merchant_country = merchant_country;
            query.order_type = order_type;
            query.agent_id = agent_id;
            Ok(payments.get_routing(&query).await?)
        }
    }
}

async fn run_agents(command: AgentsCommand, sdk: &Agentrix) -> Result<Value, CliError> {
    let agents = sdk.agents();
    match command {
        AgentsCommand::Grant {
            agent_id,
            single_limit,
            daily_limit,
            currency,
            expires_in_days,
        } => {
            let request = AutoPayGrantRequest::new(agent_id, single_limit, daily_limit)
                .with_currency(currency)
                .with_expires_in_days(expires_in_days);
            let grant = agents.create_auto_pay_grant(&request).await?;
            tracing::info!(id = ?grant.id, "Auto-pay grant created");
            render(&grant)
        }
        AgentsCommand::ShowGrant => match agents.get_auto_pay_grant().await? {
            Some(grant) => render(&grant),
            None => Ok(Value::Null),
        },
        AgentsCommand::Earnings { id } => Ok(agents.get_earnings(&id).await?),
        AgentsCommand::Commissions { id, status } => {
            let query = CommissionQuery {
                status,
                ..CommissionQuery::default()
            };
            Ok(agents.get_commissions(&id, &query).await?)
        }
    }
}

async fn run_merchants(command: MerchantsCommand, sdk: &Agentrix) -> Result<Value, CliError> {
    let merchants = sdk.merchants();
    match command {
        MerchantsCommand::Products { limit, offset } => {
            let query = ProductQuery {
                limit,
                offset,
                ..ProductQuery::default()
            };
            Ok(merchants.list_products(&query).await?.raw)
        }
        MerchantsCommand::Product { id } => render(&merchants.get_product(&id).await?),
        MerchantsCommand::Orders { status } => {
            let query = OrderQuery {
                status,
                ..OrderQuery::default()
            };
            Ok(merchants.list_orders(&query).await?.raw)
        }
        MerchantsCommand::Order { id } => render(&merchants.get_order(&id).await?),
    }
}

async fn run_marketplace(command: MarketplaceCommand, sdk: &Agentrix) -> Result<Value, CliError> {
    let marketplace = sdk.marketplace();
    match command {
        MarketplaceCommand::Search {
            query,
            category,
            limit,
        } => {
            let mut search = ProductSearch::new(query).with_page(limit, 0);
            if category.is_some() {
                search = search.with_filters(SearchFilters {
                    category,
                    ..SearchFilters::default()
                });
            }
            Ok(marketplace.search_products(&search).await?.raw)
        }
        MarketplaceCommand::Product { id } => render(&marketplace.get_product(&id).await?),
        MarketplaceCommand::Recommended { agent_id, limit } => {
            let query = RecommendationQuery {
                limit,
                ..RecommendationQuery::default()
            };
            render(&marketplace.get_recommended_products(&agent_id, &query).await?)
        }
        MarketplaceCommand::Order { id } => render(&marketplace.get_order(&id).await?),
    }
}

fn run_webhook(command: WebhookCommand, brand: Brand) -> Result<Value, CliError> {
    match command {
        WebhookCommand::Verify {
            payload_file,
            signature,
            secret,
        } => {
            let handler = webhook_handler(secret, brand);
            let payload = read_payload(&payload_file)?;
            let event = handler.construct_event(&payload, &signature)?;
            tracing::info!(id = ?event.id, event_type = ?event.event_type, "Signature valid");
            Ok(json!({ "valid": true, "event": render(&event)? }))
        }
        WebhookCommand::Sign {
            payload_file,
            secret,
        } => {
            let handler = webhook_handler(secret, brand);
            let payload = read_payload(&payload_file)?;
            Ok(json!({
                "header": handler.signature_header(),
                "signature": handler.sign(&payload)?,
            }))
        }
    }
}

/// A missing secret is left empty so the handler reports it.
fn webhook_handler(secret: Option<String>, brand: Brand) -> WebhookHandler {
    let secret = secret
        .or_else(|| std::env::var(brand.env_var("WEBHOOK_SECRET")).ok())
        .unwrap_or_default();
    WebhookHandler::with_brand(secret, brand)
}

fn read_payload(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read-only checks that exercise authentication, routing and decoding.
async fn smoke(sdk: &Agentrix) -> Result<Value, CliError> {
    let list = sdk
        .payments()
        .list(&ListPayments {
            limit: Some(1),
            ..ListPayments::default()
        })
        .await
        .map(|page| json!({ "items": page.items.len() }));
    let grant = sdk
        .agents()
        .get_auto_pay_grant()
        .await
        .map(|grant| json!({ "present": grant.is_some() }));

    let checks: Vec<Value> = [("payments.list", list), ("agents.get_auto_pay_grant", grant)]
        .into_iter()
        .map(|(name, outcome)| match outcome {
            Ok(detail) => {
                tracing::info!(check = name, "Smoke check passed");
                json!({ "check": name, "ok": true, "detail": detail })
            }
            Err(err) => {
                tracing::warn!(check = name, error = %err, "Smoke check failed");
                json!({ "check": name, "ok": false, "code": err.code(), "error": err.message() })
            }
        })
        .collect();

    let total = checks.len();
    let failed = checks
        .iter()
        .filter(|check| check["ok"] != Value::Bool(true))
        .count();
    let report = json!({ "checks": checks, "failed": failed });
    if failed > 0 {
        return Err(CliError::Smoke {
            report,
            failed,
            total,
        });
    }
    Ok(report)
}
