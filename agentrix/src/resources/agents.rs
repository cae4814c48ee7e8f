use serde_json::{Value, json};

use super::segment;
use crate::client::HttpClient;
use crate::error::{Result, ValidationError};
use crate::types::{AutoPayGrant, AutoPayGrantRequest, CommissionQuery, read_partial};
use crate::validation::{validate_currency, validate_id};

/// Agent operations: auto-pay grants, earnings and commissions.
#[derive(Debug, Clone, Copy)]
pub struct Agents<'a> {
    client: &'a HttpClient,
}

impl<'a> Agents<'a> {
    pub(crate) const fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// Grants an agent permission to pay automatically within limits, with
    /// `POST /agent/auto-pay/grant`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank agent id, a non-positive limit
    /// or a bad currency; otherwise the translated API failure.
    pub async fn create_auto_pay_grant(&self, request: &AutoPayGrantRequest) -> Result<AutoPayGrant> {
        validate_id("Agent ID", &request.agent_id)?;
        validate_limit("Single limit", request.single_limit)?;
        validate_limit("Daily limit", request.daily_limit)?;
        validate_currency(&request.currency)?;
        let value = self.client.post("/agent/auto-pay/grant", request).await?;
        Ok(read_partial(value))
    }

    /// Reads the caller's auto-pay grant with `GET /agent/auto-pay/grant`.
    ///
    /// Returns `Ok(None)` when no grant exists: the API answered `null`, an
    /// empty body, `{ "grant": null }`, or 404. A 404 is not retried.
    ///
    /// # Errors
    ///
    /// Returns the translated API failure for any other error.
    pub async fn get_auto_pay_grant(&self) -> Result<Option<AutoPayGrant>> {
        let Some(value) = self.client.get_optional("/agent/auto-pay/grant").await? else {
            return Ok(None);
        };
        let grant = match value {
            Value::Null => return Ok(None),
            Value::Object(ref fields) if fields.contains_key("grant") => fields["grant"].clone(),
            other => other,
        };
        if grant.is_null() {
            return Ok(None);
        }
        Ok(Some(read_partial(grant)))
    }

    /// Revokes a grant with `DELETE /agent/auto-pay/grant/{id}`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank id, otherwise the translated
    /// API failure.
    pub async fn revoke_auto_pay_grant(&self, grant_id: &str) -> Result<Value> {
        validate_id("Grant ID", grant_id)?;
        self.client
            .delete(&format!("/agent/auto-pay/grant/{}", segment(grant_id)))
            .await
    }

    /// Reads an agent's earnings summary with `GET /agent/earnings`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank agent id, otherwise the
    /// translated API failure.
    pub async fn get_earnings(&self, agent_id: &str) -> Result<Value> {
        validate_id("Agent ID", agent_id)?;
        self.client
            .get_with_query("/agent/earnings", &json!({ "agentId": agent_id }))
            .await
    }

    /// Lists an agent's commissions with `GET /agent/commissions`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank agent id, otherwise the
    /// translated API failure.
    pub async fn get_commissions(&self, agent_id: &str, query: &CommissionQuery) -> Result<Value> {
        validate_id("Agent ID", agent_id)?;
        let mut params = serde_json::to_value(query)?;
        if let Value::Object(fields) = &mut params {
            fields.insert("agentId".to_owned(), Value::String(agent_id.to_owned()));
        }
        self.client.get_with_query("/agent/commissions", &params).await
    }
}

fn validate_limit(field: &str, limit: f64) -> Result<(), ValidationError> {
    if !limit.is_finite() || limit <= 0.0 {
        return Err(ValidationError::new(format!("{field} must be greater than 0")));
    }
    Ok(())
}
