//! The HTTP client core shared by every resource facade.
//!
//! [`HttpClient`] owns the credentials, the base URL, the retry policy and a
//! single `reqwest::Client` connection pool. All network I/O of the SDK goes
//! through it.
//!
//! ## Retries
//!
//! A call makes up to [`RetryPolicy::attempts`] attempts. After failed attempt
//! `n` (0-indexed) it sleeps `2^n` backoff units before the next one; there is
//! no sleep before the first attempt or after the last. Transport errors and
//! non-2xx statuses are retried. A 2xx response is returned as-is and never
//! retried, even when its body describes an application-level failure.
//! [`HttpClient::get_optional`] reads a 404 as an absent resource and stops
//! there.
//!
//! ## Error Handling
//!
//! Once the attempts are exhausted the last failure is translated into an
//! [`AgentrixError`]: non-2xx responses become [`ApiError`]s built from the
//! response body, transport failures become [`ApiError`]s without a status,
//! and undecodable 2xx bodies become `UNKNOWN_ERROR`s.

use std::sync::RwLock;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::config::AgentrixConfig;
use crate::error::{AgentrixError, ApiError, GenericError, Result, ValidationError};
use crate::validation::validate_api_key;

/// How many attempts a call gets and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    backoff_unit: Duration,
    retry_client_errors: bool,
}

impl RetryPolicy {
    /// Creates a policy making `attempts` attempts (at least one).
    #[must_use]
    pub fn new(attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff_unit,
            retry_client_errors: true,
        }
    }

    /// Controls whether 4xx responses other than 408 and 429 are retried.
    #[must_use]
    pub const fn with_retry_client_errors(mut self, retry: bool) -> Self {
        self.retry_client_errors = retry;
        self
    }

    /// Total attempts per call.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Delay to sleep after failed attempt `attempt` (0-indexed), or `None`
    /// when it was the last attempt.
    #[must_use]
    pub fn backoff_after(&self, attempt: u32) -> Option<Duration> {
        if attempt + 1 >= self.attempts {
            return None;
        }
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        Some(self.backoff_unit.saturating_mul(factor))
    }

    fn should_retry(&self, failure: &Failure) -> bool {
        match failure {
            Failure::Transport(_) => true,
            Failure::Status { status, .. } => {
                !status.is_client_error()
                    || self.retry_client_errors
                    || matches!(
                        *status,
                        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS
                    )
            }
            Failure::Decode(_) => false,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            AgentrixConfig::DEFAULT_RETRIES,
            AgentrixConfig::DEFAULT_BACKOFF_UNIT,
        )
    }
}

/// Why a single attempt failed.
enum Failure {
    Transport(reqwest::Error),
    Status {
        status: StatusCode,
        body: Vec<u8>,
        message: String,
    },
    Decode(serde_json::Error),
}

impl Failure {
    fn into_error(self) -> AgentrixError {
        match self {
            Self::Transport(err) => err.into(),
            Self::Status {
                status,
                body,
                message,
            } => ApiError::from_response(status, &body, &message).into(),
            Self::Decode(err) => {
                GenericError::unknown(format!("Failed to decode response body: {err}")).into()
            }
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "{err}"),
            Self::Status { message, .. } => write!(f, "{message}"),
            Self::Decode(err) => write!(f, "{err}"),
        }
    }
}

/// Authenticated JSON client with retry and error translation.
///
/// Resource facades borrow a single `HttpClient`; it is `Send + Sync` and
/// may be shared across tasks.
pub struct HttpClient {
    client: reqwest::Client,
    base_url: RwLock<String>,
    authorization: RwLock<HeaderValue>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl HttpClient {
    /// Builds a client from a configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank API key or one that cannot be
    /// sent as a header, and a generic error if the TLS backend fails to
    /// initialize.
    pub fn new(config: &AgentrixConfig) -> Result<Self> {
        validate_api_key(&config.api_key)?;
        let authorization = bearer(&config.api_key)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.brand.user_agent())
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenericError::new("CLIENT_INIT_ERROR", e.to_string()))?;

        let retry = RetryPolicy::new(config.retries, config.backoff_unit)
            .with_retry_client_errors(config.retry_client_errors);

        Ok(Self {
            client,
            base_url: RwLock::new(strip_trailing_slash(config.effective_base_url())),
            authorization: RwLock::new(authorization),
            timeout: config.timeout,
            retry,
        })
    }

    /// Returns the current base URL.
    #[must_use]
    pub fn base_url(&self) -> String {
        read(&self.base_url).clone()
    }

    /// Returns the API key currently attached to requests.
    #[must_use]
    pub fn api_key(&self) -> String {
        read(&self.authorization)
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .unwrap_or_default()
            .to_owned()
    }

    /// Returns the per-attempt timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Replaces the API key used by subsequent requests.
    ///
    /// Requests already in flight keep the key they were issued with.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank key or one that cannot be sent
    /// as a header; the previous key stays in effect.
    pub fn set_api_key(&self, api_key: &str) -> Result<()> {
        validate_api_key(api_key)?;
        let value = bearer(api_key)?;
        *write(&self.authorization) = value;
        Ok(())
    }

    /// Replaces the base URL, stripping one trailing slash.
    pub fn set_base_url(&self, base_url: &str) {
        *write(&self.base_url) = strip_trailing_slash(base_url);
    }

    /// Sends `GET {base}{path}`.
    ///
    /// # Errors
    ///
    /// Returns an [`AgentrixError`] once all attempts have failed.
    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, None, None).await
    }

    /// Sends `GET {base}{path}`, reading a 404 as `None`.
    ///
    /// The 404 ends the call at once; it is never retried.
    ///
    /// # Errors
    ///
    /// Returns an [`AgentrixError`] once all attempts have failed for any
    /// other reason.
    pub async fn get_optional(&self, path: &str) -> Result<Option<Value>> {
        self.send(Method::GET, path, None, None, Some(StatusCode::NOT_FOUND))
            .await
    }

    /// Sends `GET {base}{path}?{query}`.
    ///
    /// `query` must serialize to a flat object; `null` members are omitted.
    ///
    /// # Errors
    ///
    /// Returns an [`AgentrixError`] once all attempts have failed, or a
    /// validation error if `query` is not a flat object.
    pub async fn get_with_query<Q>(&self, path: &str, query: &Q) -> Result<Value>
    where
        Q: Serialize + ?Sized,
    {
        let pairs = query_pairs(query)?;
        self.request(Method::GET, path, Some(pairs), None).await
    }

    /// Sends `POST {base}{path}` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an [`AgentrixError`] once all attempts have failed.
    pub async fn post<B>(&self, path: &str, body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, path, None, Some(body)).await
    }

    /// Sends `POST {base}{path}` without a body.
    ///
    /// # Errors
    ///
    /// Returns an [`AgentrixError`] once all attempts have failed.
    pub async fn post_empty(&self, path: &str) -> Result<Value> {
        self.request(Method::POST, path, None, None).await
    }

    /// Sends `PUT {base}{path}` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an [`AgentrixError`] once all attempts have failed.
    pub async fn put<B>(&self, path: &str, body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::PUT, path, None, Some(body)).await
    }

    /// Sends `DELETE {base}{path}`.
    ///
    /// # Errors
    ///
    /// Returns an [`AgentrixError`] once all attempts have failed.
    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.request(Method::DELETE, path, None, None).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<Vec<(String, String)>>,
        body: Option<Value>,
    ) -> Result<Value> {
        let value = self.send(method, path, query, body, None).await?;
        Ok(value.unwrap_or(Value::Null))
    }

    /// Runs one logical call: up to `attempts` tries with backoff in between.
    ///
    /// A response with status `absent` ends the call with `Ok(None)`.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "agentrix.request", skip(self, query, body), err)
    )]
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: Option<Vec<(String, String)>>,
        body: Option<Value>,
        absent: Option<StatusCode>,
    ) -> Result<Option<Value>> {
        let url = self.resolve(path, query.as_deref())?;
        let mut attempt = 0;
        loop {
            let failure = match self.attempt(method.clone(), &url, body.as_ref()).await {
                Ok(value) => {
                    #[cfg(feature = "telemetry")]
                    if attempt > 0 {
                        tracing::info!(%method, %url, attempt = attempt + 1, "Request succeeded after retry");
                    }
                    return Ok(Some(value));
                }
                Err(failure) => failure,
            };
            if matches!(&failure, Failure::Status { status, .. } if Some(*status) == absent) {
                return Ok(None);
            }

            let delay = if self.retry.should_retry(&failure) {
                self.retry.backoff_after(attempt)
            } else {
                None
            };
            let Some(delay) = delay else {
                #[cfg(feature = "telemetry")]
                tracing::error!(%method, %url, attempts = attempt + 1, error = %failure, "Request failed");
                return Err(failure.into_error());
            };

            #[cfg(feature = "telemetry")]
            tracing::warn!(
                %method,
                %url,
                attempt = attempt + 1,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %failure,
                "Request attempt failed, retrying"
            );

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Issues a single attempt.
    async fn attempt(
        &self,
        method: Method,
        url: &Url,
        body: Option<&Value>,
    ) -> std::result::Result<Value, Failure> {
        let authorization = read(&self.authorization).clone();
        let mut request = self
            .client
            .request(method, url.clone())
            .header(AUTHORIZATION, authorization);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(Failure::Transport)?;
        let status = response.status();
        let status_error = response
            .error_for_status_ref()
            .err()
            .map(|err| err.to_string());
        if let Some(message) = status_error {
            let body = response
                .bytes()
                .await
                .map(|bytes| bytes.to_vec())
                .unwrap_or_default();
            return Err(Failure::Status {
                status,
                body,
                message,
            });
        }

        let bytes = response.bytes().await.map_err(Failure::Transport)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(Failure::Decode)
    }

    /// Joins `path` onto the base URL and appends query pairs.
    fn resolve(&self, path: &str, query: Option<&[(String, String)]>) -> Result<Url> {
        let base = read(&self.base_url).clone();
        let separator = if path.starts_with('/') { "" } else { "/" };
        let mut url = Url::parse(&format!("{base}{separator}{path}"))?;
        if let Some(pairs) = query.filter(|pairs| !pairs.is_empty()) {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &*read(&self.base_url))
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

/// Builds the `Authorization` header value for `api_key`.
fn bearer(api_key: &str) -> Result<HeaderValue, ValidationError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {api_key}"))
        .map_err(|_| ValidationError::new("API key contains invalid header characters"))?;
    value.set_sensitive(true);
    Ok(value)
}

fn strip_trailing_slash(url: &str) -> String {
    url.strip_suffix('/').unwrap_or(url).to_owned()
}

/// Flattens a serializable query into string pairs, skipping `null` members.
fn query_pairs<Q>(query: &Q) -> Result<Vec<(String, String)>>
where
    Q: Serialize + ?Sized,
{
    let value = serde_json::to_value(query)?;
    let Value::Object(fields) = value else {
        return Err(ValidationError::new("Query parameters must be an object").into());
    };
    fields
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key, s)),
            Value::Number(n) => Ok((key, n.to_string())),
            Value::Bool(b) => Ok((key, b.to_string())),
            _ => Err(ValidationError::new(format!(
                "Query parameter '{key}' must be a scalar"
            ))
            .into()),
        })
        .collect()
}

// A poisoned lock still holds a complete value: writers replace it in one
// assignment.
fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(std::sync::PoisonError::into_inner)
}
