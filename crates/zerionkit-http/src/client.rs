//! HTTP transport backed by `reqwest`.
//!
//! Responsibilities:
//! - attach the derived Authorization header and JSON content headers
//! - apply environment-specific request mutation (User-Agent suppression,
//!   `X-Env` routing header)
//! - retry transient failures with linear backoff
//! - normalize every terminal failure into [`ApiError`]

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use zerionkit_core::config::{ApiEnv, ClientConfig, RequestDefaults};
use zerionkit_core::env::EnvironmentProfile;
use zerionkit_core::error::{ApiError, SendFailure};
use zerionkit_core::policy::{RetryConfig, RetryPolicy};
use zerionkit_core::transport::{ApiTransport, HttpMethod};

const USER_AGENT: &str = concat!("ZerionKit/", env!("CARGO_PKG_VERSION"));

/// `reqwest`-backed implementation of [`ApiTransport`].
///
/// Per-request settings live in an immutable [`RequestDefaults`] snapshot
/// behind a lock; the `set_*` reconfigure operations swap the snapshot
/// atomically, so each request observes one coherent configuration.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    auth_header: String,
    profile: EnvironmentProfile,
    defaults: RwLock<RequestDefaults>,
}

impl HttpTransport {
    /// Build a transport for the detected runtime environment.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::with_profile(config, EnvironmentProfile::detect())
    }

    /// Build a transport for an explicit environment profile.
    pub fn with_profile(
        config: &ClientConfig,
        profile: EnvironmentProfile,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_header: config.auth_header(),
            profile,
            defaults: RwLock::new(config.request_defaults()),
        })
    }

    fn snapshot(&self) -> RequestDefaults {
        *self.defaults.read().unwrap()
    }

    async fn send_once(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
        defaults: &RequestDefaults,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .request(to_reqwest_method(method), &url)
            .timeout(defaults.timeout)
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        // Browsers forbid a caller-set User-Agent; suppress it before the
        // wire rather than letting the runtime warn about it.
        if self.profile.auth_context().send_user_agent {
            request = request.header(reqwest::header::USER_AGENT, USER_AGENT);
        }
        if defaults.env == ApiEnv::Testnet {
            request = request.header("X-Env", "testnet");
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%method, path, "→ request");

        let response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();

        tracing::debug!(status = status.as_u16(), %method, path, "← response");

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::from_error_response(status.as_u16(), &text));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("response body interrupted: {e}")))?;
        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| ApiError::unknown(format!("response was not valid JSON: {e}")))
    }

    fn classify(&self, err: reqwest::Error) -> ApiError {
        let failure = if err.is_builder() {
            SendFailure::NotDispatched(err.to_string())
        } else {
            // Connect failures, timeouts and mid-flight resets all present
            // as "sent but no response".
            SendFailure::NoResponse(err.to_string())
        };
        ApiError::from_send_failure(&self.profile, failure)
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let defaults = self.snapshot();
        let policy = RetryPolicy::new(RetryConfig {
            max_retries: defaults.max_retries,
            base_delay: defaults.retry_delay,
        });

        // Each retry re-issues the identical request configuration; safe
        // because the whole surface is reads.
        let mut attempt = 0u32;
        loop {
            match self.send_once(method, path, body.as_ref(), &defaults).await {
                Ok(value) => return Ok(value),
                Err(e) if policy.should_retry(&e) => {
                    attempt += 1;
                    match policy.next_delay(attempt) {
                        Some(delay) => {
                            tracing::warn!(
                                attempt,
                                delay_ms = delay.as_millis() as u64,
                                error = %e,
                                path,
                                "retrying request"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        None => {
                            tracing::error!(attempt, error = %e, path, "retry budget exhausted");
                            return Err(e);
                        }
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn set_environment(&self, env: ApiEnv) {
        self.defaults.write().unwrap().env = env;
    }

    fn set_timeout(&self, timeout: Duration) {
        self.defaults.write().unwrap().timeout = timeout;
    }

    fn set_retries(&self, retries: u32, delay: Option<Duration>) {
        let mut defaults = self.defaults.write().unwrap();
        defaults.max_retries = retries;
        if let Some(delay) = delay {
            defaults.retry_delay = delay;
        }
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}
