//! Client configuration, validated at construction.

use std::time::Duration;

use crate::env::encode_base64;
use crate::error::ApiError;

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.zerion.io";
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default retry budget.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default base delay between retries (attempt `k` waits `base * k`).
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Which API environment requests are routed to.
///
/// Testnet mode adds an `X-Env: testnet` header; production mode removes the
/// header entirely rather than sending a falsy value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiEnv {
    #[default]
    Production,
    Testnet,
}

/// Validated client configuration.
///
/// Immutable once built. Runtime adjustments (timeout, retries, environment)
/// go through the transport's documented reconfigure operations, which swap a
/// [`RequestDefaults`] snapshot atomically instead of mutating shared fields.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl ClientConfig {
    /// Build a configuration with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ApiError> {
        Self::builder(api_key).build()
    }

    /// Start building a configuration.
    pub fn builder(api_key: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// The derived `Authorization` header value: `Basic base64(key + ":")`.
    pub fn auth_header(&self) -> String {
        format!("Basic {}", encode_base64(&format!("{}:", self.api_key)))
    }

    /// Per-request settings snapshot the transport starts from.
    pub fn request_defaults(&self) -> RequestDefaults {
        RequestDefaults {
            timeout: self.timeout,
            max_retries: self.max_retries,
            retry_delay: self.retry_delay,
            env: ApiEnv::Production,
        }
    }
}

/// Builder for [`ClientConfig`]. Validation happens in [`build`].
///
/// [`build`]: ClientConfigBuilder::build
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    api_key: String,
    base_url: String,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Validate and build. Fails fast, before any network activity.
    pub fn build(self) -> Result<ClientConfig, ApiError> {
        if self.api_key.is_empty() {
            return Err(ApiError::Validation("API key is required".into()));
        }
        if !is_valid_api_key(&self.api_key) {
            return Err(ApiError::Validation(
                "invalid API key format, expected zk_prod_... or zk_dev_...".into(),
            ));
        }
        if self.timeout < Duration::from_millis(1000) {
            return Err(ApiError::Validation("timeout must be at least 1000ms".into()));
        }
        if self.max_retries > 10 {
            return Err(ApiError::Validation("retries must be between 0 and 10".into()));
        }

        Ok(ClientConfig {
            api_key: self.api_key,
            base_url: self.base_url,
            timeout: self.timeout,
            max_retries: self.max_retries,
            retry_delay: self.retry_delay,
        })
    }
}

/// Immutable per-request settings snapshot.
///
/// The live transport holds the current snapshot behind a lock and hands each
/// request its own copy, so in-flight requests never observe a half-applied
/// reconfiguration.
#[derive(Debug, Clone, Copy)]
pub struct RequestDefaults {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub env: ApiEnv,
}

/// Checks the `zk_(prod|dev)_[A-Za-z0-9]+` key format.
pub fn is_valid_api_key(key: &str) -> bool {
    let rest = match key.strip_prefix("zk_") {
        Some(rest) => rest,
        None => return false,
    };
    let suffix = match rest.strip_prefix("prod_").or_else(|| rest.strip_prefix("dev_")) {
        Some(suffix) => suffix,
        None => return false,
    };
    !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_alphanumeric())
}
