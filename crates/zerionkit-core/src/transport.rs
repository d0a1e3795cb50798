//! The `ApiTransport` trait — the seam between domain services and the wire.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ApiEnv;
use crate::error::ApiError;

/// HTTP methods the API surface uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The central async trait every transport implements.
///
/// Implementations attach authentication and environment headers, apply the
/// retry policy, and normalize every failure into [`ApiError`]. They never
/// interpret domain semantics: any non-2xx status is a failure, full stop.
///
/// # Thread safety
/// Implementations must be `Send + Sync`; services hold them as
/// `Arc<dyn ApiTransport>`.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Perform a request against a path relative to the base URL and return
    /// the parsed JSON response body.
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError>;

    async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.request(HttpMethod::Get, path, None).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        self.request(HttpMethod::Post, path, body).await
    }

    async fn put(&self, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        self.request(HttpMethod::Put, path, body).await
    }

    async fn patch(&self, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        self.request(HttpMethod::Patch, path, body).await
    }

    async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.request(HttpMethod::Delete, path, None).await
    }

    /// Route subsequent requests to the given API environment. Testnet mode
    /// adds `X-Env: testnet`; production mode removes the header entirely.
    fn set_environment(&self, env: ApiEnv);

    /// Replace the per-request timeout for subsequent requests.
    fn set_timeout(&self, timeout: Duration);

    /// Replace the retry budget (and optionally the base delay) for
    /// subsequent requests.
    fn set_retries(&self, retries: u32, delay: Option<Duration>);

    /// The base URL requests are resolved against.
    fn base_url(&self) -> &str;
}

/// Typed convenience layer over [`ApiTransport`].
#[async_trait]
pub trait ApiTransportExt: ApiTransport {
    /// GET a path and deserialize the response body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let value = self.get(path).await?;
        decode(value)
    }

    /// POST a body and deserialize the response body.
    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let value = self.post(path, body).await?;
        decode(value)
    }
}

impl<T: ApiTransport + ?Sized> ApiTransportExt for T {}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::unknown(format!("failed to decode response body: {e}")))
}
