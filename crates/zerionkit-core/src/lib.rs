//! zerionkit-core — the resilient transport layer for the ZerionKit client.
//!
//! # Overview
//!
//! ZerionKit is a typed client for the Zerion blockchain-data REST API. The
//! core crate defines everything the domain services share:
//!
//! - [`ApiTransport`] — the central async trait every transport implements
//! - [`ClientConfig`] — validated configuration with derived Basic auth
//! - [`ApiError`] — the normalized error type all failures converge to
//! - [`EnvironmentProfile`] — one-shot runtime classification
//! - [`policy`] module — retry eligibility and linear backoff
//! - [`page`] module — JSON:API envelope and cursor traversal
//! - [`cache`] module — short-TTL response memoization
//! - [`query`] module — bracket-notation query strings

pub mod cache;
pub mod config;
pub mod env;
pub mod error;
pub mod page;
pub mod policy;
pub mod query;
pub mod transport;

pub use cache::{CacheStats, TtlCache};
pub use config::{ApiEnv, ClientConfig, ClientConfigBuilder, RequestDefaults};
pub use env::{AdapterPreference, AuthContext, EnvironmentProfile, RuntimeKind};
pub use error::{ApiError, SendFailure};
pub use page::{collect_all, Document, Links, Meta, MAX_PAGE_SIZE};
pub use policy::{RetryConfig, RetryPolicy};
pub use query::QueryParams;
pub use transport::{ApiTransport, ApiTransportExt, HttpMethod};
