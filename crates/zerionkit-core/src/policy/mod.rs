//! Reliability policies wrapped around the transport.
//!
//! Applied per request:
//! ```text
//! Request → [RetryPolicy] → [Transport]
//! ```

pub mod retry;

pub use retry::{RetryConfig, RetryPolicy};
