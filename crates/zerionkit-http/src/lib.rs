//! zerionkit-http — `reqwest`-backed [`ApiTransport`] implementation.
//!
//! [`ApiTransport`]: zerionkit_core::transport::ApiTransport

mod client;

pub use client::HttpTransport;
