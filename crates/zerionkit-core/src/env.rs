//! Runtime environment detection.
//!
//! The transport changes behavior depending on where it runs: browsers forbid
//! setting a User-Agent header and enforce CORS, servers do neither. Rather
//! than probing ad hoc at each decision point, the runtime is classified once
//! into an [`EnvironmentProfile`] and passed by value to every component that
//! needs it.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// The class of runtime the client is executing in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeKind {
    /// Browser main thread (wasm target).
    Browser,
    /// Native server-side process.
    Server,
    /// Browser worker context.
    Worker,
    /// Unrecognized runtime — downstream components degrade gracefully
    /// (no CORS handling, no User-Agent).
    Unknown,
}

impl std::fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Browser => write!(f, "browser"),
            Self::Server => write!(f, "server"),
            Self::Worker => write!(f, "worker"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Which underlying request mechanism the transport should prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterPreference {
    /// XHR-style adapter, required for browser compatibility.
    Xhr,
    /// Plain HTTP client.
    Http,
}

/// Environment facts the transport and retry layers consult.
///
/// Pure function of the ambient runtime: [`EnvironmentProfile::detect`] is
/// idempotent and returns an identical profile for the whole process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentProfile {
    pub kind: RuntimeKind,
    pub is_browser: bool,
    pub is_server: bool,
    pub is_worker: bool,
    /// Browsers refuse a caller-set User-Agent; setting it must be suppressed
    /// before the wire, not attempted and ignored.
    pub supports_user_agent: bool,
    pub supports_with_credentials: bool,
    pub preferred_adapter: AdapterPreference,
}

/// Header-relevant subset of the profile, consumed by the request transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub send_user_agent: bool,
    pub with_credentials: bool,
}

impl EnvironmentProfile {
    /// Classify the ambient runtime.
    ///
    /// Compile-target facts decide: wasm builds run inside a browser-class
    /// host, native unix/windows builds are server processes. Anything else
    /// reports [`RuntimeKind::Unknown`] rather than failing.
    pub fn detect() -> Self {
        let kind = if cfg!(target_arch = "wasm32") {
            RuntimeKind::Browser
        } else if cfg!(any(unix, windows)) {
            RuntimeKind::Server
        } else {
            RuntimeKind::Unknown
        };
        Self::from_kind(kind)
    }

    /// Build the profile for a specific runtime kind.
    pub fn from_kind(kind: RuntimeKind) -> Self {
        let is_browser = kind == RuntimeKind::Browser;
        let is_server = kind == RuntimeKind::Server;
        let is_worker = kind == RuntimeKind::Worker;
        Self {
            kind,
            is_browser,
            is_server,
            is_worker,
            supports_user_agent: !is_browser,
            supports_with_credentials: is_browser || is_worker,
            preferred_adapter: if is_browser {
                AdapterPreference::Xhr
            } else {
                AdapterPreference::Http
            },
        }
    }

    /// Facts the transport needs when assembling request headers.
    pub fn auth_context(&self) -> AuthContext {
        AuthContext {
            send_user_agent: self.supports_user_agent,
            // Credentialed cross-origin requests are disabled by default for
            // compatibility; the flag only records whether the runtime has
            // the concept at all.
            with_credentials: false,
        }
    }
}

/// RFC 4648 standard base64 with padding.
pub fn encode_base64(input: &str) -> String {
    BASE64.encode(input.as_bytes())
}
