//! Transport configuration for the training backend client.

use std::collections::HashMap;
use std::time::Duration;

/// A secret string type for sensitive data like bearer tokens.
/// Prevents accidental logging or display of secrets.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret string.
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Get the underlying secret value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

/// Transport options for the training backend.
///
/// The credential is injected here explicitly rather than read from a
/// shared store at request time; whoever constructs the client decides
/// where the token comes from.
///
/// # Example
/// ```rust
/// use simtrain::options::TransportOptions;
/// use std::time::Duration;
///
/// let options = TransportOptions::new("http://localhost:8080/api/social-worker/simulation")
///     .with_credential("token-123")
///     .with_timeout(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Base URL of the simulation endpoints, without a trailing slash.
    pub base_url: String,

    /// Bearer credential sent verbatim in the `Authorization` header.
    /// When `None` the header is omitted entirely.
    pub credential: Option<SecretString>,

    /// Request timeout. Streaming responses inherit it as well, so it
    /// should be generous enough for a full generation.
    pub timeout: Option<Duration>,

    /// HTTP proxy URL.
    pub proxy: Option<String>,

    /// Additional HTTP headers to include in every request.
    pub extra_headers: Option<HashMap<String, String>>,
}

impl TransportOptions {
    /// Create new transport options pointing at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credential: None,
            timeout: None,
            proxy: None,
            extra_headers: None,
        }
    }

    /// Set the bearer credential.
    pub fn with_credential(mut self, credential: impl Into<SecretString>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the proxy URL.
    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Set extra headers.
    pub fn with_extra_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.extra_headers = Some(headers);
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key, value);
        self
    }
}
