//! Sigwarden configuration.

use crate::SigwardenError;
use std::fmt;
use std::time::Duration;

/// Default maximum age of a signature before it is rejected.
pub const DEFAULT_MAX_SIGNATURE_AGE: Duration = Duration::from_secs(15);

/// Default timeout for the signing client.
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a [`Validator`](crate::Validator).
///
/// URL resolution uses exactly one method per request, in priority order:
/// `base_url` if set, then a custom extractor attached to the validator,
/// then the default extractor.
#[derive(Clone)]
pub struct ValidatorConfig {
    /// Shared secret used to key the HMAC.
    /// SECURITY: never logged; the `Debug` impl redacts it.
    pub secret_key: String,

    /// Signatures older than this are rejected.
    pub max_signature_age: Duration,

    /// Fixed external base URL (scheme + host, no trailing slash),
    /// e.g. `https://hooks.example.com`. The request's path and query are appended.
    pub base_url: Option<String>,
}

impl ValidatorConfig {
    /// Create a configuration with the default maximum age and no base URL.
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            max_signature_age: DEFAULT_MAX_SIGNATURE_AGE,
            base_url: None,
        }
    }

    /// Set the maximum signature age.
    pub fn with_max_signature_age(mut self, max_signature_age: Duration) -> Self {
        self.max_signature_age = max_signature_age;
        self
    }

    /// Set a fixed external base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), SigwardenError> {
        if self.secret_key.is_empty() {
            return Err(SigwardenError::ConfigError(
                "secret_key cannot be empty".to_string(),
            ));
        }
        if self.max_signature_age.is_zero() {
            return Err(SigwardenError::ConfigError(
                "max_signature_age must be greater than zero".to_string(),
            ));
        }
        if chrono::Duration::from_std(self.max_signature_age).is_err() {
            return Err(SigwardenError::ConfigError(format!(
                "max_signature_age is out of range: {:?}",
                self.max_signature_age
            )));
        }
        if matches!(self.base_url.as_deref(), Some("")) {
            return Err(SigwardenError::ConfigError(
                "base_url cannot be empty when set".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for ValidatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorConfig")
            .field("secret_key", &"<redacted>")
            .field("max_signature_age", &self.max_signature_age)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Configuration for the sending side [`SigningClient`](crate::client::http::SigningClient).
#[derive(Clone)]
pub struct SigningClientConfig {
    /// API base URL every request path is appended to, e.g. `https://gateway.example/api`.
    pub base_url: String,

    /// Shared secret used to key the HMAC.
    pub secret_key: String,

    /// User-Agent product identifier (e.g., "billing-worker").
    pub user_agent_product: String,

    /// Request timeout.
    pub timeout: Duration,
}

impl SigningClientConfig {
    /// Create a client configuration with the default timeout.
    pub fn new(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        user_agent_product: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            secret_key: secret_key.into(),
            user_agent_product: user_agent_product.into(),
            timeout: DEFAULT_CLIENT_TIMEOUT,
        }
    }

    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), SigwardenError> {
        if self.secret_key.is_empty() {
            return Err(SigwardenError::ConfigError(
                "secret_key cannot be empty".to_string(),
            ));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SigwardenError::ConfigError(format!(
                "base_url must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.user_agent_product.is_empty() {
            return Err(SigwardenError::ConfigError(
                "user_agent_product cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for SigningClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningClientConfig")
            .field("base_url", &self.base_url)
            .field("secret_key", &"<redacted>")
            .field("user_agent_product", &self.user_agent_product)
            .field("timeout", &self.timeout)
            .finish()
    }
}
