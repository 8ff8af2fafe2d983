//! Signed request validator - the main receiving-side API.
//!
//! Validation runs these steps, each with its own failure mode:
//! 1. Require `X-Signature`, `X-Timestamp` and `X-Nonce`
//! 2. Parse the timestamp
//! 3. Reject signatures older than the configured maximum age
//! 4. Read at most [`MAX_BODY_SIZE`] body bytes for hashing
//! 5. Resolve the external URL (base URL > custom extractor > default)
//! 6. Verify the HMAC in constant time
//! 7. Hand the body back unchanged

use crate::clock::{Clock, SystemClock};
use crate::config::ValidatorConfig;
use crate::crypto::freshness::check_timestamp_freshness;
use crate::crypto::signer::Signer;
use crate::integrations::gate::SignatureLayer;
use crate::protocol::body::{read_capped, RestoredBody, MAX_BODY_SIZE};
use crate::protocol::headers::{HEADER_X_NONCE, HEADER_X_SIGNATURE, HEADER_X_TIMESTAMP};
use crate::protocol::url::{request_uri, DefaultUrlExtractor, UrlExtractor};
use crate::SigwardenError;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::request::Parts;
use http::{HeaderMap, HeaderName, Request};
use http_body::Body;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Signature metadata extracted from request headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureClaims {
    /// Claimed hex HMAC.
    pub signature: String,
    /// Sender nonce.
    pub nonce: String,
    /// Parsed signing time.
    pub created: DateTime<Utc>,
}

/// Validates signed requests.
///
/// Configuration is fixed at construction; share one instance (e.g. behind an
/// `Arc`) across all request handlers.
pub struct Validator {
    signer: Signer,
    config: ValidatorConfig,
    clock: Arc<dyn Clock>,
    url_extractor: Option<Arc<dyn UrlExtractor>>,
}

impl Validator {
    /// Create a validator with the given configuration.
    ///
    /// Uses the system clock for freshness checks.
    ///
    /// # Errors
    /// Returns `ConfigError` if configuration validation fails.
    pub fn new(config: ValidatorConfig) -> Result<Self, SigwardenError> {
        config.validate()?;
        Ok(Self::with_clock(config, Arc::new(SystemClock)))
    }

    /// Create a validator with a custom clock (for testing).
    #[cfg(any(test, feature = "test-seams"))]
    pub fn new_with_clock(
        config: ValidatorConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SigwardenError> {
        config.validate()?;
        Ok(Self::with_clock(config, clock))
    }

    fn with_clock(config: ValidatorConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            signer: Signer::new(&config.secret_key),
            config,
            clock,
            url_extractor: None,
        }
    }

    /// Use a custom strategy to resolve the request URL.
    ///
    /// Ignored when the configuration sets a fixed `base_url`.
    pub fn with_url_extractor(mut self, extractor: impl UrlExtractor + 'static) -> Self {
        self.url_extractor = Some(Arc::new(extractor));
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Wrap this validator in a tower layer that rejects invalid requests with `401`.
    pub fn into_layer(self) -> SignatureLayer {
        SignatureLayer::new(self)
    }

    /// Check a request, consuming its body only up to the hashing cap.
    ///
    /// The request is always handed back with a body that yields the original
    /// bytes, whether or not validation passed.
    pub async fn check_request<B>(
        &self,
        request: Request<B>,
    ) -> (Request<RestoredBody<B>>, Result<(), SigwardenError>)
    where
        B: Body<Data = Bytes> + Unpin,
        B::Error: fmt::Display,
    {
        let (parts, body) = request.into_parts();

        let claims = match self.extract_claims(&parts.headers) {
            Ok(claims) => claims,
            Err(err) => {
                return (Request::from_parts(parts, RestoredBody::untouched(body)), Err(err));
            }
        };

        let (body, hashed) = read_capped(body, MAX_BODY_SIZE).await;
        let result = hashed.and_then(|hashed| self.verify_claims(&claims, &parts, &hashed));

        (Request::from_parts(parts, body), result)
    }

    /// Check a request whose body is already buffered.
    ///
    /// Bytes beyond [`MAX_BODY_SIZE`] are ignored, as in [`check_request`](Self::check_request).
    pub fn check_parts(&self, parts: &Parts, body: &[u8]) -> Result<(), SigwardenError> {
        let claims = self.extract_claims(&parts.headers)?;
        let hashed = &body[..body.len().min(MAX_BODY_SIZE)];
        self.verify_claims(&claims, parts, hashed)
    }

    /// Extract the signature headers and enforce freshness.
    ///
    /// # Errors
    /// * `MissingHeader` - a signature header is absent or empty
    /// * `MalformedTimestamp` - `X-Timestamp` is not an integer
    /// * `SignatureExpired` - the signature is older than `max_signature_age`
    pub fn extract_claims(&self, headers: &HeaderMap) -> Result<SignatureClaims, SigwardenError> {
        let signature = required_header(headers, HEADER_X_SIGNATURE)?;
        let timestamp = headers
            .get(HEADER_X_TIMESTAMP)
            .filter(|v| !v.is_empty())
            .ok_or(SigwardenError::MissingHeader {
                header: HEADER_X_TIMESTAMP,
            })?;
        let nonce = required_header(headers, HEADER_X_NONCE)?;

        let timestamp = timestamp.to_str().map_err(|_| {
            SigwardenError::MalformedTimestamp("timestamp is not visible ASCII".to_string())
        })?;
        let created = check_timestamp_freshness(
            timestamp,
            self.config.max_signature_age,
            self.clock.as_ref(),
        )?;

        Ok(SignatureClaims {
            signature: signature.to_string(),
            nonce: nonce.to_string(),
            created,
        })
    }

    /// Resolve the full URL the request was signed for.
    pub fn resolve_url(&self, parts: &Parts) -> Result<String, SigwardenError> {
        if let Some(base_url) = &self.config.base_url {
            return Ok(format!("{}{}", base_url, request_uri(parts)));
        }

        match &self.url_extractor {
            Some(extractor) => extractor.extract(parts),
            None => DefaultUrlExtractor.extract(parts),
        }
    }

    fn verify_claims(
        &self,
        claims: &SignatureClaims,
        parts: &Parts,
        body: &[u8],
    ) -> Result<(), SigwardenError> {
        let url = self.resolve_url(parts)?;

        if !self.signer.verify(
            &claims.signature,
            &claims.nonce,
            claims.created,
            parts.method.as_str(),
            &url,
            body,
        ) {
            return Err(SigwardenError::InvalidSignature);
        }

        debug!(
            method = %parts.method,
            url = %url,
            nonce = %claims.nonce,
            "Signature verified"
        );
        Ok(())
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("config", &self.config)
            .field("custom_url_extractor", &self.url_extractor.is_some())
            .finish()
    }
}

fn required_header(headers: &HeaderMap, name: HeaderName) -> Result<&str, SigwardenError> {
    headers
        .get(&name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(SigwardenError::MissingHeader { header: name })
}
