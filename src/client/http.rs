//! Reqwest-based HTTP client that signs every outgoing request.
//!
//! The URL and body signed are exactly the ones sent, so a receiver running
//! [`Validator`](crate::Validator) reconstructs the same signing string.

use crate::clock::{Clock, SystemClock};
use crate::config::SigningClientConfig;
use crate::crypto::signer::Signer;
use crate::SigwardenError;
use http::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use http::Method;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// A fully signed request, ready to send.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// HTTP method.
    pub method: Method,

    /// Full URL including query string, exactly as signed.
    pub url: String,

    /// Request headers, including the signature headers.
    pub headers: HeaderMap,

    /// Raw request body, exactly as signed.
    pub body: Vec<u8>,
}

/// HTTP client that attaches `X-Signature`, `X-Timestamp` and `X-Nonce`.
pub struct SigningClient {
    client: Client,
    signer: Signer,
    clock: Arc<dyn Clock>,
    base_url: String,
    user_agent: String,
}

impl SigningClient {
    /// Create a new signing client from config.
    pub fn new(config: &SigningClientConfig) -> Result<Self, SigwardenError> {
        config.validate()?;
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a client with a custom clock (for testing).
    #[cfg(any(test, feature = "test-seams"))]
    pub fn new_with_clock(
        config: &SigningClientConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SigwardenError> {
        config.validate()?;
        Self::with_clock(config, clock)
    }

    fn with_clock(
        config: &SigningClientConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SigwardenError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SigwardenError::Transport(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            client,
            signer: Signer::new(&config.secret_key),
            clock,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: build_user_agent(config),
        })
    }

    /// Build and sign a request without sending it.
    ///
    /// `GET` and `DELETE` params go into the query string; other methods send
    /// them as a JSON body.
    ///
    /// # Note
    /// The whole JSON body is signed. A receiving [`Validator`](crate::Validator)
    /// only hashes the first [`MAX_BODY_SIZE`](crate::MAX_BODY_SIZE) bytes, so
    /// a body larger than that fails validation there.
    pub fn prepare<P>(
        &self,
        path: &str,
        method: Method,
        params: Option<&P>,
    ) -> Result<PreparedRequest, SigwardenError>
    where
        P: Serialize + ?Sized,
    {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, path.trim_start_matches('/')))
            .map_err(|e| SigwardenError::ProtocolError(format!("Invalid request URL: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, header_value(&self.user_agent)?);

        let body = match params {
            Some(params) if sends_query(&method) => {
                append_query(&mut url, params)?;
                Vec::new()
            }
            Some(params) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                serde_json::to_vec(params).map_err(|e| {
                    SigwardenError::ProtocolError(format!("Failed to serialize: {}", e))
                })?
            }
            None => Vec::new(),
        };

        let url = url.to_string();
        let signature = self
            .signer
            .sign_request(method.as_str(), &url, &body, self.clock.now_utc());
        signature.apply_to(&mut headers)?;

        Ok(PreparedRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Send a signed request and return the raw response body.
    ///
    /// # Note
    /// Bodies over [`MAX_BODY_SIZE`](crate::MAX_BODY_SIZE) are rejected by a
    /// sigwarden receiver; see [`prepare`](Self::prepare).
    ///
    /// # Errors
    /// * `ProtocolError` - params or URL could not be encoded
    /// * `Transport` - the request failed or returned a non-success status
    pub fn request<P>(
        &self,
        path: &str,
        method: Method,
        params: Option<&P>,
    ) -> Result<Vec<u8>, SigwardenError>
    where
        P: Serialize + ?Sized,
    {
        let prepared = self.prepare(path, method, params)?;
        debug!(method = %prepared.method, url = %prepared.url, "Sending signed request");

        let response = self
            .client
            .request(prepared.method, &prepared.url)
            .headers(prepared.headers)
            .body(prepared.body)
            .send()
            .map_err(|e| SigwardenError::Transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .map_err(|e| SigwardenError::Transport(format!("Failed to read body: {}", e)))?
            .to_vec();

        if !status.is_success() {
            return Err(SigwardenError::Transport(format!(
                "Unexpected status {}",
                status
            )));
        }

        Ok(body)
    }

    /// Get the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Build a User-Agent string from config.
///
/// Format: `<product> sigwarden/<version>`
pub fn build_user_agent(config: &SigningClientConfig) -> String {
    format!(
        "{} sigwarden/{}",
        config.user_agent_product,
        env!("CARGO_PKG_VERSION")
    )
}

fn sends_query(method: &Method) -> bool {
    *method == Method::GET || *method == Method::DELETE
}

/// Flatten a params object into query pairs. Nulls are skipped, strings are
/// sent raw and everything else as its JSON text.
fn append_query<P>(url: &mut Url, params: &P) -> Result<(), SigwardenError>
where
    P: Serialize + ?Sized,
{
    let value = serde_json::to_value(params)
        .map_err(|e| SigwardenError::ProtocolError(format!("Failed to serialize: {}", e)))?;

    let Value::Object(map) = value else {
        return Err(SigwardenError::ProtocolError(
            "Query params must serialize to an object".to_string(),
        ));
    };

    if map.values().all(Value::is_null) {
        return Ok(());
    }

    let mut pairs = url.query_pairs_mut();
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::String(s) => {
                pairs.append_pair(&key, &s);
            }
            other => {
                pairs.append_pair(&key, &other.to_string());
            }
        }
    }
    Ok(())
}

fn header_value(value: &str) -> Result<HeaderValue, SigwardenError> {
    HeaderValue::from_str(value)
        .map_err(|e| SigwardenError::ProtocolError(format!("Invalid header value: {}", e)))
}
