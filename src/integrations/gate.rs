//! Tower middleware that enforces signature validation before the inner service.
//!
//! Every failure becomes a `401 Unauthorized` with an empty body. The error
//! kind is logged but never sent to the client.

use crate::protocol::body::RestoredBody;
use crate::validator::Validator;
use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body::Body;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{debug, warn};

/// Layer that wraps services in a [`SignatureService`].
#[derive(Debug, Clone)]
pub struct SignatureLayer {
    validator: Arc<Validator>,
}

impl SignatureLayer {
    /// Create a layer from a validator.
    pub fn new(validator: Validator) -> Self {
        Self::from_shared(Arc::new(validator))
    }

    /// Create a layer from a validator shared with other code.
    pub fn from_shared(validator: Arc<Validator>) -> Self {
        Self { validator }
    }
}

impl<S> Layer<S> for SignatureLayer {
    type Service = SignatureService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SignatureService::new(inner, Arc::clone(&self.validator))
    }
}

/// Service that only calls `inner` for correctly signed requests.
#[derive(Debug, Clone)]
pub struct SignatureService<S> {
    inner: S,
    validator: Arc<Validator>,
}

impl<S> SignatureService<S> {
    /// Wrap `inner` so validation runs first.
    pub fn new(inner: S, validator: Arc<Validator>) -> Self {
        Self { inner, validator }
    }
}

impl<S, B, ResBody> Service<Request<B>> for SignatureService<S>
where
    S: Service<Request<RestoredBody<B>>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    B: Body<Data = Bytes> + Unpin + Send + 'static,
    B::Error: fmt::Display,
    ResBody: Default + Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let validator = Arc::clone(&self.validator);
        // Keep the instance that was driven to readiness
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let method = req.method().clone();
            let path = req.uri().path().to_owned();

            let (req, result) = validator.check_request(req).await;
            if let Err(err) = result {
                warn!(
                    method = %method,
                    path = %path,
                    error = %err,
                    "Rejected signed request"
                );
                return Ok(unauthorized());
            }

            debug!(method = %method, path = %path, "Signed request accepted");
            inner.call(req).await
        })
    }
}

/// Create a gate around `inner` using `validator`.
pub fn validate<S>(validator: Arc<Validator>, inner: S) -> SignatureService<S> {
    SignatureService::new(inner, validator)
}

fn unauthorized<B: Default>() -> Response<B> {
    let mut response = Response::new(B::default());
    *response.status_mut() = StatusCode::UNAUTHORIZED;
    response
}
