//! Sign a webhook request and push it through the validation gate.
//!
//! # Running
//!
//! ```bash
//! RUST_LOG=sigwarden=debug cargo run --example sign_and_validate
//! ```
//!
//! # Note
//!
//! In production the secret is provisioned out-of-band to both sides and the
//! gate wraps your real router; here both halves live in one process.

use bytes::Bytes;
use chrono::Utc;
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use sigwarden::{RestoredBody, Signer, SigwardenError, Validator, ValidatorConfig};
use std::convert::Infallible;
use tower::{service_fn, Layer, ServiceExt};
use tracing_subscriber::EnvFilter;

const SHARED_SECRET: &str = "demo-shared-secret";

async fn handler(
    req: Request<RestoredBody<Full<Bytes>>>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    };
    println!("  handler received {} bytes", body.len());
    Ok(Response::new(Full::new(Bytes::from_static(b"ok"))))
}

fn build_request(body: &'static str, tamper: bool) -> Result<Request<Full<Bytes>>, SigwardenError> {
    let signer = Signer::new(SHARED_SECRET);
    let headers = signer.sign_request(
        "POST",
        "http://localhost:8080/webhooks/sms",
        body.as_bytes(),
        Utc::now(),
    );

    let sent = if tamper { r#"{"text":"forged"}"# } else { body };
    let mut request = Request::post("/webhooks/sms")
        .header("host", "localhost:8080")
        .body(Full::new(Bytes::from_static(sent.as_bytes())))
        .map_err(|e| SigwardenError::ProtocolError(e.to_string()))?;
    headers.apply_to(request.headers_mut())?;
    Ok(request)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), SigwardenError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let validator = Validator::new(ValidatorConfig::new(SHARED_SECRET))?;
    let layer = validator.into_layer();

    for (label, tamper) in [("genuine", false), ("tampered", true)] {
        println!("{} request:", label);
        let request = build_request(r#"{"text":"Hello World! :-)"}"#, tamper)?;

        let response = layer
            .layer(service_fn(handler))
            .oneshot(request)
            .await
            .unwrap_or_else(|never: Infallible| match never {});

        match response.status() {
            StatusCode::OK => println!("  ✓ accepted"),
            status => println!("  ✗ rejected with {}", status),
        }
    }

    Ok(())
}
