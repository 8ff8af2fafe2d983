//! End-to-end: sign on the sending side, validate through the tower gate.

use bytes::Bytes;
use chrono::Utc;
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use sigwarden::{RestoredBody, SecureTransport, Signer, Validator, ValidatorConfig, MAX_BODY_SIZE};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tower::{service_fn, Layer, ServiceExt};

const SECRET: &str = "integration-secret";

async fn echo(req: Request<RestoredBody<Full<Bytes>>>) -> Result<Response<Full<Bytes>>, Infallible> {
    let body = req.into_body().collect().await.unwrap().to_bytes();
    Ok(Response::new(Full::new(body)))
}

fn signed(
    signer: &Signer,
    signed_at: chrono::DateTime<Utc>,
    url: &str,
    path: &str,
    body: Bytes,
) -> Request<Full<Bytes>> {
    let headers = signer.sign_request("POST", url, &body[..body.len().min(MAX_BODY_SIZE)], signed_at);
    let mut request = Request::post(path)
        .header("host", "hooks.example")
        .body(Full::new(body))
        .unwrap();
    headers.apply_to(request.headers_mut()).unwrap();
    request
}

async fn send(validator: Validator, request: Request<Full<Bytes>>) -> Response<Full<Bytes>> {
    validator
        .into_layer()
        .layer(service_fn(echo))
        .oneshot(request)
        .await
        .unwrap()
}

#[tokio::test]
async fn signed_request_reaches_handler_with_full_body() {
    let signer = Signer::new(SECRET);
    let body = Bytes::from(vec![b'z'; MAX_BODY_SIZE * 3]);
    let mut request = signed(
        &signer,
        Utc::now(),
        "https://hooks.example/inbound?flag&a=1",
        "/inbound?flag&a=1",
        body.clone(),
    );
    request.extensions_mut().insert(SecureTransport);

    let validator = Validator::new(ValidatorConfig::new(SECRET)).unwrap();
    let response = send(validator, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.into_body().collect().await.unwrap().to_bytes(), body);
}

#[tokio::test]
async fn stale_request_rejected() {
    let signer = Signer::new(SECRET);
    let signed_at = Utc::now() - chrono::Duration::seconds(16);
    let request = signed(
        &signer,
        signed_at,
        "http://hooks.example/inbound",
        "/inbound",
        Bytes::from_static(b"{}"),
    );

    let validator = Validator::new(ValidatorConfig::new(SECRET)).unwrap();
    let response = send(validator, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn recently_signed_request_accepted() {
    let signer = Signer::new(SECRET);
    // One second inside the window, leaving slack for test latency
    let signed_at = Utc::now() - chrono::Duration::seconds(14);
    let request = signed(
        &signer,
        signed_at,
        "http://hooks.example/inbound",
        "/inbound",
        Bytes::from_static(b"{}"),
    );

    let validator = Validator::new(ValidatorConfig::new(SECRET)).unwrap();
    let response = send(validator, request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn wrong_secret_rejected() {
    let signer = Signer::new("some-other-secret");
    let request = signed(
        &signer,
        Utc::now(),
        "http://hooks.example/inbound",
        "/inbound",
        Bytes::from_static(b"{}"),
    );

    let validator = Validator::new(ValidatorConfig::new(SECRET)).unwrap();
    let response = send(validator, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.into_body().collect().await.unwrap().to_bytes().is_empty());
}

#[tokio::test]
async fn base_url_behind_proxy() {
    let signer = Signer::new(SECRET);
    let request = signed(
        &signer,
        Utc::now(),
        "https://public.example/inbound",
        "/inbound",
        Bytes::from_static(b"{}"),
    );

    let config = ValidatorConfig::new(SECRET)
        .with_base_url("https://public.example")
        .with_max_signature_age(Duration::from_secs(60));
    let validator = Arc::new(Validator::new(config).unwrap());

    let response = sigwarden::validate(validator, service_fn(echo))
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
