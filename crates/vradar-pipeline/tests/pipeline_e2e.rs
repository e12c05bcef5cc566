//! End-to-end pipeline integration tests.
//!
//! These tests compose the full stage chain the vRadar web server runs:
//!
//! 1. Request ID - assign the UUID v7 request identifier
//! 2. Basic Authentication - gate requests and attach the principal
//! 3. Redirection - rewrite configured paths into 302 responses
//!
//! and verify the chain-level behavior: ordering, short-circuits, and
//! the exact wire shape of the 401 challenge and redirect responses.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use http::{Request as HttpRequest, Response as HttpResponse, StatusCode};
use http_body_util::Full;
use std::sync::Arc;
use vradar_core::fixtures::{
    MockAuthenticationConfig, MockCredentialStore, MockRedirectionConfig,
};
use vradar_core::AuthenticationScheme;
use vradar_pipeline::stages::{
    BasicAuthenticationStage, RedirectionStage, RequestIdStage, REQUEST_ID_HEADER,
    WWW_AUTHENTICATE_CHALLENGE,
};
use vradar_pipeline::{BoxFuture, Pipeline, PipelineContext, Request, Response};

/// A terminal handler that reports which principal (if any) reached it.
fn principal_reporting_handler(
) -> impl FnOnce(&mut PipelineContext, Request) -> BoxFuture<'static, Response> + Send + 'static {
    |ctx, _req| {
        let principal = ctx
            .principal()
            .map_or_else(|| "anonymous".to_string(), |p| p.name().to_string());
        Box::pin(async move {
            HttpResponse::builder()
                .status(StatusCode::OK)
                .header("x-principal", principal)
                .body(Full::new(Bytes::from("OK")))
                .unwrap()
        })
    }
}

fn make_request(uri: &str, host: &str) -> Request {
    HttpRequest::builder()
        .uri(uri)
        .header(http::header::HOST, host)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

fn make_authorized_request(uri: &str, host: &str, user: &str, password: &str) -> Request {
    let encoded = BASE64.encode(format!("{user}:{password}"));
    HttpRequest::builder()
        .uri(uri)
        .header(http::header::HOST, host)
        .header(http::header::AUTHORIZATION, format!("Basic {encoded}"))
        .body(Full::new(Bytes::new()))
        .unwrap()
}

fn auth_config(scheme: AuthenticationScheme) -> MockAuthenticationConfig {
    MockAuthenticationConfig::new()
        .with_scheme(scheme)
        .with_admin_prefix("/admin/")
}

fn credential_store() -> MockCredentialStore {
    MockCredentialStore::new()
        .with_user("admin", "secret", true)
        .with_user("viewer", "lookonly", false)
}

fn redirection_config() -> MockRedirectionConfig {
    MockRedirectionConfig::new().with_mobile_redirect("/", "/desktop.html", "/mobile.html")
}

/// Builds the full three-stage pipeline in its intended order.
fn build_pipeline(scheme: AuthenticationScheme) -> Pipeline {
    Pipeline::builder()
        .add_stage(RequestIdStage::new())
        .add_stage(BasicAuthenticationStage::new(
            Arc::new(auth_config(scheme)),
            Arc::new(credential_store()),
        ))
        .add_stage(RedirectionStage::new(Arc::new(redirection_config())))
        .build()
}

#[tokio::test]
async fn test_exempt_request_reaches_handler_anonymously() {
    let pipeline = build_pipeline(AuthenticationScheme::None);

    let response = pipeline
        .process(
            PipelineContext::new(),
            make_request("/map.html", "example.com"),
            principal_reporting_handler(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-principal").unwrap(), "anonymous");
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn test_global_auth_challenges_before_redirecting() {
    let pipeline = build_pipeline(AuthenticationScheme::Basic);

    // "/" is a configured redirect, but authentication runs first.
    let response = pipeline
        .process(
            PipelineContext::new(),
            make_request("/", "example.com"),
            principal_reporting_handler(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(!response.headers().contains_key(http::header::LOCATION));

    let challenges: Vec<_> = response
        .headers()
        .get_all(http::header::WWW_AUTHENTICATE)
        .iter()
        .collect();
    assert_eq!(challenges.len(), 1);
    assert_eq!(challenges[0], WWW_AUTHENTICATE_CHALLENGE);
}

#[tokio::test]
async fn test_authenticated_request_still_redirects() {
    let pipeline = build_pipeline(AuthenticationScheme::Basic);

    let response = pipeline
        .process(
            PipelineContext::new(),
            make_authorized_request("/", "example.com", "viewer", "lookonly"),
            principal_reporting_handler(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(http::header::LOCATION).unwrap(),
        "http://example.com/desktop.html"
    );
}

#[tokio::test]
async fn test_authenticated_request_reaches_handler_with_principal() {
    let pipeline = build_pipeline(AuthenticationScheme::Basic);

    let response = pipeline
        .process(
            PipelineContext::new(),
            make_authorized_request("/map.html", "example.com", "viewer", "lookonly"),
            principal_reporting_handler(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-principal").unwrap(), "viewer");
}

#[tokio::test]
async fn test_admin_path_rejects_valid_non_administrator() {
    let pipeline = build_pipeline(AuthenticationScheme::None);

    let response = pipeline
        .process(
            PipelineContext::new(),
            make_authorized_request("/admin/settings.html", "example.com", "viewer", "lookonly"),
            principal_reporting_handler(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_path_accepts_administrator() {
    let pipeline = build_pipeline(AuthenticationScheme::None);

    let response = pipeline
        .process(
            PipelineContext::new(),
            make_authorized_request("/admin/settings.html", "example.com", "admin", "secret"),
            principal_reporting_handler(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-principal").unwrap(), "admin");
}

#[tokio::test]
async fn test_challenge_carries_request_id() {
    let pipeline = build_pipeline(AuthenticationScheme::Basic);

    // The request ID stage wraps the whole chain, so even a 401 from the
    // authentication stage is tagged.
    let response = pipeline
        .process(
            PipelineContext::new(),
            make_request("/map.html", "example.com"),
            principal_reporting_handler(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn test_mobile_agent_redirects_to_mobile_target() {
    let pipeline = build_pipeline(AuthenticationScheme::None);

    let request = HttpRequest::builder()
        .uri("/")
        .header(http::header::HOST, "example.com")
        .header(
            http::header::USER_AGENT,
            "Mozilla/5.0 (Linux; Android 13; Pixel 7) Mobile Safari/537.36",
        )
        .body(Full::new(Bytes::new()))
        .unwrap();

    let response = pipeline
        .process(
            PipelineContext::new(),
            request,
            principal_reporting_handler(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(http::header::LOCATION).unwrap(),
        "http://example.com/mobile.html"
    );
}

#[tokio::test]
async fn test_redirect_strips_default_port_and_keeps_query() {
    let pipeline = Pipeline::builder()
        .add_stage(RedirectionStage::new(Arc::new(
            MockRedirectionConfig::new().with_redirect("/mobile", "/mobile"),
        )))
        .build();

    let response = pipeline
        .process(
            PipelineContext::with_path_base("/app"),
            make_request("/app/mobile?x=1", "example.com:80"),
            principal_reporting_handler(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(http::header::LOCATION).unwrap(),
        "http://example.com/app/mobile?x=1"
    );
}

#[tokio::test]
async fn test_pipeline_stage_names_in_order() {
    let pipeline = build_pipeline(AuthenticationScheme::None);
    assert_eq!(
        pipeline.stage_names(),
        vec!["request_id", "basic_authentication", "redirection"]
    );
    assert_eq!(pipeline.stage_count(), 3);
}
