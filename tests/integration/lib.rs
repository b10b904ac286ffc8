//! Shared helpers for gateway integration tests.

use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{header, Request, Response};
use axum::Router;
use promptdock_gateway::{AppState, Server};
use std::net::SocketAddr;
use std::sync::Arc;

/// Router with default settings and a mocked peer address.
///
/// No API keys are configured, so any request that reaches a provider
/// fails with an authentication error rather than touching the network.
pub fn test_router() -> Router {
    Server::router(Arc::new(AppState::for_tests()), true)
        .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 41234))))
}

/// Build a JSON POST request.
pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a GET request.
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
