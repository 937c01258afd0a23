//! 路由装配 - 合并各 API 模块并挂载中间件

use std::time::Instant;

use axum::{Router, middleware};
use http::HeaderValue;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::core::ServerState;

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        target: "http_access",
        method = %method,
        path = %uri.path(),
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request handled"
    );

    response
}

fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    match frontend_url.and_then(|url| HeaderValue::from_str(url).ok()) {
        Some(origin) => CorsLayer::permissive().allow_origin(origin),
        None => CorsLayer::permissive(),
    }
}

/// Build the Axum router with state and middleware applied
///
/// Compression skips `text/event-stream`, so live order streams are flushed
/// frame by frame.
pub fn build_app(state: ServerState) -> Router {
    let cors = cors_layer(state.config.frontend_url.as_deref());

    Router::<ServerState>::new()
        .merge(crate::api::health::router())
        .merge(crate::api::live_orders::router())
        .merge(crate::api::orders::router())
        .with_state(state)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
}
