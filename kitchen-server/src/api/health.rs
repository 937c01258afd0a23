//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /health | GET | 健康检查 + 当前看板连接数 |

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// 状态 (ok | shutting_down)
    status: &'static str,
    /// 版本号
    version: &'static str,
    environment: String,
    /// 运行时间 (秒)
    uptime_seconds: u64,
    /// 当前 SSE 订阅者数量
    subscribers: usize,
    server_time: chrono::DateTime<chrono::Utc>,
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let status = if state.live.is_shutdown() {
        "shutting_down"
    } else {
        "ok"
    };
    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        uptime_seconds: state.uptime_seconds(),
        subscribers: state.live.subscriber_count(),
        server_time: chrono::Utc::now(),
    })
}
