//! Live Orders API
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/live-orders | GET | SSE 事件流 (首帧为 `connected`) |
//! | /api/live-orders/list | GET | 厨房看板订单全量列表 (最新在前) |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/live-orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::stream))
        .route("/list", get(handler::list))
}
