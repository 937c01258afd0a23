//! Order API Module
//!
//! | 路径 | 方法 | 说明 | 事件 |
//! |------|------|------|------|
//! | /api/orders | POST | 创建订单 | order_created |
//! | /api/orders/{id} | GET | 订单详情 | - |
//! | /api/orders/{id} | PATCH | 状态迁移 | order_updated / order_cancelled |
//! | /api/orders/{id}/pay | POST | 确认付款 | order_paid |
//! | /api/orders/{id}/payment-method | PATCH | 修改付款方式 | order_updated |
//! | /api/orders/{id}/adjust-eta | POST | 调整预计完成时间 | order_eta_updated |
//! | /api/orders/{id}/cancel | POST | 取消订单 | order_cancelled |

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/{id}", get(handler::get_by_id).patch(handler::update_status))
        .route("/{id}/pay", post(handler::mark_paid))
        .route("/{id}/payment-method", patch(handler::change_payment_method))
        .route("/{id}/adjust-eta", post(handler::adjust_eta))
        .route("/{id}/cancel", post(handler::cancel))
}
