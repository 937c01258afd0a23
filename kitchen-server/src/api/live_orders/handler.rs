//! Live Orders Handlers

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use shared::{ApiResponse, Json, LiveOrderEvent, LiveOrderMessage, Order};
use tokio::sync::mpsc;

use crate::core::ServerState;
use crate::live::{Frame, SubscriptionGuard, subscriber_stream};
use crate::utils::{AppError, AppResult, ok};

/// 打开一个看板事件流
///
/// 1. 先把 `connected` 帧写入该连接的缓冲，保证它是客户端看到的第一帧
/// 2. 注册到 LiveOrderRegistry
/// 3. 响应流持有 SubscriptionGuard，连接断开时自动退订
pub async fn stream(
    State(state): State<ServerState>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    if state.live.is_shutdown() {
        return Err(AppError::with_message(
            shared::ErrorCode::NetworkError,
            "Server is shutting down",
        ));
    }

    let (tx, rx) = mpsc::channel::<Frame>(state.config.subscriber_buffer);

    let connected = LiveOrderMessage::now(LiveOrderEvent::Connected).to_json()?;
    tx.try_send(Arc::from(connected))
        .map_err(|e| AppError::internal(format!("Failed to queue connected event: {e}")))?;

    let handle = state.live.subscribe(tx);
    let guard = SubscriptionGuard::new(state.live.clone(), handle.id());
    let events = subscriber_stream(rx, handle.token().clone(), guard);

    let keep_alive = KeepAlive::new().interval(Duration::from_secs(state.config.sse_keep_alive_secs));
    Ok(Sse::new(events).keep_alive(keep_alive))
}

/// 厨房看板订单列表 (初始加载和出错后重新同步)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let orders = state.orders.kitchen_orders().await?;
    Ok(ok(orders))
}
