//! Shared types for the live kitchen workspace
//!
//! Wire types used by both `kitchen-server` and `kitchen-client`:
//! order snapshots, live order events and their SSE frame codec,
//! and the unified error system.

pub mod error;
pub mod live;
pub mod order;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use live::{LiveOrderEvent, LiveOrderMessage};
pub use order::{Order, OrderId, OrderStatus};

/// 当前时间 (Unix millis, UTC)
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
