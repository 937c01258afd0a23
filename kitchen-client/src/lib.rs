//! Kitchen Client - 厨房看板客户端
//!
//! Consumes the live order stream of `kitchen-server` and keeps a local
//! kitchen board in sync: push events, full resyncs, operator actions
//! and the audible alert for unacknowledged orders.

pub mod ack;
pub mod alarm;
pub mod board;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod stream;

pub use ack::AckStore;
pub use alarm::{AlarmDriver, Chime, LogChime};
pub use board::{AlertState, AlertTransition, BoardOrder, Countdown, KitchenBoard};
pub use config::ClientConfig;
pub use dashboard::KitchenDashboard;
pub use error::{ClientError, ClientResult};
pub use http::{HttpClient, KitchenApi};
pub use stream::{Backoff, LiveOrderStream, SseDecoder};

// Re-export shared types for convenience
pub use shared::{ApiResponse, LiveOrderEvent, LiveOrderMessage, Order, OrderId, OrderStatus};
