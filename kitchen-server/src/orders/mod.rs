//! 订单模块 - 存储接口、内存实现和事件发布
//!
//! ```text
//! HTTP handler ──▶ LiveOrderService ──▶ OrderStore (提交)
//!                        │
//!                        └── 提交成功 ──▶ LiveOrderRegistry::publish
//! ```

pub mod memory;
pub mod money;
pub mod service;
pub mod store;

pub use memory::MemoryOrderStore;
pub use service::{LiveOrderService, MAX_ETA_DELTA_MINUTES};
pub use store::OrderStore;
