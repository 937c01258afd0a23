//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`live_orders`] - 厨房看板实时推送 (SSE) 和初始列表
//! - [`orders`] - 订单写入接口 (每次成功写入后发布事件)

pub mod health;
pub mod live_orders;
pub mod orders;
