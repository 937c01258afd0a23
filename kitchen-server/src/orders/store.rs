//! OrderStore - 订单存储接口
//!
//! 实时推送只依赖这组操作。每个写操作在返回 `Ok` 时已经提交，
//! 调用方据此发布事件；返回 `Err` 时没有任何状态被修改。

use async_trait::async_trait;
use shared::AppResult;
use shared::order::{NewOrder, Order, OrderId, OrderStatus, PaymentMethod};

#[async_trait]
pub trait OrderStore: Send + Sync + std::fmt::Debug {
    /// 创建订单 (校验行项目、计算总额)；现金订单直接进入 `paid`
    async fn create(&self, input: NewOrder) -> AppResult<Order>;

    /// 按 ID 获取当前订单状态
    async fn fetch(&self, id: OrderId) -> AppResult<Order>;

    /// 确认付款
    async fn mark_paid(&self, id: OrderId, method: PaymentMethod) -> AppResult<Order>;

    /// 修改付款方式 (仅限未付款订单)
    async fn set_payment_method(&self, id: OrderId, method: PaymentMethod) -> AppResult<Order>;

    /// 状态迁移
    async fn mutate_status(&self, id: OrderId, status: OrderStatus) -> AppResult<Order>;

    /// 在当前预计完成时间基础上调整 `delta_minutes` 分钟
    async fn adjust_eta(&self, id: OrderId, delta_minutes: i64) -> AppResult<Order>;

    /// 取消订单
    async fn cancel(&self, id: OrderId) -> AppResult<Order>;

    /// 厨房看板需要显示的订单 (最新的在前)
    async fn fetch_kitchen_relevant(&self) -> AppResult<Vec<Order>>;
}
