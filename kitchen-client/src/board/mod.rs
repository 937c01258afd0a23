//! KitchenBoard - 看板本地订单列表
//!
//! 由一次全量加载和随后的推送事件维护，普通生命周期变化不需要重新拉取。
//!
//! | 事件 | 处理 |
//! |------|------|
//! | order_created / order_paid | 原位替换或插入到最前；不属于厨房的状态直接移除 |
//! | order_updated | 仍属于厨房则更新，否则移除 |
//! | order_eta_updated | 只修改 `estimated_ready_at`；本地不存在则忽略 |
//! | order_cancelled | 按 ID 移除 |
//! | connected / 未知 | 忽略 |
//!
//! 每次变更都返回 [`AlertTransition`]，调用方据此驱动报警。

mod alert;
mod countdown;

pub use alert::{AlertState, AlertTransition};
pub use countdown::{Countdown, WARN_THRESHOLD_MILLIS};

use shared::order::{Order, OrderId, OrderStatus};
use shared::LiveOrderEvent;

use crate::ack::AckStore;

/// 看板上的一个订单
#[derive(Debug, Clone, PartialEq)]
pub struct BoardOrder {
    pub order: Order,
    /// 操作员是否已确认 (已确认的订单不再报警)
    pub acknowledged: bool,
}

impl BoardOrder {
    pub fn id(&self) -> OrderId {
        self.order.id
    }

    pub fn countdown(&self, now: i64) -> Countdown {
        Countdown::of(&self.order, now)
    }

    fn is_pending(&self) -> bool {
        self.order.status.is_kitchen_relevant() && !self.acknowledged
    }
}

/// 看板状态
#[derive(Debug)]
pub struct KitchenBoard {
    orders: Vec<BoardOrder>,
    acks: AckStore,
    alert: AlertState,
}

impl KitchenBoard {
    pub fn new(acks: AckStore) -> Self {
        Self {
            orders: Vec::new(),
            acks,
            alert: AlertState::Silent,
        }
    }

    /// 当前订单 (最新在前)
    pub fn orders(&self) -> &[BoardOrder] {
        &self.orders
    }

    pub fn get(&self, id: OrderId) -> Option<&BoardOrder> {
        self.orders.iter().find(|o| o.id() == id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn alert_state(&self) -> AlertState {
        self.alert
    }

    pub fn acks(&self) -> &AckStore {
        &self.acks
    }

    /// 未确认的厨房订单数量
    pub fn pending_count(&self) -> usize {
        self.orders.iter().filter(|o| o.is_pending()).count()
    }

    /// 用全量列表替换本地状态
    pub fn load(&mut self, orders: Vec<Order>) -> AlertTransition {
        let mut orders: Vec<BoardOrder> = orders
            .into_iter()
            .filter(|o| o.status.is_kitchen_relevant())
            .map(|order| BoardOrder {
                acknowledged: self.acks.is_acknowledged(order.id),
                order,
            })
            .collect();
        orders.sort_by(|a, b| {
            b.order
                .created_at
                .cmp(&a.order.created_at)
                .then(b.id().cmp(&a.id()))
        });
        self.orders = orders;
        self.refresh_alert()
    }

    /// 应用一个推送事件
    pub fn apply(&mut self, event: &LiveOrderEvent) -> AlertTransition {
        match event {
            LiveOrderEvent::OrderCreated { order }
            | LiveOrderEvent::OrderPaid { order }
            | LiveOrderEvent::OrderUpdated { order } => self.upsert(order.clone()),
            LiveOrderEvent::OrderEtaUpdated {
                order_id,
                estimated_ready_at,
            } => {
                self.patch_eta(*order_id, *estimated_ready_at);
            }
            LiveOrderEvent::OrderCancelled { order_id, .. } => {
                self.remove(*order_id);
            }
            LiveOrderEvent::Connected | LiveOrderEvent::Unknown => {}
        }
        self.refresh_alert()
    }

    /// 记录操作员确认并写入确认文件 (在发送请求之前调用)
    pub fn acknowledge(&mut self, id: OrderId, now: i64) -> AlertTransition {
        let transition = self.record_ack(id, now);
        if let Err(e) = self.acks.save() {
            tracing::warn!(order_id = id, error = %e, "Failed to persist acknowledgment");
        }
        transition
    }

    /// 只在内存中记录确认；确认文件由调用方另行保存
    pub fn record_ack(&mut self, id: OrderId, now: i64) -> AlertTransition {
        self.acks.record(id, now);
        if let Some(entry) = self.orders.iter_mut().find(|o| o.order.id == id) {
            entry.acknowledged = true;
        }
        self.refresh_alert()
    }

    /// 乐观更新本地状态，离开厨房状态的订单被移除
    pub fn set_status(&mut self, id: OrderId, status: OrderStatus) -> AlertTransition {
        if !status.is_kitchen_relevant() {
            self.remove(id);
        } else if let Some(entry) = self.orders.iter_mut().find(|o| o.order.id == id) {
            entry.order.status = status;
        }
        self.refresh_alert()
    }

    /// 只修改预计完成时间；本地不存在的订单不会被恢复
    pub fn patch_eta(&mut self, id: OrderId, estimated_ready_at: i64) -> bool {
        match self.orders.iter_mut().find(|o| o.order.id == id) {
            Some(entry) => {
                entry.order.estimated_ready_at = Some(estimated_ready_at);
                true
            }
            None => false,
        }
    }

    fn upsert(&mut self, order: Order) {
        if !order.status.is_kitchen_relevant() {
            self.remove(order.id);
            return;
        }

        let stored_ack = self.acks.is_acknowledged(order.id);
        match self.orders.iter_mut().find(|o| o.order.id == order.id) {
            Some(entry) => {
                entry.acknowledged |= stored_ack;
                entry.order = order;
            }
            None => self.orders.insert(
                0,
                BoardOrder {
                    order,
                    acknowledged: stored_ack,
                },
            ),
        }
    }

    fn remove(&mut self, id: OrderId) -> bool {
        let before = self.orders.len();
        self.orders.retain(|o| o.order.id != id);
        before != self.orders.len()
    }

    fn refresh_alert(&mut self) -> AlertTransition {
        let has_pending = self.orders.iter().any(BoardOrder::is_pending);
        self.alert.update(has_pending)
    }
}
