//! Live order events - 厨房看板实时推送
//!
//! 每个事件以 SSE 帧 `data: <json>\n\n` 的形式推送，JSON 通过 `event` 字段区分类型：
//!
//! ```text
//! {"event":"connected","ts":1700000000000}
//! {"event":"order_created","order":{...},"ts":...}
//! {"event":"order_eta_updated","order_id":42,"estimated_ready_at":...,"ts":...}
//! ```
//!
//! 无法识别的 `event` 值解码为 [`LiveOrderEvent::Unknown`]，由消费端忽略。

use serde::{Deserialize, Serialize};

use crate::order::{Order, OrderId, OrderStatus};

/// 实时订单事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LiveOrderEvent {
    /// 连接建立确认 (仅发送给新连接的客户端)
    Connected,
    /// 新订单已创建
    OrderCreated { order: Order },
    /// 付款已确认
    OrderPaid { order: Order },
    /// 状态或其他字段变化
    OrderUpdated { order: Order },
    /// 预计完成时间调整
    OrderEtaUpdated {
        order_id: OrderId,
        estimated_ready_at: i64,
    },
    /// 订单已取消
    OrderCancelled { order_id: OrderId, status: OrderStatus },
    /// 未知事件 (向前兼容)
    #[serde(other)]
    Unknown,
}

impl LiveOrderEvent {
    /// Wire name of the event kind
    pub fn kind(&self) -> &'static str {
        match self {
            LiveOrderEvent::Connected => "connected",
            LiveOrderEvent::OrderCreated { .. } => "order_created",
            LiveOrderEvent::OrderPaid { .. } => "order_paid",
            LiveOrderEvent::OrderUpdated { .. } => "order_updated",
            LiveOrderEvent::OrderEtaUpdated { .. } => "order_eta_updated",
            LiveOrderEvent::OrderCancelled { .. } => "order_cancelled",
            LiveOrderEvent::Unknown => "unknown",
        }
    }

    /// Order the event refers to, if any
    pub fn order_id(&self) -> Option<OrderId> {
        match self {
            LiveOrderEvent::OrderCreated { order }
            | LiveOrderEvent::OrderPaid { order }
            | LiveOrderEvent::OrderUpdated { order } => Some(order.id),
            LiveOrderEvent::OrderEtaUpdated { order_id, .. }
            | LiveOrderEvent::OrderCancelled { order_id, .. } => Some(*order_id),
            LiveOrderEvent::Connected | LiveOrderEvent::Unknown => None,
        }
    }

    pub fn cancelled(order_id: OrderId) -> Self {
        LiveOrderEvent::OrderCancelled {
            order_id,
            status: OrderStatus::Cancelled,
        }
    }
}

/// 事件信封：事件本体 + 发送时间戳
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveOrderMessage {
    #[serde(flatten)]
    pub event: LiveOrderEvent,
    /// Emission time (Unix millis), informational only
    #[serde(default)]
    pub ts: i64,
}

impl LiveOrderMessage {
    pub fn new(event: LiveOrderEvent, ts: i64) -> Self {
        Self { event, ts }
    }

    /// Stamp `event` with the current time
    pub fn now(event: LiveOrderEvent) -> Self {
        Self::new(event, crate::now_millis())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Encode as a single SSE frame: `data: <json>\n\n`
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        Ok(encode_frame(&self.to_json()?))
    }
}

/// Wrap a JSON payload in an SSE `data:` frame
pub fn encode_frame(json: &str) -> String {
    format!("data: {json}\n\n")
}
