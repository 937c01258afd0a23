//! Order snapshot - 订单的完整状态

use serde::{Deserialize, Serialize};

use super::types::{CustomerInfo, DeliveryType, LineItem, OrderStatus, PaymentMethod};

/// 订单 ID (服务端按顺序分配)
pub type OrderId = i64;

/// 订单快照
///
/// 所有时间戳均为 Unix 毫秒。`total` 由服务端根据行项目计算，客户端只读。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_ready_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_prep_minutes: Option<u32>,
    pub total: f64,
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// 顾客选择的付款方式 (付款前可修改)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    /// 实际付款方式，付款确认时设置一次
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_by: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub delivery_type: DeliveryType,
}

impl Order {
    /// Total quantity across all line items
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.qty).sum()
    }

    pub fn is_paid(&self) -> bool {
        self.paid_by.is_some()
    }
}

/// 创建订单请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub delivery_type: DeliveryType,
    /// 顾客选择的付款方式；现金订单在创建时即视为已付款
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_prep_minutes: Option<u32>,
}
