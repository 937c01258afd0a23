//! Value types carried by order snapshots

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, ErrorCode};

// ============================================================================
// Order Status
// ============================================================================

/// 订单状态
///
/// 序列化为小写字符串；解析时忽略大小写和首尾空白。
///
/// | 状态 | 厨房可见 | 终态 |
/// |------|----------|------|
/// | new | ✓ | |
/// | paid | ✓ | |
/// | preparing | ✓ | |
/// | prepared | ✓ | |
/// | completed | | ✓ |
/// | cancelled | | ✓ |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum OrderStatus {
    /// 新订单，等待厨房接单
    #[default]
    New,
    /// 已确认付款，等待厨房接单
    Paid,
    /// 制作中
    Preparing,
    /// 已出餐，等待取餐/配送
    Prepared,
    /// 已完成
    Completed,
    /// 已取消
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::New,
        OrderStatus::Paid,
        OrderStatus::Preparing,
        OrderStatus::Prepared,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Paid => "paid",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Prepared => "prepared",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// 是否应显示在厨房看板上
    pub const fn is_kitchen_relevant(&self) -> bool {
        matches!(
            self,
            OrderStatus::New | OrderStatus::Paid | OrderStatus::Preparing | OrderStatus::Prepared
        )
    }

    /// 是否为终态 (不允许再迁移)
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// 是否仍在等待厨房接单
    pub const fn is_awaiting_acceptance(&self) -> bool {
        matches!(self, OrderStatus::New | OrderStatus::Paid)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown order status string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0:?}")]
pub struct ParseStatusError(pub String);

impl FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = ParseStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrderStatus> for &'static str {
    fn from(status: OrderStatus) -> Self {
        status.as_str()
    }
}

impl From<ParseStatusError> for AppError {
    fn from(err: ParseStatusError) -> Self {
        AppError::with_message(ErrorCode::OrderInvalidStatus, err.to_string())
            .with_detail("status", err.0)
    }
}

// ============================================================================
// Payment / Delivery
// ============================================================================

/// 付款方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => f.write_str("cash"),
            PaymentMethod::Card => f.write_str("card"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            _ => Err(AppError::with_message(
                ErrorCode::PaymentInvalidMethod,
                format!("Invalid payment method: {s}"),
            )
            .with_detail("allowed", "cash, card")),
        }
    }
}

/// 取餐方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    #[default]
    Pickup,
    Delivery,
}

// ============================================================================
// Line Items / Customer
// ============================================================================

fn default_qty() -> u32 {
    1
}

/// 订单行项目 (创建后不可变)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub title: String,
    #[serde(default = "default_qty")]
    pub qty: u32,
    /// Unit price
    pub price: f64,
}

impl LineItem {
    pub fn new(title: impl Into<String>, qty: u32, price: f64) -> Self {
        Self {
            title: title.into(),
            qty,
            price,
        }
    }
}

/// 顾客联系信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}
