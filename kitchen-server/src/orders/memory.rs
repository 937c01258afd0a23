//! In-memory OrderStore
//!
//! 每个写操作在 DashMap 的条目锁内完成校验和修改，规则检查与写入是原子的。

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::order::{NewOrder, Order, OrderId, OrderStatus, PaymentMethod};

use super::money;
use super::store::OrderStore;

/// 内存订单存储
#[derive(Debug)]
pub struct MemoryOrderStore {
    orders: DashMap<OrderId, Order>,
    next_id: AtomicI64,
}

impl Default for MemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self {
            orders: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Apply `f` to the order under its entry lock; nothing is written when `f` fails
    fn update<F>(&self, id: OrderId, f: F) -> AppResult<Order>
    where
        F: FnOnce(&mut Order, i64) -> AppResult<()>,
    {
        let mut entry = self
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::order_not_found(id))?;

        let now = shared::now_millis();
        let mut draft = entry.clone();
        f(&mut draft, now)?;
        draft.updated_at = now;
        *entry = draft.clone();
        Ok(draft)
    }
}

fn ensure_not_terminal(order: &Order) -> AppResult<()> {
    match order.status {
        OrderStatus::Completed => Err(AppError::with_message(
            ErrorCode::OrderAlreadyCompleted,
            format!("Order {} already completed", order.id),
        )),
        OrderStatus::Cancelled => Err(AppError::with_message(
            ErrorCode::OrderAlreadyCancelled,
            format!("Order {} already cancelled", order.id),
        )),
        _ => Ok(()),
    }
}

fn validate_new_order(input: &NewOrder) -> AppResult<f64> {
    if let Some(customer) = &input.customer {
        if customer.name.trim().is_empty() {
            return Err(AppError::required_field("customer name"));
        }
        if customer.phone.trim().is_empty() {
            return Err(AppError::required_field("customer phone"));
        }
    }
    money::order_total(&input.items)
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(&self, input: NewOrder) -> AppResult<Order> {
        let total = validate_new_order(&input)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = shared::now_millis();

        let (status, paid_by, paid_at) = match input.payment_method {
            Some(PaymentMethod::Cash) => (OrderStatus::Paid, Some(PaymentMethod::Cash), Some(now)),
            _ => (OrderStatus::New, None, None),
        };

        let order = Order {
            id,
            status,
            created_at: now,
            updated_at: now,
            estimated_ready_at: None,
            estimated_prep_minutes: input.estimated_prep_minutes,
            total,
            items: input.items,
            payment_method: input.payment_method,
            paid_by,
            paid_at,
            customer: input.customer,
            notes: input.notes.filter(|n| !n.trim().is_empty()),
            delivery_type: input.delivery_type,
        };

        self.orders.insert(id, order.clone());
        tracing::info!(order_id = id, total, status = %order.status, "Order created");
        Ok(order)
    }

    async fn fetch(&self, id: OrderId) -> AppResult<Order> {
        self.orders
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::order_not_found(id))
    }

    async fn mark_paid(&self, id: OrderId, method: PaymentMethod) -> AppResult<Order> {
        self.update(id, |order, now| {
            if order.is_paid() {
                return Err(AppError::with_message(
                    ErrorCode::OrderAlreadyPaid,
                    "Order already paid",
                ));
            }
            ensure_not_terminal(order)?;
            order.payment_method = Some(method);
            order.paid_by = Some(method);
            order.paid_at = Some(now);
            if order.status == OrderStatus::New {
                order.status = OrderStatus::Paid;
            }
            Ok(())
        })
    }

    async fn set_payment_method(&self, id: OrderId, method: PaymentMethod) -> AppResult<Order> {
        self.update(id, |order, _| {
            if order.is_paid() {
                return Err(AppError::with_message(
                    ErrorCode::OrderAlreadyPaid,
                    "Payment method cannot be changed after payment",
                ));
            }
            ensure_not_terminal(order)?;
            order.payment_method = Some(method);
            Ok(())
        })
    }

    async fn mutate_status(&self, id: OrderId, status: OrderStatus) -> AppResult<Order> {
        if status == OrderStatus::Paid {
            return Err(AppError::with_message(
                ErrorCode::OrderInvalidStatus,
                "Status 'paid' can only be set by confirming payment",
            ));
        }
        self.update(id, |order, _| {
            ensure_not_terminal(order)?;
            if status == OrderStatus::Cancelled {
                order.paid_by = None;
                order.paid_at = None;
            }
            order.status = status;
            Ok(())
        })
    }

    async fn adjust_eta(&self, id: OrderId, delta_minutes: i64) -> AppResult<Order> {
        self.update(id, |order, _| {
            ensure_not_terminal(order)?;
            order.estimated_ready_at = Some(order.shifted_ready_at(delta_minutes));
            Ok(())
        })
    }

    async fn cancel(&self, id: OrderId) -> AppResult<Order> {
        self.mutate_status(id, OrderStatus::Cancelled).await
    }

    async fn fetch_kitchen_relevant(&self) -> AppResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| entry.status.is_kitchen_relevant())
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }
}
