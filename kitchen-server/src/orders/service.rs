//! LiveOrderService - 订单写入 + 事件发布
//!
//! 每个写操作先提交到 [`OrderStore`]，成功后构造恰好一个事件并发布。
//! 写入失败时不发布；发布失败只记录日志，不回滚也不影响请求结果。

use std::sync::Arc;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::order::{NewOrder, Order, OrderId, OrderStatus, PaymentMethod};
use shared::LiveOrderEvent;

use super::store::OrderStore;
use crate::live::LiveOrderRegistry;

/// Largest ETA adjustment accepted in one request (minutes)
pub const MAX_ETA_DELTA_MINUTES: i64 = 240;

/// 订单服务
#[derive(Clone, Debug)]
pub struct LiveOrderService {
    store: Arc<dyn OrderStore>,
    live: LiveOrderRegistry,
}

impl LiveOrderService {
    pub fn new(store: Arc<dyn OrderStore>, live: LiveOrderRegistry) -> Self {
        Self { store, live }
    }

    pub fn store(&self) -> &Arc<dyn OrderStore> {
        &self.store
    }

    /// 发布事件，失败只记录日志
    fn announce(&self, event: LiveOrderEvent) {
        let kind = event.kind();
        let order_id = event.order_id();
        if let Err(e) = self.live.publish(event) {
            tracing::error!(event = kind, order_id = ?order_id, error = %e, "Failed to publish live order event");
        }
    }

    /// 新订单 → `order_created`
    pub async fn create(&self, input: NewOrder) -> AppResult<Order> {
        let order = self.store.create(input).await?;
        self.announce(LiveOrderEvent::OrderCreated {
            order: order.clone(),
        });
        Ok(order)
    }

    pub async fn fetch(&self, id: OrderId) -> AppResult<Order> {
        self.store.fetch(id).await
    }

    /// 付款确认 → `order_paid`
    pub async fn mark_paid(&self, id: OrderId, method: PaymentMethod) -> AppResult<Order> {
        let order = self.store.mark_paid(id, method).await?;
        tracing::info!(order_id = id, method = %method, "Order paid");
        self.announce(LiveOrderEvent::OrderPaid {
            order: order.clone(),
        });
        Ok(order)
    }

    /// 修改付款方式 → `order_updated`
    pub async fn set_payment_method(&self, id: OrderId, method: PaymentMethod) -> AppResult<Order> {
        let order = self.store.set_payment_method(id, method).await?;
        self.announce(LiveOrderEvent::OrderUpdated {
            order: order.clone(),
        });
        Ok(order)
    }

    /// 状态迁移 (含拒单) → `order_updated`
    pub async fn mutate_status(&self, id: OrderId, status: OrderStatus) -> AppResult<Order> {
        let order = self.store.mutate_status(id, status).await?;
        tracing::info!(order_id = id, status = %status, "Order status changed");
        self.announce(LiveOrderEvent::OrderUpdated {
            order: order.clone(),
        });
        Ok(order)
    }

    /// ETA 调整 → `order_eta_updated`
    pub async fn adjust_eta(&self, id: OrderId, delta_minutes: i64) -> AppResult<Order> {
        if delta_minutes == 0 || delta_minutes.abs() > MAX_ETA_DELTA_MINUTES {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!(
                    "delta_minutes must be non-zero and within ±{}",
                    MAX_ETA_DELTA_MINUTES
                ),
            )
            .with_detail("delta_minutes", delta_minutes));
        }

        let order = self.store.adjust_eta(id, delta_minutes).await?;
        let estimated_ready_at = order.effective_ready_at();
        tracing::info!(order_id = id, delta_minutes, estimated_ready_at, "Order ETA adjusted");
        self.announce(LiveOrderEvent::OrderEtaUpdated {
            order_id: order.id,
            estimated_ready_at,
        });
        Ok(order)
    }

    /// 取消 → `order_cancelled`
    pub async fn cancel(&self, id: OrderId) -> AppResult<Order> {
        let order = self.store.cancel(id).await?;
        tracing::info!(order_id = id, "Order cancelled");
        self.announce(LiveOrderEvent::cancelled(order.id));
        Ok(order)
    }

    pub async fn kitchen_orders(&self) -> AppResult<Vec<Order>> {
        self.store.fetch_kitchen_relevant().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::Frame;
    use crate::orders::MemoryOrderStore;
    use async_trait::async_trait;
    use shared::LiveOrderMessage;
    use shared::order::{DeliveryType, LineItem};
    use tokio::sync::mpsc;

    /// Store whose every write fails
    #[derive(Debug)]
    struct FailingStore;

    #[async_trait]
    impl OrderStore for FailingStore {
        async fn create(&self, _: NewOrder) -> AppResult<Order> {
            Err(AppError::internal("write failed"))
        }
        async fn fetch(&self, id: OrderId) -> AppResult<Order> {
            Err(AppError::order_not_found(id))
        }
        async fn mark_paid(&self, _: OrderId, _: PaymentMethod) -> AppResult<Order> {
            Err(AppError::internal("write failed"))
        }
        async fn set_payment_method(&self, _: OrderId, _: PaymentMethod) -> AppResult<Order> {
            Err(AppError::internal("write failed"))
        }
        async fn mutate_status(&self, _: OrderId, _: OrderStatus) -> AppResult<Order> {
            Err(AppError::internal("write failed"))
        }
        async fn adjust_eta(&self, _: OrderId, _: i64) -> AppResult<Order> {
            Err(AppError::internal("write failed"))
        }
        async fn cancel(&self, _: OrderId) -> AppResult<Order> {
            Err(AppError::internal("write failed"))
        }
        async fn fetch_kitchen_relevant(&self) -> AppResult<Vec<Order>> {
            Ok(Vec::new())
        }
    }

    fn new_order() -> NewOrder {
        NewOrder {
            items: vec![LineItem::new("Burger", 2, 6.5)],
            customer: None,
            notes: None,
            delivery_type: DeliveryType::Pickup,
            payment_method: None,
            estimated_prep_minutes: None,
        }
    }

    fn service_with(store: Arc<dyn OrderStore>) -> (LiveOrderService, mpsc::UnboundedReceiver<Frame>) {
        let live = LiveOrderRegistry::new();
        let (tx, rx) = mpsc::unbounded_channel();
        live.subscribe(tx);
        (LiveOrderService::new(store, live), rx)
    }

    fn next_event(rx: &mut mpsc::UnboundedReceiver<Frame>) -> LiveOrderEvent {
        let frame = rx.try_recv().expect("an event should have been published");
        serde_json::from_str::<LiveOrderMessage>(&frame).unwrap().event
    }

    #[tokio::test]
    async fn failed_writes_publish_nothing() {
        let (service, mut rx) = service_with(Arc::new(FailingStore));

        assert!(service.create(new_order()).await.is_err());
        assert!(service.mark_paid(1, PaymentMethod::Card).await.is_err());
        assert!(service.set_payment_method(1, PaymentMethod::Cash).await.is_err());
        assert!(service.mutate_status(1, OrderStatus::Preparing).await.is_err());
        assert!(service.adjust_eta(1, 5).await.is_err());
        assert!(service.cancel(1).await.is_err());

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn rejected_eta_delta_publishes_nothing() {
        let (service, mut rx) = service_with(Arc::new(MemoryOrderStore::new()));
        let order = service.create(new_order()).await.unwrap();
        let _ = next_event(&mut rx);

        for delta in [0, 241, -241] {
            let err = service.adjust_eta(order.id, delta).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn each_mutation_publishes_exactly_one_matching_event() {
        let (service, mut rx) = service_with(Arc::new(MemoryOrderStore::new()));

        let order = service.create(new_order()).await.unwrap();
        assert!(matches!(next_event(&mut rx), LiveOrderEvent::OrderCreated { order: o } if o.id == order.id));

        service.mark_paid(order.id, PaymentMethod::Card).await.unwrap();
        assert!(matches!(next_event(&mut rx), LiveOrderEvent::OrderPaid { order: o } if o.status == OrderStatus::Paid));

        service.mutate_status(order.id, OrderStatus::Preparing).await.unwrap();
        assert!(matches!(next_event(&mut rx), LiveOrderEvent::OrderUpdated { order: o } if o.status == OrderStatus::Preparing));

        let adjusted = service.adjust_eta(order.id, 10).await.unwrap();
        match next_event(&mut rx) {
            LiveOrderEvent::OrderEtaUpdated {
                order_id,
                estimated_ready_at,
            } => {
                assert_eq!(order_id, order.id);
                assert_eq!(Some(estimated_ready_at), adjusted.estimated_ready_at);
            }
            other => panic!("unexpected event {other:?}"),
        }

        service.cancel(order.id).await.unwrap();
        assert_eq!(next_event(&mut rx), LiveOrderEvent::cancelled(order.id));

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn reject_publishes_updated_snapshot() {
        let (service, mut rx) = service_with(Arc::new(MemoryOrderStore::new()));
        let order = service.create(new_order()).await.unwrap();
        let _ = next_event(&mut rx);

        let rejected = service
            .mutate_status(order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(rejected.status, OrderStatus::Cancelled);
        assert_eq!(
            next_event(&mut rx),
            LiveOrderEvent::OrderUpdated { order: rejected }
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn mutation_succeeds_with_no_subscribers() {
        let service = LiveOrderService::new(
            Arc::new(MemoryOrderStore::new()),
            LiveOrderRegistry::new(),
        );
        let order = service.create(new_order()).await.unwrap();
        assert_eq!(service.kitchen_orders().await.unwrap(), vec![order]);
    }
}
