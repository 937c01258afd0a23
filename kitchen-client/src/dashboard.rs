//! KitchenDashboard - 看板控制器
//!
//! 把 [`KitchenBoard`] (本地状态)、[`KitchenApi`] (服务器) 和
//! [`AlarmDriver`] (报警) 组合在一起：
//!
//! - 推送事件 -> 看板 -> 报警状态
//! - `connected` 事件 -> 重新拉取全量列表 (断线期间的事件不会补发)
//! - 操作员动作 -> 先确认、乐观更新，再发请求；失败时重新拉取
//!
//! 请求成功后不再把响应写回看板：响应可能晚于其他终端推送的新状态，
//! 服务器自己的 `order_updated` / `order_eta_updated` 事件负责收敛。

use std::sync::Arc;

use shared::order::{OrderId, OrderStatus};
use shared::{LiveOrderEvent, LiveOrderMessage, Order};
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

use crate::alarm::AlarmDriver;
use crate::board::{AlertState, AlertTransition, BoardOrder, KitchenBoard};
use crate::{ClientResult, KitchenApi};

pub struct KitchenDashboard {
    board: Mutex<KitchenBoard>,
    /// 串行化确认文件写入，保证后写入的快照更新
    ack_writes: Mutex<()>,
    api: Arc<dyn KitchenApi>,
    alarm: Option<AlarmDriver>,
}

impl std::fmt::Debug for KitchenDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KitchenDashboard")
            .field("alarm", &self.alarm)
            .finish_non_exhaustive()
    }
}

impl KitchenDashboard {
    pub fn new(board: KitchenBoard, api: Arc<dyn KitchenApi>) -> Self {
        Self {
            board: Mutex::new(board),
            ack_writes: Mutex::new(()),
            api,
            alarm: None,
        }
    }

    /// 挂接报警驱动
    pub fn with_alarm(mut self, alarm: AlarmDriver) -> Self {
        self.alarm = Some(alarm);
        self
    }

    fn drive(&self, transition: AlertTransition) {
        match transition {
            AlertTransition::Started => tracing::info!("Kitchen alarm started"),
            AlertTransition::Stopped => tracing::info!("Kitchen alarm stopped"),
            AlertTransition::Unchanged => {}
        }
        if let Some(alarm) = &self.alarm {
            alarm.apply(transition);
        }
    }

    /// 拉取全量列表替换本地状态
    pub async fn resync(&self) -> ClientResult<()> {
        let orders = self.api.kitchen_orders().await?;
        let count = orders.len();
        let transition = self.board.lock().await.load(orders);
        tracing::debug!(orders = count, "Kitchen board resynced");
        self.drive(transition);
        Ok(())
    }

    /// 处理一条推送消息
    pub async fn handle(&self, message: LiveOrderMessage) {
        if matches!(message.event, LiveOrderEvent::Connected) {
            if let Err(e) = self.resync().await {
                tracing::warn!(error = %e, "Resync after connect failed");
            }
            return;
        }

        let transition = self.board.lock().await.apply(&message.event);
        self.drive(transition);
    }

    /// 消费事件直到 token 取消或发送方关闭
    pub async fn run_live(&self, mut rx: mpsc::Receiver<LiveOrderMessage>, token: CancellationToken) {
        loop {
            let message = tokio::select! {
                _ = token.cancelled() => break,
                message = rx.recv() => message,
            };
            match message {
                Some(message) => self.handle(message).await,
                None => break,
            }
        }
        tracing::debug!("Kitchen dashboard live loop stopped");
    }

    // ========== Operator actions ==========

    /// 接单 (开始制作)
    pub async fn accept(&self, id: OrderId) -> ClientResult<Order> {
        self.transition(id, OrderStatus::Preparing).await
    }

    /// 制作完成
    pub async fn mark_prepared(&self, id: OrderId) -> ClientResult<Order> {
        self.transition(id, OrderStatus::Prepared).await
    }

    /// 已取餐 / 已送达
    pub async fn complete(&self, id: OrderId) -> ClientResult<Order> {
        self.transition(id, OrderStatus::Completed).await
    }

    /// 拒单
    pub async fn reject(&self, id: OrderId) -> ClientResult<Order> {
        self.transition(id, OrderStatus::Cancelled).await
    }

    async fn transition(&self, id: OrderId, status: OrderStatus) -> ClientResult<Order> {
        {
            let mut board = self.board.lock().await;
            let ack = board.record_ack(id, shared::now_millis());
            let optimistic = board.set_status(id, status);
            self.drive(ack);
            self.drive(optimistic);
        }
        self.persist_acks().await;

        match self.api.update_status(id, status).await {
            Ok(order) => Ok(order),
            Err(e) => {
                tracing::warn!(order_id = id, status = %status, error = %e, "Status update failed");
                self.recover().await;
                Err(e)
            }
        }
    }

    /// 调整预计完成时间 (分钟，可为负)
    pub async fn adjust_eta(&self, id: OrderId, delta_minutes: i64) -> ClientResult<Order> {
        {
            let mut board = self.board.lock().await;
            let shifted = board
                .get(id)
                .map(|entry| entry.order.shifted_ready_at(delta_minutes));
            if let Some(ready_at) = shifted {
                board.patch_eta(id, ready_at);
            }
        }

        match self.api.adjust_eta(id, delta_minutes).await {
            Ok(order) => Ok(order),
            Err(e) => {
                tracing::warn!(order_id = id, delta_minutes, error = %e, "ETA adjustment failed");
                self.recover().await;
                Err(e)
            }
        }
    }

    /// 在阻塞线程池中写入确认文件；失败只记录日志
    async fn persist_acks(&self) {
        let _writer = self.ack_writes.lock().await;
        let acks = self.board.lock().await.acks().clone();
        if acks.path().is_none() {
            return;
        }

        match tokio::task::spawn_blocking(move || acks.save()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Failed to persist acknowledgments"),
            Err(e) => tracing::warn!(error = %e, "Acknowledgment writer task failed"),
        }
    }

    async fn recover(&self) {
        if let Err(e) = self.resync().await {
            tracing::warn!(error = %e, "Resync after failed action failed");
        }
    }

    // ========== Queries ==========

    /// 当前看板订单 (最新在前)
    pub async fn snapshot(&self) -> Vec<BoardOrder> {
        self.board.lock().await.orders().to_vec()
    }

    pub async fn alert_state(&self) -> AlertState {
        self.board.lock().await.alert_state()
    }

    pub async fn pending_count(&self) -> usize {
        self.board.lock().await.pending_count()
    }

    /// 停止报警任务
    pub async fn shutdown(self) {
        if let Some(alarm) = self.alarm {
            alarm.shutdown().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ack::AckStore;
    use crate::ClientError;
    use async_trait::async_trait;
    use shared::order::LineItem;
    use shared::{AppError, ErrorCode};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn order(id: OrderId, status: OrderStatus) -> Order {
        Order {
            id,
            status,
            created_at: id * 1_000,
            updated_at: id * 1_000,
            estimated_ready_at: None,
            estimated_prep_minutes: None,
            total: 6.5,
            items: vec![LineItem::new("Burger", 1, 6.5)],
            payment_method: None,
            paid_by: None,
            paid_at: None,
            customer: None,
            notes: None,
            delivery_type: Default::default(),
        }
    }

    #[derive(Default)]
    struct MockApi {
        list: std::sync::Mutex<Vec<Order>>,
        fail_updates: bool,
        list_calls: AtomicUsize,
    }

    #[async_trait]
    impl KitchenApi for MockApi {
        async fn kitchen_orders(&self) -> ClientResult<Vec<Order>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.list.lock().unwrap().clone())
        }

        async fn update_status(&self, id: OrderId, status: OrderStatus) -> ClientResult<Order> {
            if self.fail_updates {
                return Err(ClientError::Api(AppError::new(ErrorCode::OrderInvalidStatus)));
            }
            Ok(order(id, status))
        }

        async fn adjust_eta(&self, id: OrderId, delta_minutes: i64) -> ClientResult<Order> {
            let mut o = order(id, OrderStatus::Preparing);
            o.estimated_ready_at = Some(o.shifted_ready_at(delta_minutes));
            Ok(o)
        }
    }

    fn dashboard(api: Arc<MockApi>) -> KitchenDashboard {
        KitchenDashboard::new(KitchenBoard::new(AckStore::in_memory(48)), api)
    }

    fn created(order: Order) -> LiveOrderMessage {
        LiveOrderMessage::new(LiveOrderEvent::OrderCreated { order }, 0)
    }

    #[tokio::test]
    async fn connected_triggers_full_resync() {
        let api = Arc::new(MockApi::default());
        *api.list.lock().unwrap() = vec![order(1, OrderStatus::New), order(2, OrderStatus::Paid)];
        let dash = dashboard(api.clone());

        dash.handle(LiveOrderMessage::new(LiveOrderEvent::Connected, 0))
            .await;

        assert_eq!(api.list_calls.load(Ordering::SeqCst), 1);
        let ids: Vec<_> = dash.snapshot().await.iter().map(|o| o.id()).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(dash.alert_state().await, AlertState::Alarming);
    }

    #[tokio::test]
    async fn accept_acknowledges_and_silences() {
        let api = Arc::new(MockApi::default());
        let dash = dashboard(api);

        dash.handle(created(order(1, OrderStatus::New))).await;
        assert_eq!(dash.alert_state().await, AlertState::Alarming);

        let updated = dash.accept(1).await.unwrap();
        assert_eq!(updated.status, OrderStatus::Preparing);

        let board = dash.snapshot().await;
        assert_eq!(board[0].order.status, OrderStatus::Preparing);
        assert!(board[0].acknowledged);
        assert_eq!(dash.alert_state().await, AlertState::Silent);
    }

    #[tokio::test]
    async fn complete_removes_order() {
        let dash = dashboard(Arc::new(MockApi::default()));
        dash.handle(created(order(1, OrderStatus::Prepared))).await;

        dash.complete(1).await.unwrap();
        assert!(dash.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn failed_action_resyncs_from_server() {
        let api = Arc::new(MockApi {
            fail_updates: true,
            ..Default::default()
        });
        *api.list.lock().unwrap() = vec![order(1, OrderStatus::New)];
        let dash = dashboard(api.clone());
        dash.handle(created(order(1, OrderStatus::New))).await;

        let err = dash.reject(1).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::OrderInvalidStatus));

        // Optimistic removal was rolled back by the resync
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 1);
        let board = dash.snapshot().await;
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].order.status, OrderStatus::New);
        // The acknowledgment stays
        assert!(board[0].acknowledged);
        assert_eq!(dash.alert_state().await, AlertState::Silent);
    }

    #[tokio::test]
    async fn adjust_eta_patches_ready_time() {
        let dash = dashboard(Arc::new(MockApi::default()));
        dash.handle(created(order(3, OrderStatus::Preparing))).await;

        let updated = dash.adjust_eta(3, 10).await.unwrap();
        let board = dash.snapshot().await;
        assert_eq!(board[0].order.estimated_ready_at, updated.estimated_ready_at);
        assert_eq!(board[0].order.status, OrderStatus::Preparing);
    }

    /// Holds `update_status` open until released
    #[derive(Default)]
    struct SlowApi {
        entered: tokio::sync::Notify,
        release: tokio::sync::Notify,
    }

    #[async_trait]
    impl KitchenApi for SlowApi {
        async fn kitchen_orders(&self) -> ClientResult<Vec<Order>> {
            Ok(Vec::new())
        }

        async fn update_status(&self, id: OrderId, status: OrderStatus) -> ClientResult<Order> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(order(id, status))
        }

        async fn adjust_eta(&self, id: OrderId, _: i64) -> ClientResult<Order> {
            Ok(order(id, OrderStatus::Preparing))
        }
    }

    #[tokio::test]
    async fn late_response_does_not_resurrect_completed_order() {
        let api = Arc::new(SlowApi::default());
        let dash = Arc::new(KitchenDashboard::new(
            KitchenBoard::new(AckStore::in_memory(48)),
            api.clone(),
        ));
        dash.handle(created(order(1, OrderStatus::New))).await;

        let accepting = tokio::spawn({
            let dash = dash.clone();
            async move { dash.accept(1).await }
        });
        api.entered.notified().await;

        // Another station completes the order while the accept is in flight
        dash.handle(LiveOrderMessage::new(
            LiveOrderEvent::OrderUpdated {
                order: order(1, OrderStatus::Completed),
            },
            0,
        ))
        .await;
        assert!(dash.snapshot().await.is_empty());

        api.release.notify_one();
        let accepted = accepting.await.unwrap().unwrap();
        assert_eq!(accepted.status, OrderStatus::Preparing);
        assert!(dash.snapshot().await.is_empty());
        assert_eq!(dash.alert_state().await, AlertState::Silent);
    }

    #[tokio::test]
    async fn operator_action_persists_acknowledgment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acks.json");
        let acks = AckStore::load(&path, 48, shared::now_millis()).unwrap();
        let dash = KitchenDashboard::new(KitchenBoard::new(acks), Arc::new(MockApi::default()));
        dash.handle(created(order(7, OrderStatus::Paid))).await;

        dash.accept(7).await.unwrap();

        let reloaded = AckStore::load(&path, 48, shared::now_millis()).unwrap();
        assert!(reloaded.is_acknowledged(7));
    }

    #[tokio::test]
    async fn run_live_stops_when_sender_drops() {
        let dash = dashboard(Arc::new(MockApi::default()));
        let (tx, rx) = mpsc::channel(8);
        tx.send(created(order(1, OrderStatus::New))).await.unwrap();
        drop(tx);

        dash.run_live(rx, CancellationToken::new()).await;
        assert_eq!(dash.snapshot().await.len(), 1);
    }
}
