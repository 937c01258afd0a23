//! LiveOrderRegistry - 看板订阅者注册表
//!
//! 进程内唯一的共享可变状态。subscribe / unsubscribe / publish 共用一把
//! `parking_lot::Mutex`，投递本身是非阻塞的 (`try_deliver`)，持锁时间只取决于
//! 订阅者数量。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use shared::{LiveOrderEvent, LiveOrderMessage};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::sink::{EventSink, Frame, SinkError};

/// 订阅者 ID (进程内单调递增)
pub type SubscriberId = u64;

/// 发布失败 - 只有事件本身无法序列化时才会出现
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to serialize live order event: {0}")]
    Serialize(#[from] serde_json::Error),
}

struct Subscriber {
    sink: Box<dyn EventSink>,
    token: CancellationToken,
}

struct Inner {
    subscribers: Mutex<HashMap<SubscriberId, Subscriber>>,
    next_id: AtomicU64,
    /// 所有订阅者 token 的父 token
    shutdown_token: CancellationToken,
}

/// 订阅者句柄
///
/// `token` 在订阅者被移除 (主动退订、投递失败、服务器关闭) 时取消，
/// 传输层据此结束对应的流。
#[derive(Debug, Clone)]
pub struct SubscriberHandle {
    id: SubscriberId,
    token: CancellationToken,
}

impl SubscriberHandle {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_removed(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// 实时订单订阅者注册表
///
/// Clone 共享同一个注册表。在 `ServerState::initialize` 中构造一次。
#[derive(Clone)]
pub struct LiveOrderRegistry {
    inner: Arc<Inner>,
}

impl fmt::Debug for LiveOrderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveOrderRegistry")
            .field("subscribers", &self.subscriber_count())
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}

impl Default for LiveOrderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveOrderRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                subscribers: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                shutdown_token: CancellationToken::new(),
            }),
        }
    }

    /// 注册一个订阅者
    ///
    /// 不发送任何事件；`connected` 确认由流端点在注册前写入 sink。
    /// 关闭后注册的句柄立即处于已取消状态。
    pub fn subscribe<S: EventSink>(&self, sink: S) -> SubscriberHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let token = self.inner.shutdown_token.child_token();
        let handle = SubscriberHandle {
            id,
            token: token.clone(),
        };

        if self.is_shutdown() {
            tracing::debug!(subscriber_id = id, "Registry shut down, subscriber rejected");
            return handle;
        }

        let count = {
            let mut subscribers = self.inner.subscribers.lock();
            subscribers.insert(
                id,
                Subscriber {
                    sink: Box::new(sink),
                    token,
                },
            );
            subscribers.len()
        };

        tracing::info!(subscriber_id = id, subscribers = count, "Live order subscriber connected");
        handle
    }

    /// 移除订阅者 (幂等)
    ///
    /// 返回是否确实移除了一个订阅者。
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let (removed, count) = {
            let mut subscribers = self.inner.subscribers.lock();
            (subscribers.remove(&id), subscribers.len())
        };

        match removed {
            Some(subscriber) => {
                subscriber.token.cancel();
                tracing::info!(subscriber_id = id, subscribers = count, "Live order subscriber disconnected");
                true
            }
            None => false,
        }
    }

    /// 发布事件，返回成功投递的订阅者数量
    pub fn publish(&self, event: LiveOrderEvent) -> Result<usize, PublishError> {
        self.publish_message(&LiveOrderMessage::now(event))
    }

    /// 发布已带时间戳的事件
    ///
    /// 事件只序列化一次，所有订阅者收到同一份字节。投递失败的订阅者在
    /// 本次调用内被移除，不重试也不向调用方报告。
    pub fn publish_message(&self, message: &LiveOrderMessage) -> Result<usize, PublishError> {
        let frame: Frame = Arc::from(message.to_json()?);

        let (delivered, dropped) = {
            let mut subscribers = self.inner.subscribers.lock();
            let mut delivered = 0usize;
            let mut dropped: Vec<(SubscriberId, SinkError)> = Vec::new();

            for (id, subscriber) in subscribers.iter() {
                match subscriber.sink.try_deliver(&frame) {
                    Ok(()) => delivered += 1,
                    Err(reason) => dropped.push((*id, reason)),
                }
            }

            for (id, _) in &dropped {
                if let Some(subscriber) = subscribers.remove(id) {
                    subscriber.token.cancel();
                }
            }

            (delivered, dropped)
        };

        for (id, reason) in &dropped {
            match reason {
                SinkError::Closed => {
                    tracing::debug!(subscriber_id = id, "Removed closed live order subscriber")
                }
                SinkError::Full => {
                    tracing::warn!(subscriber_id = id, "Removed lagging live order subscriber")
                }
            }
        }

        tracing::debug!(
            event = message.event.kind(),
            order_id = ?message.event.order_id(),
            delivered,
            dropped = dropped.len(),
            "Live order event published"
        );

        Ok(delivered)
    }

    /// 当前订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }

    pub fn is_registered(&self, id: SubscriberId) -> bool {
        self.inner.subscribers.lock().contains_key(&id)
    }

    /// 关闭注册表：取消所有订阅者并拒绝新的订阅
    pub fn shutdown(&self) {
        self.inner.shutdown_token.cancel();
        let closed = {
            let mut subscribers = self.inner.subscribers.lock();
            let closed = subscribers.len();
            subscribers.clear();
            closed
        };
        tracing::info!(closed, "Live order registry shut down");
    }

    pub fn is_shutdown(&self) -> bool {
        self.inner.shutdown_token.is_cancelled()
    }
}

/// 退订守卫 - 被 drop 时移除订阅者
///
/// 由响应流持有：客户端断开、写入中途失败或服务器关闭时，流被 drop，
/// 订阅者随之移除。
#[derive(Debug)]
pub struct SubscriptionGuard {
    registry: LiveOrderRegistry,
    id: SubscriberId,
}

impl SubscriptionGuard {
    pub fn new(registry: LiveOrderRegistry, id: SubscriberId) -> Self {
        Self { registry, id }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.registry.unsubscribe(self.id);
    }
}
