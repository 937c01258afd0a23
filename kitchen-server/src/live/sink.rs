//! Subscriber sinks

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

/// 序列化后的事件 JSON，所有订阅者共享同一份
pub type Frame = Arc<str>;

/// 投递失败原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SinkError {
    /// 连接已关闭
    #[error("subscriber closed")]
    Closed,
    /// 订阅者消费过慢，缓冲已满
    #[error("subscriber buffer full")]
    Full,
}

/// 订阅者输出端
///
/// `try_deliver` 不得阻塞：注册表在持锁状态下逐个投递。
pub trait EventSink: Send + Sync + 'static {
    fn try_deliver(&self, frame: &Frame) -> Result<(), SinkError>;
}

impl EventSink for mpsc::Sender<Frame> {
    fn try_deliver(&self, frame: &Frame) -> Result<(), SinkError> {
        self.try_send(Arc::clone(frame)).map_err(|e| match e {
            mpsc::error::TrySendError::Closed(_) => SinkError::Closed,
            mpsc::error::TrySendError::Full(_) => SinkError::Full,
        })
    }
}

impl EventSink for mpsc::UnboundedSender<Frame> {
    fn try_deliver(&self, frame: &Frame) -> Result<(), SinkError> {
        self.send(Arc::clone(frame)).map_err(|_| SinkError::Closed)
    }
}
