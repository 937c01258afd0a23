//! 实时订单推送 - 看板订阅者注册表和 SSE 流
//!
//! ```text
//! LiveOrderService (提交成功后)
//!       │ publish(LiveOrderEvent)
//!       ▼
//! LiveOrderRegistry ── 序列化一次 ──▶ Frame (Arc<str>)
//!   └── subscribers: id → Subscriber { sink, token }
//!         │ try_deliver (非阻塞)
//!         ▼
//!   mpsc::Sender<Frame> ──▶ subscriber_stream ──▶ SSE `data: <json>\n\n`
//! ```
//!
//! 投递失败 (连接关闭或缓冲写满) 的订阅者在同一次 publish 中被移除。

mod registry;
mod sink;
mod stream;

pub use registry::{
    LiveOrderRegistry, PublishError, SubscriberHandle, SubscriberId, SubscriptionGuard,
};
pub use sink::{EventSink, Frame, SinkError};
pub use stream::subscriber_stream;
