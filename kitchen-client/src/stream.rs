//! LiveOrderStream - 实时订单事件流消费者
//!
//! 读取 `GET /api/live-orders` 的 `text/event-stream` 响应体，解析出
//! [`LiveOrderMessage`] 并转发给调用方。连接断开后按指数退避重连，
//! 每次重连都会收到新的 `connected` 事件，由调用方据此重新拉取全量列表。

use std::time::Duration;

use futures::StreamExt;
use shared::{LiveOrderEvent, LiveOrderMessage};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{ClientConfig, ClientResult, HttpClient};

/// SSE 响应体解码器
///
/// 按块喂入字节，返回已完整的 `data` 负载。多行 `data:` 用 `\n` 连接；
/// 注释行 (`:`) 和 `event` / `id` / `retry` 字段被忽略。
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    data: Option<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut out = Vec::new();

        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);

            if line.is_empty() {
                if let Some(data) = self.data.take() {
                    out.push(data);
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line.as_ref(), ""),
            };
            if field == "data" {
                match self.data.as_mut() {
                    Some(data) => {
                        data.push('\n');
                        data.push_str(value);
                    }
                    None => self.data = Some(value.to_string()),
                }
            }
        }

        out
    }
}

/// 解析单个 `data` 负载；格式错误的消息被丢弃
pub fn decode_message(data: &str) -> Option<LiveOrderMessage> {
    match serde_json::from_str::<LiveOrderMessage>(data) {
        Ok(message) => Some(message),
        Err(e) => {
            tracing::warn!(error = %e, payload = data, "Dropping malformed live order message");
            None
        }
    }
}

/// 重连退避 (翻倍，封顶)
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

enum SessionEnd {
    /// 服务器关闭或网络中断，需要重连
    Disconnected,
    /// 接收方已关闭，停止
    ReceiverGone,
}

/// 带自动重连的事件流
#[derive(Debug, Clone)]
pub struct LiveOrderStream {
    http: HttpClient,
    backoff: Backoff,
}

impl LiveOrderStream {
    pub fn new(http: HttpClient, config: &ClientConfig) -> Self {
        Self {
            http,
            backoff: Backoff::new(config.reconnect_initial, config.reconnect_max),
        }
    }

    /// 持续转发事件，直到 token 被取消或接收方关闭
    pub async fn run(mut self, tx: mpsc::Sender<LiveOrderMessage>, token: CancellationToken) {
        loop {
            let end = tokio::select! {
                _ = token.cancelled() => return,
                end = self.session(&tx) => end,
            };

            match end {
                Ok(SessionEnd::ReceiverGone) => return,
                Ok(SessionEnd::Disconnected) => {
                    tracing::info!("Live order stream closed, reconnecting");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Live order stream failed");
                }
            }

            let delay = self.backoff.next_delay();
            tracing::debug!(delay_ms = delay.as_millis() as u64, "Waiting before reconnect");
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn session(&mut self, tx: &mpsc::Sender<LiveOrderMessage>) -> ClientResult<SessionEnd> {
        let response = self.http.open_live_stream().await?;
        let mut body = response.bytes_stream();
        let mut decoder = SseDecoder::new();

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            for data in decoder.push(&chunk) {
                let Some(message) = decode_message(&data) else {
                    continue;
                };
                if matches!(message.event, LiveOrderEvent::Connected) {
                    tracing::info!("Live order stream connected");
                    self.backoff.reset();
                }
                if tx.send(message).await.is_err() {
                    return Ok(SessionEnd::ReceiverGone);
                }
            }
        }

        Ok(SessionEnd::Disconnected)
    }
}
