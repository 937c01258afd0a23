//! AlarmDriver - 报警声音调度
//!
//! 进入 Alarming 时立即播放一次，之后每隔 `interval` 重复，直到 Stopped。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::board::AlertTransition;

/// 报警声音输出
pub trait Chime: Send + Sync + 'static {
    fn play(&self);
}

/// 只写日志的提示音 (无音频设备时使用)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogChime;

impl Chime for LogChime {
    fn play(&self) {
        tracing::info!("🔔 New kitchen order waiting for acceptance");
    }
}

/// 报警驱动任务
///
/// 被 drop 时 watch 通道关闭，后台任务随之退出。
#[derive(Debug)]
pub struct AlarmDriver {
    alarming: watch::Sender<bool>,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl AlarmDriver {
    pub fn spawn(chime: Arc<dyn Chime>, interval: Duration) -> Self {
        let (alarming, rx) = watch::channel(false);
        let token = CancellationToken::new();
        let task = tokio::spawn(run(chime, interval, rx, token.clone()));
        Self {
            alarming,
            token,
            task,
        }
    }

    /// 根据看板返回的状态变化启动或停止报警
    pub fn apply(&self, transition: AlertTransition) {
        match transition {
            AlertTransition::Started => {
                self.alarming.send_replace(true);
            }
            AlertTransition::Stopped => {
                self.alarming.send_replace(false);
            }
            AlertTransition::Unchanged => {}
        }
    }

    pub fn is_alarming(&self) -> bool {
        *self.alarming.borrow()
    }

    /// 停止任务
    pub async fn shutdown(self) {
        self.token.cancel();
        let _ = self.task.await;
    }
}

async fn run(
    chime: Arc<dyn Chime>,
    interval: Duration,
    mut alarming: watch::Receiver<bool>,
    token: CancellationToken,
) {
    loop {
        // Silent: wait until alarming
        loop {
            let on = *alarming.borrow_and_update();
            if on {
                break;
            }
            tokio::select! {
                _ = token.cancelled() => return,
                changed = alarming.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }

        chime.play();
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Alarming: repeat until silenced
        loop {
            tokio::select! {
                _ = token.cancelled() => return,
                changed = alarming.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    if !*alarming.borrow_and_update() {
                        break;
                    }
                }
                _ = ticker.tick() => chime.play(),
            }
        }
    }
}
