use std::sync::Arc;

use crate::core::Config;
use crate::live::LiveOrderRegistry;
use crate::orders::{LiveOrderService, MemoryOrderStore, OrderStore};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 在启动时构造一次，通过 axum State 传递给每个路由处理器。
/// 所有字段都是 Arc 句柄，Clone 成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | live | LiveOrderRegistry | 看板订阅者注册表 |
/// | orders | LiveOrderService | 订单写入 + 事件发布 |
/// | started_at | i64 | 启动时间 (Unix millis) |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 实时订单订阅者注册表
    pub live: LiveOrderRegistry,
    /// 订单服务 (提交后发布事件)
    pub orders: LiveOrderService,
    /// 启动时间
    pub started_at: i64,
}

impl ServerState {
    /// 使用内存订单存储初始化服务器状态
    pub fn initialize(config: &Config) -> Self {
        Self::with_store(config, Arc::new(MemoryOrderStore::new()))
    }

    /// 使用指定的订单存储初始化 (测试或外部存储)
    pub fn with_store(config: &Config, store: Arc<dyn OrderStore>) -> Self {
        let live = LiveOrderRegistry::new();
        let orders = LiveOrderService::new(store, live.clone());
        tracing::debug!(
            subscriber_buffer = config.subscriber_buffer,
            "Server state initialized"
        );
        Self {
            config: config.clone(),
            live,
            orders,
            started_at: shared::now_millis(),
        }
    }

    /// 运行时间 (秒)
    pub fn uptime_seconds(&self) -> u64 {
        let elapsed = shared::now_millis() - self.started_at;
        u64::try_from(elapsed / 1000).unwrap_or(0)
    }
}
