//! Kitchen Server - 厨房看板实时订单服务
//!
//! # 架构概述
//!
//! - **实时推送** (`live`): 订阅者注册表 + SSE 事件流
//! - **订单** (`orders`): 存储接口、内存实现、提交后发布事件
//! - **HTTP API** (`api`): 订单写入接口、看板列表、健康检查
//!
//! # 模块结构
//!
//! ```text
//! kitchen-server/src/
//! ├── core/          # 配置、状态、路由、服务器
//! ├── live/          # 订阅者注册表、SSE 流
//! ├── orders/        # OrderStore、LiveOrderService
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志、响应工具
//! ```

pub mod api;
pub mod core;
pub mod live;
pub mod orders;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState, build_app};
pub use live::LiveOrderRegistry;
pub use orders::{LiveOrderService, MemoryOrderStore, OrderStore};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
    __ __ _ __       __
   / //_/(_) /______/ /_  ___  ____
  / ,<  / / __/ ___/ __ \/ _ \/ __ \
 / /| |/ / /_/ /__/ / / /  __/ / / /
/_/ |_/_/\__/\___/_/ /_/\___/_/ /_/
    "#
    );
}
