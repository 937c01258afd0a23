/// 服务器配置 - 厨房实时订单服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (启动时会先加载 `.env`)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 (RUST_LOG 优先) |
/// | LOG_JSON | false | 是否输出 JSON 日志 |
/// | LOG_DIR | - | 日志目录 (按天滚动) |
/// | SUBSCRIBER_BUFFER | 64 | 每个看板连接的待发送帧上限 |
/// | SSE_KEEP_ALIVE_SECS | 15 | SSE 心跳间隔(秒) |
/// | FRONTEND_URL | - | CORS 允许的来源 (未设置时放行所有来源) |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | 关闭超时时间(毫秒) |
///
/// # 示例
///
/// ```ignore
/// HTTP_PORT=8080 LOG_LEVEL=debug cargo run -p kitchen-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 日志级别
    pub log_level: String,
    /// 是否输出 JSON 格式日志
    pub log_json: bool,
    /// 日志目录 (未设置时只输出到 stdout)
    pub log_dir: Option<String>,
    /// 每个订阅者的缓冲帧数，写满的订阅者会被移除
    pub subscriber_buffer: usize,
    /// SSE keep-alive 注释间隔 (秒)
    pub sse_keep_alive_secs: u64,
    /// 前端地址 (CORS)
    pub frontend_url: Option<String>,
    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        Self {
            http_port: env_parse("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_parse("LOG_JSON", false),
            log_dir: env_opt("LOG_DIR"),
            subscriber_buffer: env_parse("SUBSCRIBER_BUFFER", 64usize).max(1),
            sse_keep_alive_secs: env_parse("SSE_KEEP_ALIVE_SECS", 15u64).max(1),
            frontend_url: env_opt("FRONTEND_URL"),
            shutdown_timeout_ms: env_parse("SHUTDOWN_TIMEOUT_MS", 10000),
        }
    }

    /// 使用自定义端口覆盖配置
    ///
    /// 常用于测试场景 (端口 0 由系统分配)
    pub fn with_overrides(http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
