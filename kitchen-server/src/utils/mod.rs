//! 工具模块 - 日志和统一响应

pub mod logger;

use shared::{ApiResponse, Json};

// Re-export error types from shared
pub use shared::error::{AppError, AppResult, ErrorCategory, ErrorCode};

/// 成功响应 `{"code":0,"message":"OK","data":...}`
pub fn ok<T>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}
