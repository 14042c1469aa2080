//! 应用层错误定义

use thiserror::Error;

use crate::application::ports::{InferenceError, MediaError, StorageError};
use crate::domain::PromptError;

/// 应用层错误
///
/// 推理错误在各自的生成阶段内被捕获，只有创建推理客户端失败时才会走到这里
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 推理客户端错误
    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    /// 媒体工具错误（致命）
    #[error("Media tool error: {0}")]
    Media(#[from] MediaError),

    /// 存储错误
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<PromptError> for ApplicationError {
    fn from(err: PromptError) -> Self {
        Self::ValidationError(err.to_string())
    }
}
