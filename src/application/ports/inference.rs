//! Inference Engine Port - 远程推理服务抽象
//!
//! 定义音乐生成与语音合成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Credential, Prompt};

/// 推理错误
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Response status code does not indicate success: {status} {body}")]
    Status { status: u16, body: String },

    #[error("Empty response from {0}")]
    EmptyResponse(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl InferenceError {
    /// 非成功状态码（如果有）
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// 推理任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceKind {
    Music,
    Voiceover,
}

impl std::fmt::Display for InferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceKind::Music => write!(f, "music"),
            InferenceKind::Voiceover => write!(f, "voiceover"),
        }
    }
}

/// Inference Engine Port
///
/// 两个操作结构相同：提交提示文本，返回原始音频字节
#[async_trait]
pub trait InferenceEnginePort: Send + Sync {
    /// 生成音乐（MP3）
    async fn generate_music(&self, prompt: &Prompt) -> Result<Vec<u8>, InferenceError>;

    /// 生成旁白（WAV）
    async fn generate_voiceover(&self, prompt: &Prompt) -> Result<Vec<u8>, InferenceError>;

    /// 按类型分派
    async fn generate(
        &self,
        kind: InferenceKind,
        prompt: &Prompt,
    ) -> Result<Vec<u8>, InferenceError> {
        match kind {
            InferenceKind::Music => self.generate_music(prompt).await,
            InferenceKind::Voiceover => self.generate_voiceover(prompt).await,
        }
    }
}

/// 为一次运行创建推理引擎
///
/// 引擎在运行期间由编排器持有，运行结束时释放
pub trait InferenceEngineFactory: Send + Sync {
    fn connect(
        &self,
        credential: &Credential,
    ) -> Result<Box<dyn InferenceEnginePort>, InferenceError>;
}
