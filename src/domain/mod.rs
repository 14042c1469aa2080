//! Domain Layer - 领域层
//!
//! 本项目没有持久化的数据模型，只有贯穿流水线的几个值对象:
//! - Credential: 推理服务的访问令牌（带占位符校验）
//! - Prompt: 描述期望音频内容的文本

pub mod credential;
pub mod prompt;

pub use credential::{Credential, CredentialError, CREDENTIAL_PLACEHOLDER};
pub use prompt::{Prompt, PromptError};
