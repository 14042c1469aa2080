//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod artifact_storage;
mod inference;
mod media_tool;

pub use artifact_storage::{ArtifactStoragePort, StorageError};
pub use inference::{InferenceEngineFactory, InferenceEnginePort, InferenceError, InferenceKind};
pub use media_tool::{MediaError, MediaInfo, MediaToolPort, StreamInfo, StreamKind};
