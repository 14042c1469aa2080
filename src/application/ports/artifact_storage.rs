//! Artifact Storage Port - 出站端口
//!
//! 生成物（音频、视频）落盘与存在性检查

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(String),
}

/// Artifact Storage Port
#[async_trait]
pub trait ArtifactStoragePort: Send + Sync {
    /// 将相对路径解析到存储根目录下
    fn resolve(&self, path: &Path) -> PathBuf;

    /// 写入字节，返回实际路径
    async fn save(&self, path: &Path, data: &[u8]) -> Result<PathBuf, StorageError>;

    /// 文件是否存在
    async fn exists(&self, path: &Path) -> bool;
}
