//! File Storage - 文件系统生成物存储实现
//!
//! 实现 ArtifactStoragePort trait

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{ArtifactStoragePort, StorageError};

/// 文件系统存储
///
/// 相对路径相对于 base_dir 解析，绝对路径原样使用
pub struct FileArtifactStorage {
    /// 存储根目录
    base_dir: PathBuf,
}

impl FileArtifactStorage {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// 以当前工作目录为根
    pub fn current_dir() -> Self {
        Self::new(".")
    }
}

#[async_trait]
impl ArtifactStoragePort for FileArtifactStorage {
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    async fn save(&self, path: &Path, data: &[u8]) -> Result<PathBuf, StorageError> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::IoError(e.to_string()))?;
        }

        fs::write(&full_path, data)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        tracing::debug!(
            "Saved artifact: path={}, size={} bytes",
            full_path.display(),
            data.len()
        );

        Ok(full_path)
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(self.resolve(path)).await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_save_artifact() {
        let temp_dir = tempdir().unwrap();
        let storage = FileArtifactStorage::new(temp_dir.path());
        let data = b"fake mp3 data";

        let path = storage
            .save(Path::new("generated_music.mp3"), data)
            .await
            .unwrap();
        assert_eq!(path, temp_dir.path().join("generated_music.mp3"));
        assert!(path.exists());

        assert_eq!(std::fs::read(&path).unwrap(), data);
        assert!(storage.exists(Path::new("generated_music.mp3")).await);
    }

    #[tokio::test]
    async fn test_save_creates_nested_dirs() {
        let temp_dir = tempdir().unwrap();
        let storage = FileArtifactStorage::new(temp_dir.path());

        let path = storage
            .save(Path::new("out/audio/voice.wav"), b"RIFF")
            .await
            .unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_absolute_path_is_not_rebased() {
        let temp_dir = tempdir().unwrap();
        let other_dir = tempdir().unwrap();
        let storage = FileArtifactStorage::new(temp_dir.path());

        let absolute = other_dir.path().join("final.mp4");
        assert_eq!(storage.resolve(&absolute), absolute);
    }

    #[tokio::test]
    async fn test_missing_file_does_not_exist() {
        let temp_dir = tempdir().unwrap();
        let storage = FileArtifactStorage::new(temp_dir.path());

        assert!(!storage.exists(Path::new("missing.wav")).await);
    }

    #[tokio::test]
    async fn test_save_into_file_path_fails() {
        let temp_dir = tempdir().unwrap();
        std::fs::write(temp_dir.path().join("blocker"), b"x").unwrap();
        let storage = FileArtifactStorage::new(temp_dir.path());

        let err = storage
            .save(Path::new("blocker/voice.wav"), b"RIFF")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::IoError(_)));
    }
}
