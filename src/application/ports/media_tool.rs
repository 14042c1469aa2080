//! Media Tool Port - 外部媒体工具抽象
//!
//! 静态图片生成视频、探测流信息、将视频流与多条音轨合并

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 媒体工具错误
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Source file not found: {0}")]
    SourceNotFound(String),

    #[error("{tool} could not be started: {message}")]
    ToolNotFound { tool: String, message: String },

    #[error("{tool} failed with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("No video stream found in {0}")]
    NoVideoStream(String),

    #[error("No audio stream found in {0}")]
    NoAudioStream(String),

    #[error("Invalid probe output: {0}")]
    InvalidProbe(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl MediaError {
    pub fn source_not_found(path: &Path) -> Self {
        Self::SourceNotFound(path.display().to_string())
    }
}

/// 流类型（对应 ffprobe 的 codec_type）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Data,
    Attachment,
    #[serde(other)]
    Unknown,
}

/// 单条流的信息
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    /// 容器内的流序号
    pub index: u32,
    pub kind: StreamKind,
    pub codec_name: Option<String>,
    pub duration_secs: Option<f64>,
}

/// 媒体文件信息
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    pub path: PathBuf,
    pub streams: Vec<StreamInfo>,
    /// 容器时长（秒）
    pub duration_secs: Option<f64>,
}

impl MediaInfo {
    pub fn streams_of(&self, kind: StreamKind) -> impl Iterator<Item = &StreamInfo> {
        self.streams.iter().filter(move |s| s.kind == kind)
    }

    pub fn has_video(&self) -> bool {
        self.streams_of(StreamKind::Video).next().is_some()
    }

    pub fn has_audio(&self) -> bool {
        self.streams_of(StreamKind::Audio).next().is_some()
    }
}

/// Media Tool Port
///
/// 编码细节全部交给外部工具，不做时长对齐、重采样或兼容性校验
#[async_trait]
pub trait MediaToolPort: Send + Sync {
    /// 将静态图片循环成固定时长的视频
    ///
    /// `image_path` 必须存在，否则返回 `MediaError::SourceNotFound`
    async fn create_video_from_image(
        &self,
        image_path: &Path,
        duration_seconds: u32,
        output_path: &Path,
    ) -> Result<PathBuf, MediaError>;

    /// 将视频流与所有音轨合并到一个输出文件
    async fn combine_audio_and_video(
        &self,
        video_path: &Path,
        audio_paths: &[PathBuf],
        output_path: &Path,
    ) -> Result<PathBuf, MediaError>;

    /// 探测文件的流信息
    async fn probe(&self, path: &Path) -> Result<MediaInfo, MediaError>;
}
