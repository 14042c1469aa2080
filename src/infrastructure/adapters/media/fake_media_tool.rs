//! Fake Media Tool - 用于测试的媒体工具
//!
//! 不调用 ffmpeg，只记录调用并写出占位文件。
//! 合成出的文件会记住自己的流布局，随后 probe 可以查到。

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::application::ports::{MediaError, MediaInfo, MediaToolPort, StreamInfo, StreamKind};

/// 一次媒体工具调用
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCall {
    CreateVideo {
        image: PathBuf,
        duration_seconds: u32,
        output: PathBuf,
    },
    Combine {
        video: PathBuf,
        audio: Vec<PathBuf>,
        output: PathBuf,
    },
    Probe(PathBuf),
}

/// Fake Media Tool
#[derive(Default)]
pub struct FakeMediaTool {
    calls: Mutex<Vec<MediaCall>>,
    layouts: Mutex<HashMap<PathBuf, Vec<StreamKind>>>,
    fail_combine: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl FakeMediaTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// 合并步骤以工具失败的方式返回错误
    pub fn failing_combine() -> Self {
        Self {
            fail_combine: true,
            ..Self::default()
        }
    }

    /// 所有调用（按顺序）
    pub fn calls(&self) -> Vec<MediaCall> {
        lock(&self.calls).clone()
    }

    /// 除 probe 以外的调用
    pub fn tool_invocations(&self) -> Vec<MediaCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, MediaCall::Probe(_)))
            .collect()
    }

    fn record(&self, call: MediaCall) {
        lock(&self.calls).push(call);
    }

    async fn write_placeholder(
        &self,
        output: &Path,
        layout: Vec<StreamKind>,
    ) -> Result<(), MediaError> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| MediaError::IoError(e.to_string()))?;
            }
        }
        tokio::fs::write(output, b"fake media")
            .await
            .map_err(|e| MediaError::IoError(e.to_string()))?;
        lock(&self.layouts).insert(output.to_path_buf(), layout);
        Ok(())
    }
}

/// 未知文件按扩展名猜测
fn guess_layout(path: &Path) -> Vec<StreamKind> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp4" | "mkv" | "mov" | "webm" | "jpg" | "jpeg" | "png" => vec![StreamKind::Video],
        "mp3" | "wav" | "flac" | "ogg" | "aac" | "m4a" => vec![StreamKind::Audio],
        _ => Vec::new(),
    }
}

#[async_trait]
impl MediaToolPort for FakeMediaTool {
    async fn create_video_from_image(
        &self,
        image_path: &Path,
        duration_seconds: u32,
        output_path: &Path,
    ) -> Result<PathBuf, MediaError> {
        if !tokio::fs::try_exists(image_path).await.unwrap_or(false) {
            return Err(MediaError::source_not_found(image_path));
        }
        self.record(MediaCall::CreateVideo {
            image: image_path.to_path_buf(),
            duration_seconds,
            output: output_path.to_path_buf(),
        });
        self.write_placeholder(output_path, vec![StreamKind::Video])
            .await?;
        Ok(output_path.to_path_buf())
    }

    async fn combine_audio_and_video(
        &self,
        video_path: &Path,
        audio_paths: &[PathBuf],
        output_path: &Path,
    ) -> Result<PathBuf, MediaError> {
        if !self.probe(video_path).await?.has_video() {
            return Err(MediaError::NoVideoStream(video_path.display().to_string()));
        }
        for audio_path in audio_paths {
            if !self.probe(audio_path).await?.has_audio() {
                return Err(MediaError::NoAudioStream(audio_path.display().to_string()));
            }
        }

        self.record(MediaCall::Combine {
            video: video_path.to_path_buf(),
            audio: audio_paths.to_vec(),
            output: output_path.to_path_buf(),
        });

        if self.fail_combine {
            return Err(MediaError::ToolFailed {
                tool: "ffmpeg".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "fake mux failure".to_string(),
            });
        }

        let mut layout = vec![StreamKind::Video];
        layout.extend(std::iter::repeat(StreamKind::Audio).take(audio_paths.len()));
        self.write_placeholder(output_path, layout).await?;
        Ok(output_path.to_path_buf())
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, MediaError> {
        self.record(MediaCall::Probe(path.to_path_buf()));
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(MediaError::source_not_found(path));
        }

        let layout = lock(&self.layouts)
            .get(path)
            .cloned()
            .unwrap_or_else(|| guess_layout(path));

        Ok(MediaInfo {
            path: path.to_path_buf(),
            streams: layout
                .into_iter()
                .enumerate()
                .map(|(index, kind)| StreamInfo {
                    index: index as u32,
                    kind,
                    codec_name: None,
                    duration_secs: None,
                })
                .collect(),
            duration_secs: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_combine_one_video_two_audio_yields_three_streams() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("video_source.mp4");
        let music = dir.path().join("generated_music.mp3");
        let voice = dir.path().join("generated_voiceover.wav");
        for path in [&video, &music, &voice] {
            std::fs::write(path, b"x").unwrap();
        }
        let output = dir.path().join("final_output.mp4");

        let tool = FakeMediaTool::new();
        let written = tool
            .combine_audio_and_video(&video, &[music.clone(), voice.clone()], &output)
            .await
            .unwrap();
        assert_eq!(written, output);
        assert!(output.exists());

        let info = tool.probe(&output).await.unwrap();
        assert_eq!(info.streams.len(), 3);
        assert_eq!(info.streams_of(StreamKind::Video).count(), 1);
        assert_eq!(info.streams_of(StreamKind::Audio).count(), 2);
        assert_eq!(tool.tool_invocations().len(), 1);
    }

    #[tokio::test]
    async fn test_create_video_requires_image() {
        let dir = tempfile::tempdir().unwrap();
        let tool = FakeMediaTool::new();
        let err = tool
            .create_video_from_image(&dir.path().join("missing.jpg"), 10, &dir.path().join("v.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::SourceNotFound(_)));
        assert!(tool.tool_invocations().is_empty());
    }

    #[tokio::test]
    async fn test_combine_rejects_audio_file_without_audio_stream() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("video_source.mp4");
        let not_audio = dir.path().join("notes.txt");
        std::fs::write(&video, b"x").unwrap();
        std::fs::write(&not_audio, b"x").unwrap();

        let tool = FakeMediaTool::new();
        let err = tool
            .combine_audio_and_video(&video, &[not_audio], &dir.path().join("out.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::NoAudioStream(_)));
    }
}
