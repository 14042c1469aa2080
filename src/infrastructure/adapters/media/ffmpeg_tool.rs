//! FFmpeg Media Tool - 基于 ffmpeg/ffprobe 命令行的媒体工具
//!
//! 实现 MediaToolPort trait：
//! - 静态图片 → 固定时长视频（libx264 / yuv420p）
//! - ffprobe 探测流信息
//! - 视频流（copy）+ N 条音轨合并

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;

use super::probe::parse_probe_output;
use crate::application::ports::{MediaError, MediaInfo, MediaToolPort};
use crate::config::MediaConfig;

/// stderr 中保留的最大行数
const STDERR_TAIL_LINES: usize = 20;

/// 合成视频的帧率
const STILL_FRAME_RATE: u32 = 25;

/// FFmpeg 工具配置
#[derive(Debug, Clone)]
pub struct FfmpegToolConfig {
    /// ffmpeg/ffprobe 所在目录，None 表示从 PATH 查找
    pub ffmpeg_dir: Option<PathBuf>,
    /// 音轨编码器
    pub audio_codec: String,
}

impl Default for FfmpegToolConfig {
    fn default() -> Self {
        Self {
            ffmpeg_dir: None,
            audio_codec: "aac".to_string(),
        }
    }
}

impl From<&MediaConfig> for FfmpegToolConfig {
    fn from(config: &MediaConfig) -> Self {
        Self {
            ffmpeg_dir: config.ffmpeg_dir.clone(),
            audio_codec: config.audio_codec.clone(),
        }
    }
}

/// FFmpeg 媒体工具
pub struct FfmpegMediaTool {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    audio_codec: String,
}

impl FfmpegMediaTool {
    pub fn new(config: FfmpegToolConfig) -> Self {
        Self {
            ffmpeg: resolve_binary(config.ffmpeg_dir.as_deref(), "ffmpeg"),
            ffprobe: resolve_binary(config.ffmpeg_dir.as_deref(), "ffprobe"),
            audio_codec: config.audio_codec,
        }
    }

    /// 运行外部工具，非零退出码视为失败
    async fn run(&self, tool: &Path, args: &[OsString]) -> Result<Output, MediaError> {
        let tool_name = tool_name(tool);
        tracing::debug!(tool = %tool_name, args = ?args, "Invoking media tool");

        let output = Command::new(tool)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MediaError::ToolNotFound {
                        tool: tool_name.clone(),
                        message: format!("{} ({})", e, tool.display()),
                    }
                } else {
                    MediaError::IoError(format!("Failed to run {}: {}", tool_name, e))
                }
            })?;

        if !output.status.success() {
            let stderr = stderr_tail(&output.stderr, STDERR_TAIL_LINES);
            tracing::error!(tool = %tool_name, status = %output.status, "Media tool failed");
            return Err(MediaError::ToolFailed {
                tool: tool_name,
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(output)
    }
}

#[async_trait]
impl MediaToolPort for FfmpegMediaTool {
    async fn create_video_from_image(
        &self,
        image_path: &Path,
        duration_seconds: u32,
        output_path: &Path,
    ) -> Result<PathBuf, MediaError> {
        if !tokio::fs::try_exists(image_path).await.unwrap_or(false) {
            return Err(MediaError::source_not_found(image_path));
        }
        ensure_parent_dir(output_path).await?;

        tracing::info!(
            image = %image_path.display(),
            duration_seconds,
            output = %output_path.display(),
            "Creating video from still image"
        );

        let args = image_to_video_args(image_path, duration_seconds, output_path);
        self.run(&self.ffmpeg, &args).await?;

        Ok(output_path.to_path_buf())
    }

    async fn combine_audio_and_video(
        &self,
        video_path: &Path,
        audio_paths: &[PathBuf],
        output_path: &Path,
    ) -> Result<PathBuf, MediaError> {
        let video = self.probe(video_path).await?;
        if !video.has_video() {
            return Err(MediaError::NoVideoStream(video_path.display().to_string()));
        }

        for audio_path in audio_paths {
            let audio = self.probe(audio_path).await?;
            if !audio.has_audio() {
                return Err(MediaError::NoAudioStream(audio_path.display().to_string()));
            }
        }
        ensure_parent_dir(output_path).await?;

        tracing::info!(
            video = %video_path.display(),
            audio_tracks = audio_paths.len(),
            output = %output_path.display(),
            "Combining audio and video"
        );

        let args = mux_args(video_path, audio_paths, output_path, &self.audio_codec);
        self.run(&self.ffmpeg, &args).await?;

        Ok(output_path.to_path_buf())
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, MediaError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(MediaError::source_not_found(path));
        }

        let output = self.run(&self.ffprobe, &probe_args(path)).await?;
        let json = String::from_utf8_lossy(&output.stdout);
        let info = parse_probe_output(path, &json)?;

        tracing::debug!(
            path = %path.display(),
            streams = info.streams.len(),
            duration = ?info.duration_secs,
            "Probed media file"
        );

        Ok(info)
    }
}

/// 在目录下查找可执行文件，Windows 上补全 .exe
fn resolve_binary(dir: Option<&Path>, name: &str) -> PathBuf {
    let file_name = format!("{}{}", name, std::env::consts::EXE_SUFFIX);
    match dir {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

fn tool_name(tool: &Path) -> String {
    tool.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| tool.display().to_string())
}

fn stderr_tail(stderr: &[u8], max_lines: usize) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}

async fn ensure_parent_dir(path: &Path) -> Result<(), MediaError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| MediaError::IoError(e.to_string()))?;
        }
    }
    Ok(())
}

/// ffmpeg 参数：静态图片循环成视频
pub fn image_to_video_args(
    image_path: &Path,
    duration_seconds: u32,
    output_path: &Path,
) -> Vec<OsString> {
    let duration = duration_seconds.to_string();
    let frame_rate = STILL_FRAME_RATE.to_string();

    let mut args: Vec<OsString> = vec!["-y".into(), "-loop".into(), "1".into(), "-i".into()];
    args.push(image_path.into());
    args.extend(
        [
            "-t",
            duration.as_str(),
            "-c:v",
            "libx264",
            "-tune",
            "stillimage",
            "-pix_fmt",
            "yuv420p",
            // libx264 要求宽高为偶数
            "-vf",
            "scale=trunc(iw/2)*2:trunc(ih/2)*2",
            "-r",
            frame_rate.as_str(),
        ]
        .map(OsString::from),
    );
    args.push(output_path.into());
    args
}

/// ffmpeg 参数：输入 0 的第一条视频流 + 每个音频输入的第一条音轨
pub fn mux_args(
    video_path: &Path,
    audio_paths: &[PathBuf],
    output_path: &Path,
    audio_codec: &str,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), video_path.into()];
    for audio_path in audio_paths {
        args.push("-i".into());
        args.push(audio_path.into());
    }

    args.push("-map".into());
    args.push("0:v:0".into());
    for input_index in 1..=audio_paths.len() {
        args.push("-map".into());
        args.push(format!("{}:a:0", input_index).into());
    }

    args.extend(["-c:v", "copy"].map(OsString::from));
    if !audio_paths.is_empty() {
        args.push("-c:a".into());
        args.push(audio_codec.into());
    }
    args.push(output_path.into());
    args
}

/// ffprobe 参数
pub fn probe_args(path: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-v",
        "error",
        "-show_streams",
        "-show_format",
        "-of",
        "json",
    ]
    .map(OsString::from)
    .to_vec();
    args.push(path.into());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().to_string()).collect()
    }

    #[test]
    fn test_image_to_video_args() {
        let args = image_to_video_args(Path::new("image_source.jpg"), 10, Path::new("video_source.mp4"));
        let args = strings(&args);
        assert_eq!(&args[..5], &["-y", "-loop", "1", "-i", "image_source.jpg"]);
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "10");
        assert!(args.contains(&"yuv420p".to_string()));
        assert_eq!(args.last().unwrap(), "video_source.mp4");
    }

    #[test]
    fn test_mux_args_maps_every_audio_track() {
        let audio = vec![
            PathBuf::from("generated_music.mp3"),
            PathBuf::from("generated_voiceover.wav"),
        ];
        let args = strings(&mux_args(
            Path::new("video_source.mp4"),
            &audio,
            Path::new("final_output.mp4"),
            "aac",
        ));
        assert_eq!(
            args,
            vec![
                "-y",
                "-i",
                "video_source.mp4",
                "-i",
                "generated_music.mp3",
                "-i",
                "generated_voiceover.wav",
                "-map",
                "0:v:0",
                "-map",
                "1:a:0",
                "-map",
                "2:a:0",
                "-c:v",
                "copy",
                "-c:a",
                "aac",
                "final_output.mp4",
            ]
        );
    }

    #[test]
    fn test_mux_args_single_track() {
        let audio = vec![PathBuf::from("generated_voiceover.wav")];
        let args = strings(&mux_args(Path::new("v.mp4"), &audio, Path::new("out.mp4"), "copy"));
        assert_eq!(args.iter().filter(|a| *a == "-map").count(), 2);
        assert!(args.contains(&"1:a:0".to_string()));
        assert!(!args.contains(&"2:a:0".to_string()));
    }

    #[test]
    fn test_probe_args() {
        let args = strings(&probe_args(Path::new("clip.mp4")));
        assert_eq!(args.last().unwrap(), "clip.mp4");
        assert!(args.contains(&"-show_streams".to_string()));
        assert!(args.contains(&"json".to_string()));
    }

    #[test]
    fn test_resolve_binary() {
        let tool = FfmpegMediaTool::new(FfmpegToolConfig {
            ffmpeg_dir: Some(PathBuf::from("/opt/ffmpeg")),
            ..Default::default()
        });
        assert!(tool.ffmpeg.starts_with("/opt/ffmpeg"));
        assert_eq!(tool_name(&tool.ffprobe), "ffprobe");

        let tool = FfmpegMediaTool::new(FfmpegToolConfig::default());
        assert_eq!(tool_name(&tool.ffmpeg), "ffmpeg");
    }

    #[test]
    fn test_stderr_tail() {
        let stderr = b"line1\nline2\nline3\nline4";
        assert_eq!(stderr_tail(stderr, 2), "line3\nline4");
        assert_eq!(stderr_tail(stderr, 10), "line1\nline2\nline3\nline4");
    }

    #[tokio::test]
    async fn test_missing_image_fails_before_invoking_tool() {
        let dir = tempfile::tempdir().unwrap();
        // 指向不存在的目录，若真的调用工具会得到 ToolNotFound
        let tool = FfmpegMediaTool::new(FfmpegToolConfig {
            ffmpeg_dir: Some(dir.path().join("no-such-dir")),
            ..Default::default()
        });
        let err = tool
            .create_video_from_image(&dir.path().join("missing.jpg"), 10, &dir.path().join("out.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::SourceNotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_tool_binary() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("image_source.jpg");
        std::fs::write(&image, b"not really a jpeg").unwrap();
        let tool = FfmpegMediaTool::new(FfmpegToolConfig {
            ffmpeg_dir: Some(dir.path().join("no-such-dir")),
            ..Default::default()
        });
        let err = tool
            .create_video_from_image(&image, 10, &dir.path().join("out.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::ToolNotFound { .. }));
    }

    #[tokio::test]
    async fn test_combine_with_missing_video() {
        let dir = tempfile::tempdir().unwrap();
        let tool = FfmpegMediaTool::new(FfmpegToolConfig::default());
        let err = tool
            .combine_audio_and_video(
                &dir.path().join("missing.mp4"),
                &[dir.path().join("a.mp3")],
                &dir.path().join("out.mp4"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::SourceNotFound(_)));
    }

    /// 用 shell 脚本替身代替真实 ffmpeg，校验实际传给进程的参数
    #[cfg(unix)]
    mod stub_binaries {
        use super::*;
        use crate::application::ports::{MediaError, MediaToolPort};
        use std::os::unix::fs::PermissionsExt;
        use std::path::{Path, PathBuf};

        /// .mp4 只有视频流，其余文件只有音频流
        const STREAM_INFO_SCRIPT: &str = r#"for last; do :; done
case "$last" in
  *.mp4) echo '{"streams":[{"index":0,"codec_type":"video","codec_name":"h264"}],"format":{"duration":"10.0"}}' ;;
  *) echo '{"streams":[{"index":0,"codec_type":"audio","codec_name":"mp3"}],"format":{}}' ;;
esac"#;

        /// 记录参数并写出最后一个参数指向的输出文件
        const RECORDING_FFMPEG_SCRIPT: &str = r#"printf '%s\n' "$@" > "$(dirname "$0")/ffmpeg.args"
for last; do :; done
printf 'muxed' > "$last""#;

        const FAILING_FFMPEG_SCRIPT: &str = "echo boom >&2\nexit 3";

        fn write_script(path: &Path, body: &str) {
            std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            let mut perms = std::fs::metadata(path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(path, perms).unwrap();
        }

        fn stub_tool(dir: &Path, ffmpeg_script: &str) -> FfmpegMediaTool {
            let bin_dir = dir.join("bin");
            std::fs::create_dir_all(&bin_dir).unwrap();
            let tool = FfmpegMediaTool::new(FfmpegToolConfig {
                ffmpeg_dir: Some(bin_dir),
                ..Default::default()
            });
            write_script(&tool.ffmpeg, ffmpeg_script);
            write_script(&tool.ffprobe, STREAM_INFO_SCRIPT);
            tool
        }

        fn recorded_args(dir: &Path) -> Vec<String> {
            std::fs::read_to_string(dir.join("bin").join("ffmpeg.args"))
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }

        fn media_files(dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
            let video = dir.join("v.mp4");
            let music = dir.join("m.mp3");
            let voice = dir.join("w.wav");
            std::fs::write(&video, b"video").unwrap();
            std::fs::write(&music, b"music").unwrap();
            std::fs::write(&voice, b"voice").unwrap();
            (video, music, voice)
        }

        #[tokio::test]
        async fn test_combine_passes_mux_args_to_ffmpeg() {
            let dir = tempfile::tempdir().unwrap();
            let tool = stub_tool(dir.path(), RECORDING_FFMPEG_SCRIPT);
            let (video, music, voice) = media_files(dir.path());
            let audio = vec![music, voice];
            let output = dir.path().join("out").join("final.mp4");

            let result = tool
                .combine_audio_and_video(&video, &audio, &output)
                .await
                .unwrap();

            assert_eq!(result, output);
            assert_eq!(std::fs::read(&output).unwrap(), b"muxed");
            assert_eq!(
                recorded_args(dir.path()),
                strings(&mux_args(&video, &audio, &output, "aac"))
            );
        }

        #[tokio::test]
        async fn test_create_video_passes_still_image_args() {
            let dir = tempfile::tempdir().unwrap();
            let tool = stub_tool(dir.path(), RECORDING_FFMPEG_SCRIPT);
            let image = dir.path().join("image_source.jpg");
            std::fs::write(&image, b"jpeg").unwrap();
            let output = dir.path().join("video_source.mp4");

            tool.create_video_from_image(&image, 10, &output)
                .await
                .unwrap();

            assert!(output.exists());
            assert_eq!(
                recorded_args(dir.path()),
                strings(&image_to_video_args(&image, 10, &output))
            );
        }

        #[tokio::test]
        async fn test_nonzero_exit_reports_status_and_stderr() {
            let dir = tempfile::tempdir().unwrap();
            let tool = stub_tool(dir.path(), FAILING_FFMPEG_SCRIPT);
            let (video, music, _) = media_files(dir.path());

            let err = tool
                .combine_audio_and_video(&video, &[music], &dir.path().join("out.mp4"))
                .await
                .unwrap_err();

            match &err {
                MediaError::ToolFailed {
                    tool,
                    status,
                    stderr,
                } => {
                    assert_eq!(tool, "ffmpeg");
                    assert_eq!(status, "exit status: 3");
                    assert_eq!(stderr, "boom");
                }
                other => panic!("unexpected error: {other:?}"),
            }
            assert_eq!(err.to_string(), "ffmpeg failed with exit status: 3: boom");
        }

        #[tokio::test]
        async fn test_combine_rejects_track_without_audio() {
            let dir = tempfile::tempdir().unwrap();
            let tool = stub_tool(dir.path(), RECORDING_FFMPEG_SCRIPT);
            let (video, music, _) = media_files(dir.path());

            let err = tool
                .combine_audio_and_video(
                    &video,
                    &[music, video.clone()],
                    &dir.path().join("out.mp4"),
                )
                .await
                .unwrap_err();

            match err {
                MediaError::NoAudioStream(path) => assert_eq!(path, video.display().to_string()),
                other => panic!("unexpected error: {other:?}"),
            }
            assert!(!dir.path().join("bin").join("ffmpeg.args").exists());
        }

        #[tokio::test]
        async fn test_combine_rejects_video_without_video_stream() {
            let dir = tempfile::tempdir().unwrap();
            let tool = stub_tool(dir.path(), RECORDING_FFMPEG_SCRIPT);
            let (_, music, voice) = media_files(dir.path());

            let err = tool
                .combine_audio_and_video(&music, &[voice], &dir.path().join("out.mp4"))
                .await
                .unwrap_err();

            assert!(matches!(err, MediaError::NoVideoStream(_)));
        }
    }
}
