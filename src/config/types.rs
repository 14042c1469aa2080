//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::CREDENTIAL_PLACEHOLDER;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 推理服务配置
    #[serde(default)]
    pub inference: InferenceConfig,

    /// 提示文本
    #[serde(default)]
    pub prompts: PromptConfig,

    /// 生成音频的输出位置
    #[serde(default)]
    pub output: OutputConfig,

    /// 媒体工具与视频合成配置
    #[serde(default)]
    pub media: MediaConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 推理服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    /// Bearer 令牌
    /// 默认为占位符，运行时由 Credential Guard 拦截
    #[serde(default = "default_credential")]
    pub credential: String,

    /// 音乐生成模型地址
    #[serde(default = "default_music_endpoint")]
    pub music_endpoint: String,

    /// 语音合成模型地址
    #[serde(default = "default_tts_endpoint")]
    pub tts_endpoint: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_credential() -> String {
    CREDENTIAL_PLACEHOLDER.to_string()
}

fn default_music_endpoint() -> String {
    "https://api-inference.huggingface.co/models/facebook/musicgen-small".to_string()
}

fn default_tts_endpoint() -> String {
    "https://api-inference.huggingface.co/models/espnet/kan-bayashi_ljspeech_vits".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            credential: default_credential(),
            music_endpoint: default_music_endpoint(),
            tts_endpoint: default_tts_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// 提示文本
#[derive(Debug, Clone, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_music_prompt")]
    pub music: String,

    #[serde(default = "default_voiceover_prompt")]
    pub voiceover: String,
}

fn default_music_prompt() -> String {
    "light, calm, inspirational music with a gentle piano melody, upbeat drums, and a hint of a soft synth pad".to_string()
}

fn default_voiceover_prompt() -> String {
    "Hello, this is a test of the Text-to-Speech API.".to_string()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            music: default_music_prompt(),
            voiceover: default_voiceover_prompt(),
        }
    }
}

/// 生成音频的输出位置
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_music_path")]
    pub music_path: PathBuf,

    /// TTS 模型通常返回 WAV
    #[serde(default = "default_voiceover_path")]
    pub voiceover_path: PathBuf,
}

fn default_music_path() -> PathBuf {
    PathBuf::from("generated_music.mp3")
}

fn default_voiceover_path() -> PathBuf {
    PathBuf::from("generated_voiceover.wav")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            music_path: default_music_path(),
            voiceover_path: default_voiceover_path(),
        }
    }
}

/// 媒体配置
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// 静态图片
    #[serde(default = "default_image_path")]
    pub image_path: PathBuf,

    /// 视频源（synthesize_video 为 true 时作为合成视频的输出）
    #[serde(default = "default_video_path")]
    pub video_path: PathBuf,

    /// 最终输出
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// 合成视频时长（秒）
    #[serde(default = "default_duration_seconds")]
    pub duration_seconds: u32,

    /// 是否从静态图片合成占位视频
    /// 为 false 时直接使用已有的 video_path
    #[serde(default = "default_synthesize_video")]
    pub synthesize_video: bool,

    /// ffmpeg/ffprobe 所在目录，未设置时从 PATH 查找
    #[serde(default)]
    pub ffmpeg_dir: Option<PathBuf>,

    /// 音轨编码器，"copy" 表示不重新编码
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
}

fn default_image_path() -> PathBuf {
    PathBuf::from("image_source.jpg")
}

fn default_video_path() -> PathBuf {
    PathBuf::from("video_source.mp4")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("final_output.mp4")
}

fn default_duration_seconds() -> u32 {
    10
}

fn default_synthesize_video() -> bool {
    true
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            image_path: default_image_path(),
            video_path: default_video_path(),
            output_path: default_output_path(),
            duration_seconds: default_duration_seconds(),
            synthesize_video: default_synthesize_video(),
            ffmpeg_dir: None,
            audio_codec: default_audio_codec(),
        }
    }
}

impl MediaConfig {
    /// 阶段 4 需要检查的源文件
    pub fn source_path(&self) -> &PathBuf {
        if self.synthesize_video {
            &self.image_path
        } else {
            &self.video_path
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
