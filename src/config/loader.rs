//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（aura.toml）
//! 3. 默认值

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;
use crate::domain::credential::redact;
use crate::domain::CREDENTIAL_PLACEHOLDER;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["aura", "aura.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "AURA";

/// 环境变量中按原始字符串读取的键（不做数字/布尔推断）
const RAW_STRING_KEYS: &[&str] = &["inference.credential"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `AURA_`，层级分隔符 `__`）
/// 2. 配置文件（aura.toml 或 aura.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `AURA_INFERENCE__CREDENTIAL=hf_xxx`
/// - `AURA_INFERENCE__MUSIC_ENDPOINT=http://localhost:9000/music`
/// - `AURA_MEDIA__DURATION_SECONDS=15`
/// - `AURA_MEDIA__SYNTHESIZE_VIDEO=false`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_config_with(config_path, |key| std::env::var(key).ok())
}

fn load_config_with(
    config_path: Option<&Path>,
    env_lookup: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("inference.credential", CREDENTIAL_PLACEHOLDER)?
        .set_default(
            "inference.music_endpoint",
            "https://api-inference.huggingface.co/models/facebook/musicgen-small",
        )?
        .set_default(
            "inference.tts_endpoint",
            "https://api-inference.huggingface.co/models/espnet/kan-bayashi_ljspeech_vits",
        )?
        .set_default("inference.timeout_secs", 120)?
        .set_default("output.music_path", "generated_music.mp3")?
        .set_default("output.voiceover_path", "generated_voiceover.wav")?
        .set_default("media.image_path", "image_source.jpg")?
        .set_default("media.video_path", "video_source.mp4")?
        .set_default("media.output_path", "final_output.mp4")?
        .set_default("media.duration_seconds", 10)?
        .set_default("media.synthesize_video", true)?
        .set_default("media.audio_codec", "aac")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: AURA_INFERENCE__CREDENTIAL=hf_xxx
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );
    builder = apply_raw_string_overrides(builder, env_lookup)?;

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// `AURA_INFERENCE__CREDENTIAL` 对应的环境变量名
fn env_key(key: &str) -> String {
    format!("{}_{}", ENV_PREFIX, key.replace('.', "__").to_uppercase())
}

/// try_parsing 会把 "0123" 这样的令牌解析成整数 123，这些键改用原始字符串覆盖
fn apply_raw_string_overrides(
    mut builder: ConfigBuilder<DefaultState>,
    env_lookup: impl Fn(&str) -> Option<String>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for key in RAW_STRING_KEYS {
        if let Some(raw) = env_lookup(&env_key(key)) {
            builder = builder.set_override(*key, raw)?;
        }
    }
    Ok(builder)
}

/// 验证配置有效性
///
/// 令牌是否为占位符不在这里检查，交给 Credential Guard
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    validate_endpoint("music_endpoint", &config.inference.music_endpoint)?;
    validate_endpoint("tts_endpoint", &config.inference.tts_endpoint)?;

    if config.inference.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Inference timeout cannot be 0".to_string(),
        ));
    }

    if config.prompts.music.trim().is_empty() || config.prompts.voiceover.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Prompts cannot be empty".to_string(),
        ));
    }

    if config.media.duration_seconds == 0 {
        return Err(ConfigError::ValidationError(
            "Video duration must be greater than 0".to_string(),
        ));
    }

    let paths = [
        ("output.music_path", &config.output.music_path),
        ("output.voiceover_path", &config.output.voiceover_path),
        ("media.image_path", &config.media.image_path),
        ("media.video_path", &config.media.video_path),
        ("media.output_path", &config.media.output_path),
    ];
    for (name, path) in paths {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                name
            )));
        }
    }

    if config.media.audio_codec.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Audio codec cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_endpoint(name: &str, url: &str) -> Result<(), ConfigError> {
    if url.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{} cannot be empty",
            name
        )));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "{} must be an http(s) URL: {}",
            name, url
        )));
    }
    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Credential: {}", redact(&config.inference.credential));
    tracing::info!("Music Endpoint: {}", config.inference.music_endpoint);
    tracing::info!("TTS Endpoint: {}", config.inference.tts_endpoint);
    tracing::info!("Inference Timeout: {}s", config.inference.timeout_secs);
    tracing::info!("Music Output: {:?}", config.output.music_path);
    tracing::info!("Voiceover Output: {:?}", config.output.voiceover_path);
    tracing::info!("Synthesize Video: {}", config.media.synthesize_video);
    if config.media.synthesize_video {
        tracing::info!("Image Source: {:?}", config.media.image_path);
        tracing::info!("Video Duration: {}s", config.media.duration_seconds);
    }
    tracing::info!("Video Source: {:?}", config.media.video_path);
    tracing::info!("Final Output: {:?}", config.media.output_path);
    match &config.media.ffmpeg_dir {
        Some(dir) => tracing::info!("FFmpeg Directory: {:?}", dir),
        None => tracing::info!("FFmpeg Directory: <PATH>"),
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
