//! Aura Media - 音乐与旁白生成、视频合成自动化
//!
//! 用法: aura-media [config.toml]

use std::path::PathBuf;
use std::sync::Arc;

use aura_media::application::{RunOrchestrator, RunOutcome};
use aura_media::config::{load_config, load_config_from_path, print_config, AppConfig};
use aura_media::infrastructure::adapters::{
    FfmpegMediaTool, FfmpegToolConfig, FileArtifactStorage, HttpInferenceClientConfig,
    HttpInferenceFactory,
};

fn init_tracing(config: &AppConfig) {
    let log_filter = format!("{},aura_media={}", config.log.level, config.log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    // 日志写到 stderr，stdout 留给进度输出
    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => load_config_from_path(Some(path.as_path())),
        None => load_config(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);
    tracing::info!("Aura Media - music, voiceover and video assembly");
    print_config(&config);

    let inference = Arc::new(HttpInferenceFactory::new(HttpInferenceClientConfig::from(
        &config.inference,
    )));
    let media_tool = Arc::new(FfmpegMediaTool::new(FfmpegToolConfig::from(&config.media)));
    let storage = Arc::new(FileArtifactStorage::current_dir());

    let orchestrator = RunOrchestrator::new(config, inference, media_tool, storage);
    let report = orchestrator.run().await?;

    match report.outcome {
        Some(RunOutcome::Completed) => tracing::info!(
            elapsed_ms = ?report.elapsed_ms(),
            failures = report.failure_lines().len(),
            "Run finished"
        ),
        Some(outcome) => tracing::warn!(outcome = ?outcome, "Run stopped early"),
        None => {}
    }

    Ok(())
}
