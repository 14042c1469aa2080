//! Run Orchestrator - 流水线编排
//!
//! 五个阶段严格顺序执行：
//! 1. 校验令牌（失败则终止）
//! 2. 生成音乐并落盘（失败只记录，继续）
//! 3. 生成旁白并落盘（失败只记录，继续）
//! 4. 检查图片/视频源文件（缺失则终止）
//! 5. 按需合成占位视频，再把成功生成的音轨合并进去
//!
//! 远程调用失败可以容忍，本地源文件缺失则不行

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::ApplicationError;
use super::ports::{
    ArtifactStoragePort, InferenceEngineFactory, InferenceEnginePort, InferenceKind,
    MediaToolPort,
};
use super::report::{EventStatus, RunOutcome, RunReport, Stage};
use crate::config::AppConfig;
use crate::domain::{Credential, Prompt};

/// 运行编排器
pub struct RunOrchestrator {
    config: AppConfig,
    inference: Arc<dyn InferenceEngineFactory>,
    media_tool: Arc<dyn MediaToolPort>,
    storage: Arc<dyn ArtifactStoragePort>,
    /// 是否把进度打印到标准输出
    echo: bool,
}

impl RunOrchestrator {
    pub fn new(
        config: AppConfig,
        inference: Arc<dyn InferenceEngineFactory>,
        media_tool: Arc<dyn MediaToolPort>,
        storage: Arc<dyn ArtifactStoragePort>,
    ) -> Self {
        Self {
            config,
            inference,
            media_tool,
            storage,
            echo: true,
        }
    }

    /// 不打印控制台输出（事件仍记录在 RunReport 中）
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    fn emit(&self, report: &mut RunReport, stage: Stage, status: EventStatus, message: String) {
        let event = report.push(stage, status, message);
        if self.echo {
            println!("{}", event.message);
        }
    }

    fn blank_line(&self) {
        if self.echo {
            println!();
        }
    }

    /// 执行一次完整运行
    ///
    /// 令牌被拒、源文件缺失、没有可合并的音轨都以 `Ok(RunReport)` 返回；
    /// 媒体工具失败以 `Err(ApplicationError::Media)` 返回
    pub async fn run(&self) -> Result<RunReport, ApplicationError> {
        let mut report = RunReport::start();

        // 1. 令牌
        let credential = match Credential::guard(&self.config.inference.credential) {
            Ok(credential) => credential,
            Err(e) => {
                tracing::warn!(error = %e, "Credential rejected, aborting run");
                self.emit(&mut report, Stage::Credential, EventStatus::Failure, e.instruction());
                return Ok(report.finish(RunOutcome::CredentialRejected));
            }
        };

        let music_prompt = Prompt::new(self.config.prompts.music.as_str())?;
        let voiceover_prompt = Prompt::new(self.config.prompts.voiceover.as_str())?;

        // 客户端在本次运行期间存活，函数返回时释放
        let engine = self.inference.connect(&credential)?;

        // 2. 音乐
        let music_path = self
            .generate_track(
                engine.as_ref(),
                InferenceKind::Music,
                &music_prompt,
                &self.config.output.music_path,
                &mut report,
            )
            .await;
        report.music_path = music_path;
        self.blank_line();

        // 3. 旁白
        let voiceover_path = self
            .generate_track(
                engine.as_ref(),
                InferenceKind::Voiceover,
                &voiceover_prompt,
                &self.config.output.voiceover_path,
                &mut report,
            )
            .await;
        report.voiceover_path = voiceover_path;
        self.blank_line();

        // 4. 源文件
        let media = &self.config.media;
        let source = media.source_path();
        if !self.storage.exists(source).await {
            let kind = if media.synthesize_video { "image" } else { "video" };
            tracing::error!(path = %source.display(), "Source file not found, aborting run");
            self.emit(
                &mut report,
                Stage::SourceCheck,
                EventStatus::Failure,
                format!(
                    "The {} source file '{}' was not found. Please add the file at that location.",
                    kind,
                    source.display()
                ),
            );
            return Ok(report.finish(RunOutcome::SourceMissing));
        }

        // 5. 视频合成与合并
        let video_path = self.storage.resolve(&media.video_path);
        if media.synthesize_video {
            let image_path = self.storage.resolve(&media.image_path);
            self.media_tool
                .create_video_from_image(&image_path, media.duration_seconds, &video_path)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to create video from image");
                    e
                })?;
            self.emit(
                &mut report,
                Stage::Video,
                EventStatus::Success,
                format!("Placeholder video created at {}", media.video_path.display()),
            );
        }
        report.video_path = Some(video_path.clone());

        let audio_tracks: Vec<PathBuf> = [report.music_path.clone(), report.voiceover_path.clone()]
            .into_iter()
            .flatten()
            .collect();

        if audio_tracks.is_empty() {
            tracing::warn!("No audio tracks were generated, skipping final assembly");
            self.emit(
                &mut report,
                Stage::Combine,
                EventStatus::Failure,
                "No audio tracks were generated; skipping final assembly.".to_string(),
            );
            return Ok(report.finish(RunOutcome::NothingToCombine));
        }

        let output_path = self.storage.resolve(&media.output_path);
        let written = self
            .media_tool
            .combine_audio_and_video(&video_path, &audio_tracks, &output_path)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to combine audio and video");
                e
            })?;

        tracing::info!(
            output = %written.display(),
            audio_tracks = audio_tracks.len(),
            "Final video assembled"
        );
        self.emit(
            &mut report,
            Stage::Combine,
            EventStatus::Success,
            format!("Final video assembled at {}", media.output_path.display()),
        );
        report.final_output = Some(written);

        Ok(report.finish(RunOutcome::Completed))
    }

    /// 生成一条音轨并落盘
    ///
    /// 推理或写盘失败都只记录，返回 None
    async fn generate_track(
        &self,
        engine: &dyn InferenceEnginePort,
        kind: InferenceKind,
        prompt: &Prompt,
        path: &Path,
        report: &mut RunReport,
    ) -> Option<PathBuf> {
        let (stage, label) = match kind {
            InferenceKind::Music => (Stage::Music, "Music"),
            InferenceKind::Voiceover => (Stage::Voiceover, "Voiceover"),
        };

        self.emit(
            report,
            stage,
            EventStatus::Info,
            format!("Generating {} for prompt: '{}'...", kind, prompt),
        );

        let result = match engine.generate(kind, prompt).await {
            Ok(audio) => self
                .storage
                .save(path, &audio)
                .await
                .map_err(ApplicationError::from),
            Err(e) => Err(ApplicationError::from(e)),
        };

        match result {
            Ok(saved) => {
                self.emit(
                    report,
                    stage,
                    EventStatus::Success,
                    format!("{} successfully generated and saved to {}", label, path.display()),
                );
                Some(saved)
            }
            Err(e) => {
                tracing::error!(kind = %kind, error = %e, "Generation failed, continuing");
                let message = match e {
                    ApplicationError::Inference(inner) => inner.to_string(),
                    other => other.to_string(),
                };
                self.emit(
                    report,
                    stage,
                    EventStatus::Failure,
                    format!("An error occurred during {} generation: {}", kind, message),
                );
                None
            }
        }
    }
}
