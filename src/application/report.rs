//! Run Report - 一次运行的结果记录
//!
//! 控制台输出是唯一的进度信号，这里把同样的信息结构化保存下来

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// 流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Credential,
    Music,
    Voiceover,
    SourceCheck,
    Video,
    Combine,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Credential => write!(f, "credential"),
            Stage::Music => write!(f, "music"),
            Stage::Voiceover => write!(f, "voiceover"),
            Stage::SourceCheck => write!(f, "source-check"),
            Stage::Video => write!(f, "video"),
            Stage::Combine => write!(f, "combine"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Info,
    Success,
    Failure,
}

/// 一行控制台输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageEvent {
    pub stage: Stage,
    pub status: EventStatus,
    pub message: String,
}

/// 运行的终止状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// 最终视频已生成（可能只包含部分音轨）
    Completed,
    /// 令牌为空或仍是占位符
    CredentialRejected,
    /// 图片或视频源文件不存在
    SourceMissing,
    /// 两条音轨都没有生成成功
    NothingToCombine,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcome: Option<RunOutcome>,
    pub events: Vec<StageEvent>,
    pub music_path: Option<PathBuf>,
    pub voiceover_path: Option<PathBuf>,
    pub video_path: Option<PathBuf>,
    pub final_output: Option<PathBuf>,
}

impl RunReport {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            outcome: None,
            events: Vec::new(),
            music_path: None,
            voiceover_path: None,
            video_path: None,
            final_output: None,
        }
    }

    pub fn push(&mut self, stage: Stage, status: EventStatus, message: impl Into<String>) -> &StageEvent {
        self.events.push(StageEvent {
            stage,
            status,
            message: message.into(),
        });
        &self.events[self.events.len() - 1]
    }

    pub fn finish(mut self, outcome: RunOutcome) -> Self {
        self.finished_at = Some(Utc::now());
        self.outcome = Some(outcome);
        self
    }

    pub fn success_lines(&self) -> Vec<&str> {
        self.lines_with(EventStatus::Success)
    }

    pub fn failure_lines(&self) -> Vec<&str> {
        self.lines_with(EventStatus::Failure)
    }

    fn lines_with(&self, status: EventStatus) -> Vec<&str> {
        self.events
            .iter()
            .filter(|e| e.status == status)
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn event(&self, stage: Stage, status: EventStatus) -> Option<&StageEvent> {
        self.events
            .iter()
            .find(|e| e.stage == stage && e.status == status)
    }

    /// 运行耗时（毫秒）
    pub fn elapsed_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }
}
