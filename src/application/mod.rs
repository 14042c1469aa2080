//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（InferenceEngine、MediaTool、ArtifactStorage）
//! - orchestrator: 五阶段顺序流水线
//! - report: 运行结果记录
//! - error: 应用层错误定义

pub mod error;
pub mod orchestrator;
pub mod ports;
pub mod report;

pub use error::ApplicationError;
pub use orchestrator::RunOrchestrator;
pub use report::{EventStatus, RunOutcome, RunReport, Stage, StageEvent};

pub use ports::{
    // Artifact storage
    ArtifactStoragePort,
    StorageError,
    // Inference engine
    InferenceEngineFactory,
    InferenceEnginePort,
    InferenceError,
    InferenceKind,
    // Media tool
    MediaError,
    MediaInfo,
    MediaToolPort,
    StreamInfo,
    StreamKind,
};
