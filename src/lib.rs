//! Aura Media - 音乐与旁白生成、视频合成自动化
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Credential: 令牌校验（占位符拦截）
//! - Prompt: 提示文本
//!
//! 应用层 (application/):
//! - Ports: 端口定义（InferenceEngine, MediaTool, ArtifactStorage）
//! - Orchestrator: 五阶段顺序流水线
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HTTP 推理客户端、ffmpeg 媒体工具、文件存储，以及测试用的 Fake 实现

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
