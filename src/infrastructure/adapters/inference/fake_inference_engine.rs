//! Fake Inference Engine - 用于测试的推理引擎
//!
//! 不发起网络请求，按配置返回固定音频或模拟的 HTTP 错误

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::application::ports::{
    InferenceEngineFactory, InferenceEnginePort, InferenceError, InferenceKind,
};
use crate::domain::{Credential, Prompt};

/// 单个推理调用的预设结果
#[derive(Debug, Clone)]
pub enum FakeOutcome {
    /// 返回这些音频字节
    Audio(Vec<u8>),
    /// 以该状态码失败
    Status(u16),
}

impl FakeOutcome {
    fn resolve(&self) -> Result<Vec<u8>, InferenceError> {
        match self {
            FakeOutcome::Audio(data) => Ok(data.clone()),
            FakeOutcome::Status(status) => Err(InferenceError::Status {
                status: *status,
                body: "fake failure".to_string(),
            }),
        }
    }
}

/// Fake Inference Engine 配置
#[derive(Debug, Clone)]
pub struct FakeInferenceConfig {
    pub music: FakeOutcome,
    pub voiceover: FakeOutcome,
}

impl Default for FakeInferenceConfig {
    fn default() -> Self {
        Self {
            music: FakeOutcome::Audio(b"ID3fake-mp3".to_vec()),
            voiceover: FakeOutcome::Audio(b"RIFFfake-wav".to_vec()),
        }
    }
}

/// Fake Inference Engine
pub struct FakeInferenceEngine {
    config: FakeInferenceConfig,
    calls: Arc<AtomicUsize>,
}

impl FakeInferenceEngine {
    pub fn new(config: FakeInferenceConfig) -> Self {
        Self {
            config,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 已处理的推理调用次数
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond(&self, kind: InferenceKind, prompt: &Prompt) -> Result<Vec<u8>, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(kind = %kind, prompt_len = prompt.len(), "FakeInferenceEngine: returning preset outcome");
        match kind {
            InferenceKind::Music => self.config.music.resolve(),
            InferenceKind::Voiceover => self.config.voiceover.resolve(),
        }
    }
}

#[async_trait]
impl InferenceEnginePort for FakeInferenceEngine {
    async fn generate_music(&self, prompt: &Prompt) -> Result<Vec<u8>, InferenceError> {
        self.respond(InferenceKind::Music, prompt)
    }

    async fn generate_voiceover(&self, prompt: &Prompt) -> Result<Vec<u8>, InferenceError> {
        self.respond(InferenceKind::Voiceover, prompt)
    }
}

/// 统计 connect 与推理调用次数的工厂
#[derive(Debug, Clone, Default)]
pub struct FakeInferenceFactory {
    config: FakeInferenceConfig,
    connects: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl FakeInferenceFactory {
    pub fn new(config: FakeInferenceConfig) -> Self {
        Self {
            config,
            connects: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// 所有引擎实例累计的推理调用次数
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl InferenceEngineFactory for FakeInferenceFactory {
    fn connect(
        &self,
        _credential: &Credential,
    ) -> Result<Box<dyn InferenceEnginePort>, InferenceError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeInferenceEngine {
            config: self.config.clone(),
            calls: self.calls.clone(),
        }))
    }
}
