//! HTTP Inference Client - 调用远程推理服务
//!
//! 实现 InferenceEnginePort trait，通过 HTTP 调用两个固定的模型地址
//!
//! 推理 API:
//! POST <model endpoint>
//! Header: Authorization: Bearer <token>
//! Request: {"inputs": "..."}  (JSON)
//! Response: 原始音频字节（音乐为 MP3，语音为 WAV）

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{
    InferenceEngineFactory, InferenceEnginePort, InferenceError, InferenceKind,
};
use crate::config::InferenceConfig;
use crate::domain::{Credential, Prompt};

/// 推理请求体 (JSON)
#[derive(Debug, Serialize)]
struct InferenceHttpRequest<'a> {
    inputs: &'a str,
}

/// HTTP 推理客户端配置
#[derive(Debug, Clone)]
pub struct HttpInferenceClientConfig {
    /// 音乐生成模型地址
    pub music_endpoint: String,
    /// 语音合成模型地址
    pub tts_endpoint: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpInferenceClientConfig {
    fn default() -> Self {
        InferenceConfig::default().into()
    }
}

impl From<&InferenceConfig> for HttpInferenceClientConfig {
    fn from(config: &InferenceConfig) -> Self {
        Self {
            music_endpoint: config.music_endpoint.clone(),
            tts_endpoint: config.tts_endpoint.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

impl From<InferenceConfig> for HttpInferenceClientConfig {
    fn from(config: InferenceConfig) -> Self {
        Self::from(&config)
    }
}

impl HttpInferenceClientConfig {
    pub fn new(music_endpoint: impl Into<String>, tts_endpoint: impl Into<String>) -> Self {
        Self {
            music_endpoint: music_endpoint.into(),
            tts_endpoint: tts_endpoint.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 推理客户端
///
/// 内部持有一个 reqwest::Client，两次推理调用复用同一连接池
pub struct HttpInferenceClient {
    client: Client,
    config: HttpInferenceClientConfig,
    credential: Credential,
}

impl HttpInferenceClient {
    /// 创建新的 HTTP 推理客户端
    pub fn new(
        config: HttpInferenceClientConfig,
        credential: Credential,
    ) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InferenceError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            config,
            credential,
        })
    }

    fn endpoint(&self, kind: InferenceKind) -> &str {
        match kind {
            InferenceKind::Music => &self.config.music_endpoint,
            InferenceKind::Voiceover => &self.config.tts_endpoint,
        }
    }

    async fn post_prompt(
        &self,
        kind: InferenceKind,
        prompt: &Prompt,
    ) -> Result<Vec<u8>, InferenceError> {
        let url = self.endpoint(kind);
        let result = self.send(url, prompt).await;
        if let Err(e) = &result {
            tracing::error!(kind = %kind, url = %url, error = %e, "Inference request failed");
        }
        result
    }

    async fn send(&self, url: &str, prompt: &Prompt) -> Result<Vec<u8>, InferenceError> {
        let body = InferenceHttpRequest {
            inputs: prompt.as_str(),
        };

        tracing::debug!(
            url = %url,
            prompt_len = prompt.len(),
            "Sending inference request"
        );

        let response = self
            .client
            .post(url)
            .bearer_auth(self.credential.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InferenceError::Timeout
                } else if e.is_connect() {
                    InferenceError::NetworkError(format!(
                        "Cannot connect to inference service: {}",
                        e
                    ))
                } else {
                    InferenceError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| InferenceError::InvalidResponse(format!("Failed to read audio: {}", e)))?
            .to_vec();

        if audio_data.is_empty() {
            return Err(InferenceError::EmptyResponse(url.to_string()));
        }

        tracing::info!(
            url = %url,
            audio_size = audio_data.len(),
            "Inference completed"
        );

        Ok(audio_data)
    }
}

#[async_trait]
impl InferenceEnginePort for HttpInferenceClient {
    async fn generate_music(&self, prompt: &Prompt) -> Result<Vec<u8>, InferenceError> {
        self.post_prompt(InferenceKind::Music, prompt).await
    }

    async fn generate_voiceover(&self, prompt: &Prompt) -> Result<Vec<u8>, InferenceError> {
        self.post_prompt(InferenceKind::Voiceover, prompt).await
    }
}

/// 每次运行创建一个 HttpInferenceClient
#[derive(Debug, Clone)]
pub struct HttpInferenceFactory {
    config: HttpInferenceClientConfig,
}

impl HttpInferenceFactory {
    pub fn new(config: HttpInferenceClientConfig) -> Self {
        Self { config }
    }
}

impl InferenceEngineFactory for HttpInferenceFactory {
    fn connect(
        &self,
        credential: &Credential,
    ) -> Result<Box<dyn InferenceEnginePort>, InferenceError> {
        tracing::debug!(credential = %credential.redacted(), "Creating HTTP inference client");
        let client = HttpInferenceClient::new(self.config.clone(), credential.clone())?;
        Ok(Box::new(client))
    }
}
