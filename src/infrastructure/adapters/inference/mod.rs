//! Inference Adapter - 推理服务客户端实现

mod fake_inference_engine;
mod http_inference_client;

pub use fake_inference_engine::{
    FakeInferenceConfig, FakeInferenceEngine, FakeInferenceFactory, FakeOutcome,
};
pub use http_inference_client::*;
