//! ffprobe JSON 解析
//!
//! 只取合并音视频需要的字段

use serde::Deserialize;
use std::path::Path;

use crate::application::ports::{MediaError, MediaInfo, StreamInfo, StreamKind};

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    index: u32,
    codec_type: Option<StreamKind>,
    codec_name: Option<String>,
    /// ffprobe 以字符串输出时长
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

fn parse_duration(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// 解析 `ffprobe -show_streams -show_format -of json` 的输出
pub fn parse_probe_output(path: &Path, json: &str) -> Result<MediaInfo, MediaError> {
    let output: ProbeOutput = serde_json::from_str(json)
        .map_err(|e| MediaError::InvalidProbe(format!("{}: {}", path.display(), e)))?;

    let streams = output
        .streams
        .into_iter()
        .map(|s| StreamInfo {
            index: s.index,
            kind: s.codec_type.unwrap_or(StreamKind::Unknown),
            codec_name: s.codec_name,
            duration_secs: parse_duration(s.duration.as_deref()),
        })
        .collect();

    let duration_secs = output
        .format
        .and_then(|f| parse_duration(f.duration.as_deref()));

    Ok(MediaInfo {
        path: path.to_path_buf(),
        streams,
        duration_secs,
    })
}
