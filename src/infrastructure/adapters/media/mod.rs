//! Media Adapter - 外部媒体工具实现

mod fake_media_tool;
mod ffmpeg_tool;
mod probe;

pub use fake_media_tool::{FakeMediaTool, MediaCall};
pub use ffmpeg_tool::{image_to_video_args, mux_args, probe_args, FfmpegMediaTool, FfmpegToolConfig};
pub use probe::parse_probe_output;
