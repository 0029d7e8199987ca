//! 命令行参数定义与校验

use std::path::PathBuf;

use clap::Parser;

use crate::config::{
    DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_RECORD_PATH, DEFAULT_SNAPSHOT_PATH, Resolution,
    RunConfig,
};
use crate::error::{AnnotateError, Result};

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Run a YOLO model over a video file and display the annotated frames"
)]
pub struct Args {
    /// Path to YOLO model file (e.g. best.onnx).
    #[arg(long)]
    pub model: PathBuf,

    /// Path to video file (e.g. video.mp4).
    #[arg(long)]
    pub source: PathBuf,

    /// Minimum confidence threshold.
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE_THRESHOLD)]
    pub thresh: f32,

    /// Resolution in WxH format (e.g. 640x480).
    #[arg(long)]
    pub resolution: Option<String>,

    /// Save output video (requires --resolution).
    #[arg(long)]
    pub record: bool,

    /// Where the recorded video is written.
    #[arg(long, default_value = DEFAULT_RECORD_PATH)]
    pub record_path: PathBuf,

    /// Where the snapshot key writes the current frame.
    #[arg(long, default_value = DEFAULT_SNAPSHOT_PATH)]
    pub snapshot_path: PathBuf,
}

impl Args {
    /// 校验参数并生成 [`RunConfig`]
    ///
    /// 检查顺序：模型文件、视频文件、阈值、分辨率、录制开关。
    /// 任何一步失败都不会打开资源或创建输出文件。
    pub fn into_run_config(self) -> Result<RunConfig> {
        if !self.model.exists() {
            return Err(AnnotateError::ModelNotFound(self.model));
        }
        if !self.source.is_file() {
            return Err(AnnotateError::SourceNotFound(self.source));
        }
        // 任意数值都可作为阈值，超出 [0, 1] 只是全部画出或全部不画
        if self.thresh.is_nan() {
            return Err(AnnotateError::InvalidThreshold(self.thresh));
        }

        let resolution = self
            .resolution
            .as_deref()
            .map(str::parse::<Resolution>)
            .transpose()?;

        if self.record && resolution.is_none() {
            return Err(AnnotateError::RecordWithoutResolution);
        }

        Ok(RunConfig {
            model_path: self.model,
            source_path: self.source,
            confidence_threshold: self.thresh,
            resolution,
            record: self.record,
            record_path: self.record_path,
            snapshot_path: self.snapshot_path,
        })
    }
}
