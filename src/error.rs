//! 错误类型定义

use std::path::PathBuf;

use thiserror::Error;

/// 本库统一使用的 Result 别名
pub type Result<T> = std::result::Result<T, AnnotateError>;

/// 运行过程中可能出现的错误
///
/// 前五种属于配置错误，在打开任何资源之前就会返回；其余错误来自逐帧循环，
/// 出现即终止运行。
#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("Model file not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    #[error("Video file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Invalid resolution format {0:?}. Use WxH, e.g., 640x480")]
    InvalidResolution(String),

    #[error("Invalid confidence threshold {0}. Use a number, e.g., 0.5")]
    InvalidThreshold(f32),

    #[error("Recording requires --resolution to be set.")]
    RecordWithoutResolution,

    #[error("Failed to open video: {}", .0.display())]
    SourceOpen(PathBuf),

    #[error("Failed to open video writer: {}", .0.display())]
    RecorderOpen(PathBuf),

    #[error("Recorder expects {expected:?} frames, got {actual:?}")]
    FrameSize {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Frame conversion failed: {0}")]
    Frame(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Model error: {0}")]
    Model(#[from] ort::Error),

    #[error("Video error: {0}")]
    Video(#[from] opencv::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnnotateError {
    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Self::Inference(msg.into())
    }

    /// 是否属于启动前的配置错误
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ModelNotFound(_)
                | Self::SourceNotFound(_)
                | Self::InvalidResolution(_)
                | Self::InvalidThreshold(_)
                | Self::RecordWithoutResolution
        )
    }
}
