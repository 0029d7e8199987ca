pub mod annotate;
pub mod cli;
pub mod config;
pub mod error;
pub mod fps;
pub mod video;
pub mod vision;

// 重新导出常用类型和函数
pub use annotate::{FrameLoop, KeyAction, LoopState, RunSummary};
pub use config::{Resolution, RunConfig};
pub use error::{AnnotateError, Result};
pub use vision::{BoundingBox, Detection, Detector, YoloDetector, draw_detections};
pub use vision::{image_to_tensor, resize_image};
pub use vision::{ClassNames, load_model};
