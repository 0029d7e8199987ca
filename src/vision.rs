//! Vision模块 - 基于YOLO的目标检测与结果绘制
//!
//! 该模块提供一整套检测功能，包括：
//! - 模型加载与类别名称读取
//! - 图像预处理
//! - 模型推理
//! - 结果后处理
//! - 可视化绘制
//!
//! # 工作流程
//!
//! 1. 使用 `YoloDetector::from_path` 加载ONNX模型
//! 2. 调用 `detect` 得到一帧的检测结果
//! 3. 使用 `Overlay` 按阈值绘制检测框与标签
//!
//! # 示例
//!
//! ```no_run
//! use yolo_annotate::vision::{Detector, Overlay, YoloDetector};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut detector = YoloDetector::from_path("path/to/model.onnx")?;
//! let mut frame = image::RgbImage::new(640, 480);
//!
//! let detections = detector.detect(&frame)?;
//! let mut overlay = Overlay::new(&frame);
//! let count = overlay.draw_detections(&detections, 0.5, |id| detector.class_name(id));
//! overlay.write_to(&mut frame);
//! # Ok(())
//! # }
//! ```

pub mod array;
pub mod bounds;
pub mod detect;
pub mod draw;
pub mod font;
pub mod infer;
pub mod model;
pub mod posts;
pub mod prevs;

pub use bounds::{BoundingBox, Detection};
pub use detect::{Detector, YoloDetector};
pub use draw::{Overlay, class_color, draw_detections, label_text};
pub use model::{ClassNames, load_model};
pub use prevs::{image_to_tensor, resize_image};
