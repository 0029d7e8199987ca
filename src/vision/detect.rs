use std::borrow::Cow;
use std::path::Path;
use std::time::Instant;

use image::RgbImage;
use log::{debug, warn};
use ort::session::Session;

use crate::config::{
    DEFAULT_INPUT_HEIGHT, DEFAULT_INPUT_WIDTH, DEFAULT_MODEL_CONFIDENCE, DEFAULT_NMS_THRESHOLD,
};
use crate::error::Result;
use crate::vision::bounds::Detection;
use crate::vision::infer::run_inference;
use crate::vision::model::{ClassNames, load_model};
use crate::vision::posts::{ScaleMessage, process_detections};
use crate::vision::prevs::{image_to_tensor, resize_image};

/// 检测模型接口
///
/// 逐帧循环只依赖这个接口：给一帧图像，返回该帧的全部检测结果，
/// 并能按类别ID查询类别名称。
pub trait Detector {
    /// 对一帧图像执行检测，坐标以该帧像素为单位
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>>;

    /// 类别名称
    fn class_name(&self, class_id: usize) -> Cow<'_, str>;
}

/// YOLO目标检测器
///
/// 封装了完整的检测流程，包括图像预处理、模型推理和结果后处理。
///
/// # 示例
///
/// ```no_run
/// use yolo_annotate::vision::detect::{Detector, YoloDetector};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut detector = YoloDetector::from_path("path/to/model.onnx")?
///     .with_confidence_threshold(0.25)
///     .with_nms_threshold(0.7);
/// let frame = image::RgbImage::new(1280, 720);
/// let detections = detector.detect(&frame)?;
/// # Ok(())
/// # }
/// ```
pub struct YoloDetector {
    /// ONNX模型会话
    model: Session,
    /// 类别名称
    names: ClassNames,
    /// 模型输入宽度
    input_width: usize,
    /// 模型输入高度
    input_height: usize,
    /// 模型置信度下限，低于此值的候选框直接丢弃
    confidence_threshold: f32,
    /// NMS（非极大值抑制）阈值，用于去除重复检测
    nms_threshold: f32,
}

impl YoloDetector {
    /// 创建新的YoloDetector实例
    ///
    /// # 参数
    /// * `model` - 已加载的ONNX模型
    /// * `names` - 类别名称表
    /// * `input_width` - 模型输入图像宽度
    /// * `input_height` - 模型输入图像高度
    pub fn new(model: Session, names: ClassNames, input_width: usize, input_height: usize) -> Self {
        Self {
            model,
            names,
            input_width,
            input_height,
            confidence_threshold: DEFAULT_MODEL_CONFIDENCE,
            nms_threshold: DEFAULT_NMS_THRESHOLD,
        }
    }

    /// 从模型文件加载检测器，类别名称取自模型元数据
    pub fn from_path(model_path: impl AsRef<Path>) -> Result<Self> {
        let model = load_model(model_path)?;
        let names = ClassNames::from_session(&model)?;
        if names.is_empty() {
            warn!("Model has no class names in its metadata, labels will show class ids");
        } else {
            debug!("Loaded model with {} class names", names.len());
        }
        Ok(Self::new(
            model,
            names,
            DEFAULT_INPUT_WIDTH,
            DEFAULT_INPUT_HEIGHT,
        ))
    }

    /// 设置置信度下限
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// 设置NMS阈值
    pub fn with_nms_threshold(mut self, threshold: f32) -> Self {
        self.nms_threshold = threshold;
        self
    }

}

impl Detector for YoloDetector {
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>> {
        let message = ScaleMessage {
            o_width: frame.width(),
            o_height: frame.height(),
            s_width: self.input_width,
            s_height: self.input_height,
        };
        let resized = resize_image(frame, self.input_width as u32, self.input_height as u32);
        let input_tensor = image_to_tensor(&resized, self.input_height, self.input_width);

        let start_time = Instant::now();
        let output = run_inference(&mut self.model, &input_tensor)?;
        debug!(
            "Inference took {:?} ({} candidates)",
            start_time.elapsed(),
            output.num_candidates()
        );

        Ok(process_detections(
            &output,
            &message,
            self.confidence_threshold,
            self.nms_threshold,
        ))
    }

    fn class_name(&self, class_id: usize) -> Cow<'_, str> {
        self.names.get(class_id)
    }
}
