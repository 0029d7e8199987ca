//! 模型输出后处理
//!
//! 负责坐标转换、置信度下限过滤与按类别的非极大值抑制(NMS)。

use ndarray::Axis;

use crate::vision::bounds::{BoundingBox, Detection};
use crate::vision::infer::{InferenceOutput, OutputLayout};

/// 原图与模型输入之间的尺寸信息
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleMessage {
    /// 原图宽度
    pub o_width: u32,
    /// 原图高度
    pub o_height: u32,
    /// 模型输入宽度
    pub s_width: usize,
    /// 模型输入高度
    pub s_height: usize,
}

impl ScaleMessage {
    fn factors(&self) -> (f32, f32) {
        (
            self.o_width as f32 / self.s_width as f32,
            self.o_height as f32 / self.s_height as f32,
        )
    }
}

/// 处理模型输出，应用置信度下限和NMS阈值
///
/// # 参数
/// * `output` - 每行一个候选框的模型输出
/// * `message` - 原图与模型输入的尺寸
/// * `confidence_threshold` - 置信度下限
/// * `nms_threshold` - NMS阈值
///
/// # 返回值
/// 返回按置信度降序排列、坐标位于原图范围内的检测结果
///
/// # 示例
///
/// ```
/// use ndarray::array;
/// use yolo_annotate::vision::infer::{InferenceOutput, OutputLayout};
/// use yolo_annotate::vision::posts::{ScaleMessage, process_detections};
///
/// // 一个候选框，cx=320 cy=320 w=64 h=64，单类别得分 0.9
/// let output = InferenceOutput {
///     rows: array![[320.0, 320.0, 64.0, 64.0, 0.9]],
///     layout: OutputLayout::Raw,
/// };
/// let message = ScaleMessage { o_width: 1280, o_height: 640, s_width: 640, s_height: 640 };
/// let detections = process_detections(&output, &message, 0.25, 0.7);
/// assert_eq!(detections.len(), 1);
/// assert_eq!(detections[0].bbox.x1, 576.0);
/// ```
pub fn process_detections(
    output: &InferenceOutput,
    message: &ScaleMessage,
    confidence_threshold: f32,
    nms_threshold: f32,
) -> Vec<Detection> {
    let mut detections = match output.layout {
        OutputLayout::Raw => decode_raw(output, confidence_threshold),
        OutputLayout::EndToEnd => decode_end_to_end(output, confidence_threshold),
    };

    let (scale_x, scale_y) = message.factors();
    let (max_x, max_y) = (message.o_width as f32, message.o_height as f32);
    for detection in detections.iter_mut() {
        detection.bbox = detection.bbox.scale(scale_x, scale_y).clamp(max_x, max_y);
    }
    detections.retain(|d| d.bbox.is_valid());

    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    match output.layout {
        OutputLayout::Raw => apply_nms(&detections, nms_threshold),
        OutputLayout::EndToEnd => detections,
    }
}

fn decode_raw(output: &InferenceOutput, confidence_threshold: f32) -> Vec<Detection> {
    let mut detections = Vec::new();

    for row in output.rows.axis_iter(Axis(0)) {
        // 取得分最高的类别
        let (class_id, confidence) = row
            .iter()
            .skip(4)
            .copied()
            .enumerate()
            .fold((0, f32::MIN), |best, (id, score)| {
                if score > best.1 { (id, score) } else { best }
            });

        if confidence < confidence_threshold {
            continue;
        }

        detections.push(Detection::new(
            BoundingBox::from_center(row[0], row[1], row[2], row[3]),
            class_id,
            confidence,
        ));
    }

    detections
}

fn decode_end_to_end(output: &InferenceOutput, confidence_threshold: f32) -> Vec<Detection> {
    output
        .rows
        .axis_iter(Axis(0))
        .filter(|row| row[4] >= confidence_threshold)
        .map(|row| {
            Detection::new(
                BoundingBox::new(row[0], row[1], row[2], row[3]),
                row[5].max(0.0) as usize,
                row[4],
            )
        })
        .collect()
}

/// 应用非极大值抑制
///
/// 输入需已按置信度降序排列。只在同类别之间抑制，
/// 与已保留框的IoU达到阈值的框被丢弃。
pub fn apply_nms(detections: &[Detection], nms_threshold: f32) -> Vec<Detection> {
    let mut result: Vec<Detection> = Vec::new();
    let mut suppressed = vec![false; detections.len()];

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }
        let kept = &detections[i];
        result.push(kept.clone());

        for j in (i + 1)..detections.len() {
            if suppressed[j] || detections[j].class_id != kept.class_id {
                continue;
            }
            if kept.bbox.iou(&detections[j].bbox) >= nms_threshold {
                suppressed[j] = true;
            }
        }
    }

    result
}
