use ndarray::{Array2, Array4};
use ort::{inputs, session::Session};

use crate::config::MODEL_INPUT_NAME;
use crate::error::{AnnotateError, Result};
use crate::vision::array::to_input;

/// 模型输出的排布方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLayout {
    /// 原始输出 `[1, 4 + nc, anchors]`，每列为 cx, cy, w, h 与各类别得分
    Raw,
    /// 端到端输出 `[1, N, 6]`，每行为 x1, y1, x2, y2, conf, class_id，已做过NMS
    EndToEnd,
}

/// 统一为“每行一个候选框”的模型输出
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceOutput {
    pub rows: Array2<f32>,
    pub layout: OutputLayout,
}

impl InferenceOutput {
    /// 根据三维输出的形状判断排布并转为每行一个候选框
    ///
    /// 原始输出的通道数远小于锚框数量，据此区分两种排布。
    pub fn from_raw_output(shape: &[usize], data: Vec<f32>) -> Result<Self> {
        if shape.len() != 3 || shape[0] != 1 {
            return Err(AnnotateError::inference(format!(
                "unexpected output shape {:?}",
                shape
            )));
        }
        let (dim1, dim2) = (shape[1], shape[2]);
        let matrix = Array2::from_shape_vec((dim1, dim2), data)
            .map_err(|e| AnnotateError::inference(e.to_string()))?;

        if dim2 == 6 && dim1 > dim2 {
            return Ok(Self {
                rows: matrix,
                layout: OutputLayout::EndToEnd,
            });
        }
        if dim1 < 5 {
            return Err(AnnotateError::inference(format!(
                "unexpected output shape {:?}",
                shape
            )));
        }
        Ok(Self {
            rows: matrix.reversed_axes().as_standard_layout().to_owned(),
            layout: OutputLayout::Raw,
        })
    }

    pub fn num_candidates(&self) -> usize {
        self.rows.nrows()
    }
}

/// 运行模型推理
///
/// # 参数
/// * `model` - ONNX模型Session
/// * `input` - 输入张量，形状应为(1, 3, height, width)
///
/// # 返回值
/// 返回每行一个候选框的输出矩阵及其排布
pub fn run_inference(model: &mut Session, input: &Array4<f32>) -> Result<InferenceOutput> {
    let input_tensor = to_input(input)?;
    let outputs = model.run(inputs![MODEL_INPUT_NAME => input_tensor])?;

    let output = outputs[0].try_extract_tensor::<f32>()?;
    let shape: Vec<usize> = output.0.iter().map(|&d| d.max(0) as usize).collect();
    let data = output.1.to_vec();

    InferenceOutput::from_raw_output(&shape, data)
}
