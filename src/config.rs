use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AnnotateError;

// 目标检测超参数配置
pub const DEFAULT_INPUT_WIDTH: usize = 640;
pub const DEFAULT_INPUT_HEIGHT: usize = 640;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;
pub const DEFAULT_MODEL_CONFIDENCE: f32 = 0.25; // 模型内部的下限，用户阈值在绘制时再过滤
pub const DEFAULT_NMS_THRESHOLD: f32 = 0.7;
pub const MODEL_INPUT_NAME: &str = "images";

// 输出文件
pub const DEFAULT_RECORD_PATH: &str = "demo1.avi";
pub const DEFAULT_SNAPSHOT_PATH: &str = "capture.png";
pub const RECORD_FPS: f64 = 30.0;
pub const RECORD_FOURCC: [char; 4] = ['M', 'J', 'P', 'G'];

// 显示窗口
pub const WINDOW_NAME: &str = "YOLO Detection";
pub const KEY_POLL_MS: i32 = 1;

/// 检测框调色板（RGB），按 `class_id % PALETTE.len()` 取色
pub const PALETTE: [[u8; 3]; 4] = [
    [0, 0, 255],   // 蓝
    [0, 255, 0],   // 绿
    [255, 0, 0],   // 红
    [0, 255, 255], // 青
];
pub const STATUS_COLOR: [u8; 3] = [255, 255, 0];
pub const BOX_THICKNESS: f32 = 2.0;
pub const LABEL_OFFSET: i32 = 10;
pub const FPS_TEXT_ORIGIN: (i32, i32) = (10, 20);
pub const COUNT_TEXT_ORIGIN: (i32, i32) = (10, 45);

/// 输出分辨率，由 `WxH` 字符串解析得到
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl FromStr for Resolution {
    type Err = AnnotateError;

    /// 解析 `640x480` 格式，`x` 大小写均可，宽高必须为正整数
    ///
    /// ```
    /// use yolo_annotate::config::Resolution;
    ///
    /// let res: Resolution = "1280X720".parse().unwrap();
    /// assert_eq!((res.width, res.height), (1280, 720));
    /// assert!("640x".parse::<Resolution>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AnnotateError::InvalidResolution(s.to_string());
        let lower = s.trim().to_ascii_lowercase();
        let (w, h) = lower.split_once('x').ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// 一次运行的全部配置，解析后不再修改
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub model_path: PathBuf,
    pub source_path: PathBuf,
    pub confidence_threshold: f32,
    pub resolution: Option<Resolution>,
    pub record: bool,
    pub record_path: PathBuf,
    pub snapshot_path: PathBuf,
}

impl RunConfig {
    /// 使用默认阈值与输出路径创建配置，不做任何文件检查
    pub fn new(model_path: impl Into<PathBuf>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            source_path: source_path.into(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            resolution: None,
            record: false,
            record_path: PathBuf::from(DEFAULT_RECORD_PATH),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
        }
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = path.into();
        self
    }

    pub fn with_record(mut self, record: bool) -> Self {
        self.record = record;
        self
    }
}
