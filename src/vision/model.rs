use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use ort::session::{Session, builder::GraphOptimizationLevel};
use regex::Regex;

/// 加载YOLO模型
///
/// 加载ONNX格式的YOLO模型，并应用优化配置。
///
/// # 参数
/// * `model_path` - 模型文件路径
///
/// # 返回值
/// 返回加载的Session对象
///
/// # 错误处理
/// 如果模型加载失败会返回Err
///
/// # 示例
///
/// ```no_run
/// use yolo_annotate::vision::model::load_model;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let model = load_model("path/to/model.onnx")?;
/// # Ok(())
/// # }
/// ```
pub fn load_model(model_path: impl AsRef<Path>) -> Result<Session, ort::Error> {
    let model = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(4)?
        .commit_from_file(model_path)?;
    Ok(model)
}

/// 类别ID到类别名称的映射
///
/// Ultralytics 导出的 ONNX 模型会在自定义元数据 `names` 中写入
/// `{0: 'person', 1: 'bicycle', ...}`，这里将其解析出来。
/// 没有名称的类别以数字ID显示。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassNames {
    names: BTreeMap<usize, String>,
}

fn names_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(\d+)\s*:\s*(?:'([^']*)'|"([^"]*)")"#).expect("names pattern is valid")
    })
}

impl ClassNames {
    /// 从模型元数据读取类别名称，缺失时返回空表
    pub fn from_session(session: &Session) -> Result<Self, ort::Error> {
        let metadata = session.metadata()?;
        let names = metadata.custom("names")?;
        Ok(names.map(|raw| Self::parse(&raw)).unwrap_or_default())
    }

    /// 解析元数据中的 `names` 字符串
    ///
    /// ```
    /// use yolo_annotate::vision::model::ClassNames;
    ///
    /// let names = ClassNames::parse("{0: 'person', 1: \"traffic light\"}");
    /// assert_eq!(names.get(0), "person");
    /// assert_eq!(names.get(1), "traffic light");
    /// assert_eq!(names.get(7), "7");
    /// ```
    pub fn parse(raw: &str) -> Self {
        let names = names_pattern()
            .captures_iter(raw)
            .filter_map(|caps| {
                let id = caps.get(1)?.as_str().parse().ok()?;
                let name = caps.get(2).or_else(|| caps.get(3))?.as_str().to_string();
                Some((id, name))
            })
            .collect();
        Self { names }
    }

    pub fn get(&self, class_id: usize) -> Cow<'_, str> {
        match self.names.get(&class_id) {
            Some(name) => Cow::Borrowed(name.as_str()),
            None => Cow::Owned(class_id.to_string()),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ClassNames {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).enumerate().collect(),
        }
    }
}
