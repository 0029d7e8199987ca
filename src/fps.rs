use std::time::Duration;

/// 逐帧瞬时帧率的记录，只追加，结束时求平均
#[derive(Debug, Clone, Default)]
pub struct FpsSamples {
    samples: Vec<f64>,
}

impl FpsSamples {
    pub fn new() -> Self {
        Self::default()
    }

    /// 根据单帧耗时记录一次瞬时帧率并返回该值
    ///
    /// 耗时为零时按 1ns 计算，避免出现无穷大。
    pub fn record(&mut self, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64().max(1e-9);
        let fps = 1.0 / secs;
        self.samples.push(fps);
        fps
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    /// 所有样本的算术平均值；没有处理任何帧时返回 `None`
    ///
    /// ```
    /// use std::time::Duration;
    /// use yolo_annotate::fps::FpsSamples;
    ///
    /// let mut fps = FpsSamples::new();
    /// assert_eq!(fps.mean(), None);
    /// fps.record(Duration::from_millis(100));
    /// fps.record(Duration::from_millis(50));
    /// assert!((fps.mean().unwrap() - 15.0).abs() < 1e-9);
    /// ```
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }
}
