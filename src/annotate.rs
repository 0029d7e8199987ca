//! 逐帧标注循环
//!
//! 读帧 → 推理 → 按阈值过滤 → 绘制 → 显示/录制 → 处理按键，直到视频结束或按下退出键。
//! 单线程同步执行，只有暂停状态会阻塞等待按键。

use std::time::Instant;

use image::RgbImage;
use log::{debug, info, warn};

use crate::config::{KEY_POLL_MS, RunConfig};
use crate::error::Result;
use crate::fps::FpsSamples;
use crate::video::{Display, FrameSink, FrameSource};
use crate::vision::detect::Detector;
use crate::vision::draw::Overlay;
use crate::vision::prevs::resize_image;

/// 循环状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Paused,
    Terminated,
}

/// 按键对应的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Pause,
    Snapshot,
    Ignore,
}

impl KeyAction {
    /// `q` 退出，`s` 暂停，`p` 保存截图，大小写均可
    pub fn from_key(key: char) -> Self {
        match key {
            'q' | 'Q' => Self::Quit,
            's' | 'S' => Self::Pause,
            'p' | 'P' => Self::Snapshot,
            _ => Self::Ignore,
        }
    }
}

/// 一次运行的统计结果
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// 处理的帧数
    pub frames: usize,
    /// 所有帧绘制的目标总数
    pub objects: usize,
    /// 保存截图的次数
    pub snapshots: usize,
    /// 平均帧率，没有处理任何帧时为 `None`
    pub average_fps: Option<f64>,
}

impl RunSummary {
    /// 结束时打印的一行帧率信息
    ///
    /// ```
    /// use yolo_annotate::annotate::RunSummary;
    ///
    /// let mut summary = RunSummary { frames: 0, objects: 0, snapshots: 0, average_fps: None };
    /// assert_eq!(summary.fps_line(), "Average FPS: not computed (no frames processed)");
    /// summary.average_fps = Some(24.456);
    /// assert_eq!(summary.fps_line(), "Average FPS: 24.46");
    /// ```
    pub fn fps_line(&self) -> String {
        match self.average_fps {
            Some(fps) => format!("Average FPS: {:.2}", fps),
            None => "Average FPS: not computed (no frames processed)".to_string(),
        }
    }
}

/// 逐帧标注循环
///
/// 独占视频来源、显示窗口与可选的录制句柄，`run` 结束时统一释放；
/// 出错提前返回时在 `Drop` 中释放。
pub struct FrameLoop<D, S, V, W>
where
    D: Detector,
    S: FrameSource,
    V: Display,
    W: FrameSink,
{
    config: RunConfig,
    detector: D,
    source: S,
    display: V,
    recorder: Option<W>,
    fps: FpsSamples,
    state: LoopState,
    frames: usize,
    objects: usize,
    snapshots: usize,
    released: bool,
}

impl<D, S, V, W> FrameLoop<D, S, V, W>
where
    D: Detector,
    S: FrameSource,
    V: Display,
    W: FrameSink,
{
    pub fn new(config: RunConfig, detector: D, source: S, display: V, recorder: Option<W>) -> Self {
        Self {
            config,
            detector,
            source,
            display,
            recorder,
            fps: FpsSamples::new(),
            state: LoopState::Running,
            frames: 0,
            objects: 0,
            snapshots: 0,
            released: false,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn fps(&self) -> &FpsSamples {
        &self.fps
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn display(&self) -> &V {
        &self.display
    }

    pub fn recorder(&self) -> Option<&W> {
        self.recorder.as_ref()
    }

    /// 运行到视频结束或按下退出键，释放资源并返回统计结果
    pub fn run(&mut self) -> Result<RunSummary> {
        while self.state != LoopState::Terminated {
            match self.state {
                LoopState::Running => self.step()?,
                LoopState::Paused => {
                    // 任意按键继续
                    self.display.wait_key()?;
                    info!("Resumed");
                    self.state = LoopState::Running;
                }
                LoopState::Terminated => {}
            }
        }

        self.shutdown()?;
        Ok(self.summary())
    }

    /// 处理一帧
    pub fn step(&mut self) -> Result<()> {
        let start = Instant::now();

        let Some(frame) = self.source.next_frame()? else {
            info!("End of video.");
            self.state = LoopState::Terminated;
            return Ok(());
        };

        let mut frame = match self.config.resolution {
            Some(res) => resize_image(&frame, res.width, res.height),
            None => frame,
        };

        let detections = self.detector.detect(&frame)?;

        let mut overlay = Overlay::new(&frame);
        let detector = &self.detector;
        let object_count = overlay.draw_detections(
            &detections,
            self.config.confidence_threshold,
            move |class_id| detector.class_name(class_id),
        );

        let fps = self.fps.record(start.elapsed());
        overlay.draw_status(fps, object_count);
        overlay.write_to(&mut frame);

        self.frames += 1;
        self.objects += object_count;
        debug!(
            "Frame {}: {} detections, {} drawn, {:.2} FPS",
            self.frames,
            detections.len(),
            object_count,
            fps
        );

        self.display.show(&frame)?;

        if let Some(recorder) = self.recorder.as_mut() {
            recorder.write(&frame)?;
        }

        if let Some(key) = self.display.poll_key(KEY_POLL_MS)? {
            self.handle_key(key, &frame)?;
        }

        Ok(())
    }

    fn handle_key(&mut self, key: char, frame: &RgbImage) -> Result<()> {
        match KeyAction::from_key(key) {
            KeyAction::Quit => {
                info!("Quit requested at frame {}", self.frames);
                self.state = LoopState::Terminated;
            }
            KeyAction::Pause => {
                info!("Paused at frame {}, press any key to resume", self.frames);
                self.state = LoopState::Paused;
            }
            KeyAction::Snapshot => {
                frame.save(&self.config.snapshot_path)?;
                self.snapshots += 1;
                info!(
                    "Saved frame {} to {}",
                    self.frames,
                    self.config.snapshot_path.display()
                );
            }
            KeyAction::Ignore => {}
        }
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        // 每个资源都要尝试释放，返回第一个错误
        let source = self.source.release();
        let recorder = match self.recorder.as_mut() {
            Some(recorder) => recorder.release(),
            None => Ok(()),
        };
        let display = self.display.close();
        source.and(recorder).and(display)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            frames: self.frames,
            objects: self.objects,
            snapshots: self.snapshots,
            average_fps: self.fps.mean(),
        }
    }
}

impl<D, S, V, W> Drop for FrameLoop<D, S, V, W>
where
    D: Detector,
    S: FrameSource,
    V: Display,
    W: FrameSink,
{
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("Failed to release resources: {}", e);
        }
    }
}
