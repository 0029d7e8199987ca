//! 视频读写与显示
//!
//! 逐帧循环通过 [`FrameSource`]、[`FrameSink`]、[`Display`] 三个接口与外部交互，
//! 这里给出基于 OpenCV 的实现。每个实现都独占自己的句柄，
//! 未显式释放时在 `Drop` 中释放，任何退出路径都不会泄漏资源。

use std::path::{Path, PathBuf};

use image::RgbImage;
use log::{debug, warn};
use opencv::{
    core::{Mat, Size},
    highgui, imgproc,
    prelude::*,
    videoio::{self, VideoCapture, VideoWriter},
};

use crate::config::{RECORD_FOURCC, RECORD_FPS, Resolution};
use crate::error::{AnnotateError, Result};

/// 视频帧来源
pub trait FrameSource {
    /// 读取下一帧，视频结束时返回 `None`
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;

    /// 释放底层句柄，可重复调用
    fn release(&mut self) -> Result<()>;
}

/// 视频帧去向（录制）
pub trait FrameSink {
    fn write(&mut self, frame: &RgbImage) -> Result<()>;

    /// 释放底层句柄，可重复调用
    fn release(&mut self) -> Result<()>;
}

/// 屏幕显示与按键输入
pub trait Display {
    fn show(&mut self, frame: &RgbImage) -> Result<()>;

    /// 等待按键最多 `delay_ms` 毫秒，没有按键时返回 `None`
    fn poll_key(&mut self, delay_ms: i32) -> Result<Option<char>>;

    /// 阻塞直到有按键
    fn wait_key(&mut self) -> Result<Option<char>>;

    /// 关闭所有窗口
    fn close(&mut self) -> Result<()>;
}

/// OpenCV 的按键码转为字符，`-1` 表示没有按键
pub fn key_from_code(code: i32) -> Option<char> {
    if code < 0 {
        return None;
    }
    char::from_u32((code & 0xFF) as u32)
}

/// BGR 格式的 `Mat` 转为 RGB 图像
pub fn mat_to_rgb(mat: &Mat) -> Result<RgbImage> {
    let mut rgb_mat = Mat::default();
    imgproc::cvt_color_def(mat, &mut rgb_mat, imgproc::COLOR_BGR2RGB)?;

    let width = rgb_mat.cols() as u32;
    let height = rgb_mat.rows() as u32;
    let data = rgb_mat.data_bytes()?.to_vec();
    RgbImage::from_vec(width, height, data)
        .ok_or_else(|| AnnotateError::Frame(format!("{}x{} buffer size mismatch", width, height)))
}

/// RGB 图像转为 BGR 格式的 `Mat`
pub fn rgb_to_mat(frame: &RgbImage) -> Result<Mat> {
    let flat = Mat::from_slice(frame.as_raw().as_slice())?;
    let packed = flat.reshape(3, frame.height() as i32)?;

    let mut bgr = Mat::default();
    imgproc::cvt_color_def(&*packed, &mut bgr, imgproc::COLOR_RGB2BGR)?;
    Ok(bgr)
}

/// 基于 `VideoCapture` 的视频文件读取
pub struct CaptureSource {
    cap: VideoCapture,
    path: PathBuf,
    released: bool,
}

impl CaptureSource {
    pub fn open(path: &Path) -> Result<Self> {
        let cap = VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)?;
        if !cap.is_opened()? {
            return Err(AnnotateError::SourceOpen(path.to_path_buf()));
        }
        debug!("Opened video source {}", path.display());
        Ok(Self {
            cap,
            path: path.to_path_buf(),
            released: false,
        })
    }
}

impl FrameSource for CaptureSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        if self.released {
            return Ok(None);
        }
        let mut mat = Mat::default();
        if !self.cap.read(&mut mat)? || mat.empty() {
            return Ok(None);
        }
        mat_to_rgb(&mat).map(Some)
    }

    fn release(&mut self) -> Result<()> {
        if !self.released {
            self.released = true;
            self.cap.release()?;
            debug!("Released video source {}", self.path.display());
        }
        Ok(())
    }
}

impl Drop for CaptureSource {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("Failed to release video source: {}", e);
        }
    }
}

/// MJPG 编码、固定帧率与尺寸的视频录制
pub struct MjpgRecorder {
    writer: VideoWriter,
    path: PathBuf,
    resolution: Resolution,
    released: bool,
}

impl MjpgRecorder {
    pub fn create(path: &Path, resolution: Resolution) -> Result<Self> {
        let [a, b, c, d] = RECORD_FOURCC;
        let fourcc = VideoWriter::fourcc(a, b, c, d)?;
        let size = Size::new(resolution.width as i32, resolution.height as i32);
        let writer = VideoWriter::new(&path.to_string_lossy(), fourcc, RECORD_FPS, size, true)?;
        if !writer.is_opened()? {
            return Err(AnnotateError::RecorderOpen(path.to_path_buf()));
        }
        debug!("Recording {} to {}", resolution, path.display());
        Ok(Self {
            writer,
            path: path.to_path_buf(),
            resolution,
            released: false,
        })
    }
}

impl FrameSink for MjpgRecorder {
    fn write(&mut self, frame: &RgbImage) -> Result<()> {
        let expected = (self.resolution.width, self.resolution.height);
        if frame.dimensions() != expected {
            return Err(AnnotateError::FrameSize {
                expected,
                actual: frame.dimensions(),
            });
        }
        let mat = rgb_to_mat(frame)?;
        self.writer.write(&mat)?;
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        if !self.released {
            self.released = true;
            self.writer.release()?;
            debug!("Closed recording {}", self.path.display());
        }
        Ok(())
    }
}

impl Drop for MjpgRecorder {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("Failed to release video writer: {}", e);
        }
    }
}

/// HighGUI 窗口
pub struct HighguiDisplay {
    window: String,
    closed: bool,
}

impl HighguiDisplay {
    pub fn open(window: &str) -> Result<Self> {
        highgui::named_window(window, highgui::WINDOW_AUTOSIZE)?;
        Ok(Self {
            window: window.to_string(),
            closed: false,
        })
    }
}

impl Display for HighguiDisplay {
    fn show(&mut self, frame: &RgbImage) -> Result<()> {
        let mat = rgb_to_mat(frame)?;
        highgui::imshow(&self.window, &mat)?;
        Ok(())
    }

    fn poll_key(&mut self, delay_ms: i32) -> Result<Option<char>> {
        Ok(key_from_code(highgui::wait_key(delay_ms.max(1))?))
    }

    fn wait_key(&mut self) -> Result<Option<char>> {
        Ok(key_from_code(highgui::wait_key(0)?))
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            highgui::destroy_all_windows()?;
        }
        Ok(())
    }
}

impl Drop for HighguiDisplay {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close display: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::Vec3b;

    #[test]
    fn key_codes_map_to_ascii() {
        assert_eq!(key_from_code(-1), None);
        assert_eq!(key_from_code('q' as i32), Some('q'));
        // 部分平台会在高位带上修饰键
        assert_eq!(key_from_code(0x10_0000 | 'P' as i32), Some('P'));
    }

    #[test]
    fn rgb_frames_become_bgr_mats_and_back() -> Result<()> {
        let mut frame = RgbImage::new(4, 3);
        frame.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        frame.put_pixel(3, 2, image::Rgb([10, 20, 30]));

        let mat = rgb_to_mat(&frame)?;
        assert_eq!((mat.cols(), mat.rows(), mat.channels()), (4, 3, 3));
        assert_eq!(mat.at_2d::<Vec3b>(0, 0)?.0, [0, 0, 255]);
        assert_eq!(mat.at_2d::<Vec3b>(2, 3)?.0, [30, 20, 10]);

        assert_eq!(mat_to_rgb(&mat)?, frame);
        Ok(())
    }

    #[test]
    fn recorder_rejects_frames_of_another_size() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("demo1.avi");
        let mut recorder = MjpgRecorder::create(&path, Resolution::new(64, 48))?;

        recorder.write(&RgbImage::new(64, 48))?;
        let err = recorder.write(&RgbImage::new(48, 64)).unwrap_err();
        assert!(matches!(
            err,
            AnnotateError::FrameSize {
                expected: (64, 48),
                actual: (48, 64),
            }
        ));

        recorder.release()?;
        recorder.release()?;
        assert!(path.exists());
        Ok(())
    }
}
