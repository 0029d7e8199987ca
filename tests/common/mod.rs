//! 测试用的假协作者：内存视频源、固定输出的检测器、按脚本按键的显示窗口、内存录制

#![allow(dead_code)]

use std::borrow::Cow;
use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use image::{Rgb, RgbImage};
use yolo_annotate::error::{AnnotateError, Result};
use yolo_annotate::video::{Display, FrameSink, FrameSource};
use yolo_annotate::vision::{ClassNames, Detection, Detector};

/// 内存中的视频源
pub struct VecSource {
    frames: VecDeque<RgbImage>,
    pub released: Rc<Cell<usize>>,
}

impl VecSource {
    pub fn new(frames: Vec<RgbImage>) -> Self {
        Self {
            frames: frames.into(),
            released: Rc::new(Cell::new(0)),
        }
    }

    /// `count` 帧纯黑图像
    pub fn blank(count: usize, width: u32, height: u32) -> Self {
        Self::new((0..count).map(|_| RgbImage::new(width, height)).collect())
    }

    /// 每帧底色不同，便于区分
    pub fn tinted(count: usize, width: u32, height: u32) -> Self {
        Self::new(
            (0..count)
                .map(|i| RgbImage::from_pixel(width, height, Rgb([(i * 20) as u8, 40, 80])))
                .collect(),
        )
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for VecSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        Ok(self.frames.pop_front())
    }

    fn release(&mut self) -> Result<()> {
        self.released.set(self.released.get() + 1);
        Ok(())
    }
}

/// 每帧返回同样检测结果的检测器，并记录收到的帧尺寸
pub struct FakeDetector {
    detections: Vec<Detection>,
    names: ClassNames,
    fail: bool,
    pub seen: Vec<(u32, u32)>,
}

impl FakeDetector {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self {
            detections,
            names: ["person", "car", "dog"].into_iter().collect(),
            fail: false,
            seen: Vec::new(),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }
}

impl Detector for FakeDetector {
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>> {
        self.seen.push(frame.dimensions());
        if self.fail {
            return Err(AnnotateError::inference("decoder exploded"));
        }
        Ok(self.detections.clone())
    }

    fn class_name(&self, class_id: usize) -> Cow<'_, str> {
        self.names.get(class_id)
    }
}

/// 记录显示过的帧，按第几次轮询返回预设按键
#[derive(Default)]
pub struct ScriptedDisplay {
    keys: HashMap<usize, char>,
    pub shown: Vec<RgbImage>,
    pub polls: usize,
    pub waits: usize,
    pub closed: Rc<Cell<usize>>,
}

impl ScriptedDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// 第 `poll` 次轮询（从0开始）时按下 `key`
    pub fn press(mut self, poll: usize, key: char) -> Self {
        self.keys.insert(poll, key);
        self
    }
}

impl Display for ScriptedDisplay {
    fn show(&mut self, frame: &RgbImage) -> Result<()> {
        self.shown.push(frame.clone());
        Ok(())
    }

    fn poll_key(&mut self, _delay_ms: i32) -> Result<Option<char>> {
        let key = self.keys.remove(&self.polls);
        self.polls += 1;
        Ok(key)
    }

    fn wait_key(&mut self) -> Result<Option<char>> {
        self.waits += 1;
        Ok(Some(' '))
    }

    fn close(&mut self) -> Result<()> {
        self.closed.set(self.closed.get() + 1);
        Ok(())
    }
}

/// 只记录帧尺寸的录制器
#[derive(Default)]
pub struct MemorySink {
    pub frames: Vec<(u32, u32)>,
    pub released: Rc<Cell<usize>>,
}

impl FrameSink for MemorySink {
    fn write(&mut self, frame: &RgbImage) -> Result<()> {
        self.frames.push(frame.dimensions());
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.released.set(self.released.get() + 1);
        Ok(())
    }
}
