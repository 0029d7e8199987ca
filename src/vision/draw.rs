//! 叠加绘制
//!
//! 所有绘制都在 raqote 的 `DrawTarget` 上完成，最后一次性写回帧。
//! 关闭抗锯齿，保证同样的输入得到逐像素一致的输出。

use std::borrow::Cow;

use image::{Rgb, RgbImage};
use raqote::{
    AntialiasMode, DrawOptions, DrawTarget, LineJoin, PathBuilder, SolidSource, Source,
    StrokeStyle,
};

use crate::config::{
    BOX_THICKNESS, COUNT_TEXT_ORIGIN, FPS_TEXT_ORIGIN, LABEL_OFFSET, PALETTE, STATUS_COLOR,
};
use crate::vision::bounds::{BoundingBox, Detection};
use crate::vision::font::{GLYPH_HEIGHT, GLYPH_WIDTH, lit_cells};

/// 文字放大倍数，每个点阵格子绘制为 TEXT_SCALE x TEXT_SCALE 像素
pub const TEXT_SCALE: i32 = 2;

/// 类别对应的颜色，只取决于 `class_id % 4`
///
/// ```
/// use yolo_annotate::vision::draw::class_color;
///
/// assert_eq!(class_color(1), class_color(5));
/// assert_ne!(class_color(0), class_color(1));
/// ```
pub fn class_color(class_id: usize) -> [u8; 3] {
    PALETTE[class_id % PALETTE.len()]
}

/// 检测框标签：`<类别名> <置信度两位小数> (<x1>,<y1>)`
///
/// ```
/// use yolo_annotate::vision::draw::label_text;
///
/// assert_eq!(label_text("person", 0.876, 10, 20), "person 0.88 (10,20)");
/// ```
pub fn label_text(class_name: &str, confidence: f32, x1: i32, y1: i32) -> String {
    format!("{} {:.2} ({},{})", class_name, confidence, x1, y1)
}

/// 文字渲染后的像素宽度
pub fn text_width(text: &str) -> i32 {
    let n = text.chars().count() as i32;
    if n == 0 {
        return 0;
    }
    (n * (GLYPH_WIDTH + 1) - 1) * TEXT_SCALE
}

fn solid(color: [u8; 3]) -> Source<'static> {
    Source::Solid(SolidSource {
        r: color[0],
        g: color[1],
        b: color[2],
        a: 0xFF,
    })
}

fn crisp() -> DrawOptions {
    DrawOptions {
        antialias: AntialiasMode::None,
        ..DrawOptions::new()
    }
}

/// 一帧图像上的绘制画布
pub struct Overlay {
    dt: DrawTarget,
}

impl Overlay {
    /// 以帧内容为底图创建画布
    pub fn new(frame: &RgbImage) -> Self {
        let (width, height) = frame.dimensions();
        let mut dt = DrawTarget::new(width as i32, height as i32);

        let image_data: Vec<u32> = frame
            .pixels()
            .map(|&Rgb([r, g, b])| u32::from_le_bytes([b, g, r, 0xFF]))
            .collect();
        let img = raqote::Image {
            width: width as i32,
            height: height as i32,
            data: &image_data,
        };
        dt.draw_image_at(0.0, 0.0, &img, &DrawOptions::new());

        Self { dt }
    }

    /// 绘制空心矩形框
    pub fn stroke_box(&mut self, bbox: &BoundingBox, color: [u8; 3]) {
        let (x1, y1, x2, y2) = bbox.pixel_corners();
        let mut pb = PathBuilder::new();
        pb.rect(x1 as f32, y1 as f32, (x2 - x1) as f32, (y2 - y1) as f32);
        let path = pb.finish();

        self.dt.stroke(
            &path,
            &solid(color),
            &StrokeStyle {
                join: LineJoin::Miter,
                width: BOX_THICKNESS,
                ..StrokeStyle::default()
            },
            &crisp(),
        );
    }

    /// 绘制一行文字，`(x, baseline)` 为左下角
    ///
    /// 不做边界裁剪之外的位置调整，超出画布的部分直接丢弃。
    pub fn draw_text(&mut self, text: &str, x: i32, baseline: i32, color: [u8; 3]) {
        let top = baseline - GLYPH_HEIGHT * TEXT_SCALE;
        let source = solid(color);
        let options = crisp();

        for (i, ch) in text.chars().enumerate() {
            let origin_x = x + i as i32 * (GLYPH_WIDTH + 1) * TEXT_SCALE;
            for (col, row) in lit_cells(ch) {
                self.dt.fill_rect(
                    (origin_x + col * TEXT_SCALE) as f32,
                    (top + row * TEXT_SCALE) as f32,
                    TEXT_SCALE as f32,
                    TEXT_SCALE as f32,
                    &source,
                    &options,
                );
            }
        }
    }

    /// 绘制置信度不低于阈值的检测结果，返回绘制的目标数量
    ///
    /// # 参数
    /// * `detections` - 本帧检测结果
    /// * `threshold` - 置信度阈值
    /// * `class_name` - 类别名称查询
    pub fn draw_detections<'a, F>(
        &mut self,
        detections: &[Detection],
        threshold: f32,
        class_name: F,
    ) -> usize
    where
        F: Fn(usize) -> Cow<'a, str>,
    {
        let mut count = 0;
        for detection in detections.iter().filter(|d| d.confidence >= threshold) {
            count += 1;
            let color = class_color(detection.class_id);
            let (x1, y1, _, _) = detection.bbox.pixel_corners();
            let label = label_text(&class_name(detection.class_id), detection.confidence, x1, y1);

            self.stroke_box(&detection.bbox, color);
            self.draw_text(&label, x1, y1 - LABEL_OFFSET, color);
        }
        count
    }

    /// 左上角的帧率与目标数量
    pub fn draw_status(&mut self, fps: f64, object_count: usize) {
        let (fx, fy) = FPS_TEXT_ORIGIN;
        let (cx, cy) = COUNT_TEXT_ORIGIN;
        self.draw_text(&format!("FPS: {:.2}", fps), fx, fy, STATUS_COLOR);
        self.draw_text(&format!("Objects: {}", object_count), cx, cy, STATUS_COLOR);
    }

    /// 将画布内容写回帧
    pub fn write_to(&self, frame: &mut RgbImage) {
        for (pixel, &argb) in frame.pixels_mut().zip(self.dt.get_data().iter()) {
            let [b, g, r, _] = argb.to_le_bytes();
            *pixel = Rgb([r, g, b]);
        }
    }
}

/// 在帧上绘制检测结果，返回绘制的目标数量
pub fn draw_detections<'a, F>(
    frame: &mut RgbImage,
    detections: &[Detection],
    threshold: f32,
    class_name: F,
) -> usize
where
    F: Fn(usize) -> Cow<'a, str>,
{
    let mut overlay = Overlay::new(frame);
    let count = overlay.draw_detections(detections, threshold, class_name);
    overlay.write_to(frame);
    count
}
