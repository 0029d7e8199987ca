use image::{RgbImage, imageops::{self, FilterType}};
use ndarray::{Array, Array4};

/// 调整图像大小
///
/// 使用双线性插值将图像拉伸为指定尺寸，尺寸已一致时直接复制。
///
/// # 参数
/// * `img` - 原始图像
/// * `width` - 目标宽度
/// * `height` - 目标高度
///
/// # 返回值
/// 返回调整大小后的图像
///
/// # 示例
///
/// ```
/// use image::RgbImage;
/// use yolo_annotate::vision::prevs::resize_image;
///
/// let img = RgbImage::new(1920, 1080);
/// let resized = resize_image(&img, 640, 480);
/// assert_eq!(resized.dimensions(), (640, 480));
/// ```
pub fn resize_image(img: &RgbImage, width: u32, height: u32) -> RgbImage {
    if img.dimensions() == (width, height) {
        return img.clone();
    }
    imageops::resize(img, width, height, FilterType::Triangle)
}

/// 将图像转换为模型输入张量
///
/// 将图像转换为模型所需的四维张量格式，包括：
/// 1. 归一化像素值到[0, 1]范围
/// 2. 保持RGB通道顺序
/// 3. 调整维度顺序为NCHW格式
///
/// 图像尺寸必须与 `input_width` x `input_height` 一致，多余的像素会被忽略。
///
/// # 返回值
/// 返回形状为(1, 3, height, width)的四维张量
///
/// # 示例
///
/// ```
/// use image::RgbImage;
/// use yolo_annotate::vision::prevs::image_to_tensor;
///
/// let img = RgbImage::from_pixel(4, 2, image::Rgb([255, 0, 51]));
/// let tensor = image_to_tensor(&img, 2, 4);
/// assert_eq!(tensor.shape(), &[1, 3, 2, 4]);
/// assert_eq!(tensor[[0, 0, 1, 3]], 1.0);
/// assert!((tensor[[0, 2, 0, 0]] - 0.2).abs() < 1e-6);
/// ```
pub fn image_to_tensor(img: &RgbImage, input_height: usize, input_width: usize) -> Array4<f32> {
    let mut tensor = Array::zeros((1, 3, input_height, input_width));

    for (x, y, pixel) in img.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        if x >= input_width || y >= input_height {
            continue;
        }
        let [r, g, b] = pixel.0;
        tensor[[0, 0, y, x]] = (r as f32) / 255.0;
        tensor[[0, 1, y, x]] = (g as f32) / 255.0;
        tensor[[0, 2, y, x]] = (b as f32) / 255.0;
    }

    tensor
}
