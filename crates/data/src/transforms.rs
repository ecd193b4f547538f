use image::{
    imageops::{self, FilterType},
    DynamicImage, RgbImage,
};

use crate::{config::DataConfig, DataError};

/// Padding used by the TF-style center crop.
pub const CROP_PADDING: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropMode {
    /// Resize the shorter side to `img_size / crop_pct`, then center-crop.
    ResizeThenCrop,
    /// Center-crop `img_size / (img_size + 32)` of the shorter side, then
    /// resize with bicubic filtering.
    CropThenResize,
}

/// Evaluation-time preprocessing: RGB image in, normalized CHW `f32` out.
#[derive(Debug, Clone)]
pub struct EvalTransform {
    img_size: u32,
    crop_pct: f32,
    filter: FilterType,
    mode: CropMode,
    mean: [f32; 3],
    std: [f32; 3],
}

impl EvalTransform {
    pub fn new(config: &DataConfig) -> Self {
        let (mode, filter) = if config.tf_preprocessing {
            (CropMode::CropThenResize, FilterType::CatmullRom)
        } else {
            (CropMode::ResizeThenCrop, config.interpolation.filter())
        };
        Self {
            img_size: config.img_size(),
            crop_pct: config.crop_pct,
            filter,
            mode,
            mean: config.mean,
            std: config.std,
        }
    }

    pub fn img_size(&self) -> u32 {
        self.img_size
    }

    pub fn mode(&self) -> CropMode {
        self.mode
    }

    /// Number of `f32` values produced per image.
    pub fn output_len(&self) -> usize {
        3 * self.img_size as usize * self.img_size as usize
    }

    pub fn apply(&self, image: &DynamicImage) -> Result<Vec<f32>, DataError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(DataError::EmptyImage { width, height });
        }
        let image = image.to_rgb8();
        let cropped = match self.mode {
            CropMode::ResizeThenCrop => self.resize_then_crop(&image),
            CropMode::CropThenResize => self.crop_then_resize(&image),
        };
        Ok(self.normalize(&cropped))
    }

    fn resize_then_crop(&self, image: &RgbImage) -> RgbImage {
        let scale_size = ((self.img_size as f32 / self.crop_pct).floor() as u32).max(self.img_size);
        let (w, h) = image.dimensions();
        let (ow, oh) = if w <= h {
            (scale_size, scaled(h, scale_size, w))
        } else {
            (scaled(w, scale_size, h), scale_size)
        };
        let resized = imageops::resize(image, ow, oh, self.filter);
        let size = self.img_size;
        let left = ((ow - size) as f32 / 2.0).round() as u32;
        let top = ((oh - size) as f32 / 2.0).round() as u32;
        imageops::crop_imm(&resized, left, top, size, size).to_image()
    }

    fn crop_then_resize(&self, image: &RgbImage) -> RgbImage {
        let (w, h) = image.dimensions();
        let ratio = self.img_size as f64 / (self.img_size + CROP_PADDING) as f64;
        let crop = ((ratio * w.min(h) as f64) as u32).max(1);
        let left = (w - crop + 1) / 2;
        let top = (h - crop + 1) / 2;
        let cropped = imageops::crop_imm(image, left, top, crop, crop).to_image();
        imageops::resize(&cropped, self.img_size, self.img_size, self.filter)
    }

    fn normalize(&self, image: &RgbImage) -> Vec<f32> {
        let (w, h) = image.dimensions();
        let plane = (w * h) as usize;
        let mut out = vec![0.0; 3 * plane];
        for (x, y, pixel) in image.enumerate_pixels() {
            let offset = (y * w + x) as usize;
            for c in 0..3 {
                out[c * plane + offset] = (pixel[c] as f32 / 255.0 - self.mean[c]) / self.std[c];
            }
        }
        out
    }
}

/// `long * target / short`, truncated, never below `target`.
fn scaled(long: u32, target: u32, short: u32) -> u32 {
    ((long as u64 * target as u64 / short.max(1) as u64) as u32).max(target)
}
