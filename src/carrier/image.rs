//! # 图像载体适配器
//!
//! 像素网格按光栅顺序 (逐行) 展平，每个像素内按通道顺序排列。
//! 容量只按 `3 × 宽 × 高` 个样本计算，Alpha 通道不计入容量。

use super::{Carrier, SelfDescribingCarrier};
use crate::config::StegConfig;
use crate::constants::IMAGE_COLOR_CHANNELS;
use crate::error::{Result, StegError};
use crate::framing;
use crate::observer::PhaseObserver;
use image::codecs::png::{CompressionType, FilterType, PngDecoder, PngEncoder};
use image::codecs::webp::WebPDecoder;
use image::{DynamicImage, ImageBuffer, ImageFormat};
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

/// 展平后的图像载体。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCarrier {
    width: u32,
    height: u32,
    /// 每像素通道数 (3 = RGB，4 = RGBA)，重组时使用。
    num_channels: usize,
    samples: Vec<u8>,
}

impl ImageCarrier {
    /// 读取并展平图像文件。
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// 从编码后的图像字节创建载体。
    ///
    /// # Errors
    ///
    /// * `AnimatedImage` - 动画 PNG 或动画 WebP。
    /// * `UnsupportedColorType` - 不是每通道 8 位的 RGB/RGBA。
    /// * `Image` - 无法识别或解码。
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let image = match image::guess_format(bytes)? {
            ImageFormat::Png => {
                let decoder = PngDecoder::new(Cursor::new(bytes))?;
                if decoder.is_apng()? {
                    return Err(StegError::AnimatedImage);
                }
                DynamicImage::from_decoder(decoder)?
            }
            ImageFormat::WebP => {
                let decoder = WebPDecoder::new(Cursor::new(bytes))?;
                if decoder.has_animation() {
                    return Err(StegError::AnimatedImage);
                }
                DynamicImage::from_decoder(decoder)?
            }
            format => image::load_from_memory_with_format(bytes, format)?,
        };
        Self::from_image(&image)
    }

    /// 展平像素网格。只接受 8 位 RGB 与 RGBA，其他颜色类型原样拒绝，
    /// 以保证写回的图像通道数与位深不变。
    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        let (num_channels, samples) = match image {
            DynamicImage::ImageRgb8(buffer) => (3, buffer.as_raw().clone()),
            DynamicImage::ImageRgba8(buffer) => (4, buffer.as_raw().clone()),
            other => return Err(StegError::UnsupportedColorType(other.color())),
        };

        Ok(Self {
            width: image.width(),
            height: image.height(),
            num_channels,
            samples,
        })
    }

    /// 按记录的通道数把样本序列重组为像素网格。
    pub fn to_image(&self) -> Result<DynamicImage> {
        let reassembled = match self.num_channels {
            4 => ImageBuffer::from_raw(self.width, self.height, self.samples.clone())
                .map(DynamicImage::ImageRgba8),
            _ => ImageBuffer::from_raw(self.width, self.height, self.samples.clone())
                .map(DynamicImage::ImageRgb8),
        };

        reassembled.ok_or(StegError::InsufficientCarrier {
            needed: self.width as usize * self.height as usize * self.num_channels,
            available: self.samples.len(),
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }
}

impl Carrier for ImageCarrier {
    fn num_samples(&self) -> usize {
        IMAGE_COLOR_CHANNELS * self.width as usize * self.height as usize
    }

    fn sample_bits(&self) -> u32 {
        u8::BITS
    }
}

impl SelfDescribingCarrier for ImageCarrier {
    fn hide(&mut self, payload: &[u8], config: &StegConfig, observer: &dyn PhaseObserver) -> Result<()> {
        let capacity = self.num_samples();
        framing::hide_tagged(&mut self.samples, capacity, payload, config, observer)
    }

    fn recover(&self, config: &StegConfig, observer: &dyn PhaseObserver) -> Result<Vec<u8>> {
        framing::recover_tagged(&self.samples, self.num_samples(), config, observer)
    }
}

/// 按目标路径的扩展名选择无损格式保存图像。
///
/// PNG 使用 `compression_level` (0-9)；其他格式使用编解码器默认设置。
/// 先在内存中完成编码，编码失败时不会留下残缺的目标文件。
pub fn save_image(image: &DynamicImage, path: &Path, compression_level: u8) -> Result<()> {
    let bytes = match ImageFormat::from_path(path)? {
        ImageFormat::Png => encode_png(image, compression_level)?,
        format => {
            let mut bytes = Vec::new();
            image.write_to(Cursor::new(&mut bytes), format)?;
            bytes
        }
    };
    fs::write(path, bytes)?;
    Ok(())
}

/// 将图像编码为 PNG 字节。
pub fn encode_png(image: &DynamicImage, compression_level: u8) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    write_png(image, &mut bytes, compression_level)?;
    Ok(bytes)
}

fn write_png<W: Write>(image: &DynamicImage, writer: W, compression_level: u8) -> Result<()> {
    let encoder = PngEncoder::new_with_quality(writer, compression_type(compression_level), FilterType::Adaptive);
    image.write_with_encoder(encoder)?;
    Ok(())
}

fn compression_type(level: u8) -> CompressionType {
    match level {
        0..=3 => CompressionType::Fast,
        4..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}
