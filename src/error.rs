//! # 错误类型模块
//!
//! 定义隐写核心 (位编解码、容量模型、载体适配器) 的所有失败情形。
//! 所有错误对单次操作都是致命的，不存在重试或部分成功的路径。

use std::path::PathBuf;
use thiserror::Error;

/// 隐写库操作的结果类型别名。
pub type Result<T> = std::result::Result<T, StegError>;

/// 隐藏或恢复数据时可能发生的错误。
#[derive(Error, Debug)]
pub enum StegError {
    /// 负载 (图像路径下包含长度标签) 超出载体在给定 LSB 数下的容量。
    #[error(
        "Only able to hide {maximum} B in this carrier with {num_lsb} LSBs, but {requested} B were requested (requires {required_lsb} LSBs)"
    )]
    CapacityExceeded {
        requested: usize,
        maximum: usize,
        num_lsb: u32,
        required_lsb: usize,
    },

    /// 音频采样位深不是 8 位或 16 位整数 PCM。
    #[error("Audio file has an unsupported bit-depth: {bits} bits (only 8-bit and 16-bit PCM are supported)")]
    UnsupportedBitDepth { bits: u16 },

    /// 恢复出的长度标签声称的负载超过载体可能承载的上限。
    #[error(
        "This carrier appears to be corrupted. It claims to hold {claimed} B, but can only hold {maximum} B with {num_lsb} LSBs"
    )]
    CorruptedSizeTag {
        claimed: usize,
        maximum: usize,
        num_lsb: u32,
    },

    /// 载体容量连长度标签都放不下，不可能含有本工具写入的数据。
    #[error("This carrier is too small to hold a {tag_width} B size tag with {num_lsb} LSBs; it contains no hidden data")]
    NoSizeTag { tag_width: usize, num_lsb: u32 },

    /// 载体样本数少于读取所需位数的样本数。
    #[error("Carrier too short: need {needed} samples, have {available}")]
    InsufficientCarrier { needed: usize, available: usize },

    /// LSB 数超出样本位宽。
    #[error("Invalid number of LSBs: {num_lsb} (must be between 1 and {max})")]
    InvalidNumLsb { num_lsb: u32, max: u32 },

    /// 输入路径不存在或不是普通文件。
    #[error("Invalid path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// 缺少必需的参数。
    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    /// 参数在当前载体或模式下没有意义。
    #[error("Unexpected argument: {0}")]
    UnexpectedArgument(&'static str),

    /// 输出文件已存在且未指定强制覆盖。
    #[error("Output file already exists: {} (use --force to overwrite)", .0.display())]
    OutputExists(PathBuf),

    /// 只支持每通道 8 位的 RGB/RGBA 图像。
    #[error("Unsupported image color type: {0:?} (only 8-bit RGB and RGBA images are supported)")]
    UnsupportedColorType(image::ColorType),

    /// 动画图像 (APNG、动画 WebP) 无法逐帧隐写。
    #[error("Animated images are not supported; only the first frame would survive")]
    AnimatedImage,

    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("WAV codec error: {0}")]
    Wav(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
