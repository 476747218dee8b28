/// 命令行默认使用的 LSB 数。
pub const DEFAULT_NUM_LSB: u32 = 2;

/// PNG 输出的默认压缩级别 (0-9)。
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 1;

/// 允许的最大压缩级别。
pub const MAX_COMPRESSION_LEVEL: u8 = 9;

/// 每个像素参与容量计算的颜色通道数。
/// Alpha 通道不计入容量。
pub const IMAGE_COLOR_CHANNELS: usize = 3;

/// 支持的音频采样字节深度。
pub const SUPPORTED_AUDIO_BYTE_DEPTHS: [u16; 2] = [1, 2];

/// 未指定输出路径时，隐写图像文件名的前缀。
pub const HIDDEN_FILE_PREFIX: &str = "doctored_";

/// 未指定输出路径时，恢复数据文件名的前缀。
pub const RECOVERED_FILE_PREFIX: &str = "recovered_";

/// 恢复数据文件的默认扩展名。
pub const RECOVERED_FILE_EXTENSION: &str = "bin";

/// 载体样本数达到此值时才分片并行处理。
pub const PARALLEL_THRESHOLD: usize = 1 << 16;
