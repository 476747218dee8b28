//! # 载体适配器模块
//!
//! 把具体载体 (图像像素网格、PCM 帧) 展平为样本序列，并提供两种统一的隐写接口：
//!
//! * [`SelfDescribingCarrier`]：负载前带长度标签，恢复时无需额外信息。
//! * [`ExplicitLengthCarrier`]：不带标签，恢复时由调用者提供字节数。

pub mod audio;
pub mod image;

pub use self::audio::{AudioCarrier, PcmSamples};
pub use self::image::ImageCarrier;

use crate::capacity::CapacityReport;
use crate::config::StegConfig;
use crate::error::Result;
use crate::observer::PhaseObserver;
use std::path::Path;

/// 展平后的载体。
pub trait Carrier {
    /// 参与容量计算的样本数。
    fn num_samples(&self) -> usize;

    /// 样本位宽，即 `num_lsb` 的上限。
    fn sample_bits(&self) -> u32;

    /// 在 `num_lsb` 下的容量报告。
    fn capacity(&self, num_lsb: u32, tagged: bool) -> CapacityReport {
        CapacityReport::new(self.num_samples(), num_lsb, tagged)
    }
}

/// 负载长度随负载一起隐藏的载体。
pub trait SelfDescribingCarrier: Carrier {
    fn hide(&mut self, payload: &[u8], config: &StegConfig, observer: &dyn PhaseObserver) -> Result<()>;

    fn recover(&self, config: &StegConfig, observer: &dyn PhaseObserver) -> Result<Vec<u8>>;
}

/// 负载长度需由调用者另行保存的载体。
pub trait ExplicitLengthCarrier: Carrier {
    fn hide_exact(&mut self, payload: &[u8], config: &StegConfig, observer: &dyn PhaseObserver) -> Result<()>;

    fn recover_exact(
        &self,
        bytes_to_recover: usize,
        config: &StegConfig,
        observer: &dyn PhaseObserver,
    ) -> Result<Vec<u8>>;
}

/// 按文件扩展名区分的载体类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierKind {
    Image,
    Audio,
}

impl CarrierKind {
    /// `.wav` / `.wave` 视为音频，其余交给图像编解码器。
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("wav" | "wave") => Self::Audio,
            _ => Self::Image,
        }
    }
}
