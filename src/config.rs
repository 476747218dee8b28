//! # 配置模块
//!
//! 每次隐藏/恢复调用显式传入的参数。库内没有任何进程级状态。

use crate::constants::DEFAULT_NUM_LSB;
use crate::error::{Result, StegError};
use clap::ValueEnum;

/// 所有载体中最宽的样本位宽 (16 位音频)。
const WIDEST_SAMPLE_BITS: u32 = 16;

/// 长度标签的字节序。
///
/// 属于线格式的一部分：隐藏端与恢复端必须一致，且不随运行平台变化。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TagByteOrder {
    #[default]
    Little,
    Big,
}

/// 单次隐写操作的配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StegConfig {
    /// 每个样本用于存放负载的低位数。
    pub num_lsb: u32,
    pub tag_order: TagByteOrder,
}

impl Default for StegConfig {
    fn default() -> Self {
        Self {
            num_lsb: DEFAULT_NUM_LSB,
            tag_order: TagByteOrder::default(),
        }
    }
}

impl StegConfig {
    /// 创建配置。具体载体还会按自身样本位宽再次校验 `num_lsb`。
    ///
    /// # Errors
    ///
    /// `num_lsb` 不在 `1..=16` 内时返回 `InvalidNumLsb`。
    pub fn new(num_lsb: u32, tag_order: TagByteOrder) -> Result<Self> {
        if num_lsb == 0 || num_lsb > WIDEST_SAMPLE_BITS {
            return Err(StegError::InvalidNumLsb {
                num_lsb,
                max: WIDEST_SAMPLE_BITS,
            });
        }
        Ok(Self { num_lsb, tag_order })
    }

    pub fn with_num_lsb(num_lsb: u32) -> Result<Self> {
        Self::new(num_lsb, TagByteOrder::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StegConfig::default();
        assert_eq!(config.num_lsb, DEFAULT_NUM_LSB);
        assert_eq!(config.tag_order, TagByteOrder::Little);
    }

    #[test]
    fn test_num_lsb_bounds() {
        assert!(StegConfig::with_num_lsb(1).is_ok());
        assert!(StegConfig::new(16, TagByteOrder::Big).is_ok());
        assert!(matches!(
            StegConfig::with_num_lsb(0),
            Err(StegError::InvalidNumLsb { num_lsb: 0, max: 16 })
        ));
        assert!(StegConfig::with_num_lsb(17).is_err());
    }
}
