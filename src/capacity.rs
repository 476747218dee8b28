//! # 容量模型模块
//!
//! 根据载体样本数与 LSB 数推导可隐藏的位数/字节数，以及长度标签的宽度。
//! 所有函数均为无状态纯函数。

use crate::error::{Result, StegError};

/// 载体可隐藏的最大位数：`num_samples × num_lsb`。
pub fn max_bits_to_hide(num_samples: usize, num_lsb: u32) -> usize {
    num_samples.saturating_mul(num_lsb as usize)
}

/// 表示 `n` 所需的位数 (`n = 0` 时为 0)。
pub fn bit_length(n: usize) -> u32 {
    usize::BITS - n.leading_zeros()
}

/// 长度标签所需字节数：`ceil(bit_length(max_bits_to_hide) / 8)`。
///
/// 标签宽度随载体容量增长，因此标签本身永远不会溢出。
pub fn bytes_for_size_tag(num_samples: usize, num_lsb: u32) -> usize {
    bit_length(max_bits_to_hide(num_samples, num_lsb)).div_ceil(8) as usize
}

/// 载体总容量 (字节，向下取整)，包含长度标签占用的部分。
pub fn capacity_bytes(num_samples: usize, num_lsb: u32) -> usize {
    max_bits_to_hide(num_samples, num_lsb) / 8
}

/// 容纳 `payload_len` 字节所需的最小 LSB 数。
pub fn required_lsb(payload_len: usize, num_samples: usize) -> usize {
    if num_samples == 0 {
        return usize::MAX;
    }
    payload_len.saturating_mul(8).div_ceil(num_samples)
}

/// 交织前的容量校验：`8 × (payload_len + tag_width) <= max_bits_to_hide`。
///
/// # Errors
///
/// 不满足时返回 `CapacityExceeded`，其中 `maximum` 为扣除标签后可用的负载字节数。
pub fn ensure_fits(payload_len: usize, tag_width: usize, num_samples: usize, num_lsb: u32) -> Result<()> {
    let needed_bits = payload_len
        .checked_add(tag_width)
        .and_then(|len| len.checked_mul(8));
    if needed_bits.is_none_or(|bits| bits > max_bits_to_hide(num_samples, num_lsb)) {
        return Err(StegError::CapacityExceeded {
            requested: payload_len,
            maximum: capacity_bytes(num_samples, num_lsb).saturating_sub(tag_width),
            num_lsb,
            required_lsb: required_lsb(payload_len.saturating_add(tag_width), num_samples),
        });
    }
    Ok(())
}

/// `analyze` 使用的容量报告。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityReport {
    pub num_samples: usize,
    pub num_lsb: u32,
    pub max_bits: usize,
    /// 总容量 (字节)。
    pub capacity_bytes: usize,
    /// 长度标签宽度；无标签的载体为 0。
    pub tag_width: usize,
}

impl CapacityReport {
    pub fn new(num_samples: usize, num_lsb: u32, tagged: bool) -> Self {
        Self {
            num_samples,
            num_lsb,
            max_bits: max_bits_to_hide(num_samples, num_lsb),
            capacity_bytes: capacity_bytes(num_samples, num_lsb),
            tag_width: if tagged {
                bytes_for_size_tag(num_samples, num_lsb)
            } else {
                0
            },
        }
    }

    /// 扣除长度标签后可容纳的负载字节数。
    pub fn payload_capacity(&self) -> usize {
        self.capacity_bytes.saturating_sub(self.tag_width)
    }

    pub fn fits(&self, payload_len: usize) -> bool {
        payload_len <= self.payload_capacity()
    }

    /// 容纳 `payload_len` 字节 (含标签) 所需的最小 LSB 数。
    pub fn required_lsb(&self, payload_len: usize) -> usize {
        required_lsb(payload_len.saturating_add(self.tag_width), self.num_samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_100x100_two_lsb() {
        let num_samples = 3 * 100 * 100;
        assert_eq!(max_bits_to_hide(num_samples, 2), 60_000);
        assert_eq!(capacity_bytes(num_samples, 2), 7_500);
        assert_eq!(bytes_for_size_tag(num_samples, 2), 2);
    }

    #[test]
    fn test_mono_audio_two_lsb() {
        assert_eq!(max_bits_to_hide(44_100, 2), 88_200);
        assert_eq!(capacity_bytes(44_100, 2), 11_025);
    }

    #[test]
    fn test_bit_length() {
        assert_eq!(bit_length(0), 0);
        assert_eq!(bit_length(1), 1);
        assert_eq!(bit_length(255), 8);
        assert_eq!(bit_length(256), 9);
        assert_eq!(bit_length(60_000), 16);
    }

    #[test]
    fn test_tag_width_edges() {
        assert_eq!(bytes_for_size_tag(0, 1), 0);
        assert_eq!(bytes_for_size_tag(255, 1), 1);
        assert_eq!(bytes_for_size_tag(256, 1), 2);
        assert_eq!(bytes_for_size_tag(1 << 16, 1), 3);
    }

    #[test]
    fn test_tag_width_is_monotonic() {
        let mut previous = 0;
        for num_samples in (0..200_000).step_by(997) {
            let width = bytes_for_size_tag(num_samples, 3);
            assert!(width >= previous);
            previous = width;
        }

        let mut previous = 0;
        for num_lsb in 1..=16 {
            let width = bytes_for_size_tag(30_000, num_lsb);
            assert!(width >= previous);
            previous = width;
        }
    }

    #[test]
    fn test_ensure_fits_boundary() {
        let num_samples = 3 * 100 * 100;
        assert!(ensure_fits(7_498, 2, num_samples, 2).is_ok());

        let err = ensure_fits(7_499, 2, num_samples, 2).unwrap_err();
        assert!(matches!(
            err,
            StegError::CapacityExceeded {
                requested: 7_499,
                maximum: 7_498,
                num_lsb: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_ensure_fits_huge_length_does_not_overflow() {
        assert!(matches!(
            ensure_fits(usize::MAX - 1, 2, 300, 2),
            Err(StegError::CapacityExceeded { maximum: 73, .. })
        ));
        assert!(ensure_fits(1 << 61, 0, 300, 2).is_err());
    }

    #[test]
    fn test_required_lsb() {
        assert_eq!(required_lsb(11_025, 44_100), 2);
        assert_eq!(required_lsb(11_026, 44_100), 3);
        assert_eq!(required_lsb(0, 10), 0);
    }

    #[test]
    fn test_report() {
        let report = CapacityReport::new(30_000, 2, true);
        assert_eq!(report.payload_capacity(), 7_498);
        assert!(report.fits(7_498));
        assert!(!report.fits(7_499));
        assert_eq!(report.required_lsb(7_499), 3);

        let untagged = CapacityReport::new(44_100, 2, false);
        assert_eq!(untagged.payload_capacity(), 11_025);
    }
}
