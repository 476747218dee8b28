//! # 位编解码模块
//!
//! 与载体无关的 LSB 交织/解交织例程。
//!
//! 位序 (线格式的一部分)：负载按字节顺序读取，每个字节内**高位在前**；
//! 位流按 `num_lsb` 位分组，组内第一个位写入样本低 `num_lsb` 位中的最高位。
//! 最后一组不足 `num_lsb` 位时以 0 补齐。

use crate::capacity::{capacity_bytes, required_lsb};
use crate::error::{Result, StegError};

#[cfg(feature = "parallel")]
use crate::constants::PARALLEL_THRESHOLD;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// 固定位宽的无符号载体样本。
pub trait Sample: Copy + Send + Sync {
    /// 样本位宽 `W`。
    const BITS: u32;

    /// 读取低 `num_lsb` 位。
    fn low_bits(self, num_lsb: u32) -> u32;

    /// 用 `bits` 覆盖低 `num_lsb` 位，保持高位不变。
    fn with_low_bits(self, num_lsb: u32, bits: u32) -> Self;
}

macro_rules! impl_sample {
    ($($ty:ty),*) => {$(
        impl Sample for $ty {
            const BITS: u32 = <$ty>::BITS;

            #[inline]
            fn low_bits(self, num_lsb: u32) -> u32 {
                u32::from(self) & low_mask(num_lsb)
            }

            #[inline]
            fn with_low_bits(self, num_lsb: u32, bits: u32) -> Self {
                let mask = low_mask(num_lsb) as $ty;
                (self & !mask) | (bits as $ty & mask)
            }
        }
    )*};
}

impl_sample!(u8, u16);

#[inline]
fn low_mask(num_lsb: u32) -> u32 {
    (1u32 << num_lsb) - 1
}

/// 校验 `1 <= num_lsb <= S::BITS`。
pub fn check_num_lsb<S: Sample>(num_lsb: u32) -> Result<()> {
    if num_lsb == 0 || num_lsb > S::BITS {
        return Err(StegError::InvalidNumLsb {
            num_lsb,
            max: S::BITS,
        });
    }
    Ok(())
}

/// 将 `payload` 交织进 `samples` 的低 `num_lsb` 位，返回新的样本序列。
///
/// 未被负载占用的样本原样返回。
///
/// # Errors
///
/// * `InvalidNumLsb` - `num_lsb` 超出样本位宽。
/// * `CapacityExceeded` - `8 × len(payload) > len(samples) × num_lsb`。
pub fn interleave<S: Sample>(samples: &[S], payload: &[u8], num_lsb: u32) -> Result<Vec<S>> {
    let mut output = samples.to_vec();
    interleave_in_place(&mut output, payload, num_lsb)?;
    Ok(output)
}

/// 与 [`interleave`] 相同，但直接修改调用者持有的样本缓冲区。
pub fn interleave_in_place<S: Sample>(samples: &mut [S], payload: &[u8], num_lsb: u32) -> Result<()> {
    check_num_lsb::<S>(num_lsb)?;

    let k = num_lsb as usize;
    let num_bits = payload.len() * 8;
    if num_bits > samples.len() * k {
        return Err(StegError::CapacityExceeded {
            requested: payload.len(),
            maximum: capacity_bytes(samples.len(), num_lsb),
            num_lsb,
            required_lsb: required_lsb(payload.len(), samples.len()),
        });
    }

    let used = num_bits.div_ceil(k);
    for_each_indexed(&mut samples[..used], used, |index, sample| {
        *sample = sample.with_low_bits(num_lsb, chunk_at(payload, index * k, k));
    });

    Ok(())
}

/// 从 `samples` 的低 `num_lsb` 位中读出 `num_bits` 位并重组为字节。
///
/// 调用者构造的 `num_bits` 总是 8 的倍数，结果恰为 `num_bits / 8` 字节。
///
/// # Errors
///
/// * `InvalidNumLsb` - `num_lsb` 超出样本位宽。
/// * `InsufficientCarrier` - 样本数少于 `ceil(num_bits / num_lsb)`。
pub fn deinterleave<S: Sample>(samples: &[S], num_bits: usize, num_lsb: u32) -> Result<Vec<u8>> {
    check_num_lsb::<S>(num_lsb)?;

    let k = num_lsb as usize;
    let needed = num_bits.div_ceil(k);
    if samples.len() < needed {
        return Err(StegError::InsufficientCarrier {
            needed,
            available: samples.len(),
        });
    }

    let mut output = vec![0u8; num_bits.div_ceil(8)];
    for_each_indexed(&mut output, needed, |index, byte| {
        *byte = (0..8).fold(0u8, |acc, offset| {
            let pos = index * 8 + offset;
            let bit = if pos < num_bits {
                (samples[pos / k].low_bits(num_lsb) >> (k - 1 - pos % k)) & 1
            } else {
                0
            };
            (acc << 1) | bit as u8
        });
    });

    Ok(output)
}

/// 从负载位流第 `start` 位起取 `k` 位 (高位在前)，越过末尾的位补 0。
#[inline]
fn chunk_at(payload: &[u8], start: usize, k: usize) -> u32 {
    (start..start + k).fold(0u32, |acc, pos| {
        let bit = payload
            .get(pos / 8)
            .map_or(0, |byte| (byte >> (7 - pos % 8)) & 1);
        (acc << 1) | u32::from(bit)
    })
}

/// 对每个元素调用 `f(index, item)`；各元素相互独立。
///
/// 涉及的载体样本数 `samples_touched` 达到阈值时分片并行。
#[cfg_attr(not(feature = "parallel"), allow(unused_variables))]
fn for_each_indexed<T, F>(items: &mut [T], samples_touched: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        if samples_touched >= PARALLEL_THRESHOLD {
            items
                .par_iter_mut()
                .enumerate()
                .for_each(|(index, item)| f(index, item));
            return;
        }
    }

    items
        .iter_mut()
        .enumerate()
        .for_each(|(index, item)| f(index, item));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_are_packed_msb_first() {
        // 'A' = 0b0100_0001
        let samples = interleave(&[0u8; 8], b"A", 1).unwrap();
        assert_eq!(samples, vec![0, 1, 0, 0, 0, 0, 0, 1]);

        let samples = interleave(&[0u8; 4], b"A", 2).unwrap();
        assert_eq!(samples, vec![0b01, 0b00, 0b00, 0b01]);
    }

    #[test]
    fn test_high_bits_are_preserved() {
        let samples = interleave(&[0b1010_1010u8; 4], &[0xFF], 2).unwrap();
        assert_eq!(samples, vec![0b1010_1011; 4]);
    }

    #[test]
    fn test_short_tail_chunk_is_zero_padded() {
        // 8 位按 3 位分组：111 111 11(0)
        let samples = interleave(&[0xFFu8; 4], &[0xFF], 3).unwrap();
        assert_eq!(samples, vec![0xFF, 0xFF, 0xFE, 0xFF]);
    }

    #[test]
    fn test_unused_samples_are_untouched() {
        let carrier: Vec<u8> = (0..32).collect();
        let samples = interleave(&carrier, b"hi", 4).unwrap();
        assert_eq!(samples.len(), carrier.len());
        assert_eq!(&samples[4..], &carrier[4..]);
    }

    #[test]
    fn test_roundtrip_every_num_lsb_u8() {
        let payload = b"The quick brown fox jumps over the lazy dog";
        let carrier: Vec<u8> = (0..400).map(|i| (i * 37 % 251) as u8).collect();
        for num_lsb in 1..=8 {
            let samples = interleave(&carrier, payload, num_lsb).unwrap();
            let recovered = deinterleave(&samples, payload.len() * 8, num_lsb).unwrap();
            assert_eq!(recovered, payload, "num_lsb = {num_lsb}");
        }
    }

    #[test]
    fn test_roundtrip_every_num_lsb_u16() {
        let payload: Vec<u8> = (0..=255).collect();
        let carrier: Vec<u16> = (0..2100).map(|i| (i * 7919 % 65521) as u16).collect();
        for num_lsb in 1..=16 {
            let samples = interleave(&carrier, &payload, num_lsb).unwrap();
            let recovered = deinterleave(&samples, payload.len() * 8, num_lsb).unwrap();
            assert_eq!(recovered, payload, "num_lsb = {num_lsb}");
        }
    }

    #[test]
    fn test_full_width_replaces_samples() {
        let samples = interleave(&[0x1234u16, 0x5678], &[0xAB, 0xCD, 0xEF], 16).unwrap();
        assert_eq!(samples, vec![0xABCD, 0xEF00]);
    }

    #[test]
    fn test_exact_capacity_fits_and_one_more_byte_fails() {
        let carrier = [0u8; 16];
        assert!(interleave(&carrier, &[0xAA; 4], 2).is_ok());

        let err = interleave(&carrier, &[0xAA; 5], 2).unwrap_err();
        assert!(matches!(
            err,
            StegError::CapacityExceeded {
                requested: 5,
                maximum: 4,
                num_lsb: 2,
                required_lsb: 3,
            }
        ));
    }

    #[test]
    fn test_deinterleave_insufficient_carrier() {
        let err = deinterleave(&[0u8; 3], 16, 4).unwrap_err();
        assert!(matches!(
            err,
            StegError::InsufficientCarrier {
                needed: 4,
                available: 3
            }
        ));
    }

    #[test]
    fn test_num_lsb_out_of_range() {
        assert!(matches!(
            interleave(&[0u8; 8], b"x", 0),
            Err(StegError::InvalidNumLsb { num_lsb: 0, max: 8 })
        ));
        assert!(matches!(
            deinterleave(&[0u8; 8], 8, 9),
            Err(StegError::InvalidNumLsb { num_lsb: 9, max: 8 })
        ));
        assert!(check_num_lsb::<u16>(16).is_ok());
    }

    #[test]
    fn test_empty_payload() {
        let carrier = [7u8; 4];
        assert_eq!(interleave(&carrier, &[], 3).unwrap(), carrier.to_vec());
        assert!(deinterleave(&carrier, 0, 3).unwrap().is_empty());
    }

    /// 逐位顺序实现，作为分片路径的对照。
    fn serial_interleave(samples: &[u16], payload: &[u8], num_lsb: u32) -> Vec<u16> {
        let k = num_lsb as usize;
        let mut output = samples.to_vec();
        // 末组不足 k 位时补 0
        for pos in 0..(payload.len() * 8).div_ceil(k) * k {
            let bit = payload
                .get(pos / 8)
                .map_or(0, |byte| u16::from((byte >> (7 - pos % 8)) & 1));
            let shift = k - 1 - pos % k;
            let sample = &mut output[pos / k];
            *sample = (*sample & !(1 << shift)) | (bit << shift);
        }
        output
    }

    fn serial_deinterleave(samples: &[u16], num_bytes: usize, num_lsb: u32) -> Vec<u8> {
        let k = num_lsb as usize;
        let mut output = vec![0u8; num_bytes];
        for pos in 0..num_bytes * 8 {
            let bit = ((samples[pos / k] >> (k - 1 - pos % k)) & 1) as u8;
            output[pos / 8] |= bit << (7 - pos % 8);
        }
        output
    }

    #[test]
    fn test_large_carrier_matches_serial_layout() {
        use crate::constants::PARALLEL_THRESHOLD;

        let num_lsb = 3;
        let payload: Vec<u8> = (0..PARALLEL_THRESHOLD + 7).map(|i| (i * 131 % 251) as u8).collect();
        let carrier: Vec<u16> = (0..payload.len() * 8 / 3 + 1)
            .map(|i| (i * 40_503 % 65_521) as u16)
            .collect();
        assert!(carrier.len() >= PARALLEL_THRESHOLD);

        let samples = interleave(&carrier, &payload, num_lsb).unwrap();
        assert_eq!(samples, serial_interleave(&carrier, &payload, num_lsb));

        let recovered = deinterleave(&samples, payload.len() * 8, num_lsb).unwrap();
        assert_eq!(recovered, serial_deinterleave(&samples, payload.len(), num_lsb));
        assert_eq!(recovered, payload);
    }
}
