//! # 负载封帧模块
//!
//! 在位编解码之上处理两种封帧方式：
//!
//! * 自描述：隐藏的位流以 `tag_width` 字节的长度标签开头，
//!   `tag_width = bytes_for_size_tag(num_samples, num_lsb)`，字节序由 [`TagByteOrder`] 固定。
//! * 显式长度：不写入标签，恢复时由调用者提供字节数。

use crate::capacity::{bytes_for_size_tag, capacity_bytes, ensure_fits};
use crate::config::{StegConfig, TagByteOrder};
use crate::error::{Result, StegError};
use crate::observer::{Phase, PhaseObserver, timed};
use crate::steganography::{Sample, check_num_lsb, deinterleave, interleave_in_place};

/// 把负载长度编码为 `width` 字节的标签。
///
/// 调用前须已通过容量校验，此时长度一定能用 `width` 字节表示。
pub fn encode_size_tag(len: usize, width: usize, order: TagByteOrder) -> Vec<u8> {
    let len = len as u64;
    match order {
        TagByteOrder::Little => len.to_le_bytes()[..width].to_vec(),
        TagByteOrder::Big => len.to_be_bytes()[8 - width..].to_vec(),
    }
}

/// 解码长度标签。
pub fn decode_size_tag(tag: &[u8], order: TagByteOrder) -> u64 {
    let fold = |acc: u64, &byte: &u8| (acc << 8) | u64::from(byte);
    match order {
        TagByteOrder::Little => tag.iter().rev().fold(0, fold),
        TagByteOrder::Big => tag.iter().fold(0, fold),
    }
}

/// 把 `标签 + 负载` 交织进 `samples` 的前 `capacity_samples` 个样本。
pub fn hide_tagged<S: Sample>(
    samples: &mut [S],
    capacity_samples: usize,
    payload: &[u8],
    config: &StegConfig,
    observer: &dyn PhaseObserver,
) -> Result<()> {
    check_num_lsb::<S>(config.num_lsb)?;
    let carrier = usable(samples.len(), capacity_samples)?;

    let tag_width = bytes_for_size_tag(carrier, config.num_lsb);
    ensure_fits(payload.len(), tag_width, carrier, config.num_lsb)?;

    let mut data = encode_size_tag(payload.len(), tag_width, config.tag_order);
    data.extend_from_slice(payload);

    timed(observer, Phase::Interleaved, || {
        interleave_in_place(&mut samples[..carrier], &data, config.num_lsb)
    })
}

/// 读出长度标签，校验后返回其后的负载。
///
/// # Errors
///
/// * `NoSizeTag` - 载体容量连长度标签都放不下。
/// * `CorruptedSizeTag` - 标签声称的长度超过 `capacity_bytes - tag_width`。
pub fn recover_tagged<S: Sample>(
    samples: &[S],
    capacity_samples: usize,
    config: &StegConfig,
    observer: &dyn PhaseObserver,
) -> Result<Vec<u8>> {
    check_num_lsb::<S>(config.num_lsb)?;
    let carrier = usable(samples.len(), capacity_samples)?;
    let samples = &samples[..carrier];

    let tag_width = bytes_for_size_tag(carrier, config.num_lsb);
    if tag_width > capacity_bytes(carrier, config.num_lsb) {
        return Err(StegError::NoSizeTag {
            tag_width,
            num_lsb: config.num_lsb,
        });
    }
    let maximum = capacity_bytes(carrier, config.num_lsb) - tag_width;

    let claimed = timed(observer, Phase::TagExtracted, || -> Result<usize> {
        let tag = deinterleave(samples, bits_in(tag_width, carrier)?, config.num_lsb)?;
        let claimed = decode_size_tag(&tag, config.tag_order);
        usize::try_from(claimed)
            .ok()
            .filter(|&len| len <= maximum)
            .ok_or(StegError::CorruptedSizeTag {
                claimed: usize::try_from(claimed).unwrap_or(usize::MAX),
                maximum,
                num_lsb: config.num_lsb,
            })
    })?;

    let mut data = timed(observer, Phase::Deinterleaved, || {
        deinterleave(samples, bits_in(tag_width + claimed, carrier)?, config.num_lsb)
    })?;
    data.drain(..tag_width);
    Ok(data)
}

/// 不带标签地交织负载。
pub fn hide_untagged<S: Sample>(
    samples: &mut [S],
    payload: &[u8],
    config: &StegConfig,
    observer: &dyn PhaseObserver,
) -> Result<()> {
    check_num_lsb::<S>(config.num_lsb)?;
    ensure_fits(payload.len(), 0, samples.len(), config.num_lsb)?;

    timed(observer, Phase::Interleaved, || {
        interleave_in_place(samples, payload, config.num_lsb)
    })
}

/// 读出调用者指定的 `bytes_to_recover` 字节。
///
/// # Errors
///
/// 载体放不下 `bytes_to_recover` 字节时返回 `InsufficientCarrier`。
pub fn recover_untagged<S: Sample>(
    samples: &[S],
    bytes_to_recover: usize,
    config: &StegConfig,
    observer: &dyn PhaseObserver,
) -> Result<Vec<u8>> {
    let num_bits = bits_in(bytes_to_recover, samples.len())?;
    timed(observer, Phase::Deinterleaved, || {
        deinterleave(samples, num_bits, config.num_lsb)
    })
}

/// `8 × num_bytes`，溢出时说明载体不可能放得下。
fn bits_in(num_bytes: usize, available: usize) -> Result<usize> {
    num_bytes
        .checked_mul(8)
        .ok_or(StegError::InsufficientCarrier {
            needed: usize::MAX,
            available,
        })
}

fn usable(available: usize, capacity_samples: usize) -> Result<usize> {
    if capacity_samples > available {
        return Err(StegError::InsufficientCarrier {
            needed: capacity_samples,
            available,
        });
    }
    Ok(capacity_samples)
}
