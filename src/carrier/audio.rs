//! # 音频载体适配器
//!
//! 把交错的 PCM 帧展平为样本序列 (仅支持 8 位与 16 位整数 PCM)。
//!
//! 样本按 WAV 文件中的原始无符号值处理：8 位 PCM 本身无符号，
//! 16 位 PCM 按补码重新解释为 `u16`。写回时保持声道数、采样率与位深不变。
//!
//! 默认不写入长度标签，恢复时需提供字节数；
//! 也可以通过 [`SelfDescribingCarrier`] 使用与图像相同的长度标签。

use super::{Carrier, ExplicitLengthCarrier, SelfDescribingCarrier};
use crate::config::StegConfig;
use crate::constants::SUPPORTED_AUDIO_BYTE_DEPTHS;
use crate::error::{Result, StegError};
use crate::framing;
use crate::observer::PhaseObserver;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

/// 按位深区分的原始 PCM 样本。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PcmSamples {
    Eight(Vec<u8>),
    Sixteen(Vec<u16>),
}

impl PcmSamples {
    pub fn len(&self) -> usize {
        match self {
            Self::Eight(samples) => samples.len(),
            Self::Sixteen(samples) => samples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bits(&self) -> u16 {
        match self {
            Self::Eight(_) => 8,
            Self::Sixteen(_) => 16,
        }
    }
}

/// 展平后的 WAV 载体。
#[derive(Debug, Clone, PartialEq)]
pub struct AudioCarrier {
    spec: WavSpec,
    samples: PcmSamples,
}

impl AudioCarrier {
    /// 用给定的流参数和样本创建载体。
    ///
    /// # Errors
    ///
    /// 流参数不是 8/16 位整数 PCM，或与样本位深不一致时返回 `UnsupportedBitDepth`。
    pub fn new(spec: WavSpec, samples: PcmSamples) -> Result<Self> {
        check_spec(&spec)?;
        if spec.bits_per_sample != samples.bits() {
            return Err(StegError::UnsupportedBitDepth {
                bits: spec.bits_per_sample,
            });
        }
        Ok(Self { spec, samples })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(WavReader::open(path)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(WavReader::new(Cursor::new(bytes))?)
    }

    fn from_reader<R: Read>(reader: WavReader<R>) -> Result<Self> {
        let spec = reader.spec();
        // 位深在读取任何样本之前检查
        check_spec(&spec)?;

        let samples = match spec.bits_per_sample {
            8 => PcmSamples::Eight(
                reader
                    .into_samples::<i8>()
                    .map(|sample| sample.map(|value| (value as u8) ^ 0x80))
                    .collect::<std::result::Result<_, _>>()?,
            ),
            _ => PcmSamples::Sixteen(
                reader
                    .into_samples::<i16>()
                    .map(|sample| sample.map(|value| value as u16))
                    .collect::<std::result::Result<_, _>>()?,
            ),
        };

        Ok(Self { spec, samples })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write_samples(WavWriter::create(path, self.spec)?)
    }

    /// 以原始流参数编码为 WAV 字节。
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write_samples(WavWriter::new(Cursor::new(&mut bytes), self.spec)?)?;
        Ok(bytes)
    }

    fn write_samples<W: Write + Seek>(&self, mut writer: WavWriter<W>) -> Result<()> {
        match &self.samples {
            PcmSamples::Eight(samples) => {
                for &sample in samples {
                    writer.write_sample((sample ^ 0x80) as i8)?;
                }
            }
            PcmSamples::Sixteen(samples) => {
                for &sample in samples {
                    writer.write_sample(sample as i16)?;
                }
            }
        }
        writer.finalize()?;
        Ok(())
    }

    pub fn spec(&self) -> &WavSpec {
        &self.spec
    }

    pub fn samples(&self) -> &PcmSamples {
        &self.samples
    }

    pub fn num_channels(&self) -> u16 {
        self.spec.channels
    }

    pub fn num_frames(&self) -> usize {
        self.samples.len() / usize::from(self.spec.channels.max(1))
    }

    /// 采样字节深度 (1 或 2)。
    pub fn byte_depth(&self) -> u16 {
        self.spec.bits_per_sample / 8
    }
}

fn check_spec(spec: &WavSpec) -> Result<()> {
    let byte_depth = spec.bits_per_sample.div_ceil(8);
    if spec.sample_format != SampleFormat::Int
        || spec.bits_per_sample % 8 != 0
        || !SUPPORTED_AUDIO_BYTE_DEPTHS.contains(&byte_depth)
    {
        return Err(StegError::UnsupportedBitDepth {
            bits: spec.bits_per_sample,
        });
    }
    Ok(())
}

impl Carrier for AudioCarrier {
    fn num_samples(&self) -> usize {
        self.num_frames() * usize::from(self.spec.channels)
    }

    fn sample_bits(&self) -> u32 {
        u32::from(self.spec.bits_per_sample)
    }
}

impl ExplicitLengthCarrier for AudioCarrier {
    fn hide_exact(&mut self, payload: &[u8], config: &StegConfig, observer: &dyn PhaseObserver) -> Result<()> {
        let capacity = self.num_samples();
        match &mut self.samples {
            PcmSamples::Eight(samples) => {
                framing::hide_untagged(&mut samples[..capacity], payload, config, observer)
            }
            PcmSamples::Sixteen(samples) => {
                framing::hide_untagged(&mut samples[..capacity], payload, config, observer)
            }
        }
    }

    fn recover_exact(
        &self,
        bytes_to_recover: usize,
        config: &StegConfig,
        observer: &dyn PhaseObserver,
    ) -> Result<Vec<u8>> {
        let capacity = self.num_samples();
        match &self.samples {
            PcmSamples::Eight(samples) => {
                framing::recover_untagged(&samples[..capacity], bytes_to_recover, config, observer)
            }
            PcmSamples::Sixteen(samples) => {
                framing::recover_untagged(&samples[..capacity], bytes_to_recover, config, observer)
            }
        }
    }
}

impl SelfDescribingCarrier for AudioCarrier {
    fn hide(&mut self, payload: &[u8], config: &StegConfig, observer: &dyn PhaseObserver) -> Result<()> {
        let capacity = self.num_samples();
        match &mut self.samples {
            PcmSamples::Eight(samples) => {
                framing::hide_tagged(samples, capacity, payload, config, observer)
            }
            PcmSamples::Sixteen(samples) => {
                framing::hide_tagged(samples, capacity, payload, config, observer)
            }
        }
    }

    fn recover(&self, config: &StegConfig, observer: &dyn PhaseObserver) -> Result<Vec<u8>> {
        let capacity = self.num_samples();
        match &self.samples {
            PcmSamples::Eight(samples) => framing::recover_tagged(samples, capacity, config, observer),
            PcmSamples::Sixteen(samples) => {
                framing::recover_tagged(samples, capacity, config, observer)
            }
        }
    }
}
