//! # lsb_steg 库
//!
//! 本库包含 LSB 隐写工具的核心逻辑：与载体无关的位编解码、容量模型，
//! 以及图像与 WAV 音频两种载体适配器。

// 声明库包含的所有模块。

pub mod capacity;
pub mod carrier;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod framing;
pub mod handler;
pub mod observer;
pub mod steganography;

pub use carrier::{AudioCarrier, Carrier, ExplicitLengthCarrier, ImageCarrier, SelfDescribingCarrier};
pub use config::{StegConfig, TagByteOrder};
pub use error::{Result, StegError};
