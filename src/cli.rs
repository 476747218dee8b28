//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use crate::config::{StegConfig, TagByteOrder};
use crate::constants::{DEFAULT_COMPRESSION_LEVEL, DEFAULT_NUM_LSB, MAX_COMPRESSION_LEVEL};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// 一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在无损图像 (如 PNG, BMP) 或 WAV 音频中隐藏或恢复任意文件。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在无损图像 (如 PNG, BMP) 或 WAV 音频中隐藏或恢复任意文件。\n扩展名为 .wav 的载体按音频处理，其余按图像处理。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：hide (隐藏)、recover (恢复) 和 analyze (分析)。
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 在载体 (图像或 WAV 音频) 中隐藏文件内容。
    Hide(HideArgs),

    /// 从经过隐写的载体中恢复隐藏的文件。
    Recover(RecoverArgs),

    /// 报告载体在给定 LSB 数下的容量及长度标签宽度。
    Analyze(AnalyzeArgs),
}

/// 隐藏与恢复共用的隐写参数。
#[derive(Args, Debug, Clone)]
pub struct StegArgs {
    /// 每个样本用于存放数据的最低有效位数 (图像与 8 位音频为 1-8，16 位音频为 1-16)。
    #[arg(short, long, default_value_t = DEFAULT_NUM_LSB, value_parser = clap::value_parser!(u32).range(1..=16))]
    pub num_lsb: u32,

    /// 长度标签的字节序，隐藏与恢复时必须一致。
    #[arg(long, value_enum, default_value_t = TagByteOrder::Little)]
    pub tag_order: TagByteOrder,

    /// 对音频载体也写入/读取长度标签 (图像总是带标签)。
    #[arg(long)]
    pub tagged: bool,

    /// 输出各阶段耗时。
    #[arg(short, long)]
    pub verbose: bool,
}

impl StegArgs {
    pub fn config(&self) -> crate::error::Result<StegConfig> {
        StegConfig::new(self.num_lsb, self.tag_order)
    }
}

impl Default for StegArgs {
    fn default() -> Self {
        Self {
            num_lsb: DEFAULT_NUM_LSB,
            tag_order: TagByteOrder::default(),
            tagged: false,
            verbose: false,
        }
    }
}

/// 'hide' 命令所需的参数。
#[derive(Args, Debug)]
pub struct HideArgs {
    /// 用于隐写的载体文件路径 (PNG, BMP 等无损图像，或 8/16 位 WAV)。
    #[arg(short, long)]
    pub input: PathBuf,

    /// 要隐藏的文件路径。
    #[arg(short, long)]
    pub file: PathBuf,

    /// 隐写完成后，保存结果载体的输出路径。默认为输入文件旁的 `doctored_<文件名>`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// PNG 输出的压缩级别 (0-9)。
    #[arg(short, long, default_value_t = DEFAULT_COMPRESSION_LEVEL, value_parser = clap::value_parser!(u8).range(0..=MAX_COMPRESSION_LEVEL as i64))]
    pub compression: u8,

    /// 目标文件已存在时强制覆盖。
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub steg: StegArgs,
}

/// 'recover' 命令所需的参数。
#[derive(Args, Debug)]
pub struct RecoverArgs {
    /// 已隐藏数据的载体文件路径。
    #[arg(short, long)]
    pub input: PathBuf,

    /// 恢复数据后的保存路径。默认为输入文件旁的 `recovered_<文件名>.bin`。
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 要恢复的字节数 (不带长度标签的音频载体必须提供)。
    #[arg(short, long)]
    pub bytes: Option<usize>,

    /// 目标文件已存在时强制覆盖。
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub steg: StegArgs,
}

/// 'analyze' 命令所需的参数。
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// 要分析的载体文件路径。
    #[arg(short, long)]
    pub input: PathBuf,

    /// 可选：打算隐藏的文件，用于判断能否放下。
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub steg: StegArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_hide_defaults() {
        let cli = Cli::try_parse_from(["lsb_steg", "hide", "-i", "cover.png", "-f", "secret.bin"]).unwrap();
        let Commands::Hide(args) = cli.command else {
            panic!("expected hide");
        };
        assert_eq!(args.steg.num_lsb, DEFAULT_NUM_LSB);
        assert_eq!(args.compression, DEFAULT_COMPRESSION_LEVEL);
        assert_eq!(args.steg.tag_order, TagByteOrder::Little);
        assert!(args.dest.is_none());
        assert!(!args.force);
    }

    #[test]
    fn test_parse_recover_audio() {
        let cli = Cli::try_parse_from([
            "lsb_steg", "recover", "-i", "song.wav", "-b", "128", "-n", "3", "--tag-order", "big",
        ])
        .unwrap();
        let Commands::Recover(args) = cli.command else {
            panic!("expected recover");
        };
        assert_eq!(args.bytes, Some(128));
        assert_eq!(args.steg.num_lsb, 3);
        assert_eq!(args.steg.tag_order, TagByteOrder::Big);
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        assert!(Cli::try_parse_from(["lsb_steg", "hide", "-i", "a.png", "-f", "b", "-n", "0"]).is_err());
        assert!(Cli::try_parse_from(["lsb_steg", "hide", "-i", "a.png", "-f", "b", "-c", "10"]).is_err());
        assert!(Cli::try_parse_from(["lsb_steg", "hide", "-i", "a.png"]).is_err());
    }
}
