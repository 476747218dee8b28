//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 和 `analyze` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用载体适配器以及向用户报告结果。

use crate::capacity::CapacityReport;
use crate::carrier::image::save_image;
use crate::carrier::{
    AudioCarrier, Carrier, CarrierKind, ExplicitLengthCarrier, ImageCarrier, SelfDescribingCarrier,
};
use crate::cli::{AnalyzeArgs, HideArgs, RecoverArgs, StegArgs};
use crate::constants::{HIDDEN_FILE_PREFIX, RECOVERED_FILE_EXTENSION, RECOVERED_FILE_PREFIX};
use crate::error::StegError;
use crate::observer::{NoopObserver, Phase, PhaseObserver, timed};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 把阶段耗时输出到标准错误。
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleObserver;

impl PhaseObserver for ConsoleObserver {
    fn on_phase(&self, phase: Phase, elapsed: Duration) {
        eprintln!(
            "{}",
            format!("{phase:<30} in {:.2}s", elapsed.as_secs_f64()).dimmed()
        );
    }
}

fn observer(steg: &StegArgs) -> &'static dyn PhaseObserver {
    if steg.verbose {
        &ConsoleObserver
    } else {
        &NoopObserver
    }
}

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取载体和待隐藏文件、检查容量、把数据隐藏进载体，
/// 最后以原始格式参数写出结果载体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 输入路径不存在，或目标文件已存在且未指定 `--force`。
/// * 无法读取或解码输入的载体或文件。
/// * 载体没有足够的空间来隐藏文件。
/// * 无法写入到目标文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    ensure_input(&args.input)?;
    ensure_input(&args.file)?;

    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| default_hidden_path(&args.input));
    ensure_writable(&dest, args.force)?;

    let config = args.steg.config()?;
    let observer = observer(&args.steg);

    let payload = fs::read(&args.file).with_context(|| {
        format!(
            "Unable to read input file: {}",
            args.file.to_string_lossy().red().bold()
        )
    })?;

    match CarrierKind::from_path(&args.input) {
        CarrierKind::Image => {
            let mut carrier = timed(observer, Phase::Flattened, || ImageCarrier::open(&args.input))
                .with_context(|| carrier_read_error(&args.input))?;

            carrier
                .hide(&payload, &config, observer)
                .with_context(|| hide_error(&args.file))?;

            let image = timed(observer, Phase::Reassembled, || carrier.to_image())?;
            timed(observer, Phase::Encoded, || {
                save_image(&image, &dest, args.compression)
            })
            .with_context(|| carrier_write_error(&dest))?;
        }
        CarrierKind::Audio => {
            let mut carrier = timed(observer, Phase::Flattened, || AudioCarrier::open(&args.input))
                .with_context(|| carrier_read_error(&args.input))?;

            let hidden = if args.steg.tagged {
                SelfDescribingCarrier::hide(&mut carrier, &payload, &config, observer)
            } else {
                carrier.hide_exact(&payload, &config, observer)
            };
            hidden.with_context(|| hide_error(&args.file))?;

            timed(observer, Phase::Encoded, || carrier.save(&dest))
                .with_context(|| carrier_write_error(&dest))?;
        }
    }

    println!(
        "{} bytes have been successfully hidden and saved: {}",
        payload.len().to_string().green().bold(),
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的载体、恢复隐藏的数据，并写入目标文件。
/// 图像载体从长度标签中得知数据长度；不带标签的音频载体需要 `--bytes`。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 输入路径不存在，或目标文件已存在且未指定 `--force`。
/// * 不带标签的音频缺少 `--bytes`，或带标签的载体多给了 `--bytes`。
/// * 无法读取或解码载体。
/// * 长度标签损坏 (载体不是由本工具以相同参数生成)。
/// * 无法写入到目标文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    ensure_input(&args.input)?;

    let kind = CarrierKind::from_path(&args.input);
    let bytes_to_recover = match (kind, args.steg.tagged, args.bytes) {
        (CarrierKind::Audio, false, Some(bytes)) => Some(bytes),
        (CarrierKind::Audio, false, None) => {
            return Err(StegError::MissingArgument("--bytes (untagged audio carries no length)").into());
        }
        (_, _, Some(_)) => {
            return Err(StegError::UnexpectedArgument("--bytes (the length is read from the size tag)").into());
        }
        (_, _, None) => None,
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_recovered_path(&args.input));
    ensure_writable(&output, args.force)?;

    let config = args.steg.config()?;
    let observer = observer(&args.steg);

    let data = match kind {
        CarrierKind::Image => {
            let carrier = timed(observer, Phase::Flattened, || ImageCarrier::open(&args.input))
                .with_context(|| carrier_read_error(&args.input))?;
            carrier
                .recover(&config, observer)
                .with_context(|| recover_error(&args.input))?
        }
        CarrierKind::Audio => {
            let carrier = timed(observer, Phase::Flattened, || AudioCarrier::open(&args.input))
                .with_context(|| carrier_read_error(&args.input))?;
            let recovered = match bytes_to_recover {
                Some(bytes) => carrier.recover_exact(bytes, &config, observer),
                None => SelfDescribingCarrier::recover(&carrier, &config, observer),
            };
            recovered.with_context(|| recover_error(&args.input))?
        }
    };

    fs::write(&output, &data).with_context(|| {
        format!(
            "Unable to write to target file: {}",
            output.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "{} bytes have been successfully recovered and saved: {}",
        data.len().to_string().green().bold(),
        output.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Analyze' 命令的执行逻辑。
///
/// 报告载体参数、给定 LSB 数下的容量与长度标签宽度；
/// 若提供了待隐藏文件，还会报告其大小以及能否放下。
pub fn handle_analyze(args: AnalyzeArgs) -> Result<()> {
    ensure_input(&args.input)?;
    if let Some(file) = &args.file {
        ensure_input(file)?;
    }

    let report = analyze(&args)?;

    println!(
        "{:<30} {} B",
        format!("Using {} LSBs, we can hide:", report.num_lsb),
        report.capacity_bytes.to_string().green().bold()
    );
    println!("{:<30} {} B", "File size tag:", report.tag_width);
    println!(
        "{:<30} {} B",
        "Usable payload capacity:",
        report.payload_capacity().to_string().green().bold()
    );

    if let Some(file) = &args.file {
        let size = fs::metadata(file)
            .with_context(|| {
                format!(
                    "Unable to read input file: {}",
                    file.to_string_lossy().red().bold()
                )
            })?
            .len() as usize;

        println!("{:<30} {} B", "Size of input file:", size);
        if report.fits(size) {
            println!("{}", "The input file fits in this carrier.".green());
        } else {
            println!(
                "{} (requires {} LSBs)",
                "The input file does not fit in this carrier.".red().bold(),
                report.required_lsb(size).to_string().red().bold()
            );
        }
    }

    Ok(())
}

/// 打开载体并打印其基本参数，返回容量报告。
pub fn analyze(args: &AnalyzeArgs) -> Result<CapacityReport> {
    let num_lsb = args.steg.num_lsb;
    let report = match CarrierKind::from_path(&args.input) {
        CarrierKind::Image => {
            let carrier =
                ImageCarrier::open(&args.input).with_context(|| carrier_read_error(&args.input))?;
            let (width, height) = carrier.dimensions();
            println!("Image resolution: ({width}, {height})");
            ensure_num_lsb(&carrier, num_lsb)?;
            carrier.capacity(num_lsb, true)
        }
        CarrierKind::Audio => {
            let carrier =
                AudioCarrier::open(&args.input).with_context(|| carrier_read_error(&args.input))?;
            println!(
                "Audio: {} frames, {} channels, {}-bit, {} Hz",
                carrier.num_frames(),
                carrier.num_channels(),
                carrier.spec().bits_per_sample,
                carrier.spec().sample_rate
            );
            ensure_num_lsb(&carrier, num_lsb)?;
            carrier.capacity(num_lsb, args.steg.tagged)
        }
    };
    Ok(report)
}

fn ensure_num_lsb(carrier: &impl Carrier, num_lsb: u32) -> Result<()> {
    if num_lsb > carrier.sample_bits() {
        return Err(StegError::InvalidNumLsb {
            num_lsb,
            max: carrier.sample_bits(),
        }
        .into());
    }
    Ok(())
}

/// 输入路径必须指向已存在的文件，在任何载体 I/O 之前检查。
fn ensure_input(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(StegError::InvalidPath(path.to_path_buf()).into());
    }
    Ok(())
}

fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(StegError::OutputExists(path.to_path_buf()).into());
    }
    Ok(())
}

/// `dir/name.ext` -> `dir/doctored_name.ext`
pub fn default_hidden_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{HIDDEN_FILE_PREFIX}{name}"))
}

/// `dir/name.ext` -> `dir/recovered_name.bin`
pub fn default_recovered_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!(
        "{RECOVERED_FILE_PREFIX}{stem}.{RECOVERED_FILE_EXTENSION}"
    ))
}

fn carrier_read_error(path: &Path) -> String {
    format!(
        "Unable to read carrier file: {}",
        path.to_string_lossy().red().bold()
    )
}

fn carrier_write_error(path: &Path) -> String {
    format!(
        "Unable to write to target carrier file: {}",
        path.to_string_lossy().red().bold()
    )
}

fn hide_error(path: &Path) -> String {
    format!(
        "Failed to hide '{}'. \nTry a larger carrier or more LSBs.",
        path.to_string_lossy().red().bold()
    )
}

fn recover_error(path: &Path) -> String {
    format!(
        "Failed to recover data from '{}'. \nThe carrier may not contain hidden data, or was hidden with different parameters.",
        path.to_string_lossy().red().bold()
    )
}
