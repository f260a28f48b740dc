//! # dos 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/dos.rs`

use crate::dos::DosOutput;

use clap::Args;
use std::path::PathBuf;

/// dos 子命令参数
#[derive(Args, Debug)]
pub struct DosArgs {
    /// DOSCAR file
    #[arg(default_value = "DOSCAR")]
    pub input: PathBuf,

    /// Output file
    #[arg(short, long, default_value = "dos.png")]
    pub output: PathBuf,

    /// Output format (auto-detected from extension if not specified)
    #[arg(short, long, value_enum)]
    pub format: Option<DosOutput>,

    /// Lower energy bound relative to the Fermi level (eV)
    #[arg(long, allow_negative_numbers = true)]
    pub emin: Option<f64>,

    /// Upper energy bound relative to the Fermi level (eV)
    #[arg(long, allow_negative_numbers = true)]
    pub emax: Option<f64>,

    /// Image width in pixels
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Plot title (defaults to the DOSCAR comment line)
    #[arg(long)]
    pub title: Option<String>,
}
