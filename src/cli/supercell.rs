//! # supercell 子命令 CLI 定义
//!
//! 单文件或目录批量模式生成 Bloch 超胞结构 (POSCAR)。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/supercell.rs`

use super::BlochArgs;

use clap::Args;
use std::path::PathBuf;

/// supercell 子命令参数
#[derive(Args, Debug)]
pub struct SupercellArgs {
    /// Input: structure file or directory containing structure files
    pub input: PathBuf,

    #[command(flatten)]
    pub bloch: BlochArgs,

    /// Output: file path (single mode) or directory (batch mode)
    #[arg(short, long, default_value = "POSCAR_supercell")]
    pub output: PathBuf,

    /// Write Cartesian instead of Direct coordinates
    #[arg(long, default_value_t = false)]
    pub cartesian: bool,

    /// Glob pattern(s) for batch mode, comma separated (default: POSCAR/CONTCAR/*.vasp)
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Recurse into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0, env = "QUNFOLD_JOBS")]
    pub jobs: usize,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
