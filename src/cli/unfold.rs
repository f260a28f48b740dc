//! # unfold 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/unfold.rs`

use super::{BlochArgs, KPointArgs};

use clap::Args;
use std::path::PathBuf;

/// unfold 子命令参数
#[derive(Args, Debug)]
pub struct UnfoldArgs {
    #[command(flatten)]
    pub bloch: BlochArgs,

    #[command(flatten)]
    pub k: KPointArgs,

    /// CSV file with records `point,row,col,re[,im]` (point = unfold point index)
    #[arg(short, long)]
    pub input: PathBuf,

    /// CSV file for the unfolded matrix (`row,col,re,im`)
    #[arg(short, long, default_value = "unfolded.csv")]
    pub output: PathBuf,

    /// Primitive matrix size (inferred from the largest index when omitted)
    #[arg(long)]
    pub size: Option<usize>,

    /// Skip entries with |value| <= tolerance (negative writes every entry)
    #[arg(short, long, default_value_t = 1e-12, allow_negative_numbers = true)]
    pub tolerance: f64,

    /// Number of worker threads (0 = auto)
    #[arg(short, long, default_value_t = 0, env = "QUNFOLD_JOBS")]
    pub jobs: usize,

    /// Overwrite an existing output file
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
