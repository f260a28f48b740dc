//! # points 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/points.rs`

use super::{BlochArgs, KPointArgs};

use clap::Args;
use std::path::PathBuf;

/// points 子命令参数
#[derive(Args, Debug)]
pub struct PointsArgs {
    #[command(flatten)]
    pub bloch: BlochArgs,

    #[command(flatten)]
    pub k: KPointArgs,

    /// Primitive structure (POSCAR) used to report Cartesian k-points in 1/Å
    #[arg(short, long)]
    pub structure: Option<PathBuf>,

    /// Write the unfold points to a CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
