//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `points`: 列出展开 k 点
//! - `unfold`: 由各 k 点矩阵组装超胞矩阵
//! - `supercell`: 生成与展开矩阵顺序一致的超胞结构
//! - `dos`: DOSCAR 态密度绘图/导出
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: points, unfold, supercell, dos

pub mod dos;
pub mod points;
pub mod supercell;
pub mod unfold;

use clap::{Args, Parser, Subcommand};

/// qunfold - Bloch 展开与后处理工具
#[derive(Parser)]
#[command(name = "qunfold")]
#[command(version)]
#[command(about = "Bloch unfolding and post-processing toolkit", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// List the k-points a folded k-point unfolds to
    Points(points::PointsArgs),

    /// Assemble the supercell matrix from per-k-point primitive matrices
    Unfold(unfold::UnfoldArgs),

    /// Tile structures into the supercell matching the unfolded matrix order
    Supercell(supercell::SupercellArgs),

    /// Plot or export the total density of states from a DOSCAR
    Dos(dos::DosArgs),
}

/// Bloch 展开参数（多个子命令共享）
#[derive(Args, Debug, Clone)]
pub struct BlochArgs {
    /// Repetitions along the three lattice directions (values < 1 are treated as 1)
    #[arg(short, long, num_args = 3, value_names = ["BI", "BJ", "BK"], allow_negative_numbers = true, required = true)]
    pub bloch: Vec<i64>,
}

impl BlochArgs {
    pub fn expansion(&self) -> [i64; 3] {
        [
            self.bloch.first().copied().unwrap_or(1),
            self.bloch.get(1).copied().unwrap_or(1),
            self.bloch.get(2).copied().unwrap_or(1),
        ]
    }
}

/// 折叠 k 点参数（约化坐标）
#[derive(Args, Debug, Clone)]
pub struct KPointArgs {
    /// Folded k-point in reduced coordinates of the supercell
    #[arg(short, long, num_args = 3, value_names = ["KX", "KY", "KZ"], allow_negative_numbers = true, default_values_t = [0.0, 0.0, 0.0])]
    pub k: Vec<f64>,
}

impl KPointArgs {
    pub fn k_point(&self) -> [f64; 3] {
        [
            self.k.first().copied().unwrap_or(0.0),
            self.k.get(1).copied().unwrap_or(0.0),
            self.k.get(2).copied().unwrap_or(0.0),
        ]
    }
}
