//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `bloch/`, `parsers/`, `dos/`, `utils/`
//! - 子模块: points, unfold, supercell, dos

pub mod dos;
pub mod points;
pub mod supercell;
pub mod unfold;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Points(args) => points::execute(args),
        Commands::Unfold(args) => unfold::execute(args),
        Commands::Supercell(args) => supercell::execute(args),
        Commands::Dos(args) => dos::execute(args),
    }
}
