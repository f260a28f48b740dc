//! # qunfold 命令行入口
//!
//! ## 子命令
//! - `points`    - 列出展开 k 点
//! - `unfold`    - 组装超胞矩阵
//! - `supercell` - 生成超胞结构
//! - `dos`       - DOSCAR 态密度绘图/导出

use clap::Parser;
use qunfold::cli::Cli;
use qunfold::{commands, utils};

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
