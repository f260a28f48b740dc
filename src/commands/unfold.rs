//! # unfold 命令实现
//!
//! 读取各展开 k 点上的原胞矩阵，组装超胞矩阵并写出。
//!
//! ## 依赖关系
//! - 使用 `cli/unfold.rs` 定义的参数
//! - 使用 `bloch/` 组装，`parsers/matrix_csv.rs` 读写
//! - 使用 `batch/runner.rs` 的线程池

use crate::batch::build_pool;
use crate::bloch::Bloch;
use crate::cli::unfold::UnfoldArgs;
use crate::error::{QunfoldError, Result};
use crate::parsers::matrix_csv;
use crate::utils::{output, progress};

/// 执行 unfold 命令
pub fn execute(args: UnfoldArgs) -> Result<()> {
    let bloch = Bloch::new(args.bloch.expansion());
    output::print_header(&format!("Bloch unfolding with {}", bloch));

    if !args.input.is_file() {
        return Err(QunfoldError::FileNotFound {
            path: args.input.display().to_string(),
        });
    }

    if args.output.exists() && !args.overwrite {
        output::print_skip(&format!(
            "Output exists, use --overwrite to replace: {}",
            args.output.display()
        ));
        return Ok(());
    }

    let k_unfold = bloch.unfold_points(args.k.k_point());
    let matrices = matrix_csv::read_matrices_file(&args.input, k_unfold.len(), args.size)?;
    let size = matrices.first().map(|m| m.nrows()).unwrap_or(0);

    output::print_info(&format!(
        "Read {} matrices of size {} from '{}'",
        matrices.len(),
        size,
        args.input.display()
    ));

    let pool = build_pool(args.jobs)?;
    let spinner = progress::create_spinner("Assembling unfolded matrix");
    let unfolded = pool.install(|| bloch.unfold(&matrices, &k_unfold));
    spinner.finish_and_clear();
    let unfolded = unfolded?;

    output::print_unfold_summary(&bloch.to_string(), k_unfold.len(), size, unfolded.nrows());

    let written = matrix_csv::write_matrix_file(&args.output, &unfolded, args.tolerance)?;
    output::print_written(
        &args.input.display().to_string(),
        &args.output.display().to_string(),
    );
    output::print_done(&format!("{} entries written", written));

    Ok(())
}
