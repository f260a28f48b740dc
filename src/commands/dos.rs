//! # dos 命令实现
//!
//! 读取 DOSCAR 总态密度，按能量窗口截取后绘图或导出。
//!
//! ## 依赖关系
//! - 使用 `cli/dos.rs` 定义的参数
//! - 使用 `parsers/doscar.rs`, `dos/`

use crate::cli::dos::DosArgs;
use crate::dos::{export, plot, DosOutput};
use crate::error::{QunfoldError, Result};
use crate::parsers::doscar;
use crate::utils::output;

/// 执行 dos 命令
pub fn execute(args: DosArgs) -> Result<()> {
    output::print_header("Density of States");

    if !args.input.is_file() {
        return Err(QunfoldError::FileNotFound {
            path: args.input.display().to_string(),
        });
    }

    let dos = doscar::parse_doscar_file(&args.input)?;
    output::print_success(&format!(
        "Loaded '{}': {} energy points, {} spin channel(s), E_F = {:.4} eV",
        dos.name,
        dos.energies.len(),
        dos.spin_channels(),
        dos.fermi
    ));

    let dos = dos.window(args.emin, args.emax);
    if args.emin.is_some() || args.emax.is_some() {
        output::print_info(&format!(
            "Energy window keeps {} points",
            dos.energies.len()
        ));
    }

    let format = args
        .format
        .unwrap_or_else(|| DosOutput::from_path(&args.output));

    match format {
        DosOutput::Png | DosOutput::Svg => {
            let title = args.title.clone().unwrap_or_else(|| dos.name.clone());
            plot::generate_dos_plot(
                &dos,
                &args.output,
                &title,
                args.width,
                args.height,
                format == DosOutput::Svg,
            )?;
        }
        DosOutput::Csv => export::to_csv_file(&dos, &args.output)?,
        DosOutput::Xy => export::to_xy_file(&dos, &args.output)?,
    }

    output::print_written(
        &args.input.display().to_string(),
        &args.output.display().to_string(),
    );

    Ok(())
}
