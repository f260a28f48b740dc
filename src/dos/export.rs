//! # 态密度数据导出
//!
//! ## 支持格式
//! - CSV: `energy,dos[,dos_down],idos[,idos_down]`
//! - XY: 带注释头的制表符分隔列，便于其他绘图工具读取
//!
//! ## 依赖关系
//! - 被 `commands/dos.rs` 调用
//! - 使用 `csv` 库写入 CSV 文件

use crate::error::{QunfoldError, Result};
use crate::models::DensityOfStates;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

fn header(dos: &DensityOfStates) -> Vec<&'static str> {
    if dos.is_spin_polarized() {
        vec!["energy", "dos_up", "dos_down", "idos_up", "idos_down"]
    } else {
        vec!["energy", "dos", "idos"]
    }
}

fn row(dos: &DensityOfStates, index: usize) -> Vec<f64> {
    let mut values = vec![dos.energies[index]];
    values.extend(dos.dos.iter().map(|channel| channel[index]));
    values.extend(dos.integrated.iter().map(|channel| channel[index]));
    values
}

/// 导出为 CSV
pub fn to_csv<W: Write>(dos: &DensityOfStates, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header(dos))?;

    for index in 0..dos.energies.len() {
        wtr.write_record(row(dos, index).iter().map(|v| format!("{:.6}", v)))?;
    }

    wtr.flush().map_err(|e| QunfoldError::FileWriteError {
        path: "<csv>".to_string(),
        source: e,
    })
}

/// 导出为 XY
pub fn to_xy<W: Write>(dos: &DensityOfStates, mut writer: W) -> std::io::Result<()> {
    writeln!(writer, "# DOS: {}", dos.name)?;
    writeln!(writer, "# Fermi level: {:.6} eV (energies shifted to 0)", dos.fermi)?;
    writeln!(writer, "# Columns: {}", header(dos).join(" "))?;
    writeln!(writer, "#")?;

    for index in 0..dos.energies.len() {
        let line = row(dos, index)
            .iter()
            .map(|v| format!("{:.6}", v))
            .collect::<Vec<_>>()
            .join("\t");
        writeln!(writer, "{}", line)?;
    }

    writer.flush()
}

/// 导出 CSV 文件
pub fn to_csv_file(dos: &DensityOfStates, output_path: &Path) -> Result<()> {
    let file = File::create(output_path).map_err(|e| QunfoldError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;
    to_csv(dos, BufWriter::new(file))
}

/// 导出 XY 文件
pub fn to_xy_file(dos: &DensityOfStates, output_path: &Path) -> Result<()> {
    let write_error = |e: std::io::Error| QunfoldError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    };
    let file = File::create(output_path).map_err(write_error)?;
    to_xy(dos, BufWriter::new(file)).map_err(write_error)
}
