//! # VASP DOSCAR 格式解析器
//!
//! 读取 DOSCAR 中的总态密度块（投影态密度块忽略）。
//!
//! ## DOSCAR 格式说明
//! ```text
//! NIONS NIONS JOBPAR NCDIJ
//! volume a b c POTIM
//! TEBEG
//! CAR
//! system name
//! EMAX EMIN NEDOS EFERMI 1.0
//! E dos idos                         # 非自旋极化 (3 列)
//! E dos_up dos_dn idos_up idos_dn    # 自旋极化 (5 列)
//! ...
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/dos.rs` 使用
//! - 使用 `models/dos.rs`

use crate::error::{QunfoldError, Result};
use crate::models::DensityOfStates;

use std::fs;
use std::path::Path;

/// 解析 DOSCAR 文件
pub fn parse_doscar_file(path: &Path) -> Result<DensityOfStates> {
    let content = fs::read_to_string(path).map_err(|e| QunfoldError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_doscar_content(&content, &path.display().to_string())
}

fn parse_error(path: &str, reason: impl Into<String>) -> QunfoldError {
    QunfoldError::ParseError {
        format: "doscar".to_string(),
        path: path.to_string(),
        reason: reason.into(),
    }
}

/// 从字符串内容解析 DOSCAR 总态密度
pub fn parse_doscar_content(content: &str, path: &str) -> Result<DensityOfStates> {
    let lines: Vec<&str> = content.lines().collect();

    if lines.len() < 6 {
        return Err(parse_error(path, "File too short"));
    }

    let name = lines[4].trim().to_string();

    // Line 5: EMAX EMIN NEDOS EFERMI weight
    let header: Vec<&str> = lines[5].split_whitespace().collect();
    if header.len() < 4 {
        return Err(parse_error(path, "Invalid energy header at line 6"));
    }
    let nedos: usize = header[2]
        .parse()
        .map_err(|_| parse_error(path, format!("Invalid NEDOS '{}'", header[2])))?;
    let fermi: f64 = header[3]
        .parse()
        .map_err(|_| parse_error(path, format!("Invalid Fermi level '{}'", header[3])))?;

    let available = lines.len().saturating_sub(6);
    if available < nedos {
        return Err(parse_error(
            path,
            format!("Expected {} DOS rows, found {}", nedos, available),
        ));
    }

    let mut energies = Vec::with_capacity(nedos);
    let mut columns: Option<usize> = None;
    let mut dos: Vec<Vec<f64>> = Vec::new();
    let mut integrated: Vec<Vec<f64>> = Vec::new();

    for (offset, line) in lines[6..6 + nedos].iter().enumerate() {
        let values: Vec<f64> = line
            .split_whitespace()
            .map(|s| s.parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| parse_error(path, format!("Invalid DOS row at line {}", offset + 7)))?;

        // 第一行确定列数
        let ncol = *columns.get_or_insert(values.len());
        if values.len() != ncol {
            return Err(parse_error(
                path,
                format!(
                    "Inconsistent column count at line {}: {} vs {}",
                    offset + 7,
                    values.len(),
                    ncol
                ),
            ));
        }

        let spins = match ncol {
            3 => 1,
            5 => 2,
            _ => {
                return Err(parse_error(
                    path,
                    format!("Unsupported DOS row width {}", ncol),
                ))
            }
        };
        if dos.is_empty() {
            dos = vec![Vec::with_capacity(nedos); spins];
            integrated = vec![Vec::with_capacity(nedos); spins];
        }

        energies.push(values[0] - fermi);
        for spin in 0..spins {
            dos[spin].push(values[1 + spin]);
            integrated[spin].push(values[1 + spins + spin]);
        }
    }

    Ok(DensityOfStates {
        name,
        fermi,
        energies,
        dos,
        integrated,
    })
}
