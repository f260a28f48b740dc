//! # 解析器模块
//!
//! 提供结构文件和 VASP 输出格式的解析器。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: poscar, doscar, matrix_csv

pub mod doscar;
pub mod matrix_csv;
pub mod poscar;

use crate::error::{QunfoldError, Result};
use crate::models::Crystal;
use std::path::Path;

/// 文件名是否为 POSCAR/CONTCAR 类结构文件
pub fn is_poscar_like(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();
    if ext == "vasp" || ext == "poscar" {
        return true;
    }

    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| {
            let upper = name.to_uppercase();
            upper.starts_with("POSCAR") || upper.starts_with("CONTCAR")
        })
        .unwrap_or(false)
}

/// 从文件路径推断格式并解析
pub fn parse_structure_file(path: &Path) -> Result<Crystal> {
    if is_poscar_like(path) {
        return poscar::parse_poscar_file(path);
    }

    Err(QunfoldError::UnsupportedFormat(format!(
        "Cannot determine format for: {}",
        path.display()
    )))
}
