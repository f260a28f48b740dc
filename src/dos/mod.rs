//! # 态密度输出模块
//!
//! 将 DOSCAR 总态密度导出为数据文件或绘制为图表。
//!
//! ## 依赖关系
//! - 被 `commands/dos.rs` 使用
//! - 使用 `models/dos.rs` 的 DensityOfStates
//! - 子模块: export (CSV/XY), plot (PNG/SVG)

pub mod export;
pub mod plot;

use clap::ValueEnum;
use std::path::Path;

/// 态密度输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum DosOutput {
    /// PNG image
    Png,
    /// SVG vector image
    Svg,
    /// CSV data file (energy, dos, idos)
    Csv,
    /// XY data file with a commented header
    Xy,
}

impl DosOutput {
    /// 根据输出文件扩展名判断格式，默认 PNG
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .as_deref()
        {
            Some("svg") => DosOutput::Svg,
            Some("csv") => DosOutput::Csv,
            Some("xy") | Some("dat") => DosOutput::Xy,
            _ => DosOutput::Png,
        }
    }

    pub fn is_plot(&self) -> bool {
        matches!(self, DosOutput::Png | DosOutput::Svg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_from_path() {
        assert_eq!(DosOutput::from_path(Path::new("dos.svg")), DosOutput::Svg);
        assert_eq!(DosOutput::from_path(Path::new("dos.CSV")), DosOutput::Csv);
        assert_eq!(DosOutput::from_path(Path::new("dos.xy")), DosOutput::Xy);
        assert_eq!(DosOutput::from_path(Path::new("dos")), DosOutput::Png);
        assert!(DosOutput::Png.is_plot());
        assert!(!DosOutput::Csv.is_plot());
    }
}
