//! # 态密度数据模型
//!
//! 存储 DOSCAR 总态密度，能量以费米能级为零点。
//!
//! ## 依赖关系
//! - 被 `parsers/doscar.rs` 构造
//! - 被 `dos/` 导出与绘图使用

use serde::{Deserialize, Serialize};

/// 总态密度
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DensityOfStates {
    /// 结构名称（DOSCAR 注释行）
    pub name: String,

    /// 费米能级 (eV)
    pub fermi: f64,

    /// 能量网格 (eV)，相对费米能级
    pub energies: Vec<f64>,

    /// 态密度 dos[spin][E]
    pub dos: Vec<Vec<f64>>,

    /// 积分态密度 integrated[spin][E]
    pub integrated: Vec<Vec<f64>>,
}

impl DensityOfStates {
    /// 自旋通道数 (1 或 2)
    pub fn spin_channels(&self) -> usize {
        self.dos.len()
    }

    /// 是否自旋极化
    pub fn is_spin_polarized(&self) -> bool {
        self.dos.len() == 2
    }

    /// 截取能量窗口 [emin, emax]
    pub fn window(&self, emin: Option<f64>, emax: Option<f64>) -> DensityOfStates {
        let lo = emin.unwrap_or(f64::NEG_INFINITY);
        let hi = emax.unwrap_or(f64::INFINITY);
        let keep: Vec<usize> = self
            .energies
            .iter()
            .enumerate()
            .filter(|(_, e)| **e >= lo && **e <= hi)
            .map(|(i, _)| i)
            .collect();

        let pick = |values: &Vec<f64>| keep.iter().map(|&i| values[i]).collect::<Vec<f64>>();

        DensityOfStates {
            name: self.name.clone(),
            fermi: self.fermi,
            energies: pick(&self.energies),
            dos: self.dos.iter().map(pick).collect(),
            integrated: self.integrated.iter().map(pick).collect(),
        }
    }

    /// 各通道态密度最大值
    pub fn max_dos(&self) -> f64 {
        self.dos
            .iter()
            .flat_map(|channel| channel.iter().copied())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DensityOfStates {
        DensityOfStates {
            name: "test".to_string(),
            fermi: 1.0,
            energies: vec![-2.0, -1.0, 0.0, 1.0, 2.0],
            dos: vec![vec![0.1, 0.2, 0.3, 0.4, 0.5], vec![0.5, 0.4, 0.3, 0.2, 0.1]],
            integrated: vec![vec![0.0; 5], vec![0.0; 5]],
        }
    }

    #[test]
    fn test_window() {
        let window = sample().window(Some(-1.0), Some(1.0));
        assert_eq!(window.energies, vec![-1.0, 0.0, 1.0]);
        assert_eq!(window.dos[1], vec![0.4, 0.3, 0.2]);
        assert!(window.is_spin_polarized());
    }

    #[test]
    fn test_max_dos() {
        assert!((sample().max_dos() - 0.5).abs() < 1e-12);
    }
}
