//! # Bloch 展开模块
//!
//! 利用 Bloch 定理，将原胞在一组 k 点上计算得到的矩阵展开为超胞矩阵。
//!
//! ## 使用流程
//! ```text
//! let bloch = Bloch::new([2, 1, 2]);
//! let k_unfold = bloch.unfold_points([0.0; 3]);
//! let matrices: Vec<_> = k_unfold.iter().map(|&k| hamiltonian(k)).collect();
//! let unfolded = bloch.unfold(&matrices, &k_unfold)?;
//! ```
//! `call` / `par_call` 把上面三步合为一次调用。
//!
//! ## 依赖关系
//! - 被 `commands/points.rs`, `commands/unfold.rs`, `commands/supercell.rs` 使用
//! - 使用 `models/structure.rs` 生成超胞结构
//! - 子模块: unfold (相位求和组装)

pub mod unfold;

use crate::error::Result;
use crate::models::Crystal;

use ndarray::Array2;
use num_complex::Complex64;
use rayon::prelude::*;
use std::fmt;

/// Bloch 展开对象，保存沿三个晶格方向的重复次数 (Bi, Bj, Bk)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bloch {
    bloch: [usize; 3],
}

impl Bloch {
    /// 创建 Bloch 展开对象，小于 1 的分量按 1 处理
    pub fn new(bloch: [i64; 3]) -> Self {
        let clamp = |b: i64| if b < 1 { 1 } else { b as usize };
        Bloch {
            bloch: [clamp(bloch[0]), clamp(bloch[1]), clamp(bloch[2])],
        }
    }

    /// 沿各晶格方向的展开次数
    pub fn bloch(&self) -> [usize; 3] {
        self.bloch
    }

    /// 展开后的原胞数 N = Bi * Bj * Bk
    ///
    /// 超出 `usize` 时饱和为 `usize::MAX`；此时 `unfold` 返回 `InvalidArgument`。
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.bloch
            .iter()
            .fold(1usize, |acc, &b| acc.saturating_mul(b))
    }

    /// 生成展开所需的 k 点
    ///
    /// `k` 是超胞倒格子中的约化坐标；返回的 N 个点是原胞倒格子中的约化坐标。
    /// 第一个晶格方向变化最快：下标 `T = r*Bj*Bi + q*Bi + p` 对应
    /// `((p + kx)/Bi, (q + ky)/Bj, (r + kz)/Bk)`。
    pub fn unfold_points(&self, k: [f64; 3]) -> Vec<[f64; 3]> {
        let [bi, bj, bk] = self.bloch;
        let mut points = Vec::with_capacity(self.len());

        for r in 0..bk {
            for q in 0..bj {
                for p in 0..bi {
                    points.push([
                        (p as f64 + k[0]) / bi as f64,
                        (q as f64 + k[1]) / bj as f64,
                        (r as f64 + k[2]) / bk as f64,
                    ]);
                }
            }
        }

        points
    }

    /// 将 `matrices` 按 `k_unfold` 展开为 (N·M, N·M) 的复矩阵
    ///
    /// `matrices[T]` 必须是在 `k_unfold[T]` 处计算的矩阵，顺序与
    /// [`Bloch::unfold_points`] 一致。
    pub fn unfold<A>(
        &self,
        matrices: &[Array2<A>],
        k_unfold: &[[f64; 3]],
    ) -> Result<Array2<Complex64>>
    where
        A: Clone + Into<Complex64> + Sync,
    {
        unfold::unfold(self.bloch, matrices, k_unfold)
    }

    /// 依次在每个展开 k 点上调用 `func`，再组装展开矩阵
    ///
    /// 额外的固定参数通过闭包捕获传入。
    pub fn call<F, A>(&self, mut func: F, k: [f64; 3]) -> Result<Array2<Complex64>>
    where
        F: FnMut([f64; 3]) -> Array2<A>,
        A: Clone + Into<Complex64> + Sync,
    {
        let k_unfold = self.unfold_points(k);
        let matrices: Vec<Array2<A>> = k_unfold.iter().map(|&kp| func(kp)).collect();
        self.unfold(&matrices, &k_unfold)
    }

    /// `call` 的可失败版本，返回第一个出错的 k 点的错误
    pub fn try_call<F, A>(&self, mut func: F, k: [f64; 3]) -> Result<Array2<Complex64>>
    where
        F: FnMut([f64; 3]) -> Result<Array2<A>>,
        A: Clone + Into<Complex64> + Sync,
    {
        let k_unfold = self.unfold_points(k);
        let matrices = k_unfold
            .iter()
            .map(|&kp| func(kp))
            .collect::<Result<Vec<Array2<A>>>>()?;
        self.unfold(&matrices, &k_unfold)
    }

    /// 并行版本：N 次矩阵计算在 rayon 线程池上执行，结果按 k 点顺序收集
    pub fn par_call<F, A>(&self, func: F, k: [f64; 3]) -> Result<Array2<Complex64>>
    where
        F: Fn([f64; 3]) -> Array2<A> + Sync,
        A: Clone + Into<Complex64> + Send + Sync,
    {
        let k_unfold = self.unfold_points(k);
        let matrices: Vec<Array2<A>> = k_unfold.par_iter().map(|&kp| func(kp)).collect();
        self.unfold(&matrices, &k_unfold)
    }

    /// `par_call` 的可失败版本
    pub fn try_par_call<F, A>(&self, func: F, k: [f64; 3]) -> Result<Array2<Complex64>>
    where
        F: Fn([f64; 3]) -> Result<Array2<A>> + Sync,
        A: Clone + Into<Complex64> + Send + Sync,
    {
        let k_unfold = self.unfold_points(k);
        let matrices = k_unfold
            .par_iter()
            .map(|&kp| func(kp))
            .collect::<Result<Vec<Array2<A>>>>()?;
        self.unfold(&matrices, &k_unfold)
    }

    /// 生成与展开矩阵块顺序一致的超胞结构
    pub fn supercell(&self, crystal: &Crystal) -> Crystal {
        crystal.tile(self.bloch)
    }
}

impl fmt::Display for Bloch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [bi, bj, bk] = self.bloch;
        write!(f, "Bloch{{{}, {}, {}}}", bi, bj, bk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QunfoldError;
    use crate::models::{Atom, Lattice};
    use std::f64::consts::PI;

    fn assert_close(a: Complex64, b: Complex64) {
        assert!((a - b).norm() < 1e-12, "{} != {}", a, b);
    }

    #[test]
    fn test_new_clamps_to_one() {
        let bloch = Bloch::new([0, -3, 2]);
        assert_eq!(bloch.bloch(), [1, 1, 2]);
        assert_eq!(bloch.len(), 2);
    }

    #[test]
    fn test_len_saturates() {
        let bloch = Bloch::new([i64::MAX, i64::MAX, 2]);
        assert_eq!(bloch.len(), usize::MAX);

        let result = bloch.unfold(&[Array2::<f64>::eye(1)], &[[0.0; 3]]);
        assert!(matches!(result, Err(QunfoldError::InvalidArgument(_))));
    }

    #[test]
    fn test_display() {
        assert_eq!(Bloch::new([2, 1, 3]).to_string(), "Bloch{2, 1, 3}");
    }

    #[test]
    fn test_unit_bloch_points() {
        let bloch = Bloch::new([1, 1, 1]);
        let k = [0.1, 0.2, 0.3];
        assert_eq!(bloch.unfold_points(k), vec![k]);
    }

    #[test]
    fn test_points_count() {
        for reps in [[1, 1, 1], [2, 1, 1], [3, 2, 1], [2, 2, 2], [1, 4, 3]] {
            let bloch = Bloch::new(reps);
            let points = bloch.unfold_points([0.25, -0.1, 0.5]);
            assert_eq!(points.len(), (reps[0] * reps[1] * reps[2]) as usize);
        }
    }

    #[test]
    fn test_points_ordering_first_axis_fastest() {
        let bloch = Bloch::new([2, 1, 1]);
        assert_eq!(
            bloch.unfold_points([0.0; 3]),
            vec![[0.0, 0.0, 0.0], [0.5, 0.0, 0.0]]
        );

        let bloch = Bloch::new([2, 2, 1]);
        let points = bloch.unfold_points([0.0; 3]);
        assert_eq!(points[1], [0.5, 0.0, 0.0]);
        assert_eq!(points[2], [0.0, 0.5, 0.0]);
        assert_eq!(points[3], [0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_points_shifted_by_k() {
        let bloch = Bloch::new([2, 1, 4]);
        let points = bloch.unfold_points([0.5, 0.3, 1.0]);
        // T = r*Bj*Bi + q*Bi + p, r = 3, p = 1
        let last = points[7];
        assert!((last[0] - 0.75).abs() < 1e-12);
        assert!((last[1] - 0.3).abs() < 1e-12);
        assert!((last[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_call_matches_manual_unfold() {
        let bloch = Bloch::new([2, 1, 2]);
        let k = [0.1, 0.0, 0.3];
        let onsite = 0.7;
        let func = |kp: [f64; 3]| {
            Array2::from_shape_fn((2, 2), |(a, b)| {
                let phase = 2.0 * PI * (kp[0] + 2.0 * kp[2]);
                if a == b {
                    Complex64::new(onsite, 0.0)
                } else if a < b {
                    Complex64::cis(phase)
                } else {
                    Complex64::cis(-phase)
                }
            })
        };

        let k_unfold = bloch.unfold_points(k);
        let matrices: Vec<_> = k_unfold.iter().map(|&kp| func(kp)).collect();
        let manual = bloch.unfold(&matrices, &k_unfold).unwrap();

        let sequential = bloch.call(func, k).unwrap();
        let parallel = bloch.par_call(func, k).unwrap();

        assert_eq!(manual.dim(), (8, 8));
        for ((m, s), p) in manual.iter().zip(sequential.iter()).zip(parallel.iter()) {
            assert_close(*m, *s);
            assert_close(*m, *p);
        }
    }

    #[test]
    fn test_try_call_propagates_error() {
        let bloch = Bloch::new([2, 1, 1]);
        let result = bloch.try_call(
            |kp: [f64; 3]| -> Result<Array2<f64>> {
                if kp[0] > 0.25 {
                    Err(QunfoldError::Other("bad k".to_string()))
                } else {
                    Ok(Array2::eye(1))
                }
            },
            [0.0; 3],
        );
        assert!(matches!(result, Err(QunfoldError::Other(_))));

        let result = bloch.try_par_call(|_| Ok(Array2::<f64>::eye(1)), [0.0; 3]);
        assert_eq!(result.unwrap().dim(), (2, 2));
    }

    #[test]
    fn test_supercell_size() {
        let lattice = Lattice::from_vectors([[2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 2.0]]);
        let crystal = Crystal::new("C", lattice, vec![Atom::new("C", [0.0, 0.0, 0.0])]);
        let supercell = Bloch::new([2, 3, 1]).supercell(&crystal);

        assert_eq!(supercell.atoms.len(), 6);
        assert!((supercell.lattice.volume() - 48.0).abs() < 1e-10);
    }
}
