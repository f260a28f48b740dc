//! # Bloch 展开矩阵组装
//!
//! 逆离散 Bloch 变换：对每个采样点 T（权重 w = 1/N），
//! ```text
//! U[(k,j,i,a), (K,J,I,b)] += w * M_T[a,b] * exp(2πi * (kx_T*(I-i) + ky_T*(J-j) + kz_T*(K-k)))
//! ```
//! 行/列块下标按 (k, j, i) 行优先展平，第一个晶格方向 i 变化最快，
//! 即块下标 `((k*Bj + j)*Bi + i)`，矩阵元下标再乘以 M 加上 a。
//!
//! ## 并行策略
//! 按目标块行划分任务：每个块行 (k, j, i) 只由一个任务写入，无需加锁。
//! 每个采样点沿各轴的相位 `exp(2πi*k*d)`（d ∈ (-B, B)）预先计算，
//! 因此重复次数为 1 的轴只有一个相位 1。
//!
//! ## 依赖关系
//! - 被 `bloch/mod.rs` 调用
//! - 使用 `ndarray`, `num-complex`, `rayon`

use crate::error::{QunfoldError, Result};

use ndarray::{s, Array2};
use num_complex::Complex64;
use rayon::prelude::*;
use std::f64::consts::PI;

/// 组装展开矩阵，返回 (N·M, N·M) 行优先复矩阵
pub fn unfold<A>(
    bloch: [usize; 3],
    matrices: &[Array2<A>],
    k_unfold: &[[f64; 3]],
) -> Result<Array2<Complex64>>
where
    A: Clone + Into<Complex64> + Sync,
{
    let n = bloch
        .iter()
        .try_fold(1usize, |acc, &b| acc.checked_mul(b))
        .ok_or_else(|| {
            QunfoldError::InvalidArgument(format!("Bloch expansion {:?} is too large", bloch))
        })?;

    if matrices.len() != n {
        return Err(QunfoldError::MatrixCountMismatch {
            expected: n,
            found: matrices.len(),
        });
    }
    if k_unfold.len() != n {
        return Err(QunfoldError::KPointCountMismatch {
            expected: n,
            found: k_unfold.len(),
        });
    }

    let m = check_shapes(matrices)?;
    n.checked_mul(m)
        .and_then(|size| size.checked_mul(size))
        .filter(|&len| len <= isize::MAX as usize)
        .ok_or_else(|| {
            QunfoldError::InvalidArgument(format!(
                "Unfolded matrix of {} blocks of size {} is too large",
                n, m
            ))
        })?;
    let w = 1.0 / n as f64;

    // 预先乘以权重并转为复数
    let weighted: Vec<Array2<Complex64>> = matrices
        .par_iter()
        .map(|matrix| {
            matrix.mapv(|x| {
                let z: Complex64 = x.into();
                z * w
            })
        })
        .collect();

    let phases: Vec<PhaseTable> = k_unfold
        .iter()
        .map(|k| PhaseTable::new(bloch, *k))
        .collect();

    let slabs: Vec<Array2<Complex64>> = (0..n)
        .into_par_iter()
        .map(|row_block| assemble_block_row(bloch, row_block, m, &weighted, &phases))
        .collect();

    let mut unfolded = Array2::<Complex64>::zeros((n * m, n * m));
    for (row_block, slab) in slabs.iter().enumerate() {
        unfolded
            .slice_mut(s![row_block * m..(row_block + 1) * m, ..])
            .assign(slab);
    }

    Ok(unfolded)
}

/// 检查所有矩阵为相同大小的方阵，返回边长 M
fn check_shapes<A>(matrices: &[Array2<A>]) -> Result<usize> {
    let (rows, cols) = matrices[0].dim();
    if rows != cols {
        return Err(QunfoldError::NonSquareMatrix {
            index: 0,
            rows,
            cols,
        });
    }

    for (index, matrix) in matrices.iter().enumerate().skip(1) {
        let found = matrix.dim();
        if found.0 != found.1 {
            return Err(QunfoldError::NonSquareMatrix {
                index,
                rows: found.0,
                cols: found.1,
            });
        }
        if found != (rows, cols) {
            return Err(QunfoldError::MatrixShapeMismatch {
                index,
                expected: (rows, cols),
                found,
            });
        }
    }

    Ok(rows)
}

/// 块下标 -> (i, j, k)
fn block_coordinates(bloch: [usize; 3], block: usize) -> [usize; 3] {
    let [bi, bj, _] = bloch;
    [block % bi, (block / bi) % bj, block / (bi * bj)]
}

/// 单个采样点沿三个轴的相位表
struct PhaseTable {
    /// axes[axis][d + B - 1] = exp(2πi * k[axis] * d)
    axes: [Vec<Complex64>; 3],
    offsets: [isize; 3],
}

impl PhaseTable {
    fn new(bloch: [usize; 3], k: [f64; 3]) -> Self {
        let axis = |ax: usize| -> Vec<Complex64> {
            let b = bloch[ax] as isize;
            (-(b - 1)..b)
                .map(|d| Complex64::cis(2.0 * PI * k[ax] * d as f64))
                .collect()
        };

        PhaseTable {
            axes: [axis(0), axis(1), axis(2)],
            offsets: [
                bloch[0] as isize - 1,
                bloch[1] as isize - 1,
                bloch[2] as isize - 1,
            ],
        }
    }

    /// `source - destination` 的相位因子
    fn phase(&self, source: [usize; 3], destination: [usize; 3]) -> Complex64 {
        let mut phase = Complex64::new(1.0, 0.0);
        for ax in 0..3 {
            let d = source[ax] as isize - destination[ax] as isize;
            phase *= self.axes[ax][(d + self.offsets[ax]) as usize];
        }
        phase
    }
}

/// 计算目标块行 `row_block` 的 (M, N·M) 子矩阵
fn assemble_block_row(
    bloch: [usize; 3],
    row_block: usize,
    m: usize,
    weighted: &[Array2<Complex64>],
    phases: &[PhaseTable],
) -> Array2<Complex64> {
    let n: usize = bloch.iter().product();
    let destination = block_coordinates(bloch, row_block);
    let mut slab = Array2::<Complex64>::zeros((m, n * m));

    for (matrix, table) in weighted.iter().zip(phases) {
        for col_block in 0..n {
            let source = block_coordinates(bloch, col_block);
            let phase = table.phase(source, destination);
            slab.slice_mut(s![.., col_block * m..(col_block + 1) * m])
                .scaled_add(phase, matrix);
        }
    }

    slab
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 直接的多重循环实现，用于交叉验证
    fn reference_unfold(
        bloch: [usize; 3],
        matrices: &[Array2<Complex64>],
        k_unfold: &[[f64; 3]],
    ) -> Array2<Complex64> {
        let [bi, bj, bk] = bloch;
        let n = bi * bj * bk;
        let m = matrices[0].nrows();
        let mut out = Array2::<Complex64>::zeros((n * m, n * m));

        for (matrix, kt) in matrices.iter().zip(k_unfold) {
            for k in 0..bk {
                for j in 0..bj {
                    for i in 0..bi {
                        for kk in 0..bk {
                            for jj in 0..bj {
                                for ii in 0..bi {
                                    let angle = 2.0
                                        * PI
                                        * (kt[0] * (ii as f64 - i as f64)
                                            + kt[1] * (jj as f64 - j as f64)
                                            + kt[2] * (kk as f64 - k as f64));
                                    let phase = Complex64::cis(angle) / n as f64;
                                    let row0 = ((k * bj + j) * bi + i) * m;
                                    let col0 = ((kk * bj + jj) * bi + ii) * m;
                                    for a in 0..m {
                                        for b in 0..m {
                                            out[[row0 + a, col0 + b]] += matrix[[a, b]] * phase;
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        out
    }

    fn points(bloch: [usize; 3], k: [f64; 3]) -> Vec<[f64; 3]> {
        crate::bloch::Bloch::new([bloch[0] as i64, bloch[1] as i64, bloch[2] as i64])
            .unfold_points(k)
    }

    /// 确定性的“随机”复矩阵
    fn sample_matrices(n: usize, m: usize) -> Vec<Array2<Complex64>> {
        (0..n)
            .map(|t| {
                Array2::from_shape_fn((m, m), |(a, b)| {
                    let x = (t * 31 + a * 7 + b * 3) as f64;
                    Complex64::new((0.37 * x).sin(), (0.11 * x + 0.5).cos())
                })
            })
            .collect()
    }

    fn assert_matrix_close(a: &Array2<Complex64>, b: &Array2<Complex64>, tol: f64) {
        assert_eq!(a.dim(), b.dim());
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).norm() < tol, "{} != {}", x, y);
        }
    }

    #[test]
    fn test_identity_case() {
        let matrix = Array2::from_shape_fn((3, 3), |(a, b)| Complex64::new(a as f64, b as f64));
        let k = [[0.1, 0.2, 0.3]];
        let unfolded = unfold([1, 1, 1], &[matrix.clone()], &k).unwrap();
        assert_matrix_close(&unfolded, &matrix, 1e-14);
    }

    #[test]
    fn test_output_shape() {
        let bloch = [2, 3, 1];
        let k = points(bloch, [0.0; 3]);
        let matrices = sample_matrices(6, 4);
        let unfolded = unfold(bloch, &matrices, &k).unwrap();
        assert_eq!(unfolded.dim(), (24, 24));
    }

    #[test]
    fn test_golden_two_point() {
        let matrices = vec![Array2::from_elem((1, 1), 1.0), Array2::from_elem((1, 1), 1.0)];
        let k = [[0.0, 0.0, 0.0], [0.5, 0.0, 0.0]];
        let unfolded = unfold([2, 1, 1], &matrices, &k).unwrap();

        // 0.5 * (1 + exp(iπ(row-col)))
        let expected = Array2::from_shape_fn((2, 2), |(r, c)| {
            if r == c {
                Complex64::new(1.0, 0.0)
            } else {
                Complex64::new(0.0, 0.0)
            }
        });
        assert_matrix_close(&unfolded, &expected, 1e-14);
    }

    #[test]
    fn test_tight_binding_chain() {
        // 单原子链 H(k) = 2t cos(2πk)，两倍超胞在 Γ 点为 [[0, 2t], [2t, 0]]
        let t = -1.0;
        let bloch = [2, 1, 1];
        let k = points(bloch, [0.0; 3]);
        let matrices: Vec<Array2<f64>> = k
            .iter()
            .map(|kp| Array2::from_elem((1, 1), 2.0 * t * (2.0 * PI * kp[0]).cos()))
            .collect();

        let unfolded = unfold(bloch, &matrices, &k).unwrap();
        assert!(unfolded[[0, 0]].norm() < 1e-12);
        assert!(unfolded[[1, 1]].norm() < 1e-12);
        assert!((unfolded[[0, 1]] - Complex64::new(2.0 * t, 0.0)).norm() < 1e-12);
        assert!((unfolded[[1, 0]] - Complex64::new(2.0 * t, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_tight_binding_chain_is_hermitian() {
        let bloch = [3, 1, 1];
        let k = points(bloch, [0.3, 0.0, 0.0]);
        let matrices: Vec<Array2<f64>> = k
            .iter()
            .map(|kp| Array2::from_elem((1, 1), -2.0 * (2.0 * PI * kp[0]).cos()))
            .collect();

        let unfolded = unfold(bloch, &matrices, &k).unwrap();
        for r in 0..3 {
            assert!(unfolded[[r, r]].norm() < 1e-12);
            for c in 0..3 {
                assert!((unfolded[[r, c]] - unfolded[[c, r]].conj()).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn test_identity_inputs_give_identity() {
        let bloch = [2, 3, 2];
        let k = points(bloch, [0.1, 0.2, 0.3]);
        let matrices: Vec<Array2<f64>> = (0..12).map(|_| Array2::eye(2)).collect();

        let unfolded = unfold(bloch, &matrices, &k).unwrap();
        let expected = Array2::<Complex64>::eye(24);
        assert_matrix_close(&unfolded, &expected, 1e-12);
    }

    #[test]
    fn test_matches_reference_implementation() {
        let cases: [([usize; 3], [f64; 3]); 6] = [
            ([1, 1, 1], [0.2, 0.1, 0.0]),
            ([2, 1, 1], [0.3, 0.0, 0.0]),
            ([1, 2, 1], [0.0, 0.4, 0.0]),
            ([1, 2, 2], [0.0, 0.25, 0.7]),
            ([2, 1, 2], [0.15, 0.0, 0.35]),
            ([2, 2, 2], [0.1, 0.2, 0.3]),
        ];

        for (bloch, k0) in cases {
            let n: usize = bloch.iter().product();
            let k = points(bloch, k0);
            let matrices = sample_matrices(n, 3);

            let fast = unfold(bloch, &matrices, &k).unwrap();
            let reference = reference_unfold(bloch, &matrices, &k);
            assert_matrix_close(&fast, &reference, 1e-12);
        }
    }

    #[test]
    fn test_matrix_count_mismatch() {
        let matrices = sample_matrices(3, 2);
        let k = points([2, 2, 1], [0.0; 3]);
        let err = unfold([2, 2, 1], &matrices, &k).unwrap_err();
        assert!(matches!(
            err,
            QunfoldError::MatrixCountMismatch {
                expected: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn test_kpoint_count_mismatch() {
        let matrices = sample_matrices(2, 2);
        let k = [[0.0; 3]];
        let err = unfold([2, 1, 1], &matrices, &k).unwrap_err();
        assert!(matches!(err, QunfoldError::KPointCountMismatch { .. }));
    }

    #[test]
    fn test_non_square_matrix() {
        let matrices = vec![Array2::<f64>::zeros((2, 3)), Array2::<f64>::zeros((2, 3))];
        let k = points([2, 1, 1], [0.0; 3]);
        let err = unfold([2, 1, 1], &matrices, &k).unwrap_err();
        assert!(matches!(err, QunfoldError::NonSquareMatrix { index: 0, .. }));
    }

    #[test]
    fn test_shape_mismatch() {
        let matrices = vec![Array2::<f64>::zeros((2, 2)), Array2::<f64>::zeros((3, 3))];
        let k = points([2, 1, 1], [0.0; 3]);
        let err = unfold([2, 1, 1], &matrices, &k).unwrap_err();
        assert!(matches!(
            err,
            QunfoldError::MatrixShapeMismatch { index: 1, .. }
        ));
    }

    #[test]
    fn test_overflowing_expansion() {
        let matrices = sample_matrices(1, 1);
        let err = unfold([usize::MAX, 2, 1], &matrices, &[[0.0; 3]]).unwrap_err();
        assert!(matches!(err, QunfoldError::InvalidArgument(_)));
    }
}
