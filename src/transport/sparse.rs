//! # 压缩行稀疏矩阵 (CSR)
//!
//! 轨道电流的稀疏结构：每行非零元数 `n_col` 与 1 起始的列下标 `list_col`。
//!
//! ## 依赖关系
//! - 被 `transport/mod.rs` 使用

use crate::error::{QunfoldError, Result};

use ndarray::Array2;

/// CSR 稀疏矩阵
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    shape: (usize, usize),
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl CsrMatrix {
    /// 由每行计数与 1 起始列下标构建稀疏结构（数据全为 0）
    pub fn from_counts(n_col: &[usize], list_col: &[usize], ncols: usize) -> Result<Self> {
        let mut indptr = Vec::with_capacity(n_col.len() + 1);
        indptr.push(0);
        for &count in n_col {
            let last = indptr[indptr.len() - 1];
            indptr.push(last + count);
        }

        let nnz = indptr[indptr.len() - 1];
        if nnz != list_col.len() {
            return Err(QunfoldError::InvalidArgument(format!(
                "Sparsity pattern has {} entries but {} column indices",
                nnz,
                list_col.len()
            )));
        }

        let indices = list_col
            .iter()
            .map(|&c| {
                if c == 0 || c > ncols {
                    Err(QunfoldError::InvalidArgument(format!(
                        "Column index {} out of range 1..={}",
                        c, ncols
                    )))
                } else {
                    Ok(c - 1)
                }
            })
            .collect::<Result<Vec<usize>>>()?;

        Ok(CsrMatrix {
            shape: (n_col.len(), ncols),
            indptr,
            indices,
            data: vec![0.0; nnz],
        })
    }

    /// 使用相同稀疏结构填入数据
    pub fn with_data(&self, data: Vec<f64>) -> Result<Self> {
        if data.len() != self.nnz() {
            return Err(QunfoldError::InvalidArgument(format!(
                "Expected {} values for the sparsity pattern, got {}",
                self.nnz(),
                data.len()
            )));
        }
        Ok(CsrMatrix {
            shape: self.shape,
            indptr: self.indptr.clone(),
            indices: self.indices.clone(),
            data,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn indptr(&self) -> &[usize] {
        &self.indptr
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// 第 `row` 行的 (列, 值)
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let (start, end) = (self.indptr[row], self.indptr[row + 1]);
        self.indices[start..end]
            .iter()
            .copied()
            .zip(self.data[start..end].iter().copied())
    }

    /// 矩阵元（重复元素求和）
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row >= self.shape.0 {
            return 0.0;
        }
        self.row(row).filter(|&(c, _)| c == col).map(|(_, v)| v).sum()
    }

    /// 转换为稠密矩阵
    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros(self.shape);
        for r in 0..self.shape.0 {
            for (c, v) in self.row(r) {
                dense[[r, c]] += v;
            }
        }
        dense
    }
}
