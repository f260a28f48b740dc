//! # k 点平均
//!
//! 输运数据的第 0 维是 k 点，第 1 维（若有）是能量点。
//! 按 k 点权重 `wkpt` 求和、取单个 k 点或保留 k 分辨数据。
//!
//! ## 依赖关系
//! - 被 `transport/mod.rs` 使用
//! - 使用 `ndarray`

use crate::error::{QunfoldError, Result};

use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};

/// k 点平均方式
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum KAverage {
    /// Σ_k w_k v_k
    #[default]
    Average,
    /// 不平均，返回全部 k 分辨数据
    Resolved,
    /// w_i v_i
    Point(usize),
    /// 对选定 k 点加权求和
    Points(Vec<usize>),
}

/// 按 `avg` 对 k 维求平均
pub fn k_average(data: &ArrayD<f64>, wkpt: &[f64], avg: &KAverage) -> Result<ArrayD<f64>> {
    reduce(data.view(), wkpt, avg)
}

/// 先取能量下标 `idx_e`（第 1 维），再对 k 维求平均
pub fn k_average_at_energy(
    data: &ArrayD<f64>,
    wkpt: &[f64],
    avg: &KAverage,
    idx_e: usize,
) -> Result<ArrayD<f64>> {
    if data.ndim() < 2 {
        return Err(QunfoldError::InvalidArgument(
            "Energy selection requires k- and energy-resolved data".to_string(),
        ));
    }
    let ne = data.shape()[1];
    if idx_e >= ne {
        return Err(QunfoldError::InvalidArgument(format!(
            "Energy index {} out of range (ne = {})",
            idx_e, ne
        )));
    }

    reduce(data.index_axis(Axis(1), idx_e), wkpt, avg)
}

fn reduce(data: ArrayViewD<'_, f64>, wkpt: &[f64], avg: &KAverage) -> Result<ArrayD<f64>> {
    if data.ndim() == 0 {
        return Err(QunfoldError::InvalidArgument(
            "k-resolved data must have a k dimension".to_string(),
        ));
    }
    let nk = data.shape()[0];
    if nk != wkpt.len() {
        return Err(QunfoldError::InvalidArgument(format!(
            "Data has {} k-points but {} weights",
            nk,
            wkpt.len()
        )));
    }

    let indices: Vec<usize> = match avg {
        KAverage::Resolved => return Ok(data.to_owned()),
        KAverage::Average => (0..nk).collect(),
        KAverage::Point(i) => vec![*i],
        KAverage::Points(list) => list.clone(),
    };

    let mut acc = ArrayD::<f64>::zeros(IxDyn(&data.shape()[1..]));
    for ik in indices {
        if ik >= nk {
            return Err(QunfoldError::InvalidArgument(format!(
                "k-point index {} out of range (nk = {})",
                ik, nk
            )));
        }
        acc.scaled_add(wkpt[ik], &data.index_axis(Axis(0), ik));
    }

    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array3};

    fn sample() -> (ArrayD<f64>, Vec<f64>) {
        // (nk = 2, ne = 3)
        let data = arr2(&[[1.0, 2.0, 3.0], [3.0, 4.0, 5.0]]).into_dyn();
        (data, vec![0.25, 0.75])
    }

    #[test]
    fn test_average() {
        let (data, w) = sample();
        let avg = k_average(&data, &w, &KAverage::Average).unwrap();
        assert_eq!(avg.shape(), &[3]);
        assert!((avg[[0]] - 2.5).abs() < 1e-12);
        assert!((avg[[2]] - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_resolved_keeps_shape() {
        let (data, w) = sample();
        let res = k_average(&data, &w, &KAverage::Resolved).unwrap();
        assert_eq!(res, data);
    }

    #[test]
    fn test_single_point_is_weighted() {
        let (data, w) = sample();
        let point = k_average(&data, &w, &KAverage::Point(1)).unwrap();
        assert!((point[[1]] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_points_subset() {
        let (data, w) = sample();
        let all = k_average(&data, &w, &KAverage::Points(vec![0, 1])).unwrap();
        let avg = k_average(&data, &w, &KAverage::Average).unwrap();
        assert_eq!(all, avg);
    }

    #[test]
    fn test_point_out_of_range() {
        let (data, w) = sample();
        assert!(k_average(&data, &w, &KAverage::Point(2)).is_err());
    }

    #[test]
    fn test_weight_mismatch() {
        let (data, _) = sample();
        assert!(k_average(&data, &[1.0], &KAverage::Average).is_err());
    }

    #[test]
    fn test_energy_selection() {
        let data = Array3::from_shape_fn((2, 3, 4), |(k, e, i)| (k * 100 + e * 10 + i) as f64)
            .into_dyn();
        let w = [0.5, 0.5];
        let sel = k_average_at_energy(&data, &w, &KAverage::Average, 2).unwrap();
        assert_eq!(sel.shape(), &[4]);
        // 0.5 * (20 + 120) = 70
        assert!((sel[[0]] - 70.0).abs() < 1e-12);

        let resolved = k_average_at_energy(&data, &w, &KAverage::Resolved, 1).unwrap();
        assert_eq!(resolved.shape(), &[2, 4]);
        assert!(k_average_at_energy(&data, &w, &KAverage::Average, 3).is_err());
    }
}
