//! # 向量数学工具
//!
//! 向量范数、伸长、正交化以及球坐标与笛卡尔坐标的相互转换。
//!
//! ## 约定
//! - `theta`: x-y 平面内从 x 轴起的方位角
//! - `phi`: 从 z 轴起的极角
//!
//! ## 依赖关系
//! - 被 `models/structure.rs` 使用
//! - 无外部模块依赖

use crate::error::{QunfoldError, Result};

/// 向量范数
pub fn fnorm(v: &[f64]) -> f64 {
    fnorm2(v).sqrt()
}

/// 向量范数的平方
pub fn fnorm2(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum()
}

/// 沿向量方向伸长 `length`：V' = V + V̂ l
pub fn expand(v: [f64; 3], length: f64) -> [f64; 3] {
    let factor = 1.0 + length / fnorm(&v);
    v.map(|x| x * factor)
}

/// 去掉 `vector` 在 `reference` 上的投影
///
/// 两向量平行时无法正交化，返回错误。
pub fn orthogonalize(reference: [f64; 3], vector: [f64; 3]) -> Result<[f64; 3]> {
    let nr = fnorm(&reference);
    let d = (0..3).map(|i| reference[i] * vector[i]).sum::<f64>() / nr;

    if (1.0 - d.abs() / fnorm(&vector)).abs() < 1e-7 {
        return Err(QunfoldError::InvalidArgument(format!(
            "orthogonalize requires non-parallel vectors: ref.vector = {}",
            d
        )));
    }

    Ok([
        vector[0] - reference[0] * d / nr,
        vector[1] - reference[1] * d / nr,
        vector[2] - reference[2] * d / nr,
    ])
}

/// 球坐标 -> 笛卡尔坐标
pub fn spher2cart(r: f64, theta: f64, phi: f64) -> [f64; 3] {
    [
        r * theta.cos() * phi.sin(),
        r * theta.sin() * phi.sin(),
        r * phi.cos(),
    ]
}

/// 球坐标分量
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub r: f64,
    pub theta: f64,
    pub phi: f64,
}

/// 笛卡尔坐标 -> 球坐标，原点处 phi 取 0
pub fn cart2spher(v: [f64; 3]) -> Spherical {
    let r = fnorm(&v);
    let theta = v[1].atan2(v[0]);
    let phi = if r == 0.0 { 0.0 } else { (v[2] / r).acos() };
    Spherical { r, theta, phi }
}

/// 只转换 r <= max_r 的点，返回 (原始下标, 球坐标)
pub fn cart2spher_within(points: &[[f64; 3]], max_r: f64) -> Vec<(usize, Spherical)> {
    let max_r2 = max_r * max_r;
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| fnorm2(&p[..]) <= max_r2)
        .map(|(i, p)| (i, cart2spher(*p)))
        .collect()
}
