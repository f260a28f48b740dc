//! # 晶体结构数据模型
//!
//! 定义统一的晶体结构表示，由结构文件解析得到，并可平铺为 Bloch 超胞。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `bloch/`, `transport/` 使用
//! - 使用 `utils/math.rs` 计算向量长度

use crate::utils::math::fnorm;

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// 晶格参数表示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 获取晶格参数 (a, b, c, alpha, beta, gamma)
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let [a_vec, b_vec, c_vec] = self.matrix;

        let a = fnorm(&a_vec);
        let b = fnorm(&b_vec);
        let c = fnorm(&c_vec);

        let alpha = (dot(&b_vec, &c_vec) / (b * c)).acos().to_degrees();
        let beta = (dot(&a_vec, &c_vec) / (a * c)).acos().to_degrees();
        let gamma = (dot(&a_vec, &b_vec) / (a * b)).acos().to_degrees();

        (a, b, c, alpha, beta, gamma)
    }

    /// 计算晶格体积（带符号）
    pub fn volume(&self) -> f64 {
        let [a, b, c] = self.matrix;
        dot(&a, &cross(&b, &c))
    }

    /// 倒格子矢量（含 2π 因子），行向量 b1, b2, b3
    pub fn reciprocal(&self) -> [[f64; 3]; 3] {
        let [a, b, c] = self.matrix;
        let factor = 2.0 * PI / self.volume();
        let scale = |v: [f64; 3]| [v[0] * factor, v[1] * factor, v[2] * factor];
        [scale(cross(&b, &c)), scale(cross(&c, &a)), scale(cross(&a, &b))]
    }

    /// 约化 k 点转换为笛卡尔坐标 (1/Å)
    pub fn k_to_cartesian(&self, k: [f64; 3]) -> [f64; 3] {
        let rcell = self.reciprocal();
        let mut out = [0.0; 3];
        for (axis, value) in out.iter_mut().enumerate() {
            *value = k[0] * rcell[0][axis] + k[1] * rcell[1][axis] + k[2] * rcell[2][axis];
        }
        out
    }

    /// 分数坐标转笛卡尔坐标
    pub fn frac_to_cart(&self, frac: [f64; 3]) -> [f64; 3] {
        let m = self.matrix;
        [
            frac[0] * m[0][0] + frac[1] * m[1][0] + frac[2] * m[2][0],
            frac[0] * m[0][1] + frac[1] * m[1][1] + frac[2] * m[2][1],
            frac[0] * m[0][2] + frac[1] * m[1][2] + frac[2] * m[2][2],
        ]
    }

    /// 笛卡尔坐标转分数坐标，奇异晶格返回 None
    pub fn cart_to_frac(&self, cart: [f64; 3]) -> Option<[f64; 3]> {
        let det = self.volume();
        if det.abs() < 1e-10 {
            return None;
        }

        // 倒格子 / 2π 即为晶格矩阵逆的转置
        let [a, b, c] = self.matrix;
        let rows = [cross(&b, &c), cross(&c, &a), cross(&a, &b)];
        Some([
            dot(&rows[0], &cart) / det,
            dot(&rows[1], &cart) / det,
            dot(&rows[2], &cart) / det,
        ])
    }

    /// 沿各晶格方向放大
    pub fn scaled(&self, reps: [usize; 3]) -> Lattice {
        let mut matrix = self.matrix;
        for (row, &rep) in matrix.iter_mut().zip(reps.iter()) {
            for value in row.iter_mut() {
                *value *= rep as f64;
            }
        }
        Lattice { matrix }
    }
}

fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// 原子信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atom {
    /// 元素符号
    pub element: String,

    /// 分数坐标 [x, y, z]
    pub position: [f64; 3],

    /// 轨道数
    pub orbitals: usize,
}

impl Atom {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Atom {
            element: element.into(),
            position,
            orbitals: 1,
        }
    }

    pub fn with_orbitals(mut self, orbitals: usize) -> Self {
        self.orbitals = orbitals;
        self
    }
}

/// 晶体结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crystal {
    /// 结构名称
    pub name: String,

    /// 晶格
    pub lattice: Lattice,

    /// 原子列表
    pub atoms: Vec<Atom>,

    /// 来源文件格式
    pub source_format: Option<String>,
}

impl Crystal {
    pub fn new(name: impl Into<String>, lattice: Lattice, atoms: Vec<Atom>) -> Self {
        Crystal {
            name: name.into(),
            lattice,
            atoms,
            source_format: None,
        }
    }

    /// 计算化学式
    pub fn formula(&self) -> String {
        use std::collections::BTreeMap;
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

        for atom in &self.atoms {
            *counts.entry(atom.element.as_str()).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|(el, count)| {
                if count == 1 {
                    el.to_string()
                } else {
                    format!("{}{}", el, count)
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// 总轨道数
    pub fn orbitals(&self) -> usize {
        self.atoms.iter().map(|a| a.orbitals).sum()
    }

    /// 原子的笛卡尔坐标
    pub fn cartesian_positions(&self) -> Vec<[f64; 3]> {
        self.atoms
            .iter()
            .map(|a| self.lattice.frac_to_cart(a.position))
            .collect()
    }

    /// 沿三个晶格方向平铺
    ///
    /// 原胞副本按 (k, j, i) 排列、第一个方向最快，与 Bloch 展开矩阵的块顺序一致：
    /// 第 `(k*Bj + j)*Bi + i` 个副本平移 (i, j, k) 个原胞。
    pub fn tile(&self, reps: [usize; 3]) -> Crystal {
        let reps = reps.map(|r| r.max(1));
        let [bi, bj, bk] = reps;
        let mut atoms = Vec::with_capacity(self.atoms.len() * bi * bj * bk);

        for k in 0..bk {
            for j in 0..bj {
                for i in 0..bi {
                    let shift = [i as f64, j as f64, k as f64];
                    for atom in &self.atoms {
                        let mut tiled = atom.clone();
                        for axis in 0..3 {
                            tiled.position[axis] =
                                (atom.position[axis] + shift[axis]) / reps[axis] as f64;
                        }
                        atoms.push(tiled);
                    }
                }
            }
        }

        Crystal {
            name: self.name.clone(),
            lattice: self.lattice.scaled(reps),
            atoms,
            source_format: self.source_format.clone(),
        }
    }
}
