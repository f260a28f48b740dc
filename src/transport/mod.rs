//! # 输运计算结果模型
//!
//! TBtrans/PHtrans 输出文件内容的内存表示，以及按 k 点平均的访问接口。
//! 文件容器本身不在此读取，调用方按原始单位提供数组：
//! 晶胞与坐标为 Bohr，能量、化学势与电子温度为 Ry。
//!
//! ## 数据布局
//! - k 分辨量第 0 维为 k 点，第 1 维为能量点
//! - 电极之间的透射按 `transmission[目标电极]` 存放在源电极下
//! - 轨道电流为 (nk, ne, nnz)，稀疏结构由 `n_col` 与 1 起始的 `list_col` 给出
//!
//! ## 依赖关系
//! - 使用 `models/structure.rs` 构建几何结构
//! - 子模块: kavg (k 点平均), sparse (CSR 矩阵)

pub mod kavg;
pub mod sparse;

pub use kavg::KAverage;
pub use sparse::CsrMatrix;

use crate::error::{QunfoldError, Result};
use crate::models::{Atom, Crystal, Lattice};

use ndarray::ArrayD;
use std::collections::BTreeMap;

/// 1 Bohr (Å)
pub const BOHR_TO_ANG: f64 = 0.529_177_210_67;

/// 1 Ry (eV)
pub const RY_TO_EV: f64 = 13.605_693_009;

/// 输运计算类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    /// 电子输运 (TBtrans)
    #[default]
    Electron,
    /// 声子输运 (PHtrans)
    Phonon,
}

impl TransportKind {
    /// 文件标签
    pub fn tag(&self) -> &'static str {
        match self {
            TransportKind::Electron => "TBT",
            TransportKind::Phonon => "PHT",
        }
    }
}

/// 单个电极的数据
#[derive(Debug, Clone, Default)]
pub struct ElectrodeData {
    /// 化学势 (Ry)
    pub mu: f64,
    /// 电子温度 (Ry)
    pub kt: f64,
    /// 到其他电极的透射，键为目标电极
    pub transmission: BTreeMap<String, ArrayD<f64>>,
    /// 透射本征值，键为目标电极
    pub transmission_eig: BTreeMap<String, ArrayD<f64>>,
    /// 电极体相透射
    pub bulk_transmission: Option<ArrayD<f64>>,
    /// 谱函数态密度
    pub ados: Option<ArrayD<f64>>,
    /// 电极体相态密度
    pub bulk_dos: Option<ArrayD<f64>>,
    /// 轨道电流 (nk, ne, nnz)
    pub orbital_current: Option<ArrayD<f64>>,
}

/// 输运计算结果
#[derive(Debug, Clone, Default)]
pub struct TransportData {
    pub kind: TransportKind,
    /// 晶胞 (Bohr)，行向量
    pub cell: [[f64; 3]; 3],
    /// 原子坐标 (Bohr)
    pub xa: Vec<[f64; 3]>,
    /// 每个原子最后一个轨道的序号（1 起始，累计）
    pub lasto: Vec<usize>,
    /// 器件区原子（1 起始）
    pub a_dev: Vec<usize>,
    /// 器件区轨道的排序表
    pub pivot: Vec<usize>,
    /// k 点（约化坐标）
    pub kpt: Vec<[f64; 3]>,
    /// k 点权重
    pub wkpt: Vec<f64>,
    /// 能量点 (Ry)
    pub energies: Vec<f64>,
    /// 格林函数态密度
    pub dos: Option<ArrayD<f64>>,
    /// 电极（按文件中分组顺序）
    pub electrodes: Vec<(String, ElectrodeData)>,
    /// 轨道电流稀疏结构：每行非零元数
    pub n_col: Vec<usize>,
    /// 轨道电流稀疏结构：列下标（1 起始）
    pub list_col: Vec<usize>,
}

impl TransportData {
    /// 原子数
    pub fn na(&self) -> usize {
        self.xa.len()
    }

    /// 轨道数
    pub fn no(&self) -> usize {
        self.lasto.last().copied().unwrap_or(0)
    }

    /// 器件区原子数
    pub fn na_d(&self) -> usize {
        self.a_dev.len()
    }

    /// 器件区轨道数
    pub fn no_d(&self) -> usize {
        self.pivot.len()
    }

    /// k 点数
    pub fn nkpt(&self) -> usize {
        self.kpt.len()
    }

    /// 能量点数
    pub fn ne(&self) -> usize {
        self.energies.len()
    }

    /// 晶胞 (Å)
    pub fn cell(&self) -> [[f64; 3]; 3] {
        self.cell.map(|row| row.map(|v| v * BOHR_TO_ANG))
    }

    /// 原子坐标 (Å)
    pub fn xyz(&self) -> Vec<[f64; 3]> {
        self.xa
            .iter()
            .map(|r| r.map(|v| v * BOHR_TO_ANG))
            .collect()
    }

    /// 能量点 (eV)
    pub fn energies_ev(&self) -> Vec<f64> {
        self.energies.iter().map(|e| e * RY_TO_EV).collect()
    }

    /// 每个原子的轨道数
    pub fn orbitals_per_atom(&self) -> Result<Vec<usize>> {
        let mut previous = 0;
        self.lasto
            .iter()
            .map(|&last| {
                if last < previous {
                    return Err(QunfoldError::InvalidArgument(format!(
                        "lasto must be non-decreasing ({} after {})",
                        last, previous
                    )));
                }
                let count = last - previous;
                previous = last;
                Ok(count)
            })
            .collect()
    }

    /// 几何结构；文件不保存元素种类，原子一律记为 H
    pub fn geometry(&self) -> Result<Crystal> {
        if self.lasto.len() != self.xa.len() {
            return Err(QunfoldError::InvalidArgument(format!(
                "{} atoms but {} lasto entries",
                self.xa.len(),
                self.lasto.len()
            )));
        }

        let lattice = Lattice::from_vectors(self.cell());
        let orbitals = self.orbitals_per_atom()?;

        let atoms = self
            .xyz()
            .into_iter()
            .zip(orbitals)
            .map(|(cart, orbs)| {
                let frac = lattice.cart_to_frac(cart).ok_or_else(|| {
                    QunfoldError::InvalidArgument("Singular cell in transport data".to_string())
                })?;
                Ok(Atom::new("H", frac).with_orbitals(orbs))
            })
            .collect::<Result<Vec<Atom>>>()?;

        let mut crystal = Crystal::new(self.kind.tag(), lattice, atoms);
        crystal.source_format = Some(self.kind.tag().to_lowercase());
        Ok(crystal)
    }

    /// 电极列表
    ///
    /// 未计算全部透射时，最后一个电极只作为第一个电极的透射目标出现，也需列出。
    pub fn electrode_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.electrodes.iter().map(|(n, _)| n.clone()).collect();
        if let Some((_, first)) = self.electrodes.first() {
            for target in first.transmission.keys() {
                if !names.contains(target) {
                    names.push(target.clone());
                }
            }
        }
        names
    }

    /// 查找电极
    pub fn electrode(&self, name: &str) -> Result<&ElectrodeData> {
        self.electrodes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, e)| e)
            .ok_or_else(|| QunfoldError::InvalidArgument(format!("Unknown electrode '{}'", name)))
    }

    /// 电极化学势 (eV)
    pub fn chemical_potential(&self, elec: &str) -> Result<f64> {
        Ok(self.electrode(elec)?.mu * RY_TO_EV)
    }

    /// 电极电子温度 (eV)
    pub fn electronic_temperature(&self, elec: &str) -> Result<f64> {
        Ok(self.electrode(elec)?.kt * RY_TO_EV)
    }

    fn average(&self, data: Option<&ArrayD<f64>>, what: &str, avg: &KAverage) -> Result<ArrayD<f64>> {
        let data = data.ok_or_else(|| {
            QunfoldError::InvalidArgument(format!("{} is not present in the transport data", what))
        })?;
        kavg::k_average(data, &self.wkpt, avg)
    }

    fn distinct(elec_from: &str, elec_to: &str) -> Result<()> {
        if elec_from == elec_to {
            return Err(QunfoldError::InvalidArgument(
                "Supplied elec_from and elec_to must not be the same".to_string(),
            ));
        }
        Ok(())
    }

    /// `elec_from` 到 `elec_to` 的透射
    pub fn transmission(&self, elec_from: &str, elec_to: &str, avg: &KAverage) -> Result<ArrayD<f64>> {
        Self::distinct(elec_from, elec_to)?;
        let elec = self.electrode(elec_from)?;
        self.average(
            elec.transmission.get(elec_to),
            &format!("{}.T from {}", elec_to, elec_from),
            avg,
        )
    }

    /// `elec_from` 到 `elec_to` 的透射本征值
    pub fn transmission_eig(
        &self,
        elec_from: &str,
        elec_to: &str,
        avg: &KAverage,
    ) -> Result<ArrayD<f64>> {
        Self::distinct(elec_from, elec_to)?;
        let elec = self.electrode(elec_from)?;
        self.average(
            elec.transmission_eig.get(elec_to),
            &format!("{}.T.Eig from {}", elec_to, elec_from),
            avg,
        )
    }

    /// 电极体相透射
    pub fn transmission_bulk(&self, elec: &str, avg: &KAverage) -> Result<ArrayD<f64>> {
        let data = self.electrode(elec)?;
        self.average(data.bulk_transmission.as_ref(), "bulk transmission", avg)
    }

    /// 格林函数态密度
    pub fn dos(&self, avg: &KAverage) -> Result<ArrayD<f64>> {
        self.average(self.dos.as_ref(), "Green function DOS", avg)
    }

    /// 源自 `elec` 的谱函数态密度
    pub fn ados(&self, elec: &str, avg: &KAverage) -> Result<ArrayD<f64>> {
        let data = self.electrode(elec)?;
        self.average(data.ados.as_ref(), "spectral DOS", avg)
    }

    /// 电极体相态密度
    pub fn dos_bulk(&self, elec: &str, avg: &KAverage) -> Result<ArrayD<f64>> {
        let data = self.electrode(elec)?;
        self.average(data.bulk_dos.as_ref(), "bulk DOS", avg)
    }

    /// 轨道电流的稀疏结构 (no × no)
    pub fn orbital_pattern(&self) -> Result<CsrMatrix> {
        CsrMatrix::from_counts(&self.n_col, &self.list_col, self.n_col.len())
    }

    fn orbital_current_data(&self, elec: &str) -> Result<&ArrayD<f64>> {
        self.electrode(elec)?
            .orbital_current
            .as_ref()
            .ok_or_else(|| {
                QunfoldError::InvalidArgument(format!("No orbital currents for electrode '{}'", elec))
            })
    }

    /// 单个能量点的轨道电流
    pub fn orbital_current_at(&self, elec: &str, idx_e: usize, avg: &KAverage) -> Result<CsrMatrix> {
        let pattern = self.orbital_pattern()?;
        let j = kavg::k_average_at_energy(self.orbital_current_data(elec)?, &self.wkpt, avg, idx_e)?;
        if j.ndim() != 1 {
            return Err(QunfoldError::InvalidArgument(
                "A single orbital-current matrix requires k-averaged or single-k data".to_string(),
            ));
        }
        pattern.with_data(j.iter().copied().collect())
    }

    /// 全部能量点的轨道电流
    ///
    /// 返回以第一个能量点填充的稀疏矩阵以及全部电流 J (ne, nnz)；
    /// 其他能量点可用 `pattern.with_data(J[e].to_vec())` 取得。
    /// `KAverage::Resolved` 不能归约为单个矩阵，返回错误。
    pub fn orbital_current(&self, elec: &str, avg: &KAverage) -> Result<(CsrMatrix, ArrayD<f64>)> {
        let pattern = self.orbital_pattern()?;
        let j = kavg::k_average(self.orbital_current_data(elec)?, &self.wkpt, avg)?;
        if j.ndim() != 2 {
            return Err(QunfoldError::InvalidArgument(
                "Orbital currents over all energies require k-averaged or single-k data"
                    .to_string(),
            ));
        }
        let first: Vec<f64> = j.iter().take(pattern.nnz()).copied().collect();
        Ok((pattern.with_data(first)?, j))
    }
}
