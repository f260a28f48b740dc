//! # qunfold - Bloch 展开与后处理工具
//!
//! 利用 Bloch 定理从原胞在少量 k 点上的矩阵组装超胞矩阵，
//! 并提供结构平铺、DOSCAR 态密度与输运计算结果的后处理。
//!
//! ## 依赖关系
//! ```text
//! lib.rs
//!   ├── bloch/      (展开 k 点与矩阵组装)
//!   ├── models/     (晶体结构与态密度)
//!   ├── parsers/    (POSCAR, DOSCAR, 矩阵 CSV)
//!   ├── transport/  (输运结果模型与 k 点平均)
//!   ├── dos/        (态密度导出与绘图)
//!   ├── batch/      (批量文件处理)
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   ├── utils/      (输出、进度条、向量数学)
//!   └── error.rs    (错误处理)
//! ```

pub mod batch;
pub mod bloch;
pub mod cli;
pub mod commands;
pub mod dos;
pub mod error;
pub mod models;
pub mod parsers;
pub mod transport;
pub mod utils;

pub use bloch::Bloch;
pub use error::{QunfoldError, Result};
