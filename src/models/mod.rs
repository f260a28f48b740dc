//! # 数据模型模块
//!
//! 定义晶体结构、态密度等数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `bloch/`, `transport/` 和 `commands/` 使用
//! - 子模块: structure, dos, element

pub mod dos;
pub mod element;
pub mod structure;

pub use dos::DensityOfStates;
pub use structure::{Atom, Crystal, Lattice};
