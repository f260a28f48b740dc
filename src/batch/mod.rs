//! # 批量处理模块
//!
//! 对目录中的结构文件批量生成 Bloch 超胞。
//!
//! ## 功能
//! - 自动检测输入类型（文件/目录）
//! - 按 glob 模式收集文件
//! - 并行处理与统计
//!
//! ## 依赖关系
//! - 被 `commands/supercell.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::FileCollector;
pub use runner::{build_pool, BatchResult, BatchRunner, ProcessResult};
