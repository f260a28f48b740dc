//! # 工具函数模块
//!
//! 提供美化输出、进度条与向量数学工具。
//!
//! ## 依赖关系
//! - 被 `commands/`, `models/` 模块使用
//! - 子模块: output, progress, math

pub mod math;
pub mod output;
pub mod progress;
