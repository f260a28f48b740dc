//! # 统一错误处理模块
//!
//! 定义 qunfold 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// qunfold 统一错误类型
#[derive(Error, Debug)]
pub enum QunfoldError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    // ─────────────────────────────────────────────────────────────
    // Bloch 展开前置条件
    // ─────────────────────────────────────────────────────────────
    #[error("Expected {expected} matrices for the Bloch expansion, got {found}")]
    MatrixCountMismatch { expected: usize, found: usize },

    #[error("Expected {expected} unfolding k-points, got {found}")]
    KPointCountMismatch { expected: usize, found: usize },

    #[error("Matrix {index} is not square: {rows}x{cols}")]
    NonSquareMatrix {
        index: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Matrix {index} has shape {found:?}, expected {expected:?}")]
    MatrixShapeMismatch {
        index: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV / 绘图错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Plot error: {0}")]
    PlotError(String),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("No matching files found with pattern: {pattern}")]
    NoFilesFound { pattern: String },

    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, QunfoldError>;
