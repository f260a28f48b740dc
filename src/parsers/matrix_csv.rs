//! # 矩阵 CSV 读写
//!
//! 展开命令的输入输出格式。
//!
//! ## 输入格式（每个展开 k 点的矩阵元）
//! ```text
//! point,row,col,re,im
//! 0,0,0,1.0,0.0
//! 1,0,1,-0.5,0.25
//! ```
//! `point` 是 `Bloch::unfold_points` 返回的 k 点下标；`im` 列可省略。
//! 未给出的矩阵元为 0，但每个 k 点至少要有一条记录。
//!
//! ## 输出格式
//! - 展开矩阵: `row,col,re,im`
//! - 展开 k 点: `index,kx,ky,kz[,cart_x,cart_y,cart_z]`
//!
//! ## 依赖关系
//! - 被 `commands/unfold.rs`, `commands/points.rs` 使用
//! - 使用 `csv` + `serde`

use crate::error::{QunfoldError, Result};

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// 输入矩阵元记录
#[derive(Debug, Clone, Deserialize)]
struct MatrixRecord {
    point: usize,
    row: usize,
    col: usize,
    re: f64,
    #[serde(default)]
    im: f64,
}

/// 输出矩阵元记录
#[derive(Debug, Clone, Serialize)]
struct EntryRecord {
    row: usize,
    col: usize,
    re: f64,
    im: f64,
}

/// 读取各 k 点矩阵
///
/// `points` 为期望的 k 点数；`size` 为矩阵边长，省略时取所有记录中的最大下标 + 1。
pub fn read_matrices<R: Read>(
    reader: R,
    points: usize,
    size: Option<usize>,
    source: &str,
) -> Result<Vec<Array2<Complex64>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for record in rdr.deserialize() {
        let record: MatrixRecord = record?;
        records.push(record);
    }

    let inferred = records
        .iter()
        .map(|r| r.row.max(r.col) + 1)
        .max()
        .unwrap_or(0);
    let m = size.unwrap_or(inferred);

    if m == 0 {
        return Err(QunfoldError::ParseError {
            format: "matrix csv".to_string(),
            path: source.to_string(),
            reason: "No matrix entries".to_string(),
        });
    }
    if inferred > m {
        return Err(QunfoldError::ParseError {
            format: "matrix csv".to_string(),
            path: source.to_string(),
            reason: format!("Entry index {} exceeds matrix size {}", inferred - 1, m),
        });
    }

    let mut matrices = vec![Array2::<Complex64>::zeros((m, m)); points];
    let mut seen = vec![false; points];
    for record in records {
        let matrix = matrices
            .get_mut(record.point)
            .ok_or_else(|| QunfoldError::ParseError {
                format: "matrix csv".to_string(),
                path: source.to_string(),
                reason: format!(
                    "Point index {} out of range (expected < {})",
                    record.point, points
                ),
            })?;
        matrix[[record.row, record.col]] += Complex64::new(record.re, record.im);
        seen[record.point] = true;
    }

    // 缺少的 k 点不能以零矩阵代替
    let found = seen.iter().filter(|s| **s).count();
    if found != points {
        return Err(QunfoldError::MatrixCountMismatch {
            expected: points,
            found,
        });
    }

    Ok(matrices)
}

/// 从文件读取各 k 点矩阵
pub fn read_matrices_file(
    path: &Path,
    points: usize,
    size: Option<usize>,
) -> Result<Vec<Array2<Complex64>>> {
    let file = File::open(path).map_err(|e| QunfoldError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    read_matrices(file, points, size, &path.display().to_string())
}

/// 写出矩阵，|z| <= tolerance 的元素跳过（tolerance < 0 时全部写出）
///
/// `target` 用于错误信息中的输出位置。
pub fn write_matrix<W: Write>(
    writer: W,
    matrix: &Array2<Complex64>,
    tolerance: f64,
    target: &str,
) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut written = 0;

    for ((row, col), value) in matrix.indexed_iter() {
        if tolerance >= 0.0 && value.norm() <= tolerance {
            continue;
        }
        wtr.serialize(EntryRecord {
            row,
            col,
            re: value.re,
            im: value.im,
        })?;
        written += 1;
    }

    wtr.flush().map_err(|e| QunfoldError::FileWriteError {
        path: target.to_string(),
        source: e,
    })?;

    Ok(written)
}

/// 写出矩阵到文件，返回写出的元素数
pub fn write_matrix_file(path: &Path, matrix: &Array2<Complex64>, tolerance: f64) -> Result<usize> {
    let file = File::create(path).map_err(|e| QunfoldError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    write_matrix(file, matrix, tolerance, &path.display().to_string())
}

/// 写出展开 k 点，可附带笛卡尔坐标
pub fn write_points_file(
    path: &Path,
    points: &[[f64; 3]],
    cartesian: Option<&[[f64; 3]]>,
) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["index", "kx", "ky", "kz"];
    if cartesian.is_some() {
        header.extend(["cart_x", "cart_y", "cart_z"]);
    }
    wtr.write_record(&header)?;

    for (index, k) in points.iter().enumerate() {
        let mut record = vec![
            index.to_string(),
            format!("{:.10}", k[0]),
            format!("{:.10}", k[1]),
            format!("{:.10}", k[2]),
        ];
        if let Some(cart) = cartesian.and_then(|c| c.get(index)) {
            record.extend(cart.iter().map(|v| format!("{:.10}", v)));
        }
        wtr.write_record(&record)?;
    }

    wtr.flush().map_err(|e| QunfoldError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
