//! # supercell 命令实现
//!
//! 将原胞结构平铺为与 Bloch 展开矩阵顺序一致的超胞。
//!
//! ## 功能
//! - 单文件模式：输出到指定文件
//! - 批量模式：目录中所有匹配文件并行处理，输出到目录
//!
//! ## 依赖关系
//! - 使用 `cli/supercell.rs` 定义的参数
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `bloch/` 平铺结构，`parsers/poscar.rs` 读写

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::bloch::Bloch;
use crate::cli::supercell::SupercellArgs;
use crate::error::{QunfoldError, Result};
use crate::parsers::poscar::{self, PoscarCoordinates};
use crate::utils::output;

use std::fs;
use std::path::{Path, PathBuf};

/// 单文件与批量共用的设置
struct SupercellConfig {
    bloch: Bloch,
    coordinates: PoscarCoordinates,
    overwrite: bool,
}

/// 执行 supercell 命令
pub fn execute(args: SupercellArgs) -> Result<()> {
    let config = SupercellConfig {
        bloch: Bloch::new(args.bloch.expansion()),
        coordinates: if args.cartesian {
            PoscarCoordinates::Cartesian
        } else {
            PoscarCoordinates::Direct
        },
        overwrite: args.overwrite,
    };

    output::print_header(&format!("Supercell generation with {}", config.bloch));

    if args.input.is_file() {
        execute_single_file(&args, &config)
    } else if args.input.is_dir() {
        execute_batch(&args, &config)
    } else {
        Err(QunfoldError::FileNotFound {
            path: args.input.display().to_string(),
        })
    }
}

/// 单文件模式
fn execute_single_file(args: &SupercellArgs, config: &SupercellConfig) -> Result<()> {
    match process_file(&args.input, &args.output, config) {
        ProcessResult::Success(msg) => {
            output::print_success(&msg);
            Ok(())
        }
        ProcessResult::Skipped(msg) => {
            output::print_skip(&msg);
            Ok(())
        }
        ProcessResult::Failed(_, err) => Err(QunfoldError::Other(err)),
    }
}

/// 批量处理模式
fn execute_batch(args: &SupercellArgs, config: &SupercellConfig) -> Result<()> {
    output::print_info(&format!("Batch mode: directory '{}'", args.input.display()));

    let mut collector = FileCollector::new(args.input.clone()).recursive(args.recursive);
    if let Some(pattern) = &args.pattern {
        collector = collector.with_pattern(pattern)?;
    }

    let files = collector.collect()?;
    if files.is_empty() {
        return Err(QunfoldError::NoFilesFound {
            pattern: args
                .pattern
                .clone()
                .unwrap_or_else(|| "POSCAR*,CONTCAR*,*.vasp".to_string()),
        });
    }

    output::print_info(&format!("Found {} structure files", files.len()));

    fs::create_dir_all(&args.output).map_err(|e| QunfoldError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;

    let runner = BatchRunner::new(args.jobs);
    let result = runner.run(files, |file| {
        let target = batch_output_path(&args.input, &args.output, file);
        process_file(file, &target, config)
    })?;

    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} success, {} skipped, {} failed",
        result.success, result.skipped, result.failed
    ));

    if !result.failures.is_empty() {
        output::print_warning("Failed files:");
        for (path, err) in result.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", path, err));
        }
        if result.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", result.failures.len() - 10));
        }
    }

    Ok(())
}

/// 批量模式的输出路径：保留相对目录，文件名追加 `_supercell`
fn batch_output_path(input_root: &Path, output_dir: &Path, file: &Path) -> PathBuf {
    let relative = file.strip_prefix(input_root).unwrap_or(file);
    let stem = relative
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("POSCAR");
    let name = match stem.rsplit_once('.') {
        Some((base, ext)) => format!("{}_supercell.{}", base, ext),
        None => format!("{}_supercell", stem),
    };

    match relative.parent() {
        Some(parent) => output_dir.join(parent).join(name),
        None => output_dir.join(name),
    }
}

/// 处理单个结构文件
fn process_file(input: &Path, output_path: &Path, config: &SupercellConfig) -> ProcessResult {
    if output_path.exists() && !config.overwrite {
        return ProcessResult::Skipped(format!(
            "Output exists, skipping: {}",
            output_path.display()
        ));
    }

    match write_supercell(input, output_path, config) {
        Ok(atoms) => ProcessResult::Success(format!(
            "{} -> {} ({} atoms)",
            input.display(),
            output_path.display(),
            atoms
        )),
        Err(e) => ProcessResult::Failed(input.display().to_string(), e.to_string()),
    }
}

fn write_supercell(input: &Path, output_path: &Path, config: &SupercellConfig) -> Result<usize> {
    let read = poscar::read_poscar_file(input)?;
    if read.species_defaulted {
        output::print_warning(&format!(
            "{}: no species line, using default element names",
            input.display()
        ));
    }

    let supercell = config.bloch.supercell(&read.crystal);
    let text = poscar::to_poscar_string_with(&supercell, config.coordinates);

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| QunfoldError::FileWriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }
    fs::write(output_path, text).map_err(|e| QunfoldError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(supercell.atoms.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_output_path() {
        let root = Path::new("/data/in");
        let out = Path::new("/data/out");
        assert_eq!(
            batch_output_path(root, out, Path::new("/data/in/POSCAR")),
            PathBuf::from("/data/out/POSCAR_supercell")
        );
        assert_eq!(
            batch_output_path(root, out, Path::new("/data/in/a/graphene.vasp")),
            PathBuf::from("/data/out/a/graphene_supercell.vasp")
        );
    }

    #[test]
    fn test_process_file_tiles_structure() {
        let dir = std::env::temp_dir().join(format!("qunfold-supercell-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join("POSCAR");
        fs::write(
            &input,
            "chain\n1.0\n2.0 0.0 0.0\n0.0 10.0 0.0\n0.0 0.0 10.0\nC\n1\nDirect\n0.0 0.0 0.0\n",
        )
        .unwrap();

        let config = SupercellConfig {
            bloch: Bloch::new([3, 1, 1]),
            coordinates: PoscarCoordinates::Direct,
            overwrite: false,
        };
        let target = dir.join("out").join("POSCAR_supercell");
        assert!(matches!(
            process_file(&input, &target, &config),
            ProcessResult::Success(_)
        ));
        assert!(matches!(
            process_file(&input, &target, &config),
            ProcessResult::Skipped(_)
        ));

        let tiled = poscar::parse_poscar_file(&target).unwrap();
        assert_eq!(tiled.atoms.len(), 3);
        assert!((tiled.lattice.matrix[0][0] - 6.0).abs() < 1e-8);

        fs::remove_dir_all(dir).unwrap();
    }
}
