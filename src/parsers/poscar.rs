//! # VASP POSCAR 格式解析器
//!
//! 解析与写出 VASP POSCAR/CONTCAR 文件格式。
//!
//! ## POSCAR 格式说明
//! ```text
//! Comment line (structure name)
//! 1.0                    # scaling factor (负值表示目标体积)
//! a1 a2 a3               # lattice vector a
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! Element1 Element2 ...  # element symbols (VASP 5+)
//! n1 n2 ...              # number of atoms per element
//! Selective dynamics     # optional
//! Direct/Cartesian       # coordinate type
//! x1 y1 z1               # atom positions
//! ...
//! ```
//!
//! 缺少元素行（VASP 4）时，元素依次取周期表前几个元素 (H, He, ...)。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 和 `commands/supercell.rs` 使用
//! - 使用 `models/structure.rs`, `models/element.rs`

use crate::error::{QunfoldError, Result};
use crate::models::element;
use crate::models::{Atom, Crystal, Lattice};

use std::fs;
use std::path::Path;

/// 写出时使用的坐标类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoscarCoordinates {
    #[default]
    Direct,
    Cartesian,
}

/// POSCAR 读取结果
#[derive(Debug, Clone)]
pub struct PoscarRead {
    pub crystal: Crystal,
    /// 文件没有元素行，元素名取自周期表
    pub species_defaulted: bool,
}

/// 解析 POSCAR/CONTCAR 文件
pub fn parse_poscar_file(path: &Path) -> Result<Crystal> {
    read_poscar_file(path).map(|read| read.crystal)
}

/// 解析 POSCAR/CONTCAR 文件，并返回是否使用了缺省元素
pub fn read_poscar_file(path: &Path) -> Result<PoscarRead> {
    let content = fs::read_to_string(path).map_err(|e| QunfoldError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    read_poscar(
        &content,
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown"),
    )
}

/// 从字符串内容解析 POSCAR 格式
pub fn parse_poscar_content(content: &str, default_name: &str) -> Result<Crystal> {
    read_poscar(content, default_name).map(|read| read.crystal)
}

fn parse_error(name: &str, reason: impl Into<String>) -> QunfoldError {
    QunfoldError::ParseError {
        format: "poscar".to_string(),
        path: name.to_string(),
        reason: reason.into(),
    }
}

/// 从字符串内容解析 POSCAR 格式
pub fn read_poscar(content: &str, default_name: &str) -> Result<PoscarRead> {
    let lines: Vec<&str> = content.lines().collect();

    if lines.len() < 8 {
        return Err(parse_error(default_name, "File too short"));
    }

    // Line 0: Comment/name
    let name = lines[0].trim().to_string();
    let name = if name.is_empty() {
        default_name.to_string()
    } else {
        name
    };

    // Line 1: Scaling factor
    let scale: f64 = lines[1]
        .split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| parse_error(&name, "Invalid scaling factor at line 2"))?;

    // Lines 2-4: Lattice vectors
    let mut matrix = [[0.0; 3]; 3];
    for (i, row) in matrix.iter_mut().enumerate() {
        let parts: Vec<f64> = lines[2 + i]
            .split_whitespace()
            .take(3)
            .filter_map(|s| s.parse().ok())
            .collect();
        if parts.len() < 3 {
            return Err(parse_error(
                &name,
                format!("Invalid lattice vector at line {}", 3 + i),
            ));
        }
        *row = [parts[0], parts[1], parts[2]];
    }

    // 负缩放因子表示目标体积
    let scale = if scale < 0.0 {
        let volume = Lattice::from_vectors(matrix).volume().abs();
        (scale.abs() / volume).cbrt()
    } else {
        scale
    };
    for row in matrix.iter_mut() {
        for value in row.iter_mut() {
            *value *= scale;
        }
    }
    let lattice = Lattice::from_vectors(matrix);

    // Line 5: Element symbols (VASP 5+) or atom counts (VASP 4)
    let line5_parts: Vec<&str> = lines[5].split_whitespace().collect();
    if line5_parts.is_empty() {
        return Err(parse_error(&name, "Missing species/count line"));
    }

    let species_defaulted = line5_parts[0].parse::<usize>().is_ok();
    let (elements, counts, atom_line_start) = if species_defaulted {
        let counts: Vec<usize> = line5_parts.iter().filter_map(|s| s.parse().ok()).collect();
        let elements: Vec<String> = (0..counts.len())
            .map(|i| {
                element::symbol(i + 1)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("X{}", i + 1))
            })
            .collect();
        (elements, counts, 6)
    } else {
        let elements: Vec<String> = line5_parts.iter().map(|s| s.to_string()).collect();
        let counts: Vec<usize> = lines[6]
            .split_whitespace()
            .filter_map(|s| s.parse().ok())
            .collect();
        (elements, counts, 7)
    };

    if counts.len() != elements.len() {
        return Err(parse_error(
            &name,
            format!(
                "{} species but {} atom counts",
                elements.len(),
                counts.len()
            ),
        ));
    }

    // Check for "Selective dynamics" line
    let mut coord_line = atom_line_start;
    if lines.len() > coord_line
        && lines[coord_line]
            .trim_start()
            .to_lowercase()
            .starts_with('s')
    {
        coord_line += 1;
    }

    if lines.len() <= coord_line {
        return Err(parse_error(&name, "Missing coordinate type line"));
    }

    let coord_type = lines[coord_line].trim().to_lowercase();
    let is_cartesian = coord_type.starts_with('c') || coord_type.starts_with('k');

    // Parse atom positions
    let total: usize = counts.iter().sum();
    let mut atoms: Vec<Atom> = Vec::with_capacity(total);
    let mut line_idx = coord_line + 1;

    for (elem, &count) in elements.iter().zip(counts.iter()) {
        for _ in 0..count {
            let line = lines.get(line_idx).ok_or_else(|| {
                parse_error(&name, format!("Expected {} atoms, file ended early", total))
            })?;
            let parts: Vec<f64> = line
                .split_whitespace()
                .take(3)
                .filter_map(|s| s.parse().ok())
                .collect();
            if parts.len() < 3 {
                return Err(parse_error(
                    &name,
                    format!("Invalid atom position at line {}", line_idx + 1),
                ));
            }

            let position = if is_cartesian {
                let cart = [parts[0] * scale, parts[1] * scale, parts[2] * scale];
                lattice
                    .cart_to_frac(cart)
                    .ok_or_else(|| parse_error(&name, "Singular lattice"))?
            } else {
                [parts[0], parts[1], parts[2]]
            };
            atoms.push(Atom::new(elem.clone(), position));
            line_idx += 1;
        }
    }

    let mut crystal = Crystal::new(name, lattice, atoms);
    crystal.source_format = Some("poscar".to_string());

    Ok(PoscarRead {
        crystal,
        species_defaulted,
    })
}

/// 将 Crystal 转换为 POSCAR 格式字符串（分数坐标）
pub fn to_poscar_string(crystal: &Crystal) -> String {
    to_poscar_string_with(crystal, PoscarCoordinates::Direct)
}

/// 将 Crystal 转换为 POSCAR 格式字符串
///
/// 相邻的同种原子合并为一组，元素可重复出现，原子顺序保持不变，
/// 从而与 Bloch 展开矩阵的轨道顺序一致。
pub fn to_poscar_string_with(crystal: &Crystal, coordinates: PoscarCoordinates) -> String {
    // (元素, 数目) 连续分组
    let mut groups: Vec<(&str, usize)> = Vec::new();
    for atom in &crystal.atoms {
        if let Some((element, count)) = groups.last_mut() {
            if *element == atom.element {
                *count += 1;
                continue;
            }
        }
        groups.push((atom.element.as_str(), 1));
    }

    let mut result = String::new();

    // Line 0: Comment
    result.push_str(&format!("{}\n", crystal.name));

    // Line 1: Scale
    result.push_str("1.0\n");

    // Lines 2-4: Lattice
    for row in &crystal.lattice.matrix {
        result.push_str(&format!(
            "  {:16.10}  {:16.10}  {:16.10}\n",
            row[0], row[1], row[2]
        ));
    }

    // Line 5: Elements
    let elements: Vec<&str> = groups.iter().map(|(e, _)| *e).collect();
    result.push_str(&format!("   {}\n", elements.join("   ")));

    // Line 6: Counts
    let counts: Vec<String> = groups.iter().map(|(_, n)| n.to_string()).collect();
    result.push_str(&format!("   {}\n", counts.join("   ")));

    // Coordinate type
    match coordinates {
        PoscarCoordinates::Direct => result.push_str("Direct\n"),
        PoscarCoordinates::Cartesian => result.push_str("Cartesian\n"),
    }

    // Atom positions
    for atom in &crystal.atoms {
        let pos = match coordinates {
            PoscarCoordinates::Direct => atom.position,
            PoscarCoordinates::Cartesian => crystal.lattice.frac_to_cart(atom.position),
        };
        result.push_str(&format!(
            "  {:16.10}  {:16.10}  {:16.10}\n",
            pos[0], pos[1], pos[2]
        ));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_poscar_vasp5() {
        let content = r#"NaCl
1.0
5.64 0.0 0.0
0.0 5.64 0.0
0.0 0.0 5.64
Na Cl
4 4
Direct
0.0 0.0 0.0
0.5 0.5 0.0
0.5 0.0 0.5
0.0 0.5 0.5
0.5 0.0 0.0
0.0 0.5 0.0
0.0 0.0 0.5
0.5 0.5 0.5
"#;
        let read = read_poscar(content, "NaCl").unwrap();
        assert!(!read.species_defaulted);
        assert_eq!(read.crystal.name, "NaCl");
        assert_eq!(read.crystal.atoms.len(), 8);

        let na_count = read.crystal.atoms.iter().filter(|a| a.element == "Na").count();
        let cl_count = read.crystal.atoms.iter().filter(|a| a.element == "Cl").count();
        assert_eq!(na_count, 4);
        assert_eq!(cl_count, 4);
    }

    #[test]
    fn test_parse_poscar_vasp4_defaults_species() {
        let content = r#"no species
1.0
3.0 0.0 0.0
0.0 3.0 0.0
0.0 0.0 3.0
1 2
Direct
0.0 0.0 0.0
0.5 0.5 0.0
0.5 0.0 0.5
"#;
        let read = read_poscar(content, "x").unwrap();
        assert!(read.species_defaulted);
        assert_eq!(read.crystal.atoms[0].element, "H");
        assert_eq!(read.crystal.atoms[1].element, "He");
        assert_eq!(read.crystal.atoms[2].element, "He");
    }

    #[test]
    fn test_parse_poscar_with_scale() {
        let content = r#"Si
2.0
2.0 0.0 0.0
0.0 2.0 0.0
0.0 0.0 2.0
Si
2
Direct
0.0 0.0 0.0
0.5 0.5 0.5
"#;
        let crystal = parse_poscar_content(content, "Si").unwrap();
        let (a, _, _, _, _, _) = crystal.lattice.parameters();

        // 2.0 * 2.0 = 4.0
        assert!((a - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_parse_poscar_negative_scale_is_volume() {
        let content = r#"Cu
-64.0
1.0 0.0 0.0
0.0 1.0 0.0
0.0 0.0 1.0
Cu
1
Direct
0.0 0.0 0.0
"#;
        let crystal = parse_poscar_content(content, "Cu").unwrap();
        assert!((crystal.lattice.volume() - 64.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_poscar_cartesian_scaled() {
        let content = r#"Fe
2.0
2.0 0.0 0.0
0.0 2.0 0.0
0.0 0.0 2.0
Fe
1
Cartesian
1.0 1.0 0.5
"#;
        let crystal = parse_poscar_content(content, "Fe").unwrap();
        let pos = crystal.atoms[0].position;
        assert!((pos[0] - 0.5).abs() < 1e-12);
        assert!((pos[1] - 0.5).abs() < 1e-12);
        assert!((pos[2] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_parse_poscar_selective_dynamics() {
        let content = r#"Fe with selective
1.0
2.87 0.0 0.0
0.0 2.87 0.0
0.0 0.0 2.87
Fe
2
Selective dynamics
Direct
0.0 0.0 0.0 T T T
0.5 0.5 0.5 F F F
"#;
        let crystal = parse_poscar_content(content, "Fe").unwrap();
        assert_eq!(crystal.atoms.len(), 2);
    }

    #[test]
    fn test_parse_poscar_truncated_positions() {
        let content = r#"Fe
1.0
2.87 0.0 0.0
0.0 2.87 0.0
0.0 0.0 2.87
Fe
3
Direct
0.0 0.0 0.0
"#;
        assert!(matches!(
            parse_poscar_content(content, "Fe"),
            Err(QunfoldError::ParseError { .. })
        ));
    }

    #[test]
    fn test_poscar_write_then_read() {
        let lattice = Lattice::from_vectors([[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]]);
        let atoms = vec![
            Atom::new("Ti", [0.0, 0.0, 0.0]),
            Atom::new("O", [0.5, 0.5, 0.0]),
            Atom::new("O", [0.5, 0.0, 0.5]),
        ];
        let crystal = Crystal::new("TiO2", lattice, atoms);

        for coordinates in [PoscarCoordinates::Direct, PoscarCoordinates::Cartesian] {
            let text = to_poscar_string_with(&crystal, coordinates);
            let parsed = parse_poscar_content(&text, "written").unwrap();

            assert_eq!(parsed.atoms.len(), 3);
            assert_eq!(parsed.atoms[0].element, "Ti");
            assert!((parsed.atoms[2].position[2] - 0.5).abs() < 1e-8);
        }
    }

    #[test]
    fn test_poscar_write_keeps_atom_order() {
        let lattice = Lattice::from_vectors([[3.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 3.0]]);
        let atoms = vec![Atom::new("Ga", [0.0; 3]), Atom::new("As", [0.25; 3])];
        let tiled = Crystal::new("GaAs", lattice, atoms).tile([2, 1, 1]);

        let text = to_poscar_string(&tiled);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[5].split_whitespace().collect::<Vec<_>>(), ["Ga", "As", "Ga", "As"]);
        assert_eq!(lines[6].split_whitespace().collect::<Vec<_>>(), ["1", "1", "1", "1"]);

        let parsed = parse_poscar_content(&text, "written").unwrap();
        assert_eq!(parsed.atoms[2].element, "Ga");
        assert!((parsed.atoms[2].position[0] - 0.5).abs() < 1e-8);
    }
}
