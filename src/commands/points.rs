//! # points 命令实现
//!
//! 打印折叠 k 点对应的展开 k 点，可选给出笛卡尔坐标并导出 CSV。
//!
//! ## 依赖关系
//! - 使用 `cli/points.rs` 定义的参数
//! - 使用 `bloch/`, `parsers/`, `utils/output.rs`

use crate::bloch::Bloch;
use crate::cli::points::PointsArgs;
use crate::error::Result;
use crate::parsers::{self, matrix_csv};
use crate::utils::output;

use tabled::{Table, Tabled};

#[derive(Tabled)]
struct PointRow {
    #[tabled(rename = "T")]
    index: usize,
    #[tabled(rename = "kx")]
    kx: String,
    #[tabled(rename = "ky")]
    ky: String,
    #[tabled(rename = "kz")]
    kz: String,
    #[tabled(rename = "|k| (1/Å)")]
    norm: String,
}

/// 执行 points 命令
pub fn execute(args: PointsArgs) -> Result<()> {
    let bloch = Bloch::new(args.bloch.expansion());
    let k = args.k.k_point();

    output::print_header(&format!("Unfold points of {}", bloch));

    let points = bloch.unfold_points(k);

    let cartesian = match &args.structure {
        Some(path) => {
            let crystal = parsers::parse_structure_file(path)?;
            output::print_info(&format!(
                "Primitive cell: {} ({} atoms)",
                crystal.name,
                crystal.atoms.len()
            ));
            Some(
                points
                    .iter()
                    .map(|&kp| crystal.lattice.k_to_cartesian(kp))
                    .collect::<Vec<_>>(),
            )
        }
        None => None,
    };

    let rows: Vec<PointRow> = points
        .iter()
        .enumerate()
        .map(|(index, kp)| PointRow {
            index,
            kx: format!("{:.6}", kp[0]),
            ky: format!("{:.6}", kp[1]),
            kz: format!("{:.6}", kp[2]),
            norm: cartesian
                .as_ref()
                .map(|cart| format!("{:.6}", crate::utils::math::fnorm(&cart[index])))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    println!("{}", Table::new(&rows));

    if let Some(path) = &args.output {
        matrix_csv::write_points_file(path, &points, cartesian.as_deref())?;
        output::print_success(&format!(
            "Wrote {} points to '{}'",
            points.len(),
            path.display()
        ));
    }

    Ok(())
}
