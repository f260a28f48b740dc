//! # 态密度图表生成
//!
//! 使用 `plotters` 绘制总态密度曲线，费米能级为零点并以竖线标出。
//! 自旋极化时自旋向下通道取负值绘制在横轴下方。
//!
//! ## 依赖关系
//! - 被 `commands/dos.rs` 调用
//! - 使用 `models/dos.rs` 的 DensityOfStates
//! - 使用 `plotters` 渲染图表

use crate::error::{QunfoldError, Result};
use crate::models::DensityOfStates;

use plotters::prelude::*;
use std::path::Path;

fn plot_error<E: std::fmt::Debug>(e: E) -> QunfoldError {
    QunfoldError::PlotError(format!("{:?}", e))
}

/// 绘制到 PNG 或 SVG
pub fn generate_dos_plot(
    dos: &DensityOfStates,
    output_path: &Path,
    title: &str,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    if dos.energies.is_empty() {
        return Err(QunfoldError::PlotError(
            "No energy points in the selected window".to_string(),
        ));
    }

    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_dos_chart(&root, dos, title)?;
        root.present().map_err(plot_error)?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_dos_chart(&root, dos, title)?;
        root.present().map_err(plot_error)?;
    }
    Ok(())
}

/// 曲线点列；自旋向下通道取负
pub fn channel_series(dos: &DensityOfStates, spin: usize) -> Vec<(f64, f64)> {
    let sign = if spin == 1 { -1.0 } else { 1.0 };
    dos.energies
        .iter()
        .zip(&dos.dos[spin])
        .map(|(&e, &d)| (e, sign * d))
        .collect()
}

fn draw_dos_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    dos: &DensityOfStates,
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_error)?;

    let x_min = dos.energies.iter().copied().fold(f64::INFINITY, f64::min);
    let x_max = dos.energies.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let x_range = if x_max > x_min {
        x_min..x_max
    } else {
        (x_min - 1.0)..(x_max + 1.0)
    };

    let top = dos.max_dos().max(1e-6) * 1.1;
    let bottom = if dos.is_spin_polarized() { -top } else { 0.0 };

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, bottom..top)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("E - E_F (eV)")
        .y_desc("DOS (states/eV)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(plot_error)?;

    let colors = [RGBColor(0, 102, 204), RGBColor(204, 51, 0)];
    let labels = ["spin up", "spin down"];

    for spin in 0..dos.spin_channels().min(2) {
        let data = channel_series(dos, spin);
        let color = colors[spin];

        chart
            .draw_series(AreaSeries::new(data.iter().copied(), 0.0, color.mix(0.2)))
            .map_err(plot_error)?;

        let series = chart
            .draw_series(LineSeries::new(data, color.stroke_width(2)))
            .map_err(plot_error)?;
        if dos.is_spin_polarized() {
            series
                .label(labels[spin])
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
    }

    // 费米能级
    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(0.0, bottom), (0.0, top)],
            BLACK.mix(0.6).stroke_width(1),
        )))
        .map_err(plot_error)?;

    if dos.is_spin_polarized() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(plot_error)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spin_down_negated() {
        let dos = DensityOfStates {
            name: "Fe".to_string(),
            fermi: 0.0,
            energies: vec![-1.0, 1.0],
            dos: vec![vec![0.5, 1.0], vec![0.25, 0.75]],
            integrated: vec![vec![0.0; 2], vec![0.0; 2]],
        };
        assert_eq!(channel_series(&dos, 0), vec![(-1.0, 0.5), (1.0, 1.0)]);
        assert_eq!(channel_series(&dos, 1), vec![(-1.0, -0.25), (1.0, -0.75)]);
    }

    #[test]
    fn test_empty_window_rejected() {
        let dos = DensityOfStates {
            name: "empty".to_string(),
            fermi: 0.0,
            energies: vec![],
            dos: vec![vec![]],
            integrated: vec![vec![]],
        };
        let out = std::env::temp_dir().join("qunfold-empty-dos.png");
        assert!(matches!(
            generate_dos_plot(&dos, &out, "empty", 100, 100, false),
            Err(QunfoldError::PlotError(_))
        ));
    }
}
