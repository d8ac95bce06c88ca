//! Dual-panel sector-probability heatmap.
//!
//! Left panel: `P_A` (synchrony). Right panel: `P_C` (escape / oscillatory).
//! Both are drawn over coupling (x) × mass (y), with a colour bar per panel.
//! Cells without a scan row are drawn in a neutral grey. Bitmap output has no
//! captions, axis descriptions or colour-bar ticks.

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::plot::{DrawResult, Figure, FigureFormat, MISSING_COLOR, probability_color};
use crate::scan::ProbabilityMesh;

const BAR_WIDTH: i32 = 80;
const BAR_STEPS: usize = 100;

pub struct HeatmapFigure<'a> {
    pub left: &'a ProbabilityMesh,
    pub right: &'a ProbabilityMesh,
}

impl Figure for HeatmapFigure<'_> {
    fn size(&self) -> (u32, u32) {
        (2400, 1000)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, format: FigureFormat) -> DrawResult
    where
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;
        let panels = root.split_evenly((1, 2));
        for (area, mesh) in panels.iter().zip([self.left, self.right]) {
            draw_panel(area, mesh, format.draws_text())?;
        }
        Ok(())
    }
}

fn draw_panel<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, mesh: &ProbabilityMesh, text: bool) -> DrawResult
where
    DB::ErrorType: 'static,
{
    if mesh.masses.is_empty() || mesh.couplings.is_empty() {
        return Ok(());
    }

    let (width, _) = area.dim_in_pixel();
    let (plot_area, bar_area) = area.split_horizontally(width as i32 - BAR_WIDTH);

    let k_edges = cell_edges(&mesh.couplings);
    let m_edges = cell_edges(&mesh.masses);

    let mut builder = ChartBuilder::on(&plot_area);
    builder.margin(10).x_label_area_size(40).y_label_area_size(60);
    if text {
        builder.caption(
            format!("P_{} ({})", mesh.sector.label(), mesh.sector.display_name()),
            ("sans-serif", 24),
        );
    }
    let mut chart =
        builder.build_cartesian_2d(k_edges[0]..k_edges[k_edges.len() - 1], m_edges[0]..m_edges[m_edges.len() - 1])?;

    if text {
        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc("k_rot")
            .y_desc("m_phi")
            .draw()?;
    }

    let n_k = mesh.couplings.len();
    let cells = (0..mesh.masses.len()).flat_map(|i| (0..n_k).map(move |j| (i, j)));
    chart.draw_series(cells.map(|(i, j)| {
        let color = mesh.get(i, j).value().map_or(MISSING_COLOR, probability_color);
        Rectangle::new(
            [(k_edges[j], m_edges[i]), (k_edges[j + 1], m_edges[i + 1])],
            color.filled(),
        )
    }))?;

    draw_color_bar(&bar_area, text)
}

fn draw_color_bar<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, text: bool) -> DrawResult
where
    DB::ErrorType: 'static,
{
    let mut bar = ChartBuilder::on(area)
        .margin_top(44)
        .margin_bottom(50)
        .margin_right(10)
        .y_label_area_size(40)
        .build_cartesian_2d(0.0..1.0, 0.0..1.0)?;

    if text {
        bar.configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_labels(6)
            .draw()?;
    }

    let step = 1.0 / BAR_STEPS as f64;
    bar.draw_series((0..BAR_STEPS).map(|i| {
        let lo = i as f64 * step;
        Rectangle::new([(0.0, lo), (1.0, lo + step)], probability_color(lo + 0.5 * step).filled())
    }))?;

    Ok(())
}

/// Cell boundaries around sorted centre values.
///
/// Interior edges are midpoints; the outer edges mirror the nearest interior
/// half-width. A single value gets a unit-wide cell.
pub fn cell_edges(centers: &[f64]) -> Vec<f64> {
    match centers.len() {
        0 => Vec::new(),
        1 => vec![centers[0] - 0.5, centers[0] + 0.5],
        n => {
            let mut edges = Vec::with_capacity(n + 1);
            edges.push(centers[0] - 0.5 * (centers[1] - centers[0]));
            for w in centers.windows(2) {
                edges.push(0.5 * (w[0] + w[1]));
            }
            edges.push(centers[n - 1] + 0.5 * (centers[n - 1] - centers[n - 2]));
            edges
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ScanRow, Sector, SectorCounts};
    use crate::plot::save_figure;

    #[test]
    fn edges_bracket_centres() {
        assert_eq!(cell_edges(&[0.0, 1.0, 3.0]), vec![-0.5, 0.5, 2.0, 4.0]);
        assert_eq!(cell_edges(&[2.0]), vec![1.5, 2.5]);
        assert!(cell_edges(&[]).is_empty());
    }

    fn sample_meshes() -> (ProbabilityMesh, ProbabilityMesh) {
        let rows = vec![
            ScanRow::from_counts(0.3, 0.0, SectorCounts { a: 3, b: 1, c: 0 }),
            ScanRow::from_counts(0.3, 0.5, SectorCounts { a: 1, b: 1, c: 2 }),
            ScanRow::from_counts(3.0, 0.0, SectorCounts { a: 0, b: 0, c: 4 }),
        ];
        (
            ProbabilityMesh::from_rows(&rows, Sector::A).unwrap(),
            ProbabilityMesh::from_rows(&rows, Sector::C).unwrap(),
        )
    }

    #[test]
    fn writes_svg_heatmap() {
        let (left, right) = sample_meshes();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heatmap.svg");
        save_figure(&path, &HeatmapFigure { left: &left, right: &right }).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Synchrony"));
    }

    #[test]
    fn writes_png_heatmap() {
        let (left, right) = sample_meshes();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phase_sector_probabilities.png");
        save_figure(&path, &HeatmapFigure { left: &left, right: &right }).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }
}
