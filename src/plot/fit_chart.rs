//! Critical-mass fit figure.
//!
//! Raw `(k_rot, m_phi_crit)` points, the fitted parabola sampled at
//! [`CURVE_SAMPLES`] couplings across the observed range, a dashed vertical
//! line at `k_peak` and a dotted horizontal line at `m_peak`.

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::fit::FitOutput;
use crate::plot::{DrawResult, Figure, FigureFormat};

pub const CURVE_SAMPLES: usize = 400;

const POINT_COLOR: RGBColor = RGBColor(31, 119, 180);
const CURVE_COLOR: RGBColor = RGBColor(255, 127, 14);
const PEAK_K_COLOR: RGBColor = RGBColor(44, 160, 44);
const PEAK_M_COLOR: RGBColor = RGBColor(214, 39, 40);

pub struct FitFigure<'a> {
    pub output: &'a FitOutput,
}

impl Figure for FitFigure<'_> {
    fn size(&self) -> (u32, u32) {
        (900, 675)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, format: FigureFormat) -> DrawResult
    where
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;

        let out = self.output;
        let fit = &out.fit;
        let (k_min, k_max) = bounds(out.k_rot.iter().copied()).ok_or("no points to plot")?;
        let curve = fit.sample_curve(k_min, k_max, CURVE_SAMPLES);

        let (x0, x1) = padded(k_min.min(fit.k_peak), k_max.max(fit.k_peak));
        let (y_lo, y_hi) = bounds(
            out.m_phi_crit
                .iter()
                .copied()
                .chain(curve.iter().map(|&(_, m)| m))
                .chain(std::iter::once(fit.m_peak)),
        )
        .ok_or("no finite values to plot")?;
        let (y0, y1) = padded(y_lo, y_hi);

        let text = format.draws_text();
        let mut builder = ChartBuilder::on(root);
        builder.margin(10).x_label_area_size(40).y_label_area_size(60);
        if text {
            builder.caption("Fit of m_phi,crit(k_rot)", ("sans-serif", 20));
        }
        let mut chart = builder.build_cartesian_2d(x0..x1, y0..y1)?;

        if text {
            chart
                .configure_mesh()
                .light_line_style(BLACK.mix(0.05))
                .x_desc("k_rot")
                .y_desc("m_phi,crit")
                .draw()?;
        }

        let points = chart.draw_series(
            out.k_rot
                .iter()
                .zip(&out.m_phi_crit)
                .map(|(&k, &m)| Circle::new((k, m), 4, POINT_COLOR.filled())),
        )?;
        if text {
            points
                .label("Data (m_phi,crit)")
                .legend(|(x, y)| Circle::new((x + 10, y), 4, POINT_COLOR.filled()));
        }

        let parabola = chart.draw_series(LineSeries::new(curve, CURVE_COLOR.stroke_width(2)))?;
        if text {
            parabola
                .label("Parabolic fit")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], CURVE_COLOR));
        }

        let k_line = chart.draw_series(
            broken_line((fit.k_peak, y0), (fit.k_peak, y1), 30, 0.6)
                .into_iter()
                .map(|seg| PathElement::new(seg, PEAK_K_COLOR)),
        )?;
        if text {
            k_line
                .label(format!("k_peak ≈ {:.3}", fit.k_peak))
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], PEAK_K_COLOR));
        }

        let m_line = chart.draw_series(
            broken_line((x0, fit.m_peak), (x1, fit.m_peak), 80, 0.3)
                .into_iter()
                .map(|seg| PathElement::new(seg, PEAK_M_COLOR)),
        )?;
        if text {
            m_line
                .label(format!("m_peak ≈ {:.3}", fit.m_peak))
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], PEAK_M_COLOR));

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        Ok(())
    }
}

/// Split the segment `from -> to` into `n` dashes, each covering `duty` of its slot.
fn broken_line(from: (f64, f64), to: (f64, f64), n: usize, duty: f64) -> Vec<Vec<(f64, f64)>> {
    let lerp = |u: f64| (from.0 + u * (to.0 - from.0), from.1 + u * (to.1 - from.1));
    (0..n)
        .map(|i| {
            let u0 = i as f64 / n as f64;
            let u1 = u0 + duty / n as f64;
            vec![lerp(u0), lerp(u1)]
        })
        .collect()
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn padded(lo: f64, hi: f64) -> (f64, f64) {
    let span = hi - lo;
    let pad = if span > 0.0 { 0.05 * span } else { 0.5 };
    (lo - pad, hi + pad)
}
