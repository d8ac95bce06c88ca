//! Backend selection for figures written to disk.
//!
//! Figures are described by a [`Figure`] implementation that draws onto any
//! Plotters backend. [`save_figure`] picks the backend from the file extension:
//! `.svg` uses the SVG backend, anything else is rendered as a bitmap (PNG).
//!
//! Plotters is built without a font backend and cannot rasterise text, so
//! figures skip every caption, label and legend when drawing a bitmap
//! ([`FigureFormat::draws_text`]). SVG output keeps them as `<text>` elements.

use std::error::Error;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::AppError;
use crate::io::ensure_parent_dir;

pub type DrawResult = Result<(), Box<dyn Error>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FigureFormat {
    Png,
    Svg,
}

impl FigureFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => FigureFormat::Svg,
            _ => FigureFormat::Png,
        }
    }

    /// Whether text elements can be drawn on this backend.
    pub fn draws_text(self) -> bool {
        matches!(self, FigureFormat::Svg)
    }
}

/// Something that can be drawn onto a Plotters drawing area.
pub trait Figure {
    /// Pixel size of the figure.
    fn size(&self) -> (u32, u32);

    /// Draw onto `root`. Text is only drawn when `format.draws_text()`.
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, format: FigureFormat) -> DrawResult
    where
        DB::ErrorType: 'static;
}

/// Render `figure` to `path`.
pub fn save_figure<F: Figure>(path: &Path, figure: &F) -> Result<(), AppError> {
    ensure_parent_dir(path)?;

    let format = FigureFormat::from_path(path);
    let result: DrawResult = match format {
        FigureFormat::Png => {
            let root = BitMapBackend::new(path, figure.size()).into_drawing_area();
            figure.draw(&root, format).and_then(|()| Ok(root.present()?))
        }
        FigureFormat::Svg => {
            let root = SVGBackend::new(path, figure.size()).into_drawing_area();
            figure.draw(&root, format).and_then(|()| Ok(root.present()?))
        }
    };

    result.map_err(|e| AppError::io(format!("Failed to render figure '{}': {e}", path.display())))
}

/// Map a probability in `[0, 1]` onto a dark-blue -> teal -> yellow ramp.
pub fn probability_color(p: f64) -> RGBColor {
    const STOPS: [(f64, (u8, u8, u8)); 5] = [
        (0.00, (68, 1, 84)),
        (0.25, (59, 82, 139)),
        (0.50, (33, 145, 140)),
        (0.75, (94, 201, 98)),
        (1.00, (253, 231, 37)),
    ];

    let p = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
    for w in STOPS.windows(2) {
        let (p0, c0) = w[0];
        let (p1, c1) = w[1];
        if p <= p1 {
            let u = (p - p0) / (p1 - p0);
            let lerp = |a: u8, b: u8| (a as f64 + u * (b as f64 - a as f64)).round() as u8;
            return RGBColor(lerp(c0.0, c1.0), lerp(c0.1, c1.1), lerp(c0.2, c1.2));
        }
    }
    let (r, g, b) = STOPS[STOPS.len() - 1].1;
    RGBColor(r, g, b)
}

/// Colour for mesh cells with no scan row.
pub const MISSING_COLOR: RGBColor = RGBColor(200, 200, 200);
