//! Quiver plots of field maps, for inspecting a grid by eye.

use crate::error::{FieldMapError, Result};
use crate::magnetic::grid::FieldGrid;
use gnuplot::*;
use std::path::Path;

/// Renders a field grid to an image file.
pub trait Plotter {
    fn plot(&self, grid: &FieldGrid, destination: &Path) -> Result<()>;
}

/// Draws the in-plane field `(field1, field2)` as an arrow at every `(pos1, pos2)`.
pub struct QuiverPlot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub width_px: u32,
    pub height_px: u32,
}

impl Default for QuiverPlot {
    fn default() -> Self {
        QuiverPlot {
            title: "2D Example Data".to_string(),
            x_label: "X (cm)".to_string(),
            y_label: "Z (cm)".to_string(),
            width_px: 1600,
            height_px: 1200,
        }
    }
}

/// Smallest spacing between neighbouring positions, or `None` for a single position.
fn min_spacing(values: &[f64]) -> Option<f64> {
    values
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(None, |min, d| Some(min.map_or(d, |m: f64| m.min(d))))
}

/// Colours from dark to bright along the magma colormap, for arrows of increasing field.
pub const MAGMA: [&str; 6] = [
    "#000004", "#3b0f70", "#8c2981", "#de4968", "#fe9f6d", "#fcfdbf",
];

/// Longest in-plane field over the grid.
fn longest_in_plane(grid: &FieldGrid) -> f64 {
    grid.samples()
        .iter()
        .map(|s| s.field[0].hypot(s.field[1]))
        .fold(0.0, f64::max)
}

/// Picks the [MAGMA] colour for a field of `magnitude` out of a largest field of `longest`.
pub fn magnitude_colour(magnitude: f64, longest: f64) -> &'static str {
    if !(longest > 0.0) {
        return MAGMA[0];
    }
    let last = MAGMA.len() - 1;
    let fraction = (magnitude / longest).max(0.0).min(1.0);
    MAGMA[(fraction * last as f64).round() as usize]
}

/// Factor converting in-plane field to arrow length, so the longest arrow spans 90% of a cell.
///
/// Returns zero when the grid has no in-plane field.
pub fn arrow_scale(grid: &FieldGrid) -> f64 {
    let spacing = match (min_spacing(&grid.axis1()), min_spacing(&grid.axis2())) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => 1.0,
    };
    let longest = longest_in_plane(grid);
    if longest > 0.0 {
        0.9 * spacing / longest
    } else {
        0.0
    }
}

impl Plotter for QuiverPlot {
    fn plot(&self, grid: &FieldGrid, destination: &Path) -> Result<()> {
        let scale = arrow_scale(grid);
        let longest = longest_in_plane(grid);
        let mut fg = Figure::new();
        let axes = fg
            .axes2d()
            .set_title(&self.title, &[])
            .set_x_label(&self.x_label, &[])
            .set_y_label(&self.y_label, &[])
            .set_aspect_ratio(Fix(1.0));
        for sample in grid.samples() {
            let dx = 0.5 * scale * sample.field[0];
            let dy = 0.5 * scale * sample.field[1];
            if dx == 0.0 && dy == 0.0 {
                continue;
            }
            axes.arrow(
                Axis(sample.pos1 - dx),
                Axis(sample.pos2 - dy),
                Axis(sample.pos1 + dx),
                Axis(sample.pos2 + dy),
                &[
                    ArrowType(Filled),
                    ArrowSize(0.02),
                    Color(magnitude_colour(sample.field[0].hypot(sample.field[1]), longest)),
                ],
            );
        }
        // Points keep the axis ranges fixed to the grid even where the field vanishes.
        let (x, y): (Vec<f64>, Vec<f64>) =
            grid.samples().iter().map(|s| (s.pos1, s.pos2)).unzip();
        axes.points(&x, &y, &[PointSymbol('.')]);

        fg.save_to_png(destination, self.width_px, self.height_px)
            .map_err(|e| FieldMapError::Plot(e.to_string()))
    }
}
