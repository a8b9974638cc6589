//! The figure artifact returned by every chart recipe.
//!
//! A [`Figure`] is a complete, backend-independent description of a plot:
//! layout, axes, and the glyphs to draw. It is built fresh for each request
//! and handed to the caller, which decides how to show or store it
//! (see [`Figure::save`] and [`Figure::to_svg`]).

use std::path::Path;

use ndarray::Array2;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::draw;
use crate::error::{Result, VizError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "svg" => Some(ImageFormat::Svg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Figure {
    pub title: String,
    pub size: (u32, u32),
    /// (rows, cols); panels fill it row by row.
    pub grid: (usize, usize),
    pub panels: Vec<Panel>,
}

impl Figure {
    pub const DEFAULT_SIZE: (u32, u32) = (1024, 768);

    pub fn single(title: impl Into<String>, panel: Panel) -> Self {
        Self {
            title: title.into(),
            size: Self::DEFAULT_SIZE,
            grid: (1, 1),
            panels: vec![panel],
        }
    }

    pub fn grid(
        title: impl Into<String>,
        size: (u32, u32),
        grid: (usize, usize),
        panels: Vec<Panel>,
    ) -> Self {
        Self {
            title: title.into(),
            size,
            grid,
            panels,
        }
    }

    /// Writes the figure to `path`, picking PNG or SVG from the extension.
    pub fn save(&self, path: &Path) -> Result<()> {
        let format = ImageFormat::from_path(path).unwrap_or_default();
        self.save_as(path, format)
    }

    pub fn save_as(&self, path: &Path, format: ImageFormat) -> Result<()> {
        match format {
            ImageFormat::Png => {
                let root = BitMapBackend::new(path, self.size).into_drawing_area();
                draw::draw_figure(&root, self).map_err(render_error)?;
            }
            ImageFormat::Svg => {
                let root = SVGBackend::new(path, self.size).into_drawing_area();
                draw::draw_figure(&root, self).map_err(render_error)?;
            }
        }
        info!("Wrote figure: {}", path.display());
        Ok(())
    }

    pub fn to_svg(&self) -> Result<String> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, self.size).into_drawing_area();
            draw::draw_figure(&root, self).map_err(render_error)?;
        }
        Ok(svg)
    }
}

fn render_error(err: Box<dyn std::error::Error>) -> VizError {
    VizError::Render(err.to_string())
}

#[derive(Debug, Clone)]
pub enum Panel {
    Cartesian(CartesianPanel),
    Heatmap(HeatmapPanel),
    Polar(PolarPanel),
    Rings(RingPanel),
    Scatter3d(Scatter3dPanel),
}

#[derive(Debug, Clone)]
pub struct CartesianPanel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    /// Category names drawn at x = 0, 1, 2, ...
    pub x_categories: Option<Vec<String>>,
    pub layers: Vec<Layer>,
}

impl CartesianPanel {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            x_range: (0.0, 1.0),
            y_range: (0.0, 1.0),
            x_categories: None,
            layers: Vec::new(),
        }
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.x_range = (-0.5, categories.len() as f64 - 0.5);
        self.x_categories = Some(categories);
        self
    }

    pub fn has_legend(&self) -> bool {
        self.layers.iter().any(|layer| layer.label().is_some())
    }
}

#[derive(Debug, Clone)]
pub enum Layer {
    Bars {
        bars: Vec<Bar>,
        color: RGBColor,
        label: Option<String>,
    },
    Line {
        points: Vec<(f64, f64)>,
        color: RGBColor,
        width: u32,
        label: Option<String>,
    },
    Points {
        markers: Vec<Marker>,
        color: RGBColor,
        opacity: f64,
        label: Option<String>,
    },
    Boxes(Vec<BoxGlyph>),
    Violins(Vec<ViolinGlyph>),
}

impl Layer {
    pub fn label(&self) -> Option<&str> {
        match self {
            Layer::Bars { label, .. } | Layer::Line { label, .. } | Layer::Points { label, .. } => {
                label.as_deref()
            }
            Layer::Boxes(_) | Layer::Violins(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub left: f64,
    pub right: f64,
    pub height: f64,
    /// Optional (low, high) error interval drawn at the bar center.
    pub error: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub x: f64,
    pub y: f64,
    pub radius: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxGlyph {
    pub center: f64,
    pub width: f64,
    pub color: RGBColor,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolinSide {
    Both,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViolinGlyph {
    pub center: f64,
    pub side: ViolinSide,
    /// (half-width in x units, y) along the density outline.
    pub outline: Vec<(f64, f64)>,
    pub color: RGBColor,
    pub label: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HeatmapPanel {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Array2<f64>,
    /// Cells set to `true` are left blank.
    pub mask: Option<Array2<bool>>,
    pub annotate: bool,
}

#[derive(Debug, Clone)]
pub struct PolarPanel {
    pub title: String,
    pub axes: Vec<String>,
    pub radial_max: f64,
    pub series: Vec<PolarSeries>,
}

/// Angle of spoke `index` out of `count`, starting at twelve o'clock and
/// running clockwise.
pub fn spoke_angle(index: usize, count: usize) -> f64 {
    std::f64::consts::FRAC_PI_2 - std::f64::consts::TAU * index as f64 / count.max(1) as f64
}

/// A closed polyline: the first point is repeated at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarSeries {
    pub label: String,
    pub color: RGBColor,
    /// (angle in radians, radius)
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone)]
pub struct RingPanel {
    pub title: String,
    /// Outermost ring first.
    pub rings: Vec<Ring>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub outer_radius: f64,
    pub inner_radius: f64,
    pub slices: Vec<Slice>,
}

impl Ring {
    pub fn total(&self) -> usize {
        self.slices.iter().map(|s| s.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub count: usize,
    pub color: RGBColor,
}

#[derive(Debug, Clone)]
pub struct Scatter3dPanel {
    pub title: String,
    pub axis_labels: [String; 3],
    pub ranges: [(f64, f64); 3],
    pub groups: Vec<PointGroup3d>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointGroup3d {
    pub label: String,
    pub color: RGBColor,
    pub points: Vec<(f64, f64, f64)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_format_from_path() {
        assert_eq!(ImageFormat::from_path(Path::new("a/b.PNG")), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_path(Path::new("chart.svg")), Some(ImageFormat::Svg));
        assert_eq!(ImageFormat::from_path(Path::new("chart")), None);
    }

    #[test]
    fn test_categories_set_range() {
        let panel = CartesianPanel::new("t", "x", "y")
            .with_categories(vec!["No".to_string(), "Yes".to_string()]);
        assert_eq!(panel.x_range, (-0.5, 1.5));
        assert!(!panel.has_legend());
    }
}
