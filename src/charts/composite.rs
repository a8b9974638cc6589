//! Multi-panel dashboards, ring charts and the 3D scatter.

use itertools::Itertools;
use plotters::style::RGBColor;

use crate::catalog::RenderParams;
use crate::charts::comparison::box_panel;
use crate::charts::correlation::{correlation_panel, CURATED};
use crate::charts::distribution::{histogram_panel, AGE, SLEEP};
use crate::charts::palette;
use crate::charts::relationship::{alcohol_heart_rate_panel, scatter_panel};
use crate::dataset::Dataset;
use crate::error::{Result, VizError};
use crate::figure::{
    Bar, CartesianPanel, Figure, Layer, Panel, PointGroup3d, Ring, RingPanel, Scatter3dPanel,
    Slice,
};
use crate::models::{CategoricalField, NumericField};
use crate::stats;

const RING_WIDTH: f64 = 0.3;

pub fn health_dashboard(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    let panels = vec![
        Panel::Cartesian(histogram_panel(dataset, &AGE)?),
        Panel::Cartesian(box_panel(
            dataset,
            CategoricalField::Gender,
            NumericField::Bmi,
            &palette::SET2,
            "BMI by Gender",
        )?),
        Panel::Cartesian(scatter_panel(
            dataset,
            NumericField::DailySteps,
            NumericField::Bmi,
            Some(CategoricalField::Gender),
            "Daily Steps vs BMI",
        )?),
        Panel::Heatmap(correlation_panel(dataset, &CURATED, "Correlations", false)?),
    ];
    Ok(Figure::grid("Health Dashboard", (1400, 1000), (2, 2), panels))
}

fn bmi_category_counts(dataset: &Dataset) -> Result<CartesianPanel> {
    let field = CategoricalField::BmiCategory;
    let categories = dataset.categorical(field)?;
    let levels = dataset.levels(field)?;
    if levels.is_empty() {
        return Err(VizError::EmptyColumn(NumericField::Bmi.name().to_string()));
    }

    let mut panel = CartesianPanel::new("BMI Categories", "BMI Category", "Count");
    let mut peak = 0;
    for (i, level) in levels.iter().enumerate() {
        let count = categories.iter().filter(|c| *c == level).count();
        peak = peak.max(count);
        panel.layers.push(Layer::Bars {
            bars: vec![Bar {
                left: i as f64 - 0.4,
                right: i as f64 + 0.4,
                height: count as f64,
                error: None,
            }],
            color: palette::pick(&palette::SET3, i),
            label: None,
        });
    }
    let mut panel = panel.with_categories(levels);
    panel.y_range = (0.0, peak as f64 * 1.1);
    Ok(panel)
}

/// Second dashboard revision: derived buckets and blood pressure on a 2x3 grid.
pub fn health_dashboard_extended(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    let panels = vec![
        Panel::Cartesian(bmi_category_counts(dataset)?),
        Panel::Cartesian(box_panel(
            dataset,
            CategoricalField::AgeGroup,
            NumericField::HeartRate,
            &palette::SET2,
            "Heart Rate by Age Group",
        )?),
        Panel::Cartesian(scatter_panel(
            dataset,
            NumericField::Systolic,
            NumericField::Diastolic,
            Some(CategoricalField::Smoker),
            "Systolic vs Diastolic",
        )?),
        Panel::Cartesian(histogram_panel(dataset, &SLEEP)?),
        Panel::Cartesian(box_panel(
            dataset,
            CategoricalField::Smoker,
            NumericField::ExerciseHoursPerWeek,
            &palette::SET3,
            "Exercise by Smoker Status",
        )?),
        Panel::Cartesian(alcohol_heart_rate_panel(dataset)?),
    ];
    Ok(Figure::grid(
        "Extended Health Dashboard",
        (1800, 1000),
        (2, 3),
        panels,
    ))
}

/// Concentric rings, outermost first. Ring `d` has one slice per combination
/// of the first `d + 1` fields present in the data. Slices are ordered by level
/// path, so each slice's children sit inside its angle.
fn ring_panel(dataset: &Dataset, fields: &[CategoricalField], title: &str) -> Result<RingPanel> {
    let mut levels = Vec::with_capacity(fields.len());
    let mut columns = Vec::with_capacity(fields.len());
    for &field in fields {
        levels.push(dataset.levels(field)?);
        columns.push(dataset.categorical(field)?);
    }
    let rows = columns.first().map_or(0, |column| column.len());
    if rows == 0 {
        return Err(VizError::EmptyColumn(
            fields.first().map_or("", |f| f.name()).to_string(),
        ));
    }

    // Level index of every row at every depth.
    let paths: Vec<Vec<usize>> = (0..rows)
        .map(|row| {
            columns
                .iter()
                .zip(&levels)
                .map(|(column, ordered)| {
                    ordered.iter().position(|l| *l == column[row]).unwrap_or(0)
                })
                .collect()
        })
        .collect();

    let rings = (0..fields.len())
        .map(|depth| {
            let slices = paths
                .iter()
                .map(|path| path[..=depth].to_vec())
                .counts()
                .into_iter()
                .sorted()
                .map(|(key, count)| Slice {
                    label: levels[depth][key[depth]].clone(),
                    count,
                    color: combination_color(&key, &levels),
                })
                .collect();
            let outer_radius = 1.0 - depth as f64 * RING_WIDTH;
            Ring {
                outer_radius,
                inner_radius: (outer_radius - RING_WIDTH).max(0.0),
                slices,
            }
        })
        .collect();
    Ok(RingPanel {
        title: title.to_string(),
        rings,
    })
}

/// Top-level slices take a tab10 hue. Each deeper level lightens its parent's
/// color by how far along its own levels it sits.
fn combination_color(key: &[usize], levels: &[Vec<String>]) -> RGBColor {
    let base = palette::pick(&palette::TAB10, key[0]);
    key.iter()
        .enumerate()
        .skip(1)
        .fold(base, |color, (depth, &level)| {
            let span = levels[depth].len().max(1) as f64;
            palette::lighten(color, 0.15 + 0.4 * level as f64 / span)
        })
}

pub fn sunburst(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    let title = "Gender, Smoking and BMI Category";
    let panel = ring_panel(
        dataset,
        &[
            CategoricalField::Gender,
            CategoricalField::Smoker,
            CategoricalField::BmiCategory,
        ],
        title,
    )?;
    Ok(Figure::single(title, Panel::Rings(panel)))
}

pub fn risk_factors_sunburst(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    let title = "Risk Factors by Gender and Age Group";
    let panel = ring_panel(
        dataset,
        &[
            CategoricalField::Gender,
            CategoricalField::AgeGroup,
            CategoricalField::RiskLevel,
        ],
        title,
    )?;
    Ok(Figure::single(title, Panel::Rings(panel)))
}

pub fn scatter_3d(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    let fields = [NumericField::Age, NumericField::Bmi, NumericField::HeartRate];
    let columns = fields
        .iter()
        .map(|&f| dataset.numeric(f).map(|c| c.to_vec()))
        .collect::<Result<Vec<_>>>()?;
    let mut ranges = [(0.0, 1.0); 3];
    for (k, column) in columns.iter().enumerate() {
        let (lo, hi) = stats::bounds(column)
            .ok_or_else(|| VizError::EmptyColumn(fields[k].name().to_string()))?;
        ranges[k] = stats::padded_range(lo, hi, 0.05);
    }

    let smoker = dataset.categorical(CategoricalField::Smoker)?;
    let groups = dataset
        .levels(CategoricalField::Smoker)?
        .into_iter()
        .enumerate()
        .map(|(i, level)| PointGroup3d {
            points: (0..smoker.len())
                .filter(|&row| smoker[row] == level)
                .map(|row| (columns[0][row], columns[1][row], columns[2][row]))
                .collect(),
            color: palette::pick(&palette::TAB10, i),
            label: format!("Smoker: {}", level),
        })
        .collect();

    let title = "Age, BMI and Heart Rate by Smoker Status";
    let panel = Scatter3dPanel {
        title: title.to_string(),
        axis_labels: fields.map(|f| f.label().to_string()),
        ranges,
        groups,
    };
    Ok(Figure::single(title, Panel::Scatter3d(panel)))
}
