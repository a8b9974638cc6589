//! Two-variable relationships: scatters, regression, grouped means, grids.

use itertools::Itertools;
use ordered_float::OrderedFloat;
use plotters::style::RGBColor;

use crate::catalog::RenderParams;
use crate::charts::palette;
use crate::dataset::Dataset;
use crate::error::{Result, VizError};
use crate::figure::{Bar, CartesianPanel, Figure, Layer, Marker, Panel};
use crate::models::{CategoricalField, NumericField};
use crate::stats;

const PAIRPLOT_FIELDS: [NumericField; 4] = [
    NumericField::Age,
    NumericField::Bmi,
    NumericField::DailySteps,
    NumericField::HeartRate,
];

fn empty(field: NumericField) -> VizError {
    VizError::EmptyColumn(field.name().to_string())
}

fn padded_bounds(values: &[f64], field: NumericField) -> Result<(f64, f64)> {
    let (lo, hi) = stats::bounds(values).ok_or_else(|| empty(field))?;
    Ok(stats::padded_range(lo, hi, 0.05))
}

/// Scatter of `y` against `x`, one layer per level of `hue` when given.
pub(crate) fn scatter_panel(
    dataset: &Dataset,
    x: NumericField,
    y: NumericField,
    hue: Option<CategoricalField>,
    title: &str,
) -> Result<CartesianPanel> {
    let xs = dataset.numeric(x)?.to_vec();
    let ys = dataset.numeric(y)?.to_vec();

    let mut panel = CartesianPanel::new(title, x.label(), y.label());
    panel.x_range = padded_bounds(&xs, x)?;
    panel.y_range = padded_bounds(&ys, y)?;

    let marker = |row: usize| Marker {
        x: xs[row],
        y: ys[row],
        radius: 4,
    };
    match hue {
        Some(hue) => {
            let keys = dataset.categorical(hue)?;
            for (i, level) in dataset.levels(hue)?.into_iter().enumerate() {
                let markers = (0..xs.len()).filter(|&row| keys[row] == level).map(marker).collect();
                panel.layers.push(Layer::Points {
                    markers,
                    color: palette::pick(&palette::TAB10, i),
                    opacity: 0.8,
                    label: Some(level),
                });
            }
        }
        None => panel.layers.push(Layer::Points {
            markers: (0..xs.len()).map(marker).collect(),
            color: palette::TAB10[0],
            opacity: 0.8,
            label: None,
        }),
    }
    Ok(panel)
}

pub fn steps_vs_bmi(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    let title = "Daily Steps vs BMI";
    let panel = scatter_panel(
        dataset,
        NumericField::DailySteps,
        NumericField::Bmi,
        Some(CategoricalField::Gender),
        title,
    )?;
    Ok(Figure::single(title, Panel::Cartesian(panel)))
}

/// Scatter with an ordinary least squares line across the x range.
pub fn bmi_vs_age(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    let (x, y) = (NumericField::Age, NumericField::Bmi);
    let title = "BMI vs Age with Regression Line";
    let mut panel = scatter_panel(dataset, x, y, None, title)?;
    if let Some(Layer::Points { markers, opacity, .. }) = panel.layers.first_mut() {
        markers.iter_mut().for_each(|m| m.radius = 6);
        *opacity = 0.5;
    }

    let xs = dataset.numeric(x)?.to_vec();
    let ys = dataset.numeric(y)?.to_vec();
    let fit = stats::least_squares(&xs, &ys)
        .ok_or_else(|| VizError::DegenerateRange(x.name().to_string()))?;
    let (lo, hi) = panel.x_range;
    panel.layers.push(Layer::Line {
        points: vec![(lo, fit.at(lo)), (hi, fit.at(hi))],
        color: palette::REGRESSION_RED,
        width: 2,
        label: None,
    });
    let (y_lo, y_hi) = panel.y_range;
    panel.y_range = (
        y_lo.min(fit.at(lo)).min(fit.at(hi)),
        y_hi.max(fit.at(lo)).max(fit.at(hi)),
    );
    Ok(Figure::single(title, Panel::Cartesian(panel)))
}

fn level_label(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// Mean heart rate per distinct alcohol level with 95% confidence bars.
pub(crate) fn alcohol_heart_rate_panel(dataset: &Dataset) -> Result<CartesianPanel> {
    let alcohol = NumericField::AlcoholConsumptionPerWeek;
    let heart_rate = NumericField::HeartRate;
    let groups = dataset
        .numeric(alcohol)?
        .into_iter()
        .map(OrderedFloat)
        .zip(dataset.numeric(heart_rate)?)
        .into_group_map();
    if groups.is_empty() {
        return Err(empty(alcohol));
    }

    let title = "Alcohol Consumption vs Heart Rate";
    let mut panel = CartesianPanel::new(title, "Alcohol Consumption (per Week)", "Heart Rate");
    let mut labels = Vec::with_capacity(groups.len());
    let mut y_max: f64 = 0.0;
    for (i, (level, rates)) in groups.into_iter().sorted_by_key(|(k, _)| *k).enumerate() {
        let estimate = stats::mean_with_ci(&rates, 0.95).ok_or_else(|| empty(heart_rate))?;
        y_max = y_max.max(estimate.high).max(estimate.mean);
        labels.push(level_label(level.into_inner()));
        panel.layers.push(Layer::Bars {
            bars: vec![Bar {
                left: i as f64 - 0.4,
                right: i as f64 + 0.4,
                height: estimate.mean,
                error: Some((estimate.low, estimate.high)),
            }],
            color: palette::pick(&palette::BLUES, i),
            label: None,
        });
    }

    let mut panel = panel.with_categories(labels);
    panel.y_range = (0.0, (y_max * 1.1).max(1.0));
    Ok(panel)
}

pub fn alcohol_vs_heart_rate(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    let panel = alcohol_heart_rate_panel(dataset)?;
    Ok(Figure::single(panel.title.clone(), Panel::Cartesian(panel)))
}

/// Systolic pressure against age; color marks smokers, size tracks BMI.
pub fn systolic_vs_age(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    let title = "Systolic Blood Pressure vs Age";
    let mut panel = scatter_panel(
        dataset,
        NumericField::Age,
        NumericField::Systolic,
        Some(CategoricalField::Smoker),
        title,
    )?;

    let bmi_scaled = dataset.ensure_standardized(&[NumericField::Bmi])?;
    let smoker = dataset.categorical(CategoricalField::Smoker)?;
    for layer in &mut panel.layers {
        if let Layer::Points { markers, label: Some(level), opacity, .. } = layer {
            let rows = (0..smoker.len()).filter(|&row| smoker[row] == *level);
            for (marker, row) in markers.iter_mut().zip(rows) {
                marker.radius = 2 + (bmi_scaled[0][row] * 8.0).round() as u32;
            }
            *opacity = 0.6;
        }
    }
    Ok(Figure::single(title, Panel::Cartesian(panel)))
}

/// Grid of pairwise scatters with per-gender densities on the diagonal.
pub fn pairplot(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    let hue = CategoricalField::Gender;
    let levels = dataset.levels(hue)?;
    let keys = dataset.categorical(hue)?;
    let columns: Vec<Vec<f64>> = PAIRPLOT_FIELDS
        .iter()
        .map(|&f| dataset.numeric(f).map(|c| c.to_vec()))
        .collect::<Result<_>>()?;
    let ranges: Vec<(f64, f64)> = PAIRPLOT_FIELDS
        .iter()
        .zip(&columns)
        .map(|(&f, values)| padded_bounds(values, f))
        .collect::<Result<_>>()?;
    let colors: Vec<RGBColor> = (0..levels.len()).map(|i| palette::pick(&palette::SET2, i)).collect();

    let n = PAIRPLOT_FIELDS.len();
    let mut panels = Vec::with_capacity(n * n);
    for (row, &y_field) in PAIRPLOT_FIELDS.iter().enumerate() {
        for (col, &x_field) in PAIRPLOT_FIELDS.iter().enumerate() {
            let show_legend = row == 0 && col == n - 1;
            let mut panel = CartesianPanel::new("", x_field.label(), y_field.label());
            panel.x_range = ranges[col];

            if row == col {
                panel.y_label = "Density".to_string();
                let mut y_max: f64 = 0.0;
                for (i, level) in levels.iter().enumerate() {
                    let values: Vec<f64> = (0..keys.len())
                        .filter(|&r| &keys[r] == level)
                        .map(|r| columns[col][r])
                        .collect();
                    let Some(points) = stats::gaussian_kde(&values, 100, 0.0) else {
                        continue;
                    };
                    y_max = points.iter().map(|p| p.1).fold(y_max, f64::max);
                    panel.layers.push(Layer::Line {
                        points,
                        color: colors[i],
                        width: 2,
                        label: show_legend.then(|| level.clone()),
                    });
                }
                panel.y_range = (0.0, if y_max > 0.0 { y_max * 1.1 } else { 1.0 });
            } else {
                panel.y_range = ranges[row];
                for (i, level) in levels.iter().enumerate() {
                    let markers = (0..keys.len())
                        .filter(|&r| &keys[r] == level)
                        .map(|r| Marker {
                            x: columns[col][r],
                            y: columns[row][r],
                            radius: 2,
                        })
                        .collect();
                    panel.layers.push(Layer::Points {
                        markers,
                        color: colors[i],
                        opacity: 0.7,
                        label: show_legend.then(|| level.clone()),
                    });
                }
            }
            panels.push(Panel::Cartesian(panel));
        }
    }

    Ok(Figure::grid(
        "Pairplot of Numeric Features",
        (1400, 1400),
        (n, n),
        panels,
    ))
}

/// One Daily_Steps vs BMI panel per gender, all on the same scales.
pub fn facetgrid_steps_vs_bmi(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    let (x, y) = (NumericField::DailySteps, NumericField::Bmi);
    let xs = dataset.numeric(x)?.to_vec();
    let ys = dataset.numeric(y)?.to_vec();
    let x_range = padded_bounds(&xs, x)?;
    let y_range = padded_bounds(&ys, y)?;
    let genders = dataset.categorical(CategoricalField::Gender)?;
    let levels = dataset.levels(CategoricalField::Gender)?;

    let panels: Vec<Panel> = levels
        .iter()
        .map(|level| {
            let mut panel = CartesianPanel::new(format!("{} Gender", level), "Daily Steps", "BMI");
            panel.x_range = x_range;
            panel.y_range = y_range;
            panel.layers.push(Layer::Points {
                markers: (0..xs.len())
                    .filter(|&row| &genders[row] == level)
                    .map(|row| Marker {
                        x: xs[row],
                        y: ys[row],
                        radius: 4,
                    })
                    .collect(),
                color: palette::TAB10[0],
                opacity: 0.7,
                label: None,
            });
            Panel::Cartesian(panel)
        })
        .collect();

    let cols = panels.len().max(1);
    Ok(Figure::grid(
        "Daily Steps vs BMI by Gender",
        (600 * cols as u32, 560),
        (1, cols),
        panels,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_dataset;

    fn cartesian(panel: &Panel) -> &CartesianPanel {
        match panel {
            Panel::Cartesian(panel) => panel,
            other => panic!("expected cartesian panel, got {:?}", other),
        }
    }

    #[test]
    fn test_hue_splits_every_row_once() {
        let dataset = sample_dataset(15);
        let panel = scatter_panel(
            &dataset,
            NumericField::DailySteps,
            NumericField::Bmi,
            Some(CategoricalField::Gender),
            "t",
        )
        .unwrap();
        assert_eq!(panel.layers.len(), 2);
        let total: usize = panel
            .layers
            .iter()
            .map(|layer| match layer {
                Layer::Points { markers, .. } => markers.len(),
                _ => 0,
            })
            .sum();
        assert_eq!(total, 15);
        assert!(panel.has_legend());
    }

    #[test]
    fn test_regression_line_is_red_and_spans_axis() {
        let dataset = sample_dataset(20);
        let figure = bmi_vs_age(&dataset, &RenderParams::default()).unwrap();
        let panel = cartesian(&figure.panels[0]);
        match &panel.layers[1] {
            Layer::Line { points, color, .. } => {
                assert_eq!(*color, palette::REGRESSION_RED);
                assert_eq!(points[0].0, panel.x_range.0);
                assert_eq!(points[1].0, panel.x_range.1);
            }
            other => panic!("expected regression line, got {:?}", other),
        }
    }

    #[test]
    fn test_alcohol_levels_sorted_with_intervals() {
        let dataset = sample_dataset(20);
        let panel = alcohol_heart_rate_panel(&dataset).unwrap();
        let labels = panel.x_categories.clone().unwrap();
        assert_eq!(labels, vec!["0", "1", "2", "3"]);
        for layer in &panel.layers {
            match layer {
                Layer::Bars { bars, .. } => {
                    let (low, high) = bars[0].error.unwrap();
                    assert!(low <= bars[0].height && bars[0].height <= high);
                }
                other => panic!("expected bars, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_systolic_marker_size_tracks_bmi() {
        let dataset = sample_dataset(12);
        let figure = systolic_vs_age(&dataset, &RenderParams::default()).unwrap();
        let panel = cartesian(&figure.panels[0]);
        let radii: Vec<u32> = panel
            .layers
            .iter()
            .flat_map(|layer| match layer {
                Layer::Points { markers, .. } => markers.iter().map(|m| m.radius).collect(),
                _ => Vec::new(),
            })
            .collect();
        assert_eq!(radii.len(), 12);
        assert!(radii.contains(&2));
        assert!(radii.contains(&10));
    }

    #[test]
    fn test_pairplot_grid_shape() {
        let dataset = sample_dataset(30);
        let figure = pairplot(&dataset, &RenderParams::default()).unwrap();
        let n = PAIRPLOT_FIELDS.len();
        assert_eq!(figure.grid, (n, n));
        assert_eq!(figure.panels.len(), n * n);
        let diagonal = cartesian(&figure.panels[0]);
        assert!(matches!(diagonal.layers[0], Layer::Line { .. }));
        let off = cartesian(&figure.panels[1]);
        assert!(matches!(off.layers[0], Layer::Points { .. }));
    }

    #[test]
    fn test_facets_share_scales() {
        let dataset = sample_dataset(16);
        let figure = facetgrid_steps_vs_bmi(&dataset, &RenderParams::default()).unwrap();
        assert_eq!(figure.grid, (1, 2));
        let a = cartesian(&figure.panels[0]);
        let b = cartesian(&figure.panels[1]);
        assert_eq!(a.x_range, b.x_range);
        assert_eq!(a.y_range, b.y_range);
        assert_eq!(a.title, "Female Gender");
    }
}
