//! Univariate histograms with a density overlay.

use plotters::style::RGBColor;

use crate::catalog::RenderParams;
use crate::charts::palette;
use crate::dataset::Dataset;
use crate::error::{Result, VizError};
use crate::figure::{Bar, CartesianPanel, Figure, Layer, Panel};
use crate::models::NumericField;
use crate::stats;

const KDE_POINTS: usize = 200;

pub(crate) struct Distribution {
    pub field: NumericField,
    pub bins: usize,
    pub color: RGBColor,
    pub title: &'static str,
    pub x_label: &'static str,
}

pub(crate) const AGE: Distribution = Distribution {
    field: NumericField::Age,
    bins: 20,
    color: palette::TAB10[0],
    title: "Age Distribution",
    x_label: "Age",
};

pub(crate) const BMI: Distribution = Distribution {
    field: NumericField::Bmi,
    bins: 20,
    color: palette::GREEN,
    title: "BMI Distribution",
    x_label: "BMI",
};

pub(crate) const SLEEP: Distribution = Distribution {
    field: NumericField::HoursOfSleep,
    bins: 15,
    color: palette::ORANGE,
    title: "Sleep Hours Distribution",
    x_label: "Hours Slept",
};

pub(crate) const STEPS: Distribution = Distribution {
    field: NumericField::DailySteps,
    bins: 20,
    color: palette::TAB10[4],
    title: "Daily Steps Distribution",
    x_label: "Daily Steps",
};

pub(crate) const HEART_RATE: Distribution = Distribution {
    field: NumericField::HeartRate,
    bins: 15,
    color: palette::CRIMSON,
    title: "Heart Rate Distribution",
    x_label: "Heart Rate (bpm)",
};

/// Histogram bars plus a KDE curve scaled to bar counts.
pub(crate) fn histogram_panel(dataset: &Dataset, chart: &Distribution) -> Result<CartesianPanel> {
    let values: Vec<f64> = dataset
        .numeric(chart.field)?
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    let hist = stats::histogram(&values, chart.bins)
        .ok_or_else(|| VizError::EmptyColumn(chart.field.name().to_string()))?;

    let bars = hist
        .counts
        .iter()
        .zip(hist.edges.windows(2))
        .map(|(&count, edge)| Bar {
            left: edge[0],
            right: edge[1],
            height: count as f64,
            error: None,
        })
        .collect();

    let mut panel = CartesianPanel::new(chart.title, chart.x_label, "Count");
    let mut y_max = hist.counts.iter().copied().max().unwrap_or(0) as f64;
    panel.layers.push(Layer::Bars {
        bars,
        color: chart.color,
        label: None,
    });

    if let Some(curve) = stats::gaussian_kde(&values, KDE_POINTS, 0.0) {
        let scale = values.len() as f64 * hist.bin_width();
        let points: Vec<(f64, f64)> = curve.into_iter().map(|(x, d)| (x, d * scale)).collect();
        y_max = points.iter().map(|p| p.1).fold(y_max, f64::max);
        panel.layers.push(Layer::Line {
            points,
            color: chart.color,
            width: 2,
            label: None,
        });
    }

    panel.x_range = (hist.edges[0], hist.edges[chart.bins]);
    panel.y_range = (0.0, (y_max * 1.1).max(1.0));
    Ok(panel)
}

fn distribution_figure(dataset: &Dataset, chart: &Distribution) -> Result<Figure> {
    let panel = histogram_panel(dataset, chart)?;
    Ok(Figure::single(chart.title, Panel::Cartesian(panel)))
}

pub fn age_distribution(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    distribution_figure(dataset, &AGE)
}

pub fn bmi_distribution(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    distribution_figure(dataset, &BMI)
}

pub fn sleep_distribution(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    distribution_figure(dataset, &SLEEP)
}

pub fn steps_distribution(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    distribution_figure(dataset, &STEPS)
}

pub fn heart_rate_distribution(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    distribution_figure(dataset, &HEART_RATE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_dataset;

    fn bars_of(panel: &CartesianPanel) -> &[Bar] {
        match &panel.layers[0] {
            Layer::Bars { bars, .. } => bars,
            other => panic!("expected bars, got {:?}", other),
        }
    }

    #[test]
    fn test_bin_counts_follow_field() {
        let dataset = sample_dataset(30);
        for (chart, bins) in [(&AGE, 20), (&BMI, 20), (&STEPS, 20), (&SLEEP, 15), (&HEART_RATE, 15)] {
            let panel = histogram_panel(&dataset, chart).unwrap();
            let bars = bars_of(&panel);
            assert_eq!(bars.len(), bins, "{}", chart.title);
            let total: f64 = bars.iter().map(|b| b.height).sum();
            assert_eq!(total, 30.0);
        }
    }

    #[test]
    fn test_density_overlay_uses_field_color() {
        let dataset = sample_dataset(30);
        let panel = histogram_panel(&dataset, &BMI).unwrap();
        assert_eq!(panel.layers.len(), 2);
        match &panel.layers[1] {
            Layer::Line { color, points, .. } => {
                assert_eq!(*color, palette::GREEN);
                assert!(points.iter().all(|p| p.1 >= 0.0 && p.1 <= panel.y_range.1));
            }
            other => panic!("expected density line, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_dataset_fails() {
        let dataset = Dataset::from_records(Vec::new());
        assert!(matches!(
            age_distribution(&dataset, &RenderParams::default()),
            Err(VizError::EmptyColumn(_))
        ));
    }
}
