//! Per-group comparisons: box plots, split violins with a swarm, grouped KDEs.

use std::collections::HashMap;

use itertools::Itertools;
use plotters::style::RGBColor;

use crate::catalog::RenderParams;
use crate::charts::palette;
use crate::dataset::Dataset;
use crate::error::{Result, VizError};
use crate::figure::{
    BoxGlyph, CartesianPanel, Figure, Layer, Marker, Panel, ViolinGlyph, ViolinSide,
};
use crate::models::{CategoricalField, NumericField};
use crate::stats;

const VIOLIN_POINTS: usize = 100;
const VIOLIN_HALF_WIDTH: f64 = 0.4;
const SWARM_STEP: f64 = 0.035;

/// Values of `value` grouped by the levels of `by`, in level order.
pub(crate) fn grouped_values(
    dataset: &Dataset,
    by: CategoricalField,
    value: NumericField,
) -> Result<Vec<(String, Vec<f64>)>> {
    let levels = dataset.levels(by)?;
    let mut groups: HashMap<String, Vec<f64>> = dataset
        .categorical(by)?
        .into_iter()
        .zip(dataset.numeric(value)?)
        .into_group_map();
    Ok(levels
        .into_iter()
        .map(|level| {
            let values = groups.remove(&level).unwrap_or_default();
            (level, values)
        })
        .collect())
}

pub(crate) fn box_panel(
    dataset: &Dataset,
    by: CategoricalField,
    value: NumericField,
    colors: &[RGBColor],
    title: &str,
) -> Result<CartesianPanel> {
    let groups = grouped_values(dataset, by, value)?;
    let empty = || VizError::EmptyColumn(value.name().to_string());

    let mut boxes = Vec::with_capacity(groups.len());
    for (i, (_, values)) in groups.iter().enumerate() {
        let summary = stats::box_summary(values).ok_or_else(empty)?;
        boxes.push(BoxGlyph {
            center: i as f64,
            width: 0.6,
            color: palette::pick(colors, i),
            q1: summary.q1,
            median: summary.median,
            q3: summary.q3,
            lower_whisker: summary.lower_whisker,
            upper_whisker: summary.upper_whisker,
            outliers: summary.outliers,
        });
    }

    let all: Vec<f64> = groups.iter().flat_map(|(_, v)| v.iter().copied()).collect();
    let (lo, hi) = stats::bounds(&all).ok_or_else(empty)?;

    let labels = groups.into_iter().map(|(label, _)| label).collect();
    let mut panel = CartesianPanel::new(title, by.name(), value.name()).with_categories(labels);
    panel.y_range = stats::padded_range(lo, hi, 0.08);
    panel.layers.push(Layer::Boxes(boxes));
    Ok(panel)
}

pub fn bmi_by_gender(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    let panel = box_panel(
        dataset,
        CategoricalField::Gender,
        NumericField::Bmi,
        &palette::SET2,
        "BMI by Gender",
    )?;
    Ok(Figure::single("BMI by Gender", Panel::Cartesian(panel)))
}

pub fn exercise_by_smoker(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    let title = "Exercise Hours per Week by Smoker Status";
    let panel = box_panel(
        dataset,
        CategoricalField::Smoker,
        NumericField::ExerciseHoursPerWeek,
        &palette::SET3,
        title,
    )?;
    Ok(Figure::single(title, Panel::Cartesian(panel)))
}

pub fn heart_rate_by_age_group(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    let title = "Heart Rate by Age Group";
    let panel = box_panel(
        dataset,
        CategoricalField::AgeGroup,
        NumericField::HeartRate,
        &palette::SET2,
        title,
    )?;
    Ok(Figure::single(title, Panel::Cartesian(panel)))
}

/// Horizontal offsets that fan out points sharing a y band: 0, +s, -s, +2s, ...
pub(crate) fn swarm_offsets(values: &[f64], band: f64, step: f64, max_offset: f64) -> Vec<f64> {
    let band = if band > 0.0 { band } else { 1.0 };
    let mut occupancy: HashMap<i64, usize> = HashMap::new();
    values
        .iter()
        .map(|&v| {
            let slot = occupancy.entry((v / band).floor() as i64).or_insert(0);
            let k = *slot;
            *slot += 1;
            let magnitude = ((k + 1) / 2) as f64 * step;
            let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
            (magnitude * sign).clamp(-max_offset, max_offset)
        })
        .collect()
}

/// Violins of BMI per smoker level, split by gender, with every subject
/// drawn as a swarm on the same axes.
pub fn bmi_vs_smoker_by_gender(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    let smoker_levels = dataset.levels(CategoricalField::Smoker)?;
    let gender_levels = dataset.levels(CategoricalField::Gender)?;
    let smokers = dataset.categorical(CategoricalField::Smoker)?;
    let genders = dataset.categorical(CategoricalField::Gender)?;
    let bmi = dataset.numeric(NumericField::Bmi)?.to_vec();
    let (lo, hi) = stats::bounds(&bmi)
        .ok_or_else(|| VizError::EmptyColumn(NumericField::Bmi.name().to_string()))?;

    // two genders share one violin, one per side; otherwise dodge
    let split = gender_levels.len() == 2;
    let dodge_width = 2.0 * VIOLIN_HALF_WIDTH / gender_levels.len().max(1) as f64;
    let mut labelled = vec![false; gender_levels.len()];
    let mut violins = Vec::new();

    for (i, smoker) in smoker_levels.iter().enumerate() {
        for (g, gender) in gender_levels.iter().enumerate() {
            let values: Vec<f64> = (0..bmi.len())
                .filter(|&row| &smokers[row] == smoker && &genders[row] == gender)
                .map(|row| bmi[row])
                .collect();
            let Some(curve) = stats::gaussian_kde(&values, VIOLIN_POINTS, 2.0) else {
                continue;
            };
            let (center, side, half_width) = if split {
                let side = if g == 0 { ViolinSide::Left } else { ViolinSide::Right };
                (i as f64, side, VIOLIN_HALF_WIDTH)
            } else {
                let center = i as f64 - VIOLIN_HALF_WIDTH + dodge_width * (g as f64 + 0.5);
                (center, ViolinSide::Both, dodge_width / 2.0)
            };
            let peak = curve.iter().map(|p| p.1).fold(0.0, f64::max);
            let outline = curve
                .into_iter()
                .map(|(y, density)| {
                    let width = if peak > 0.0 { density / peak * half_width } else { 0.0 };
                    (width, y)
                })
                .collect();
            let label = if labelled[g] {
                None
            } else {
                labelled[g] = true;
                Some(gender.clone())
            };
            violins.push(ViolinGlyph {
                center,
                side,
                outline,
                color: palette::pick(&palette::TAB10, g),
                label,
            });
        }
    }

    let mut markers = Vec::with_capacity(bmi.len());
    for (i, smoker) in smoker_levels.iter().enumerate() {
        let values: Vec<f64> = (0..bmi.len())
            .filter(|&row| &smokers[row] == smoker)
            .map(|row| bmi[row])
            .collect();
        let offsets = swarm_offsets(&values, (hi - lo) / 40.0, SWARM_STEP, VIOLIN_HALF_WIDTH);
        markers.extend(values.iter().zip(offsets).map(|(&y, dx)| Marker {
            x: i as f64 + dx,
            y,
            radius: 2,
        }));
    }

    let title = "BMI vs Smoker Status by Gender";
    let mut panel = CartesianPanel::new(title, "Smoker", "BMI").with_categories(smoker_levels);
    panel.y_range = stats::padded_range(lo, hi, 0.25);
    panel.layers.push(Layer::Violins(violins));
    panel.layers.push(Layer::Points {
        markers,
        color: palette::SWARM_INK,
        opacity: 0.6,
        label: None,
    });
    Ok(Figure::single(title, Panel::Cartesian(panel)))
}

pub fn alcohol_by_gender(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    let field = NumericField::AlcoholConsumptionPerWeek;
    let groups = grouped_values(dataset, CategoricalField::Gender, field)?;

    let title = "Alcohol Consumption by Gender";
    let mut panel = CartesianPanel::new(title, field.label(), "Density");
    let mut x_bounds: Option<(f64, f64)> = None;
    let mut y_max: f64 = 0.0;
    for (i, (gender, values)) in groups.into_iter().enumerate() {
        let Some(points) = stats::gaussian_kde(&values, 200, 3.0) else {
            continue;
        };
        for &(x, y) in &points {
            x_bounds = Some(match x_bounds {
                Some((lo, hi)) => (lo.min(x), hi.max(x)),
                None => (x, x),
            });
            y_max = y_max.max(y);
        }
        panel.layers.push(Layer::Line {
            points,
            color: palette::pick(&palette::TAB10, i),
            width: 2,
            label: Some(gender),
        });
    }

    let (lo, hi) = x_bounds.ok_or_else(|| VizError::EmptyColumn(field.name().to_string()))?;
    panel.x_range = (lo, hi);
    panel.y_range = (0.0, y_max * 1.1);
    Ok(Figure::single(title, Panel::Cartesian(panel)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_dataset;

    fn only_cartesian(figure: &Figure) -> &CartesianPanel {
        match &figure.panels[..] {
            [Panel::Cartesian(panel)] => panel,
            other => panic!("expected one cartesian panel, got {:?}", other),
        }
    }

    #[test]
    fn test_grouped_values_follow_level_order() {
        let dataset = sample_dataset(12);
        let groups = grouped_values(&dataset, CategoricalField::Gender, NumericField::Age).unwrap();
        let labels: Vec<&str> = groups.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["Female", "Male"]);
        assert_eq!(groups.iter().map(|(_, v)| v.len()).sum::<usize>(), 12);
    }

    #[test]
    fn test_box_panel_one_box_per_level() {
        let dataset = sample_dataset(20);
        let figure = heart_rate_by_age_group(&dataset, &RenderParams::default()).unwrap();
        let panel = only_cartesian(&figure);
        let levels = dataset.levels(CategoricalField::AgeGroup).unwrap();
        assert_eq!(panel.x_categories.as_ref(), Some(&levels));
        match &panel.layers[0] {
            Layer::Boxes(boxes) => {
                assert_eq!(boxes.len(), levels.len());
                for glyph in boxes {
                    assert!(glyph.lower_whisker <= glyph.q1);
                    assert!(glyph.q1 <= glyph.median && glyph.median <= glyph.q3);
                }
            }
            other => panic!("expected boxes, got {:?}", other),
        }
    }

    #[test]
    fn test_swarm_offsets_fan_out() {
        let offsets = swarm_offsets(&[5.0, 5.0, 5.0, 9.0], 1.0, 0.1, 1.0);
        assert_eq!(offsets[0], 0.0);
        assert!((offsets[1] - 0.1).abs() < 1e-12);
        assert!((offsets[2] + 0.1).abs() < 1e-12);
        assert_eq!(offsets[3], 0.0);
    }

    #[test]
    fn test_split_violins_and_swarm() {
        let dataset = sample_dataset(40);
        let figure = bmi_vs_smoker_by_gender(&dataset, &RenderParams::default()).unwrap();
        let panel = only_cartesian(&figure);
        match &panel.layers[0] {
            Layer::Violins(violins) => {
                assert_eq!(violins.len(), 4);
                assert!(violins.iter().all(|v| v.side != ViolinSide::Both));
                assert_eq!(violins.iter().filter(|v| v.label.is_some()).count(), 2);
            }
            other => panic!("expected violins, got {:?}", other),
        }
        match &panel.layers[1] {
            Layer::Points { markers, .. } => assert_eq!(markers.len(), 40),
            other => panic!("expected swarm, got {:?}", other),
        }
    }

    #[test]
    fn test_alcohol_by_gender_one_curve_per_gender() {
        let dataset = sample_dataset(24);
        let figure = alcohol_by_gender(&dataset, &RenderParams::default()).unwrap();
        let panel = only_cartesian(&figure);
        assert_eq!(panel.layers.len(), 2);
        assert!(panel.has_legend());
    }
}
