//! Per-subject radar profiles.

use crate::catalog::RenderParams;
use crate::charts::palette;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::figure::{spoke_angle, Figure, Panel, PolarPanel, PolarSeries};
use crate::models::NumericField;

pub(crate) const RADAR_FIELDS: [NumericField; 6] = [
    NumericField::Age,
    NumericField::Bmi,
    NumericField::HeartRate,
    NumericField::HoursOfSleep,
    NumericField::ExerciseHoursPerWeek,
    NumericField::AlcoholConsumptionPerWeek,
];

const MAX_COMPARED: usize = 3;

// closes the outline by repeating the first spoke
fn closed_outline(values: &[f64]) -> Vec<(f64, f64)> {
    let n = values.len();
    (0..=n)
        .map(|k| (spoke_angle(k % n, n), values[k % n]))
        .collect()
}

fn axes() -> Vec<String> {
    RADAR_FIELDS.iter().map(|f| f.label().to_string()).collect()
}

pub fn radar(dataset: &Dataset, params: &RenderParams) -> Result<Figure> {
    let index = params.index();
    let subject = dataset.row(index)?;
    let columns = RADAR_FIELDS
        .iter()
        .map(|&f| dataset.numeric(f))
        .collect::<Result<Vec<_>>>()?;
    let values: Vec<f64> = columns.iter().map(|c| c[index]).collect();
    let peak = values.iter().copied().fold(0.0, f64::max);

    let title = format!("Health Profile: Individual {}", subject.id);
    let panel = PolarPanel {
        title: title.clone(),
        axes: axes(),
        radial_max: if peak > 0.0 { peak * 1.1 } else { 1.0 },
        series: vec![PolarSeries {
            label: format!("ID {}", subject.id),
            color: palette::TAB10[0],
            points: closed_outline(&values),
        }],
    };
    Ok(Figure::single(title, Panel::Polar(panel)))
}

/// Overlays up to three consecutive subjects starting at the index, each
/// field min-max scaled over the whole table.
pub fn radar_comparison(dataset: &Dataset, params: &RenderParams) -> Result<Figure> {
    let start = params.index();
    dataset.row(start)?;
    let scaled = dataset.ensure_standardized(&RADAR_FIELDS)?;
    let end = (start + MAX_COMPARED).min(dataset.len());

    let series = dataset.records()[start..end]
        .iter()
        .enumerate()
        .map(|(i, subject)| {
            let row = start + i;
            let values: Vec<f64> = scaled.iter().map(|column| column[row]).collect();
            PolarSeries {
                label: format!("ID {}", subject.id),
                color: palette::pick(&palette::TAB10, i),
                points: closed_outline(&values),
            }
        })
        .collect();

    let title = "Health Profile Comparison";
    let panel = PolarPanel {
        title: title.to_string(),
        axes: axes(),
        radial_max: 1.0,
        series,
    };
    Ok(Figure::single(title, Panel::Polar(panel)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VizError;
    use crate::fixtures::sample_dataset;

    fn polar(figure: &Figure) -> &PolarPanel {
        match &figure.panels[..] {
            [Panel::Polar(panel)] => panel,
            other => panic!("expected polar panel, got {:?}", other),
        }
    }

    #[test]
    fn test_radar_single_row_closes_outline() {
        let dataset = sample_dataset(1);
        let figure = radar(&dataset, &RenderParams::default()).unwrap();
        let panel = polar(&figure);
        let points = &panel.series[0].points;
        assert_eq!(points.len(), panel.axes.len() + 1);
        assert_eq!(points.first(), points.last());
    }

    #[test]
    fn test_radar_uses_requested_row() {
        let dataset = sample_dataset(10);
        let figure = radar(&dataset, &RenderParams::at(4)).unwrap();
        let panel = polar(&figure);
        assert_eq!(panel.series[0].points[0].1, dataset.row(4).unwrap().age);
        assert!(panel.title.ends_with('4'));
    }

    #[test]
    fn test_radar_index_out_of_range() {
        let dataset = sample_dataset(10);
        assert!(matches!(
            radar(&dataset, &RenderParams::at(999)),
            Err(VizError::RowIndexOutOfRange { index: 999, rows: 10 })
        ));
    }

    #[test]
    fn test_comparison_truncates_at_end() {
        let dataset = sample_dataset(10);
        let figure = radar_comparison(&dataset, &RenderParams::at(8)).unwrap();
        let panel = polar(&figure);
        assert_eq!(panel.series.len(), 2);
        for series in &panel.series {
            assert_eq!(series.points.len(), RADAR_FIELDS.len() + 1);
            assert!(series.points.iter().all(|&(_, r)| (0.0..=1.0).contains(&r)));
        }
    }
}
