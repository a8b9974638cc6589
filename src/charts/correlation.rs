//! Correlation heatmaps over numeric columns.

use ndarray::{s, Array1, Array2, Axis};

use crate::catalog::RenderParams;
use crate::cluster;
use crate::dataset::Dataset;
use crate::error::{Result, VizError};
use crate::figure::{Figure, HeatmapPanel, Panel};
use crate::models::NumericField;
use crate::stats;

/// Columns that carry most of the signal, including the blood pressure split.
pub(crate) const CURATED: [NumericField; 8] = [
    NumericField::Age,
    NumericField::Bmi,
    NumericField::HeartRate,
    NumericField::Systolic,
    NumericField::Diastolic,
    NumericField::HoursOfSleep,
    NumericField::ExerciseHoursPerWeek,
    NumericField::DailySteps,
];

/// Observation matrix with one column per field.
pub(crate) fn observations(dataset: &Dataset, fields: &[NumericField]) -> Result<Array2<f64>> {
    if dataset.len() < 2 {
        let first = fields.first().map_or("", |f| f.name());
        return Err(VizError::EmptyColumn(first.to_string()));
    }
    let mut data = Array2::zeros((dataset.len(), fields.len()));
    for (j, &field) in fields.iter().enumerate() {
        data.column_mut(j).assign(&dataset.numeric(field)?);
    }
    Ok(data)
}

pub(crate) fn correlation_panel(
    dataset: &Dataset,
    fields: &[NumericField],
    title: &str,
    annotate: bool,
) -> Result<HeatmapPanel> {
    let matrix = stats::correlation_matrix(&observations(dataset, fields)?);
    Ok(HeatmapPanel {
        title: title.to_string(),
        labels: fields.iter().map(|f| f.name().to_string()).collect(),
        values: matrix,
        mask: None,
        annotate,
    })
}

/// Every numeric source column, the row ID included as the first column.
pub fn heatmap(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    let title = "Correlation Heatmap";
    let measured = observations(dataset, &NumericField::SOURCE)?;
    let mut data = Array2::zeros((measured.nrows(), measured.ncols() + 1));
    data.column_mut(0).assign(&Array1::from_iter(
        dataset.records().iter().map(|r| f64::from(r.id)),
    ));
    data.slice_mut(s![.., 1..]).assign(&measured);

    let panel = HeatmapPanel {
        title: title.to_string(),
        labels: std::iter::once("ID")
            .chain(NumericField::SOURCE.iter().map(|f| f.name()))
            .map(str::to_string)
            .collect(),
        values: stats::correlation_matrix(&data),
        mask: None,
        annotate: true,
    };
    Ok(Figure::single(title, Panel::Heatmap(panel)))
}

/// Lower-triangle heatmap; the upper triangle and diagonal are masked.
pub fn advanced_correlation(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    let title = "Correlation Matrix (Lower Triangle)";
    let mut panel = correlation_panel(dataset, &CURATED, title, true)?;
    let n = panel.labels.len();
    panel.mask = Some(Array2::from_shape_fn((n, n), |(i, j)| j >= i));
    Ok(Figure::single(title, Panel::Heatmap(panel)))
}

/// Heatmap with rows and columns reordered by hierarchical clustering.
pub fn clustermap(dataset: &Dataset, _params: &RenderParams) -> Result<Figure> {
    let fields: Vec<NumericField> = NumericField::SOURCE
        .into_iter()
        .chain([NumericField::Systolic, NumericField::Diastolic])
        .collect();
    let title = "Clustered Correlation Map";
    let mut panel = correlation_panel(dataset, &fields, title, true)?;

    let order = cluster::leaf_order(&panel.values);
    panel.values = panel
        .values
        .select(Axis(0), &order)
        .select(Axis(1), &order);
    panel.labels = order.iter().map(|&i| panel.labels[i].clone()).collect();
    Ok(Figure::single(title, Panel::Heatmap(panel)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_dataset;

    fn heatmap_of(figure: &Figure) -> &HeatmapPanel {
        match &figure.panels[..] {
            [Panel::Heatmap(panel)] => panel,
            other => panic!("expected one heatmap, got {:?}", other),
        }
    }

    #[test]
    fn test_heatmap_symmetric_unit_diagonal() {
        let dataset = sample_dataset(25);
        let figure = heatmap(&dataset, &RenderParams::default()).unwrap();
        let panel = heatmap_of(&figure);
        let n = NumericField::SOURCE.len() + 1;
        assert_eq!(panel.values.dim(), (n, n));
        assert_eq!(panel.labels.len(), n);
        assert!(panel.annotate);
        for i in 0..n {
            assert_eq!(panel.values[(i, i)], 1.0);
            for j in 0..n {
                assert_eq!(panel.values[(i, j)], panel.values[(j, i)]);
                assert!(panel.values[(i, j)].abs() <= 1.0);
            }
        }
        assert_eq!(panel.labels[0], "ID");
        assert_eq!(panel.labels[1], NumericField::Age.name());
    }

    #[test]
    fn test_advanced_mask_covers_upper_and_diagonal() {
        let dataset = sample_dataset(25);
        let figure = advanced_correlation(&dataset, &RenderParams::default()).unwrap();
        let panel = heatmap_of(&figure);
        let mask = panel.mask.as_ref().unwrap();
        assert!(panel.labels.contains(&"Systolic".to_string()));
        for ((i, j), &masked) in mask.indexed_iter() {
            assert_eq!(masked, j >= i);
        }
    }

    #[test]
    fn test_clustermap_is_permutation() {
        let dataset = sample_dataset(25);
        let plain = correlation_panel(
            &dataset,
            &NumericField::SOURCE
                .into_iter()
                .chain([NumericField::Systolic, NumericField::Diastolic])
                .collect::<Vec<_>>(),
            "plain",
            true,
        )
        .unwrap();
        let figure = clustermap(&dataset, &RenderParams::default()).unwrap();
        let panel = heatmap_of(&figure);

        let mut sorted = panel.labels.clone();
        sorted.sort();
        let mut expected = plain.labels.clone();
        expected.sort();
        assert_eq!(sorted, expected);

        let position = |label: &str| plain.labels.iter().position(|l| l == label).unwrap();
        for (a, la) in panel.labels.iter().enumerate() {
            for (b, lb) in panel.labels.iter().enumerate() {
                assert_eq!(panel.values[(a, b)], plain.values[(position(la), position(lb))]);
            }
        }
    }

    #[test]
    fn test_single_row_fails() {
        let dataset = sample_dataset(1);
        assert!(matches!(
            heatmap(&dataset, &RenderParams::default()),
            Err(VizError::EmptyColumn(_))
        ));
    }
}
