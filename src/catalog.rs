//! The chart catalog: every chart the crate can draw, grouped for display.

use std::fmt;

use tracing::{debug, warn};

use crate::charts::{comparison, composite, correlation, distribution, profile, relationship};
use crate::dataset::Dataset;
use crate::error::{Result, VizError};
use crate::figure::Figure;

pub type RenderFn = fn(&Dataset, &RenderParams) -> Result<Figure>;

/// Options accepted by chart recipes. Only the radar charts read `index`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderParams {
    pub index: Option<usize>,
}

impl RenderParams {
    pub fn at(index: usize) -> Self {
        Self { index: Some(index) }
    }

    pub fn index(&self) -> usize {
        self.index.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    BasicDistributions,
    ComparativeAnalysis,
    CorrelationAnalysis,
    MultivariateAnalysis,
    AdvancedVisualizations,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::BasicDistributions,
        Category::ComparativeAnalysis,
        Category::CorrelationAnalysis,
        Category::MultivariateAnalysis,
        Category::AdvancedVisualizations,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::BasicDistributions => "Basic Distributions",
            Category::ComparativeAnalysis => "Comparative Analysis",
            Category::CorrelationAnalysis => "Correlation Analysis",
            Category::MultivariateAnalysis => "Multivariate Analysis",
            Category::AdvancedVisualizations => "Advanced Visualizations",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub struct ChartEntry {
    pub name: &'static str,
    pub label: &'static str,
    pub category: Category,
    pub uses_index: bool,
    pub render: RenderFn,
}

macro_rules! chart {
    ($category:ident, $module:ident::$name:ident, $label:expr) => {
        chart!($category, $module::$name, $label, false)
    };
    ($category:ident, $module:ident::$name:ident, $label:expr, $uses_index:expr) => {
        ChartEntry {
            name: stringify!($name),
            label: $label,
            category: Category::$category,
            uses_index: $uses_index,
            render: $module::$name,
        }
    };
}

/// Registry in presentation order.
pub static CHARTS: &[ChartEntry] = &[
    chart!(BasicDistributions, distribution::age_distribution, "Age Distribution"),
    chart!(BasicDistributions, distribution::bmi_distribution, "BMI Distribution"),
    chart!(BasicDistributions, distribution::sleep_distribution, "Sleep Hours Distribution"),
    chart!(BasicDistributions, distribution::steps_distribution, "Daily Steps Distribution"),
    chart!(BasicDistributions, distribution::heart_rate_distribution, "Heart Rate Distribution"),
    chart!(ComparativeAnalysis, comparison::bmi_by_gender, "BMI by Gender"),
    chart!(ComparativeAnalysis, comparison::exercise_by_smoker, "Exercise by Smoker Status"),
    chart!(ComparativeAnalysis, comparison::bmi_vs_smoker_by_gender, "BMI vs Smoker by Gender"),
    chart!(ComparativeAnalysis, comparison::alcohol_by_gender, "Alcohol by Gender"),
    chart!(ComparativeAnalysis, comparison::heart_rate_by_age_group, "Heart Rate by Age Group"),
    chart!(CorrelationAnalysis, correlation::heatmap, "Correlation Heatmap"),
    chart!(CorrelationAnalysis, correlation::advanced_correlation, "Advanced Correlation"),
    chart!(CorrelationAnalysis, correlation::clustermap, "Clustered Correlation"),
    chart!(MultivariateAnalysis, relationship::steps_vs_bmi, "Daily Steps vs BMI"),
    chart!(MultivariateAnalysis, relationship::bmi_vs_age, "BMI vs Age"),
    chart!(MultivariateAnalysis, relationship::alcohol_vs_heart_rate, "Alcohol vs Heart Rate"),
    chart!(MultivariateAnalysis, relationship::systolic_vs_age, "Systolic BP vs Age"),
    chart!(MultivariateAnalysis, relationship::pairplot, "Pairplot"),
    chart!(MultivariateAnalysis, composite::scatter_3d, "3D Scatter"),
    chart!(AdvancedVisualizations, relationship::facetgrid_steps_vs_bmi, "Steps vs BMI by Gender"),
    chart!(AdvancedVisualizations, profile::radar, "Health Profile Radar", true),
    chart!(AdvancedVisualizations, profile::radar_comparison, "Radar Comparison", true),
    chart!(AdvancedVisualizations, composite::health_dashboard, "Health Dashboard"),
    chart!(AdvancedVisualizations, composite::health_dashboard_extended, "Extended Dashboard"),
    chart!(AdvancedVisualizations, composite::sunburst, "Sunburst"),
    chart!(AdvancedVisualizations, composite::risk_factors_sunburst, "Risk Factors Sunburst"),
];

pub fn find(name: &str) -> Option<&'static ChartEntry> {
    CHARTS.iter().find(|entry| entry.name == name)
}

/// Category labels with their chart names, both in presentation order.
pub fn list_categories() -> Vec<(&'static str, Vec<&'static str>)> {
    Category::ALL
        .iter()
        .map(|&category| {
            let names = CHARTS
                .iter()
                .filter(|entry| entry.category == category)
                .map(|entry| entry.name)
                .collect();
            (category.label(), names)
        })
        .collect()
}

/// Builds a fresh figure for `name`. The dataset is never modified beyond
/// its cached derived columns.
pub fn render(dataset: &Dataset, name: &str, params: &RenderParams) -> Result<Figure> {
    let entry = find(name).ok_or_else(|| VizError::UnknownChart(name.to_string()))?;
    if let Some(index) = params.index {
        if index >= dataset.len() {
            return Err(VizError::RowIndexOutOfRange {
                index,
                rows: dataset.len(),
            });
        }
    }
    debug!("Rendering chart: {}", name);
    (entry.render)(dataset, params)
}

/// Anything that can list and render charts; presentation adapters only see this.
pub trait ChartSource {
    fn categories(&self) -> Vec<(&'static str, Vec<&'static str>)>;
    fn render(&self, name: &str, params: &RenderParams) -> Result<Figure>;
}

pub struct Catalog<'a> {
    dataset: &'a Dataset,
}

impl<'a> Catalog<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }
}

impl ChartSource for Catalog<'_> {
    fn categories(&self) -> Vec<(&'static str, Vec<&'static str>)> {
        list_categories()
    }

    fn render(&self, name: &str, params: &RenderParams) -> Result<Figure> {
        render(self.dataset, name, params)
    }
}

/// Renders every listed chart in order and hands each figure to `sink`.
/// Returns the charts that failed, each with its error.
pub fn render_all<S, F>(source: &S, mut sink: F) -> Vec<(&'static str, VizError)>
where
    S: ChartSource + ?Sized,
    F: FnMut(&str, &Figure) -> Result<()>,
{
    source
        .categories()
        .into_iter()
        .flat_map(|(_, names)| names)
        .filter_map(|name| {
            let err = source
                .render(name, &RenderParams::default())
                .and_then(|figure| sink(name, &figure))
                .err()?;
            warn!("Skipping {}: {}", name, err);
            Some((name, err))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::Panel;
    use crate::fixtures::{record, sample_dataset};
    use std::collections::HashSet;

    #[test]
    fn test_every_chart_renders_without_touching_records() {
        let dataset = sample_dataset(10);
        let before = dataset.records().to_vec();
        for entry in CHARTS {
            let figure = render(&dataset, entry.name, &RenderParams::default())
                .unwrap_or_else(|e| panic!("{} failed: {}", entry.name, e));
            assert!(!figure.panels.is_empty(), "{}", entry.name);
            assert!(figure.panels.len() <= figure.grid.0 * figure.grid.1);
        }
        assert_eq!(dataset.records(), &before[..]);
    }

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = CHARTS.iter().map(|e| e.name).collect();
        assert_eq!(names.len(), CHARTS.len());
        assert!(find("radar").unwrap().uses_index);
        assert!(!find("heatmap").unwrap().uses_index);
    }

    #[test]
    fn test_unknown_chart() {
        let dataset = sample_dataset(10);
        assert!(matches!(
            render(&dataset, "pie_of_everything", &RenderParams::default()),
            Err(VizError::UnknownChart(name)) if name == "pie_of_everything"
        ));
    }

    #[test]
    fn test_index_checked_before_render() {
        let dataset = sample_dataset(10);
        let catalog = Catalog::new(&dataset);
        assert!(matches!(
            catalog.render("radar", &RenderParams::at(999)),
            Err(VizError::RowIndexOutOfRange { index: 999, rows: 10 })
        ));
        assert!(catalog.render("radar", &RenderParams::at(9)).is_ok());
    }

    #[test]
    fn test_category_listing_is_stable() {
        let dataset = sample_dataset(2);
        let listed = list_categories();
        assert_eq!(listed, Catalog::new(&dataset).categories());
        let labels: Vec<&str> = listed.iter().map(|(label, _)| *label).collect();
        assert_eq!(
            labels,
            vec![
                "Basic Distributions",
                "Comparative Analysis",
                "Correlation Analysis",
                "Multivariate Analysis",
                "Advanced Visualizations",
            ]
        );
        assert_eq!(listed[0].1[0], "age_distribution");
        let total: usize = listed.iter().map(|(_, names)| names.len()).sum();
        assert_eq!(total, CHARTS.len());
    }

    #[test]
    fn test_radar_on_one_row() {
        let dataset = sample_dataset(1);
        let figure = render(&dataset, "radar", &RenderParams::default()).unwrap();
        match &figure.panels[0] {
            Panel::Polar(panel) => {
                assert_eq!(panel.series[0].points.len(), panel.axes.len() + 1)
            }
            other => panic!("expected polar panel, got {:?}", other),
        }
    }

    #[test]
    fn test_render_all_collects_chart_failures() {
        let mut records: Vec<_> = (0..10).map(record).collect();
        records[3].blood_pressure = "120-80".to_string();
        let dataset = Dataset::from_records(records);

        let mut drawn = Vec::new();
        let failed = render_all(&Catalog::new(&dataset), |name, _| {
            drawn.push(name.to_string());
            Ok(())
        });
        let failed_names: Vec<&str> = failed.iter().map(|(name, _)| *name).collect();
        assert!(failed_names.contains(&"systolic_vs_age"));
        assert!(failed_names.contains(&"risk_factors_sunburst"));
        assert!(failed
            .iter()
            .all(|(_, err)| matches!(err, VizError::Parse { row: 3, .. })));
        assert!(drawn.contains(&"age_distribution".to_string()));
        assert_eq!(drawn.len() + failed.len(), CHARTS.len());
    }

    #[test]
    fn test_render_all_collects_sink_failures() {
        let dataset = sample_dataset(10);
        let failed = render_all(&Catalog::new(&dataset), |name, _| {
            if name == "heatmap" {
                Err(VizError::Render("disk full".to_string()))
            } else {
                Ok(())
            }
        });
        assert_eq!(failed.len(), 1);
        assert!(matches!(&failed[0], ("heatmap", VizError::Render(_))));
    }
}
