//! Summary statistics used by the chart recipes.

use ndarray::{Array2, ArrayView1};
use statrs::distribution::{Continuous, ContinuousCDF, Normal, StudentsT};
use statrs::statistics::{Data, OrderStatistics, Statistics};

/// Smallest and largest finite value.
pub fn bounds(values: &[f64]) -> Option<(f64, f64)> {
    let finite = || values.iter().copied().filter(|v| v.is_finite());
    let lo = finite().fold(f64::NAN, f64::min);
    let hi = finite().fold(f64::NAN, f64::max);
    if lo.is_finite() && hi.is_finite() {
        Some((lo, hi))
    } else {
        None
    }
}

/// Widens `lo..hi` by `fraction` of its span on both sides.
pub fn padded_range(lo: f64, hi: f64, fraction: f64) -> (f64, f64) {
    let span = (hi - lo).abs();
    let padding = if span < 1e-9 { 0.5 } else { span * fraction };
    (lo - padding, hi + padding)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.get(1)) {
            (Some(a), Some(b)) => b - a,
            _ => 0.0,
        }
    }
}

/// Equal-width bins over the data range; the last bin is closed on the right.
/// NaN and infinite values are left out.
pub fn histogram(values: &[f64], bins: usize) -> Option<Histogram> {
    if bins == 0 {
        return None;
    }
    let (mut lo, mut hi) = bounds(values)?;
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    let edges = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for &v in values.iter().filter(|v| v.is_finite()) {
        let index = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }
    Some(Histogram { edges, counts })
}

/// Gaussian kernel density estimate with Scott's bandwidth.
///
/// The grid extends `cut` bandwidths past the data range. Returns `None` when
/// fewer than two values are given or they have no spread.
pub fn gaussian_kde(values: &[f64], points: usize, cut: f64) -> Option<Vec<(f64, f64)>> {
    if values.len() < 2 || points < 2 {
        return None;
    }
    let sd = values.iter().std_dev();
    if !(sd > 0.0) {
        return None;
    }
    let n = values.len() as f64;
    let bandwidth = sd * n.powf(-0.2);
    let kernel = Normal::new(0.0, bandwidth).ok()?;
    let (lo, hi) = bounds(values)?;
    let start = lo - cut * bandwidth;
    let step = (hi + cut * bandwidth - start) / (points - 1) as f64;

    Some(
        (0..points)
            .map(|i| {
                let x = start + step * i as f64;
                let density = values.iter().map(|&v| kernel.pdf(x - v)).sum::<f64>() / n;
                (x, density)
            })
            .collect(),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// Quartiles with whiskers at the furthest points within 1.5 IQR.
pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
    if values.is_empty() {
        return None;
    }
    let mut data = Data::new(values.to_vec());
    let q1 = data.lower_quartile();
    let median = data.median();
    let q3 = data.upper_quartile();
    let iqr = q3 - q1;
    let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    let inside: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| *v >= low_fence && *v <= high_fence)
        .collect();
    let (lower_whisker, upper_whisker) = bounds(&inside).unwrap_or((q1, q3));
    let outliers = values
        .iter()
        .copied()
        .filter(|v| *v < low_fence || *v > high_fence)
        .collect();

    Some(BoxSummary {
        q1,
        median,
        q3,
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Ordinary least squares fit of `ys` on `xs`.
pub fn least_squares(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let x_mean = xs.iter().mean();
    let y_mean = ys.iter().mean();
    let sxy: f64 = xs
        .iter()
        .zip(ys.iter())
        .map(|(&x, &y)| (x - x_mean) * (y - y_mean))
        .sum();
    let sxx: f64 = xs.iter().map(|&x| (x - x_mean).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanEstimate {
    pub mean: f64,
    pub low: f64,
    pub high: f64,
}

/// Sample mean with a two-sided Student-t confidence interval.
pub fn mean_with_ci(values: &[f64], level: f64) -> Option<MeanEstimate> {
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().mean();
    if values.len() < 2 {
        return Some(MeanEstimate {
            mean,
            low: mean,
            high: mean,
        });
    }
    let n = values.len() as f64;
    let sem = values.iter().std_dev() / n.sqrt();
    let t = StudentsT::new(0.0, 1.0, n - 1.0)
        .ok()?
        .inverse_cdf(0.5 + level / 2.0);
    Some(MeanEstimate {
        mean,
        low: mean - t * sem,
        high: mean + t * sem,
    })
}

// Pearson correlation of two columns; None when either has no variance.
fn calculate_correlation(x: &ArrayView1<f64>, y: &ArrayView1<f64>) -> Option<f64> {
    let x_mean = x.mean()?;
    let y_mean = y.mean()?;
    let numerator = x
        .iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| (xi - x_mean) * (yi - y_mean))
        .sum::<f64>();
    let denominator_x = x.iter().map(|&xi| (xi - x_mean).powi(2)).sum::<f64>().sqrt();
    let denominator_y = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum::<f64>().sqrt();
    if denominator_x > 0.0 && denominator_y > 0.0 {
        Some((numerator / (denominator_x * denominator_y)).clamp(-1.0, 1.0))
    } else {
        None
    }
}

/// Pearson correlation between the columns of `data` (rows are observations).
///
/// The diagonal is exactly 1 and the result is symmetric. Pairs involving a
/// constant column are reported as 0.
pub fn correlation_matrix(data: &Array2<f64>) -> Array2<f64> {
    let cols = data.ncols();
    let mut matrix = Array2::zeros((cols, cols));
    for i in 0..cols {
        matrix[(i, i)] = 1.0;
        for j in (i + 1)..cols {
            let correlation =
                calculate_correlation(&data.column(i), &data.column(j)).unwrap_or(0.0);
            matrix[(i, j)] = correlation;
            matrix[(j, i)] = correlation;
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_histogram_counts_every_value() {
        let values = [1.0, 2.0, 2.5, 3.0, 10.0];
        let hist = histogram(&values, 3).unwrap();
        assert_eq!(hist.edges.len(), 4);
        assert_eq!(hist.counts, vec![4, 0, 1]);
        assert_eq!(hist.counts.iter().sum::<usize>(), values.len());
        assert!((hist.bin_width() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_flat_data() {
        let hist = histogram(&[4.0, 4.0], 5).unwrap();
        assert_eq!(hist.edges[0], 3.5);
        assert_eq!(hist.counts.iter().sum::<usize>(), 2);
        assert!(histogram(&[], 5).is_none());
    }

    #[test]
    fn test_histogram_skips_non_finite() {
        let values = [1.0, f64::NAN, 2.0, f64::INFINITY, 3.0];
        let hist = histogram(&values, 2).unwrap();
        assert_eq!(hist.edges, vec![1.0, 2.0, 3.0]);
        assert_eq!(hist.counts, vec![1, 2]);
        assert_eq!(bounds(&values), Some((1.0, 3.0)));
        assert!(histogram(&[f64::NAN], 3).is_none());
    }

    #[test]
    fn test_kde_integrates_to_one() {
        let values = [1.0, 2.0, 2.0, 3.0, 4.5, 5.0];
        let curve = gaussian_kde(&values, 400, 3.0).unwrap();
        let step = curve[1].0 - curve[0].0;
        let area: f64 = curve.iter().map(|(_, d)| d * step).sum();
        assert!((area - 1.0).abs() < 0.02, "area {}", area);
        assert!(gaussian_kde(&[2.0, 2.0], 10, 3.0).is_none());
    }

    #[test]
    fn test_box_summary_flags_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 100.0];
        let summary = box_summary(&values).unwrap();
        assert!(summary.q1 < summary.median && summary.median < summary.q3);
        assert_eq!(summary.outliers, vec![100.0]);
        assert_eq!(summary.upper_whisker, 7.0);
        assert_eq!(summary.lower_whisker, 1.0);
    }

    #[test]
    fn test_least_squares_recovers_line() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 3.0, 5.0, 7.0];
        let fit = least_squares(&xs, &ys).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!(least_squares(&[1.0, 1.0], &[2.0, 3.0]).is_none());
    }

    #[test]
    fn test_mean_with_ci_brackets_mean() {
        let estimate = mean_with_ci(&[70.0, 72.0, 74.0, 76.0], 0.95).unwrap();
        assert_eq!(estimate.mean, 73.0);
        assert!(estimate.low < 73.0 && estimate.high > 73.0);
        assert!((estimate.mean - estimate.low - (estimate.high - estimate.mean)).abs() < 1e-9);
    }

    #[test]
    fn test_correlation_matrix_symmetric_unit_diagonal() {
        let data = array![
            [1.0, 2.0, 5.0, 3.0],
            [2.0, 4.1, 3.0, 3.0],
            [3.0, 6.2, 4.0, 3.0],
            [4.0, 7.9, 1.0, 3.0]
        ];
        let m = correlation_matrix(&data);
        for i in 0..4 {
            assert_eq!(m[(i, i)], 1.0);
            for j in 0..4 {
                assert_eq!(m[(i, j)], m[(j, i)]);
                assert!(m[(i, j)].abs() <= 1.0);
            }
        }
        assert!(m[(0, 1)] > 0.99);
        assert_eq!(m[(0, 3)], 0.0);
    }
}
