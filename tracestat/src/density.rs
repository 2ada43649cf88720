//! Histogram binning and Gaussian kernel density estimation.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

/// Equal-width bin counts over `[lo, hi]`. Every bin is half-open except
/// the last, which also holds `hi`.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    pub lo: f64,
    pub hi: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bins `values` over their own range. A degenerate range `[x, x]` is
    /// widened to `[x - 0.5, x + 0.5]`, and an empty input to `[0, 1]`.
    pub fn new(values: &[f64], nbins: usize) -> Self {
        assert!(nbins > 0, "histogram needs at least one bin");
        let (lo, hi) = range(values).unwrap_or((0.0, 1.0));
        let (lo, hi) = if lo == hi { (lo - 0.5, hi + 0.5) } else { (lo, hi) };

        let mut counts = vec![0usize; nbins];
        let width = (hi - lo) / nbins as f64;
        for &v in values {
            let bin = (((v - lo) / width) as usize).min(nbins - 1);
            counts[bin] += 1;
        }
        Self { lo, hi, counts }
    }

    pub fn bin_width(&self) -> f64 {
        (self.hi - self.lo) / self.counts.len() as f64
    }

    /// `(left edge, right edge, count)` for every bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        let width = self.bin_width();
        self.counts.iter().enumerate().map(move |(i, &c)| {
            let left = self.lo + width * i as f64;
            (left, left + width, c)
        })
    }
}

/// Gaussian KDE with a bandwidth picked by Scott's rule,
/// `n^(-1/5)` times the sample standard deviation.
pub struct GaussianKde {
    points: Vec<f64>,
    bandwidth: f64,
}

impl GaussianKde {
    /// `None` when fewer than two points are given or they don't vary.
    pub fn scott(points: &[f64]) -> Option<Self> {
        let n = points.len();
        if n < 2 {
            return None;
        }
        let mean = points.iter().sum::<f64>() / n as f64;
        let var = points.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let bandwidth = (n as f64).powf(-0.2) * var.sqrt();
        if !bandwidth.is_normal() {
            return None;
        }
        Some(Self {
            points: points.to_vec(),
            bandwidth,
        })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn density(&self, x: f64) -> f64 {
        let norm = (2.0 * std::f64::consts::PI).sqrt() * self.bandwidth * self.points.len() as f64;
        self.points
            .iter()
            .map(|p| {
                let z = (x - p) / self.bandwidth;
                (-0.5 * z * z).exp()
            })
            .sum::<f64>()
            / norm
    }

    /// Densities at `ngrid` evenly spaced points across `[lo, hi]`,
    /// multiplied by `scale`.
    pub fn curve(&self, lo: f64, hi: f64, ngrid: usize, scale: f64) -> Vec<(f64, f64)> {
        let step = if ngrid > 1 {
            (hi - lo) / (ngrid - 1) as f64
        } else {
            0.0
        };
        (0..ngrid)
            .into_par_iter()
            .map(|i| {
                let x = lo + step * i as f64;
                (x, scale * self.density(x))
            })
            .collect()
    }
}

/// `(min, max)` of nonempty `values`.
pub fn range(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    Some(
        values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_cover_range_and_count_everything() {
        let values: Vec<f64> = (0..=100).map(f64::from).collect();
        let h = Histogram::new(&values, 50);
        assert_eq!(h.counts.len(), 50);
        assert_eq!(h.counts.iter().sum::<usize>(), values.len());
        assert!((h.bin_width() - 2.0).abs() < 1e-12);
        // max lands in the closed last bin
        assert_eq!(h.counts[49], 3);
        assert_eq!(h.counts[0], 2);
    }

    #[test]
    fn degenerate_range_is_widened() {
        let h = Histogram::new(&[5.0, 5.0], 50);
        assert_eq!(h.lo, 4.5);
        assert_eq!(h.hi, 5.5);
        assert_eq!(h.counts.iter().max(), Some(&2));
        let bins: Vec<_> = h.bins().collect();
        assert_eq!(bins.len(), 50);
        assert_eq!(bins.iter().map(|b| b.2).sum::<usize>(), 2);
    }

    #[test]
    fn empty_histogram() {
        let h = Histogram::new(&[], 10);
        assert!(h.counts.iter().all(|&c| c == 0));
        assert_eq!((h.lo, h.hi), (0.0, 1.0));
    }

    #[test]
    fn kde_integrates_to_one() {
        let points = [80.0, 95.0, 100.0, 101.0, 130.0];
        let kde = GaussianKde::scott(&points).unwrap();
        let curve = kde.curve(0.0, 250.0, 2001, 1.0);
        let dx = 250.0 / 2000.0;
        let area: f64 = curve.iter().map(|(_, y)| y * dx).sum();
        assert!((area - 1.0).abs() < 1e-3, "area {}", area);
    }

    #[test]
    fn kde_bandwidth_follows_scott() {
        let points = [1.0, 2.0, 3.0, 4.0];
        let kde = GaussianKde::scott(&points).unwrap();
        let std = (5.0f64 / 3.0).sqrt();
        assert!((kde.bandwidth() - 4f64.powf(-0.2) * std).abs() < 1e-12);
    }

    #[test]
    fn kde_needs_spread() {
        assert!(GaussianKde::scott(&[1.0]).is_none());
        assert!(GaussianKde::scott(&[3.0, 3.0, 3.0]).is_none());
    }
}
