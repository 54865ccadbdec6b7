//! Reference Gaussian KDE: a diagonal product-bandwidth kernel
//! density estimate with Scott's-rule bandwidth, matching
//! `scipy.stats.gaussian_kde`'s default factor `n^(-1/(d+4))`.
//!
//! Anything satisfying [`ptmcmc_core::kde::Kde`] may be substituted; this
//! is the one the CLI wires up by default.

use ptmcmc_core::kde::Kde;
use rand::Rng;
use rand::RngCore;
use rand_distr::{Distribution, StandardNormal};

/// A fitted Gaussian KDE: the data points themselves plus a per-dimension
/// bandwidth `h_j = scott_factor * std_j`.
pub struct GaussianKde {
    samples: Vec<Vec<f64>>,
    bandwidth: Vec<f64>,
}

impl GaussianKde {
    fn scott_factor(n: usize, d: usize) -> f64 {
        (n.max(1) as f64).powf(-1.0 / (d as f64 + 4.0))
    }

    fn per_dim_std(samples: &[Vec<f64>], d: usize) -> Vec<f64> {
        let n = samples.len() as f64;
        let mean: Vec<f64> = (0..d).map(|j| samples.iter().map(|s| s[j]).sum::<f64>() / n).collect();
        (0..d)
            .map(|j| {
                let var = samples.iter().map(|s| (s[j] - mean[j]).powi(2)).sum::<f64>() / n.max(1.0);
                var.sqrt().max(1e-12)
            })
            .collect()
    }
}

impl Kde for GaussianKde {
    fn fit(samples: &[Vec<f64>]) -> Self {
        if samples.is_empty() {
            return GaussianKde {
                samples: Vec::new(),
                bandwidth: Vec::new(),
            };
        }
        let d = samples[0].len();
        let factor = Self::scott_factor(samples.len(), d);
        let std = Self::per_dim_std(samples, d);
        let bandwidth = std.iter().map(|s| s * factor).collect();
        GaussianKde {
            samples: samples.to_vec(),
            bandwidth,
        }
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Vec<f64> {
        if self.samples.is_empty() {
            return Vec::new();
        }
        let i = rng.random_range(0..self.samples.len());
        let center = &self.samples[i];
        center
            .iter()
            .zip(&self.bandwidth)
            .map(|(&c, &h)| {
                let z: f64 = StandardNormal.sample(rng);
                c + h * z
            })
            .collect()
    }

    fn log_pdf(&self, x: &[f64]) -> f64 {
        if self.samples.is_empty() {
            return f64::NEG_INFINITY;
        }
        let d = x.len();
        let log_norm_const: f64 = self.bandwidth.iter().map(|h| -(h.ln()) - 0.5 * (2.0 * std::f64::consts::PI).ln()).sum();
        let n = self.samples.len() as f64;
        let log_terms: Vec<f64> = self
            .samples
            .iter()
            .map(|s| {
                let quad: f64 = (0..d).map(|j| {
                    let z = (x[j] - s[j]) / self.bandwidth[j];
                    z * z
                }).sum();
                log_norm_const - 0.5 * quad
            })
            .collect();
        let max_log = log_terms.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if !max_log.is_finite() {
            return f64::NEG_INFINITY;
        }
        let sum_exp: f64 = log_terms.iter().map(|&l| (l - max_log).exp()).sum();
        max_log + sum_exp.ln() - n.ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn fit_on_empty_samples_never_panics_on_sample_or_log_pdf() {
        let kde = GaussianKde::fit(&[]);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(kde.sample(&mut rng).is_empty());
        assert_eq!(kde.log_pdf(&[0.0]), f64::NEG_INFINITY);
    }

    #[test]
    fn log_pdf_peaks_near_the_data_cluster() {
        let samples: Vec<Vec<f64>> = (0..500).map(|i| vec![(i as f64 - 250.0) * 0.004]).collect();
        let kde = GaussianKde::fit(&samples);
        assert!(kde.log_pdf(&[0.0]) > kde.log_pdf(&[50.0]));
    }

    #[test]
    fn samples_stay_near_the_fitted_cluster() {
        let samples: Vec<Vec<f64>> = (0..200).map(|i| vec![i as f64 * 0.01, -(i as f64) * 0.01]).collect();
        let kde = GaussianKde::fit(&samples);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let draw = kde.sample(&mut rng);
            assert!(draw[0].abs() < 5.0);
            assert!(draw[1].abs() < 5.0);
        }
    }
}
