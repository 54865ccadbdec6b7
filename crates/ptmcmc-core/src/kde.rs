//! The contract a Gaussian KDE collaborator must satisfy for the KDE
//! proposal kernel and the RJMCMC trans-dimensional jump.
//!
//! The reference implementation (Scott's-rule bandwidth, matching
//! `scipy.stats.gaussian_kde`'s default) lives in `ptmcmc-diagnostics` so
//! it can depend on `rand_distr`/`statrs` without pulling those into the
//! sampler core; anything satisfying this trait may be substituted.

use rand::RngCore;

pub trait Kde: Send {
    /// Fit a KDE to a set of post-burn-in samples (each inner `Vec<f64>`
    /// one `d`-dimensional draw). Panics or returns a degenerate KDE are
    /// the caller's choice for `samples.is_empty()`.
    fn fit(samples: &[Vec<f64>]) -> Self
    where
        Self: Sized;

    /// Draw one sample from the fitted density.
    fn sample(&self, rng: &mut dyn RngCore) -> Vec<f64>;

    /// Log density at `x`.
    fn log_pdf(&self, x: &[f64]) -> f64;
}
