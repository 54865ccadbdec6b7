//! Adaptation engine: recursive covariance update, eigenbasis
//! refresh, DE buffer snapshot, KDE refit. Runs on rank 0 only; hot ranks
//! receive the results as [`crate::coordinator`] broadcasts.

use crate::kde::Kde;
use crate::linalg::{EigenDecomp, Mat, Welford, is_psd, jacobi_eigen};

/// A state change produced by the adaptation engine this step, destined
/// for broadcast to hot ranks by the PT coordinator.
pub enum AdaptationEvent {
    Covariance { cov: Mat, eigen: EigenDecomp },
    DeBuffer(Vec<Vec<f64>>),
    KdeActivated,
}

pub struct AdaptationEngine {
    welford: Welford,
    cov: Mat,
    eigen: EigenDecomp,
    de_buffer: Vec<Vec<f64>>,
    kde: Option<Box<dyn Kde>>,
    kde_factory: Box<dyn Fn(&[Vec<f64>]) -> Box<dyn Kde> + Send>,
}

impl AdaptationEngine {
    pub fn new(
        initial_cov: Mat,
        kde_factory: Box<dyn Fn(&[Vec<f64>]) -> Box<dyn Kde> + Send>,
    ) -> Self {
        let eigen = jacobi_eigen(&initial_cov, 1e-10, 200);
        let ndim = initial_cov.n;
        Self {
            welford: Welford::new(ndim),
            cov: initial_cov,
            eigen,
            de_buffer: Vec::new(),
            kde: None,
            kde_factory,
        }
    }

    pub fn cov(&self) -> &Mat {
        &self.cov
    }

    pub fn eigen(&self) -> &EigenDecomp {
        &self.eigen
    }

    pub fn de_buffer(&self) -> &[Vec<f64>] {
        &self.de_buffer
    }

    pub fn kde(&self) -> Option<&dyn Kde> {
        self.kde.as_deref()
    }

    /// Every `cov_update` iterations (once at least one full window has
    /// elapsed), fold the most recent window of `am_buffer` into the
    /// running Welford accumulator, recompute `Sigma`, and re-diagonalize.
    /// A recomputed covariance that fails the PSD check is logged and
    /// discarded — `Sigma`/the eigenbasis keep their previous values.
    pub fn maybe_update_covariance(
        &mut self,
        iter: u64,
        cov_update: u64,
        am_buffer: &[Vec<f64>],
    ) -> Option<AdaptationEvent> {
        if cov_update == 0 || iter == 0 || iter % cov_update != 0 {
            return None;
        }
        let end = am_buffer.len();
        let start = end.saturating_sub(cov_update as usize);
        if end - start == 0 {
            return None;
        }
        for sample in &am_buffer[start..end] {
            self.welford.update(sample);
        }
        let Some(new_cov) = self.welford.covariance() else {
            return None;
        };
        let eig = jacobi_eigen(&new_cov, 1e-10, 200);
        if !is_psd(&eig, 1e-8) {
            log::warn!(
                "adaptation: recomputed covariance failed PSD check at iter {iter}, retaining previous Sigma"
            );
            return None;
        }
        self.cov = new_cov.clone();
        self.eigen = eig.clone();
        Some(AdaptationEvent::Covariance { cov: new_cov, eigen: eig })
    }

    /// Every `burn` iterations, replace the DE buffer with the most recent
    /// `burn` cold-chain samples.
    pub fn maybe_update_de_buffer(
        &mut self,
        iter: u64,
        burn: u64,
        am_buffer: &[Vec<f64>],
    ) -> Option<AdaptationEvent> {
        if burn == 0 || iter == 0 || iter % burn != 0 {
            return None;
        }
        let end = am_buffer.len();
        let start = end.saturating_sub(burn as usize);
        if end - start == 0 {
            return None;
        }
        self.de_buffer = am_buffer[start..end].to_vec();
        Some(AdaptationEvent::DeBuffer(self.de_buffer.clone()))
    }

    /// Every `kde_update` iterations once `iter >= burn + kde_update` and
    /// KDE is weighted into the cycle, refit on `am_buffer[burn:iter]`.
    /// Returns `KdeActivated` the first time a fit succeeds so the caller
    /// can add the kernel to the cycle.
    pub fn maybe_update_kde(
        &mut self,
        iter: u64,
        burn: u64,
        kde_update: u64,
        kde_weight: u32,
        am_buffer: &[Vec<f64>],
    ) -> Option<AdaptationEvent> {
        if kde_weight == 0 || kde_update == 0 {
            return None;
        }
        if iter < burn + kde_update || iter % kde_update != 0 {
            return None;
        }
        let burn = burn as usize;
        if am_buffer.len() <= burn {
            return None;
        }
        let was_active = self.kde.is_some();
        self.kde = Some((self.kde_factory)(&am_buffer[burn..]));
        if was_active {
            None
        } else {
            Some(AdaptationEvent::KdeActivated)
        }
    }

    /// Apply a broadcast received from rank 0 (used on hot ranks).
    pub fn apply_event(&mut self, event: &AdaptationEvent) {
        match event {
            AdaptationEvent::Covariance { cov, eigen } => {
                self.cov = cov.clone();
                self.eigen = eigen.clone();
            }
            AdaptationEvent::DeBuffer(buf) => {
                self.de_buffer = buf.clone();
            }
            AdaptationEvent::KdeActivated => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::Mat;

    fn dummy_kde_factory() -> Box<dyn Fn(&[Vec<f64>]) -> Box<dyn Kde> + Send> {
        struct Noop;
        impl Kde for Noop {
            fn fit(_samples: &[Vec<f64>]) -> Self {
                Noop
            }
            fn sample(&self, _rng: &mut dyn rand::RngCore) -> Vec<f64> {
                vec![]
            }
            fn log_pdf(&self, _x: &[f64]) -> f64 {
                0.0
            }
        }
        Box::new(|samples| Box::new(Noop::fit(samples)))
    }

    #[test]
    fn covariance_updates_after_full_window() {
        let mut engine = AdaptationEngine::new(Mat::identity(2), dummy_kde_factory());
        let buffer: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, -(i as f64)]).collect();
        assert!(engine.maybe_update_covariance(5, 10, &buffer[..5]).is_none());
        let event = engine.maybe_update_covariance(10, 10, &buffer);
        assert!(matches!(event, Some(AdaptationEvent::Covariance { .. })));
    }

    #[test]
    fn de_buffer_updates_every_burn_iterations() {
        let mut engine = AdaptationEngine::new(Mat::identity(1), dummy_kde_factory());
        let buffer: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        assert!(engine.maybe_update_de_buffer(10, 10, &buffer[..10]).is_some());
        assert_eq!(engine.de_buffer().len(), 10);
    }

    #[test]
    fn kde_activates_once_past_burn_plus_update() {
        let mut engine = AdaptationEngine::new(Mat::identity(1), dummy_kde_factory());
        let buffer: Vec<Vec<f64>> = (0..100).map(|i| vec![i as f64]).collect();
        let first = engine.maybe_update_kde(20, 10, 10, 30, &buffer[..20]);
        assert!(matches!(first, Some(AdaptationEvent::KdeActivated)));
        let second = engine.maybe_update_kde(30, 10, 10, 30, &buffer[..30]);
        assert!(second.is_none());
    }
}
