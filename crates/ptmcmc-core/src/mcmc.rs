//! MCMC kernel: one Metropolis-Hastings step against the tempered
//! target, acceptance bookkeeping, optional auxiliary jump, and replay of
//! resumed samples.

use crate::cycle::ProposalCycle;
use crate::kde::Kde;
use crate::kernels::{self, KernelContext};
use crate::linalg::{EigenDecomp, Mat};
use rand::{Rng, RngCore};

/// Signature for the user's log-likelihood/log-prior callables. A plain
/// `Fn(&[f64]) -> f64` closure captures whatever bound context (the
/// original's `loglargs`/`loglkwargs`) it needs at construction time.
pub type LogDensityFn = Box<dyn Fn(&[f64]) -> f64 + Send>;

/// `(x, y, iter, beta, rng) -> (refined_y, qxy_aux)`, run after every
/// primary proposal.
pub type AuxJumpFn = Box<dyn FnMut(&[f64], &[f64], u64, f64, &mut dyn RngCore) -> (Vec<f64>, f64) + Send>;

/// All per-rank mutable state: temperature, the running covariance
/// estimate and its eigenbasis, the DE buffer, the KDE (once activated),
/// the proposal cycle, and acceptance counters.
pub struct ChainState {
    pub rank: usize,
    pub temp: f64,
    pub beta: f64,
    pub x: Vec<f64>,
    pub logl: f64,
    pub logpi: f64,
    /// Kept as `f64` rather than a count: on resume, the original
    /// reconstructs it from the stored cumulative acceptance *rate*
    /// (`iter * rate`), which need not be an integer.
    pub naccepted: f64,
    pub nswap_proposed: u64,
    pub nswap_accepted: u64,
    pub cycle: ProposalCycle,
    pub cov: Mat,
    pub eigen: EigenDecomp,
    pub de_buffer: Vec<Vec<f64>>,
    pub kde: Option<Box<dyn Kde>>,
}

impl ChainState {
    pub fn new(rank: usize, temp: f64, x0: Vec<f64>, cov: Mat, eigen: EigenDecomp) -> Self {
        Self {
            rank,
            temp,
            beta: 1.0 / temp,
            x: x0,
            logl: f64::NEG_INFINITY,
            logpi: f64::NEG_INFINITY,
            naccepted: 0.0,
            nswap_proposed: 0,
            nswap_accepted: 0,
            cycle: ProposalCycle::new(),
            cov,
            eigen,
            de_buffer: Vec::new(),
            kde: None,
        }
    }

    /// Evaluate the tempered target at the chain's current state,
    /// honoring the short-circuit on `logp = -inf`.
    pub fn evaluate_initial(&mut self, logl_fn: &LogDensityFn, logp_fn: &LogDensityFn) {
        let lp = logp_fn(&self.x);
        if lp == f64::NEG_INFINITY {
            self.logl = f64::NEG_INFINITY;
            self.logpi = f64::NEG_INFINITY;
        } else {
            self.logl = logl_fn(&self.x);
            self.logpi = self.beta * self.logl + lp;
        }
    }
}

/// Outcome of a single [`step`] call, used for bookkeeping and tests.
#[derive(Debug, Clone, Copy)]
pub struct StepOutcome {
    pub accepted: bool,
    pub proposed_logpi: f64,
}

/// One Metropolis-Hastings step. Does not touch the
/// swap protocol or the chain store — those compose around this
/// in the PT coordinator.
///
/// `kde_override` lets rank 0 pass a borrow of the adaptation engine's KDE
/// (which owns the fit) without also duplicating it into `state.kde`;
/// hot ranks pass `None` and fall back to their own `state.kde`, populated
/// from the PT coordinator's KDE broadcast.
pub fn step(
    state: &mut ChainState,
    iter: u64,
    logl_fn: &LogDensityFn,
    logp_fn: &LogDensityFn,
    mut aux: Option<&mut AuxJumpFn>,
    kde_override: Option<&dyn Kde>,
    rng: &mut dyn RngCore,
) -> StepOutcome {
    let ctx = KernelContext {
        ndim: state.x.len(),
        beta: state.beta,
        temp: state.temp,
        cov: &state.cov,
        eigen: &state.eigen,
        de_buffer: &state.de_buffer,
        kde: kde_override.or_else(|| state.kde.as_deref()),
    };
    let kind = state.cycle.select(iter, rng);
    let mut proposal = kernels::propose(kind, &state.x, &ctx, rng);

    if let Some(aux_fn) = aux.as_deref_mut() {
        let (refined, qxy_aux) = aux_fn(&state.x, &proposal.y, iter, state.beta, rng);
        proposal.y = refined;
        proposal.qxy += qxy_aux;
    }

    let lp = logp_fn(&proposal.y);
    let (new_logl, new_logpi) = if lp == f64::NEG_INFINITY {
        (f64::NEG_INFINITY, f64::NEG_INFINITY)
    } else {
        let ll = logl_fn(&proposal.y);
        (ll, state.beta * ll + lp)
    };

    let u: f64 = rng.random();
    let diff = (new_logpi - state.logpi) + proposal.qxy;
    let accepted = diff > u.ln();

    if accepted {
        state.x = proposal.y;
        state.logl = new_logl;
        state.logpi = new_logpi;
        state.naccepted += 1.0;
    }

    StepOutcome {
        accepted,
        proposed_logpi: new_logpi,
    }
}

/// Replay a previously recorded sample during resume:
/// restore `(x, logl, logpi)` and reconstruct the acceptance count from
/// the stored cumulative rate, bypassing the proposal entirely.
pub fn replay(state: &mut ChainState, iter: u64, x: Vec<f64>, logl: f64, logpi: f64, local_accept_rate: f64) {
    state.x = x;
    state.logl = logl;
    state.logpi = logpi;
    state.naccepted = iter as f64 * local_accept_rate;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::KernelKind;
    use crate::linalg::jacobi_eigen;
    use rand::{SeedableRng, rngs::StdRng};

    fn gaussian_state(rank: usize, temp: f64) -> ChainState {
        let cov = Mat::identity(1);
        let eigen = jacobi_eigen(&cov, 1e-12, 50);
        let mut st = ChainState::new(rank, temp, vec![0.0], cov, eigen);
        st.cycle.add(KernelKind::Am, 1, &mut StdRng::seed_from_u64(0)).unwrap();
        st
    }

    #[test]
    fn step_accept_rate_in_unit_interval_for_gaussian_target() {
        let mut state = gaussian_state(0, 1.0);
        let logl: LogDensityFn = Box::new(|x: &[f64]| -0.5 * x[0] * x[0]);
        let logp: LogDensityFn = Box::new(|_x: &[f64]| 0.0_f64);
        state.evaluate_initial(&logl, &logp);

        let mut rng = StdRng::seed_from_u64(42);
        let n = 2000u64;
        for i in 1..=n {
            step(&mut state, i, &logl, &logp, None, None, &mut rng);
        }
        let rate = state.naccepted / n as f64;
        assert!(rate > 0.0 && rate <= 1.0);
    }

    #[test]
    fn prior_rejection_is_never_accepted() {
        let mut state = gaussian_state(0, 1.0);
        let logl: LogDensityFn = Box::new(|_x: &[f64]| 0.0_f64);
        let logp: LogDensityFn = Box::new(|_x: &[f64]| f64::NEG_INFINITY);
        state.evaluate_initial(&logl, &logp);
        assert_eq!(state.logpi, f64::NEG_INFINITY);

        let mut rng = StdRng::seed_from_u64(7);
        for i in 1..=100u64 {
            let outcome = step(&mut state, i, &logl, &logp, None, None, &mut rng);
            assert!(!outcome.accepted);
        }
        assert_eq!(state.naccepted, 0.0);
    }

    #[test]
    fn replay_reconstructs_naccepted_from_rate() {
        let mut state = gaussian_state(0, 1.0);
        replay(&mut state, 40, vec![1.0], -1.0, -1.5, 0.25);
        assert_eq!(state.x, vec![1.0]);
        assert_eq!(state.naccepted, 10.0);
    }
}
