//! PT coordinator: spawns one OS thread per rank, wires the
//! neighbor-pair swap handshake and the rank-0 broadcast channels over
//! `std::sync::mpsc`, and drives each rank's main loop.
//!
//! `K` "ranks" exchange state over a message-passing substrate the way
//! an MPI-based implementation would use processes; this crate realizes
//! that substrate with threads and channels within a single process.
//! `mpsc::Sender::send` never blocks (the channel is unbounded), so the
//! only true suspension point
//! in the protocol below is `recv`/`try_recv` — that fact is what makes
//! the send-then-recv ordering deadlock-free without any extra
//! coordination.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::adaptation::{AdaptationEngine, AdaptationEvent};
use crate::config::SamplerConfig;
use crate::error::{Result, SamplerError};
use crate::ess::{self, AutocorrEstimator};
use crate::kde::Kde;
use crate::kernels::KernelKind;
use crate::ladder::temperature_ladder;
use crate::linalg::{EigenDecomp, Mat, jacobi_eigen};
use crate::mcmc::{self, ChainState, LogDensityFn};
use crate::store::{ChainStore, StoredSample, write_cov_snapshot};

/// Builds a fresh KDE from a set of samples. `Arc` (rather than `Box`) so
/// the PT coordinator can hand a clone to rank 0's adaptation engine and
/// still keep a copy of its own to mint the independent per-rank
/// instances the KDE broadcast hands out (replicated lazily to hot
/// chains).
pub type KdeFactory = Arc<dyn Fn(&[Vec<f64>]) -> Box<dyn Kde> + Send + Sync>;

/// Messages exchanged by the two ranks of a swap pair. A swap
/// attempt is at most three round trips: the proposing logL, the
/// accept/reject decision, and — only on acceptance — a second logL/state
/// exchange.
enum SwapMsg {
    LogL(f64),
    Decision(bool),
    State(Vec<f64>),
}

/// Rank 0's periodic broadcasts to every hot rank (tags COV, DE, TERM).
/// KDE replication is not named as a fourth tag alongside those, but
/// hot chains do need it ("replicated lazily to hot chains when
/// enabled"); it is folded in here as a fourth message kind.
enum BroadcastMsg {
    Cov(Mat, EigenDecomp),
    DeBuffer(Vec<Vec<f64>>),
    Kde(Box<dyn Kde>),
    Term,
}

/// A point-in-time view of a running sampler, safe to read from another
/// thread (the status HTTP server, a TUI) while `PtSampler::run` is still
/// executing. Only rank 0 writes it.
#[derive(Debug, Clone, Default)]
pub struct StatusSnapshot {
    pub iter: u64,
    pub niter: u64,
    pub cold_accept_rate: f64,
    pub n_eff: f64,
    pub finished: bool,
}

/// Final bookkeeping for one rank, returned from [`PtSampler::run`].
#[derive(Debug, Clone)]
pub struct RankSummary {
    pub rank: usize,
    pub temp: f64,
    pub iterations: u64,
    pub accept_rate: f64,
    pub swap_proposed: u64,
    pub swap_accepted: u64,
}

/// What a completed (or terminated-early) run produced.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub ranks: Vec<RankSummary>,
    pub final_neff: f64,
}

/// The K-rank parallel tempering sampler. `LL`/`LP` are the user's
/// log-likelihood and log-prior closures; each rank thread gets its own
/// `Clone` of them (rather than sharing one behind an `Arc`) so a closure
/// that is not internally `Sync` still works, matching a "clone of the
/// closures per rank" model.
pub struct PtSampler<LL, LP>
where
    LL: Fn(&[f64]) -> f64 + Clone + Send + 'static,
    LP: Fn(&[f64]) -> f64 + Clone + Send + 'static,
{
    config: SamplerConfig,
    ladder: Vec<f64>,
    logl: LL,
    logp: LP,
    x0: Vec<f64>,
    kde_factory: Option<KdeFactory>,
    autocorr: Option<Box<dyn AutocorrEstimator>>,
    status: Arc<Mutex<StatusSnapshot>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<LL, LP> PtSampler<LL, LP>
where
    LL: Fn(&[f64]) -> f64 + Clone + Send + 'static,
    LP: Fn(&[f64]) -> f64 + Clone + Send + 'static,
{
    /// Build a `k`-rank ladder from `config`'s temperature knobs.
    pub fn new(config: SamplerConfig, k: usize, logl: LL, logp: LP) -> Result<Self> {
        config.validate()?;
        let ladder = temperature_ladder(k, config.ndim, config.tmin, config.tmax, config.tstep)?;
        let x0 = vec![0.0; config.ndim];
        Ok(Self {
            config,
            ladder,
            logl,
            logp,
            x0,
            kde_factory: None,
            autocorr: None,
            status: Arc::new(Mutex::new(StatusSnapshot::default())),
            cancel: None,
        })
    }

    /// A single-chain (`K = 1`, `T = 1`) sampler — plain Metropolis with
    /// no tempering or swaps.
    pub fn single_chain(config: SamplerConfig, logl: LL, logp: LP) -> Result<Self> {
        Self::new(config, 1, logl, logp)
    }

    pub fn x0(mut self, x0: Vec<f64>) -> Self {
        self.x0 = x0;
        self
    }

    /// Without a KDE factory, the KDE kernel stays inactive even if
    /// `kde_weight > 0` — a warning is logged once at run start rather
    /// than treated as a fatal configuration error.
    pub fn kde_factory(mut self, factory: KdeFactory) -> Self {
        self.kde_factory = Some(factory);
        self
    }

    /// Without an autocorrelation estimator, `N_eff` stays `0.0` for the
    /// whole run and termination falls back to `iter >= niter`.
    pub fn autocorr_estimator(mut self, estimator: Box<dyn AutocorrEstimator>) -> Self {
        self.autocorr = Some(estimator);
        self
    }

    /// A cloneable handle onto the live status snapshot, meant to be
    /// handed to a status server (the companion `ptmcmc-server` crate)
    /// before calling the blocking [`Self::run`].
    pub fn status(&self) -> Arc<Mutex<StatusSnapshot>> {
        Arc::clone(&self.status)
    }

    /// Wire an external cancellation flag (e.g. a `ctrlc` handler
    /// installed by the CLI) into rank 0's own termination check: a
    /// `Ctrl+C` sets this the same way `N_eff`/`Niter` completion would,
    /// so the run checkpoints and drains in-flight swap handshakes instead
    /// of being killed mid-write.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Run to completion (or early termination via the `N_eff` target):
    /// spawn one thread per rank, join them all, and return each rank's
    /// final bookkeeping. The first rank-thread error observed is
    /// returned; a panicking rank thread surfaces as
    /// [`SamplerError::PeerDisconnected`] for rank 0, since its neighbors
    /// will have already detected the vanished channel.
    pub fn run(self) -> Result<RunSummary> {
        if self.config.kde_weight > 0 && self.kde_factory.is_none() {
            log::warn!(
                "coordinator: kde_weight > 0 but no kde_factory was supplied; the KDE kernel will stay inactive for this run"
            );
        }
        if self.autocorr.is_none() {
            log::warn!(
                "coordinator: no autocorr estimator supplied; N_eff-based early termination is disabled, falling back to niter"
            );
        }

        let k = self.ladder.len();
        let mut lower_tx: Vec<Option<Sender<SwapMsg>>> = (0..k).map(|_| None).collect();
        let mut lower_rx: Vec<Option<Receiver<SwapMsg>>> = (0..k).map(|_| None).collect();
        let mut upper_tx: Vec<Option<Sender<SwapMsg>>> = (0..k).map(|_| None).collect();
        let mut upper_rx: Vec<Option<Receiver<SwapMsg>>> = (0..k).map(|_| None).collect();
        for j in 0..k.saturating_sub(1) {
            let (up_tx, up_rx) = mpsc::channel::<SwapMsg>();
            let (down_tx, down_rx) = mpsc::channel::<SwapMsg>();
            lower_tx[j] = Some(up_tx);
            upper_rx[j + 1] = Some(up_rx);
            upper_tx[j + 1] = Some(down_tx);
            lower_rx[j] = Some(down_rx);
        }

        let mut broadcast_tx: Vec<Sender<BroadcastMsg>> = Vec::new();
        let mut broadcast_rx: Vec<Option<Receiver<BroadcastMsg>>> = (0..k).map(|_| None).collect();
        for r in 1..k {
            let (tx, rx) = mpsc::channel::<BroadcastMsg>();
            broadcast_tx.push(tx);
            broadcast_rx[r] = Some(rx);
        }

        let mut broadcast_tx_holder = Some(broadcast_tx);
        let mut autocorr_holder = self.autocorr;
        let mut handles = Vec::with_capacity(k);

        for rank in 0..k {
            let ladder = self.ladder.clone();
            let config = self.config.clone();
            let x0 = self.x0.clone();
            let logl = self.logl.clone();
            let logp = self.logp.clone();
            let lt = lower_tx[rank].take();
            let lr = lower_rx[rank].take();
            let ut = upper_tx[rank].take();
            let ur = upper_rx[rank].take();
            let kde_factory = self.kde_factory.clone();
            let autocorr = if rank == 0 { autocorr_holder.take() } else { None };
            let btx = if rank == 0 {
                broadcast_tx_holder.take().unwrap_or_default()
            } else {
                Vec::new()
            };
            let brx = broadcast_rx[rank].take();
            let status = if rank == 0 { Some(Arc::clone(&self.status)) } else { None };
            let cancel = if rank == 0 { self.cancel.clone() } else { None };

            handles.push(thread::spawn(move || {
                run_rank(
                    rank, ladder, config, x0, logl, logp, lt, lr, ut, ur, kde_factory, autocorr, btx, brx, status,
                    cancel,
                )
            }));
        }

        let mut ranks = Vec::with_capacity(k);
        let mut first_err: Option<SamplerError> = None;
        for (rank, handle) in handles.into_iter().enumerate() {
            match handle.join() {
                Ok(Ok(summary)) => ranks.push(summary),
                Ok(Err(e)) => {
                    log::warn!("rank {rank} exited with an error: {e}");
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
                Err(_) => {
                    log::warn!("rank {rank} thread panicked");
                    if first_err.is_none() {
                        first_err = Some(SamplerError::PeerDisconnected { rank });
                    }
                }
            }
        }

        if let Some(e) = first_err {
            return Err(e);
        }

        ranks.sort_by_key(|r| r.rank);
        let final_neff = self.status.lock().expect("status mutex poisoned").n_eff;
        Ok(RunSummary { ranks, final_neff })
    }
}

#[allow(clippy::too_many_arguments)]
fn run_rank<LL, LP>(
    rank: usize,
    ladder: Vec<f64>,
    config: SamplerConfig,
    x0: Vec<f64>,
    logl: LL,
    logp: LP,
    lower_tx: Option<Sender<SwapMsg>>,
    lower_rx: Option<Receiver<SwapMsg>>,
    upper_tx: Option<Sender<SwapMsg>>,
    upper_rx: Option<Receiver<SwapMsg>>,
    kde_factory: Option<KdeFactory>,
    autocorr: Option<Box<dyn AutocorrEstimator>>,
    broadcast_tx: Vec<Sender<BroadcastMsg>>,
    broadcast_rx: Option<Receiver<BroadcastMsg>>,
    status: Option<Arc<Mutex<StatusSnapshot>>>,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<RankSummary>
where
    LL: Fn(&[f64]) -> f64 + Send + 'static,
    LP: Fn(&[f64]) -> f64 + Send + 'static,
{
    let temp = ladder[rank];
    let mut rng = StdRng::seed_from_u64(config.seed ^ (rank as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));

    let logl_box: LogDensityFn = Box::new(logl);
    let logp_box: LogDensityFn = Box::new(logp);

    let (mut store, resumed) = ChainStore::open(&config.out_dir, temp, config.ndim, config.thin, config.resume)?;
    let last_iter = resumed.len() as u64 * config.thin.max(1);

    let cov0 = config.cov.clone();
    let eigen0 = jacobi_eigen(&cov0, 1e-10, 200);
    let mut state = ChainState::new(rank, temp, x0, cov0, eigen0);
    state.cycle.add(KernelKind::Scam, config.scam_weight, &mut rng)?;
    state.cycle.add(KernelKind::Am, config.am_weight, &mut rng)?;

    if let Some(last) = resumed.last() {
        mcmc::replay(&mut state, last_iter, last.x.clone(), last.logl, last.logpi, last.local_accept_rate);
        if config.tskip > 0 {
            state.nswap_proposed = last_iter / config.tskip;
            state.nswap_accepted = (state.nswap_proposed as f64 * last.swap_accept_rate).round() as u64;
        }
    } else {
        state.evaluate_initial(&logl_box, &logp_box);
    }

    let mut adaptation = if rank == 0 {
        let engine_factory = kde_factory.clone();
        let boxed: Box<dyn Fn(&[Vec<f64>]) -> Box<dyn Kde> + Send> = match engine_factory {
            Some(f) => Box::new(move |samples: &[Vec<f64>]| f(samples)),
            None => Box::new(|samples: &[Vec<f64>]| -> Box<dyn Kde> { Box::new(InertKde::fit(samples)) }),
        };
        Some(AdaptationEngine::new(config.cov.clone(), boxed))
    } else {
        None
    };
    let kde_enabled = kde_factory.is_some();
    let mut am_buffer: Vec<Vec<f64>> = Vec::new();

    let autocorr = autocorr.unwrap_or_else(|| Box::new(NoAutocorr));

    let max_iter = config.max_iter_for_rank(rank);
    let mut iter = last_iter + 1;
    let mut last_completed = last_iter;
    let mut terminate = false;

    while iter <= max_iter {
        if rank != 0 {
            if let Some(rx) = &broadcast_rx {
                loop {
                    match rx.try_recv() {
                        Ok(BroadcastMsg::Cov(cov, eigen)) => {
                            state.cov = cov;
                            state.eigen = eigen;
                        }
                        Ok(BroadcastMsg::DeBuffer(buf)) => {
                            state.de_buffer = buf;
                            // Unguarded broadcast site: preserved quirk.
                            // The iter == burn site below guards with
                            // `contains`; this one does not, so a hot
                            // chain can re-add the DE kernel on every
                            // broadcast it receives after its own local
                            // burn transition has already fired once.
                            state.cycle.add(KernelKind::De, config.de_weight, &mut rng)?;
                        }
                        Ok(BroadcastMsg::Kde(kde)) => {
                            state.kde = Some(kde);
                            if !state.cycle.contains(KernelKind::Kde) {
                                state.cycle.add(KernelKind::Kde, config.kde_weight, &mut rng)?;
                            }
                        }
                        Ok(BroadcastMsg::Term) => terminate = true,
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => {
                            // Rank 0 has already exited (it only ever
                            // drops this sender after finishing its own
                            // loop), so a disconnect here is equivalent
                            // to a TERM that arrived too late to be
                            // enqueued — not a peer failure.
                            terminate = true;
                            break;
                        }
                    }
                }
            }
            // Yield instead of busy-spinning while waiting for the next
            // broadcast or swap round.
            thread::sleep(Duration::from_micros(1));
            if terminate {
                break;
            }
        }

        // Burn transition: applies on every rank's own iteration
        // counter, not cold-chain only — see the broadcast site above for
        // why that matters.
        if iter == config.burn && !state.cycle.contains(KernelKind::De) {
            state.cycle.add(KernelKind::De, config.de_weight, &mut rng)?;
        }

        let kde_override: Option<&dyn Kde> = adaptation.as_ref().and_then(|a| a.kde());
        mcmc::step(&mut state, iter, &logl_box, &logp_box, None, kde_override, &mut rng);

        if config.tskip > 0 && iter % config.tskip == 0 {
            let peer_gone = swap_round(rank, &ladder, &mut state, &logp_box, &lower_tx, &lower_rx, &upper_tx, &upper_rx, &mut rng)?;
            if peer_gone {
                terminate = true;
            }
        }

        if let Some(adapt) = adaptation.as_mut() {
            // Buffered after the swap round so the cold chain's recorded
            // history matches the state it actually ends the iteration in
            // (the state downstream covariance/DE/KDE refreshes are fit
            // against, and what the chain store persists).
            am_buffer.push(state.x.clone());

            if let Some(AdaptationEvent::Covariance { cov, eigen }) = adapt.maybe_update_covariance(iter, config.cov_update, &am_buffer) {
                state.cov = cov.clone();
                state.eigen = eigen.clone();
                for tx in &broadcast_tx {
                    let _ = tx.send(BroadcastMsg::Cov(cov.clone(), eigen.clone()));
                }
            }
            if let Some(AdaptationEvent::DeBuffer(buf)) = adapt.maybe_update_de_buffer(iter, config.burn, &am_buffer) {
                state.de_buffer = buf.clone();
                for tx in &broadcast_tx {
                    let _ = tx.send(BroadcastMsg::DeBuffer(buf.clone()));
                }
            }
            let effective_kde_weight = if kde_enabled { config.kde_weight } else { 0 };
            if let Some(AdaptationEvent::KdeActivated) =
                adapt.maybe_update_kde(iter, config.burn, config.kde_update, effective_kde_weight, &am_buffer)
            {
                if !state.cycle.contains(KernelKind::Kde) {
                    state.cycle.add(KernelKind::Kde, config.kde_weight, &mut rng)?;
                }
                if let Some(factory) = &kde_factory {
                    let burn = config.burn as usize;
                    for tx in &broadcast_tx {
                        let _ = tx.send(BroadcastMsg::Kde(factory(&am_buffer[burn..])));
                    }
                }
            }
        }

        let local_accept_rate = state.naccepted / iter as f64;
        let swap_accept_rate = if state.nswap_proposed > 0 {
            state.nswap_accepted as f64 / state.nswap_proposed as f64
        } else {
            0.0
        };
        store.record(
            iter,
            StoredSample {
                logpi: state.logpi,
                logl: state.logl,
                local_accept_rate,
                swap_accept_rate,
                x: state.x.clone(),
            },
        );
        store.maybe_flush(iter, config.isave)?;
        if rank == 0 && config.isave > 0 && iter % config.isave == 0 {
            let _ = write_cov_snapshot(&config.out_dir, &state.cov);
        }

        if rank == 0 {
            if let Some(snapshot) = &status {
                if config.isave == 0 || iter % config.isave == 0 {
                    let mut snap = snapshot.lock().expect("status mutex poisoned");
                    snap.iter = iter;
                    snap.niter = config.niter;
                    snap.cold_accept_rate = local_accept_rate;
                }
            }

            let burn2 = 2 * config.burn;
            let neff_due = iter % 1000 == 0 && iter > burn2;
            let niter_reached = iter >= config.niter.saturating_sub(1);
            let cancelled = cancel.as_ref().is_some_and(|c| c.load(Ordering::Relaxed));
            if neff_due || niter_reached || cancelled {
                let neff = if neff_due {
                    ess::effective_sample_size(&am_buffer, config.burn as usize, autocorr.as_ref())
                } else {
                    0.0
                };
                if let Some(snapshot) = &status {
                    let mut snap = snapshot.lock().expect("status mutex poisoned");
                    if neff_due {
                        snap.n_eff = neff;
                    }
                }
                if niter_reached || cancelled || neff > config.neff_target {
                    for tx in &broadcast_tx {
                        let _ = tx.send(BroadcastMsg::Term);
                    }
                    terminate = true;
                }
            }
        }

        last_completed = iter;
        if terminate {
            if rank == 0 {
                if let Some(snapshot) = &status {
                    snapshot.lock().expect("status mutex poisoned").finished = true;
                }
            }
            break;
        }
        iter += 1;
    }

    store.flush()?;

    let accept_rate = if last_completed > 0 {
        state.naccepted / last_completed as f64
    } else {
        0.0
    };
    Ok(RankSummary {
        rank,
        temp,
        iterations: last_completed,
        accept_rate,
        swap_proposed: state.nswap_proposed,
        swap_accepted: state.nswap_accepted,
    })
}

/// One swap attempt: every rank with a lower neighbor proposes,
/// every rank with an upper neighbor decides. Both halves run in the same
/// function call per rank per step since a rank in the middle of the
/// ladder plays both roles at once; the two halves never block on each
/// other because `send` is non-blocking and each half's `recv`s target a
/// distinct channel pair.
///
/// Returns `Ok(true)` if a neighbor's channel was found disconnected
/// mid-handshake. Rank 0 only ever drops its end of a swap channel after
/// it has already decided to stop (the termination check runs after
/// this round, not before), so from a neighbor's point of view that
/// disconnect is indistinguishable from "the run is over" — it is
/// reported up as a graceful stop request, not a hard error, so that a
/// normal N_eff-triggered termination never surfaces as a failed run for
/// the hotter ranks racing slightly ahead of rank 0's own loop.
#[allow(clippy::too_many_arguments)]
fn swap_round(
    rank: usize,
    ladder: &[f64],
    state: &mut ChainState,
    logp_box: &LogDensityFn,
    lower_tx: &Option<Sender<SwapMsg>>,
    lower_rx: &Option<Receiver<SwapMsg>>,
    upper_tx: &Option<Sender<SwapMsg>>,
    upper_rx: &Option<Receiver<SwapMsg>>,
    rng: &mut dyn RngCore,
) -> Result<bool> {
    if let Some(tx) = lower_tx {
        let _ = tx.send(SwapMsg::LogL(state.logl));
        // Swap accounting is asymmetric across the pair on purpose:
        // only the lower/colder rank of each pair increments
        // `nswap_proposed`/`nswap_accepted`; the upper rank's own
        // counters never move for this pair's attempts.
        state.nswap_proposed += 1;
    }

    if let (Some(rx), Some(tx)) = (upper_rx, upper_tx) {
        let logl_lower = match rx.recv() {
            Ok(SwapMsg::LogL(v)) => v,
            Ok(_) | Err(_) => return Ok(true),
        };
        let temp_lower = ladder[rank - 1];
        let alpha = (1.0 / temp_lower - 1.0 / state.temp) * (logl_lower - state.logl);
        let u: f64 = rng.random();
        let accept = u.ln() < alpha;
        let _ = tx.send(SwapMsg::Decision(accept));
        if accept {
            if let Ok(SwapMsg::LogL(logl_lower2)) = rx.recv() {
                let _ = tx.send(SwapMsg::LogL(state.logl));
                if let Ok(SwapMsg::State(x_lower)) = rx.recv() {
                    let _ = tx.send(SwapMsg::State(state.x.clone()));
                    state.x = x_lower;
                    state.logl = logl_lower2;
                    let lp = logp_box(&state.x);
                    state.logpi = state.beta * state.logl + lp;
                }
            }
        }
    }

    if let (Some(tx), Some(rx)) = (lower_tx, lower_rx) {
        match rx.recv() {
            Ok(SwapMsg::Decision(true)) => {
                state.nswap_accepted += 1;
                let _ = tx.send(SwapMsg::LogL(state.logl));
                if let Ok(SwapMsg::LogL(logl_upper)) = rx.recv() {
                    let _ = tx.send(SwapMsg::State(state.x.clone()));
                    if let Ok(SwapMsg::State(x_upper)) = rx.recv() {
                        state.x = x_upper;
                        state.logl = logl_upper;
                        let lp = logp_box(&state.x);
                        state.logpi = state.beta * state.logl + lp;
                    }
                }
            }
            Ok(SwapMsg::Decision(false)) => {}
            Ok(_) | Err(_) => return Ok(true),
        }
    }

    Ok(false)
}

/// A KDE that is never sampled from because `kde_weight` is always forced
/// to zero alongside it (no factory supplied). Exists only so
/// `AdaptationEngine::new` always has a concrete factory to hold.
struct InertKde;
impl Kde for InertKde {
    fn fit(_samples: &[Vec<f64>]) -> Self {
        InertKde
    }
    fn sample(&self, _rng: &mut dyn RngCore) -> Vec<f64> {
        Vec::new()
    }
    fn log_pdf(&self, _x: &[f64]) -> f64 {
        f64::NEG_INFINITY
    }
}

struct NoAutocorr;
impl AutocorrEstimator for NoAutocorr {
    fn integrated_time(&self, _samples: &[f64]) -> Option<f64> {
        None
    }
}
