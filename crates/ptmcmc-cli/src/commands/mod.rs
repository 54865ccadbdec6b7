pub mod info;
pub mod resume;
pub mod run;
pub mod targets;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ptmcmc_core::coordinator::{KdeFactory, PtSampler, RunSummary};
use ptmcmc_core::error::Result;
use ptmcmc_core::kde::Kde;
use ptmcmc_core::SamplerConfig;
use ptmcmc_diagnostics::{GaussianKde, WindowedAutocorr};

use targets::{LogLikelihoodFn, LogPriorFn};

/// Options shared by `run` and `resume` — everything except `out_dir`
/// and whether an existing run is being reopened.
#[derive(clap::Args, Debug)]
pub struct SamplerArgs {
    /// Built-in demonstration target: gaussian, rosenbrock, or ball
    #[arg(long, default_value = "gaussian", value_parser = ["gaussian", "rosenbrock", "ball"])]
    pub target: String,

    #[arg(long, default_value_t = 4)]
    pub ndim: usize,

    /// Number of temperature rungs (ranks)
    #[arg(long, default_value_t = 1)]
    pub k: usize,

    #[arg(long, default_value_t = 100_000)]
    pub niter: u64,

    #[arg(long, default_value_t = 10_000)]
    pub burn: u64,

    #[arg(long, default_value_t = 10)]
    pub thin: u64,

    #[arg(long, default_value_t = 1_000)]
    pub isave: u64,

    #[arg(long, default_value_t = 1.0)]
    pub tmin: f64,

    #[arg(long)]
    pub tmax: Option<f64>,

    #[arg(long)]
    pub tstep: Option<f64>,

    #[arg(long, default_value_t = 100)]
    pub tskip: u64,

    #[arg(long, default_value_t = 1_000)]
    pub cov_update: u64,

    #[arg(long, default_value_t = 10_000)]
    pub kde_update: u64,

    #[arg(long, default_value_t = 20)]
    pub scam_weight: u32,

    #[arg(long, default_value_t = 20)]
    pub am_weight: u32,

    #[arg(long, default_value_t = 20)]
    pub de_weight: u32,

    #[arg(long, default_value_t = 30)]
    pub kde_weight: u32,

    #[arg(long, default_value_t = 100_000.0)]
    pub neff_target: f64,

    #[arg(long, default_value_t = 0xC0FFEE)]
    pub seed: u64,

    /// Serve a read-only JSON status endpoint on this port while sampling
    #[arg(long)]
    pub status_port: Option<u16>,

    #[arg(long)]
    pub verbose: bool,
}

fn identity_cov(ndim: usize) -> Vec<Vec<f64>> {
    (0..ndim)
        .map(|i| (0..ndim).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect()
}

fn build_config(args: &SamplerArgs, out_dir: &str, resume: bool) -> SamplerConfig {
    let mut config = SamplerConfig::new(args.ndim, identity_cov(args.ndim))
        .out_dir(out_dir.to_string())
        .resume(resume)
        .verbose(args.verbose)
        .seed(args.seed)
        .niter(args.niter)
        .burn(args.burn)
        .thin(args.thin)
        .isave(args.isave)
        .tmin(args.tmin)
        .tskip(args.tskip)
        .cov_update(args.cov_update)
        .kde_update(args.kde_update)
        .weights(args.scam_weight, args.am_weight, args.de_weight, args.kde_weight)
        .neff_target(args.neff_target);
    if let Some(tmax) = args.tmax {
        config = config.tmax(tmax);
    }
    if let Some(tstep) = args.tstep {
        config = config.tstep(tstep);
    }
    config
}

fn gaussian_kde_factory() -> KdeFactory {
    Arc::new(|samples: &[Vec<f64>]| -> Box<dyn Kde> { Box::new(GaussianKde::fit(samples)) })
}

/// Shared body of `run` and `resume`: build the sampler from `args`,
/// wire the reference KDE and autocorrelation estimators, install the
/// `Ctrl+C` handler, optionally start the status server, and run to
/// completion.
pub fn execute(args: &SamplerArgs, out_dir: &str, resume: bool) -> Result<RunSummary> {
    log::info!(
        "starting ptmcmc: target={} ndim={} k={} resume={resume}",
        args.target,
        args.ndim,
        args.k.max(1)
    );
    let (logl, logp): (LogLikelihoodFn, LogPriorFn) = match targets::resolve(&args.target, args.ndim) {
        Ok(pair) => pair,
        Err(msg) => {
            eprintln!("Error: {msg}");
            std::process::exit(1);
        }
    };

    let config = build_config(args, out_dir, resume);
    let sampler = PtSampler::new(config, args.k.max(1), logl, logp)?
        .kde_factory(gaussian_kde_factory())
        .autocorr_estimator(Box::new(WindowedAutocorr::new()));

    let running = Arc::new(AtomicBool::new(false));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || r.store(true, Ordering::SeqCst)).expect("Error setting Ctrl+C handler");
    let sampler = sampler.cancel_flag(running);

    if let Some(port) = args.status_port {
        let status = sampler.status();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(ptmcmc_server::run_server(status, "127.0.0.1", port));
        });
        println!("Status server listening on http://127.0.0.1:{port}/status");
    }

    println!(
        "Sampling {} rank(s), target {:?}, out_dir {out_dir:?} (Ctrl+C to checkpoint and stop)",
        args.k.max(1),
        args.target
    );
    sampler.run()
}
