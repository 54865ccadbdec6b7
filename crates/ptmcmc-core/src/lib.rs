//! # ptmcmc-core
//!
//! A parallel tempering Markov Chain Monte Carlo sampler with adaptive jump
//! proposals (SCAM, AM, DE, Gaussian KDE) and a minimal trans-dimensional
//! (reversible-jump) extension.
//!
//! ## Quick start
//!
//! ```no_run
//! use ptmcmc_core::{SamplerConfig, PtSampler};
//!
//! let config = SamplerConfig::new(1, vec![vec![1.0]])
//!     .niter(50_000)
//!     .burn(5_000)
//!     .thin(1);
//!
//! let logl = |x: &[f64]| -0.5 * x[0] * x[0];
//! let logp = |_x: &[f64]| 0.0;
//!
//! let mut sampler = PtSampler::single_chain(config, logl, logp).unwrap();
//! sampler.run().unwrap();
//! ```
//!
//! ## Architecture
//!
//! `K` ranks, one per rung of the temperature ladder, run independently and
//! exchange state only through the message-passing primitives in
//! [`coordinator`]. Rank 0 (`T = 1`, the "cold" chain) owns the adaptive
//! covariance estimate, the differential-evolution buffer, and the KDE fit,
//! and periodically broadcasts them to the hotter ranks.

pub mod adaptation;
pub mod config;
pub mod coordinator;
pub mod cycle;
pub mod error;
pub mod ess;
pub mod kde;
pub mod kernels;
pub mod ladder;
pub mod linalg;
pub mod mcmc;
pub mod rjmcmc;
pub mod store;

pub use config::SamplerConfig;
pub use coordinator::{PtSampler, RunSummary, StatusSnapshot};
pub use error::SamplerError;
pub use ess::AutocorrEstimator;
pub use mcmc::{ChainState, StepOutcome};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
