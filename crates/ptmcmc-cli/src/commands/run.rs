//! `ptmcmc run` — start a fresh sampler.

use ptmcmc_core::coordinator::RunSummary;
use ptmcmc_core::error::Result;

use super::{execute, SamplerArgs};

pub fn run(args: &SamplerArgs, out_dir: &str) -> Result<RunSummary> {
    execute(args, out_dir, false)
}
