//! `ptmcmc resume` — reopen an existing `out_dir` with `resume = true`.

use ptmcmc_core::coordinator::RunSummary;
use ptmcmc_core::error::Result;

use super::{execute, SamplerArgs};

pub fn run(args: &SamplerArgs, out_dir: &str) -> Result<RunSummary> {
    if !std::path::Path::new(out_dir).exists() {
        eprintln!("Error: out_dir {out_dir:?} does not exist — nothing to resume");
        std::process::exit(1);
    }
    execute(args, out_dir, true)
}
