//! CLI for ptmcmc — run, resume, and inspect parallel tempering MCMC
//! samplers.

mod commands;

use clap::{Parser, Subcommand};

use commands::SamplerArgs;
use commands::info::InfoArgs;

#[derive(Parser)]
#[command(name = "ptmcmc")]
#[command(about = "ptmcmc — parallel tempering MCMC with adaptive jump proposals")]
#[command(version = ptmcmc_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a fresh sampler run
    Run {
        #[command(flatten)]
        sampler: SamplerArgs,

        /// Directory to write chain files, checkpoints, and cov.json
        #[arg(long, default_value = "./chains")]
        out_dir: String,
    },

    /// Reopen an existing `out_dir` and continue sampling (`resume = true`)
    Resume {
        #[command(flatten)]
        sampler: SamplerArgs,

        /// Existing run directory to resume from
        #[arg(long)]
        out_dir: String,
    },

    /// Print the temperature ladder and cycle composition without sampling
    Info {
        /// Run directory to inspect (for an existing cov.json, if any)
        #[arg(long, default_value = "./chains")]
        out_dir: String,

        #[arg(long, default_value_t = 4)]
        ndim: usize,

        #[arg(long, default_value_t = 1)]
        k: usize,

        #[arg(long, default_value_t = 1.0)]
        tmin: f64,

        #[arg(long)]
        tmax: Option<f64>,

        #[arg(long)]
        tstep: Option<f64>,

        #[arg(long, default_value_t = 20)]
        scam_weight: u32,

        #[arg(long, default_value_t = 20)]
        am_weight: u32,

        #[arg(long, default_value_t = 20)]
        de_weight: u32,

        #[arg(long, default_value_t = 30)]
        kde_weight: u32,

        /// Print the report as JSON instead of a human-readable table
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { sampler, out_dir } => match commands::run::run(&sampler, &out_dir) {
            Ok(summary) => print_summary(&summary),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        Commands::Resume { sampler, out_dir } => match commands::resume::run(&sampler, &out_dir) {
            Ok(summary) => print_summary(&summary),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        Commands::Info {
            out_dir,
            ndim,
            k,
            tmin,
            tmax,
            tstep,
            scam_weight,
            am_weight,
            de_weight,
            kde_weight,
            json,
        } => commands::info::run(&InfoArgs {
            out_dir,
            ndim,
            k,
            tmin,
            tmax,
            tstep,
            scam_weight,
            am_weight,
            de_weight,
            kde_weight,
            json,
        }),
    }
}

fn print_summary(summary: &ptmcmc_core::coordinator::RunSummary) {
    println!();
    println!("Run complete. N_eff = {:.1}", summary.final_neff);
    for rank in &summary.ranks {
        println!(
            "  rank {:<3} T = {:<10.4} iters = {:<10} accept = {:.3} swap = {}/{}",
            rank.rank, rank.temp, rank.iterations, rank.accept_rate, rank.swap_accepted, rank.swap_proposed
        );
    }
}
