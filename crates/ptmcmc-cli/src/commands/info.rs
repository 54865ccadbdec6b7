//! `ptmcmc info` — print the temperature ladder and proposal-cycle
//! composition for an `out_dir` without sampling.

use std::fs;
use std::path::Path;

use ptmcmc_core::ladder::temperature_ladder;

pub struct InfoArgs {
    pub out_dir: String,
    pub ndim: usize,
    pub k: usize,
    pub tmin: f64,
    pub tmax: Option<f64>,
    pub tstep: Option<f64>,
    pub scam_weight: u32,
    pub am_weight: u32,
    pub de_weight: u32,
    pub kde_weight: u32,
    pub json: bool,
}

pub fn run(args: &InfoArgs) {
    let ladder = match temperature_ladder(args.k.max(1), args.ndim, args.tmin, args.tmax, args.tstep) {
        Ok(ladder) => ladder,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let cov_path = Path::new(&args.out_dir).join("cov.json");
    let cov = cov_path.exists().then(|| fs::read_to_string(&cov_path).ok()).flatten();

    if args.json {
        print_json(args, &ladder, cov.as_deref());
        return;
    }

    println!("Temperature ladder ({} rank(s)):", ladder.len());
    for (rank, temp) in ladder.iter().enumerate() {
        println!("  rank {rank:<3} T = {temp:.6}");
    }
    println!();

    let total = (args.scam_weight + args.am_weight + args.de_weight + args.kde_weight).max(1) as f64;
    println!("Proposal cycle composition:");
    for (name, weight) in [
        ("scam", args.scam_weight),
        ("am", args.am_weight),
        ("de", args.de_weight),
        ("kde", args.kde_weight),
    ] {
        println!("  {name:<5} {:>5.1}%  (weight {weight})", 100.0 * weight as f64 / total);
    }
    println!();

    match &cov {
        Some(contents) => {
            println!("Adaptive covariance snapshot ({}):", cov_path.display());
            println!("{contents}");
        }
        None => println!("No covariance snapshot yet at {}", cov_path.display()),
    }
}

fn print_json(args: &InfoArgs, ladder: &[f64], cov: Option<&str>) {
    let cov_value = cov.and_then(|s| serde_json::from_str::<serde_json::Value>(s).ok());
    let report = serde_json::json!({
        "ladder": ladder,
        "cycle_weights": {
            "scam": args.scam_weight,
            "am": args.am_weight,
            "de": args.de_weight,
            "kde": args.kde_weight,
        },
        "cov": cov_value,
    });
    println!("{}", serde_json::to_string_pretty(&report).unwrap());
}
