//! Chain diagnostics: a small statistical test battery for judging
//! whether a finished (or in-flight) PT-MCMC run actually converged.
//!
//! Each test returns a [`TestResult`] with a p-value (where applicable), a
//! pass/fail determination, and a letter grade (A through F), mirroring the
//! grading scheme used elsewhere in this workspace's test tooling.

mod autocorr;
mod kde;

pub use autocorr::{WindowedAutocorr, integrated_autocorr_time};
pub use kde::GaussianKde;

use ptmcmc_core::ess::{AutocorrEstimator, effective_sample_size};
use ptmcmc_core::linalg::{Mat, is_psd, jacobi_eigen};
use statrs::distribution::{ContinuousCDF, FisherSnedecor, Normal};

// ═══════════════════════════════════════════════════════════════════════════════
// Core types
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of a single diagnostic test.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub p_value: Option<f64>,
    pub statistic: f64,
    pub details: String,
    pub grade: char,
}

impl TestResult {
    /// Assign a letter grade based on p-value.
    ///
    /// - A: p >= 0.1
    /// - B: p >= 0.01
    /// - C: p >= 0.001
    /// - D: p >= 0.0001
    /// - F: otherwise or None
    pub fn grade_from_p(p: Option<f64>) -> char {
        match p {
            Some(p) if p >= 0.1 => 'A',
            Some(p) if p >= 0.01 => 'B',
            Some(p) if p >= 0.001 => 'C',
            Some(p) if p >= 0.0001 => 'D',
            _ => 'F',
        }
    }

    /// Determine pass/fail from p-value against a threshold (default 0.01).
    pub fn pass_from_p(p: Option<f64>, threshold: f64) -> bool {
        match p {
            Some(p) => p >= threshold,
            None => false,
        }
    }

    fn insufficient(name: &str, needed: usize, got: usize) -> TestResult {
        TestResult {
            name: name.to_string(),
            passed: false,
            p_value: None,
            statistic: 0.0,
            details: format!("insufficient data: need {needed}, got {got}"),
            grade: 'F',
        }
    }
}

/// Everything a diagnostic needs about one finished or in-flight run.
///
/// `samples` is the post-burn cold-chain history (one `Vec<f64>` per
/// iteration). `parallel_chains` holds one or more independently-seeded
/// replicate chains over the same target for Gelman-Rubin; a single-chain
/// run may pass a slice containing only `samples` itself, in which case
/// the between-chain test degrades gracefully (see
/// [`gelman_rubin_rhat`]).
pub struct ChainDiagnosticsInput<'a> {
    pub samples: &'a [Vec<f64>],
    pub parallel_chains: &'a [Vec<Vec<f64>>],
    pub local_accept_rate: f64,
    pub swap_accept_rates: &'a [f64],
    pub cov: &'a Mat,
    pub autocorr: &'a dyn AutocorrEstimator,
}

fn mean_var(xs: &[f64]) -> (f64, f64) {
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, var)
}

fn column(samples: &[Vec<f64>], dim: usize) -> Vec<f64> {
    samples.iter().map(|x| x[dim]).collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// 1. Stationarity
// ═══════════════════════════════════════════════════════════════════════════════

/// Geweke's convergence diagnostic: compare the mean of the first 10% of
/// the post-burn chain against the mean of the last 50%, dimension 0 (the
/// chain is assumed pre-thinned enough that a per-dimension z-test is
/// representative of the whole vector). `z` should be within a couple of
/// standard deviations of zero if the chain has forgotten its start.
pub fn geweke_test(input: &ChainDiagnosticsInput) -> TestResult {
    let name = "Geweke Stationarity";
    let n = input.samples.len();
    if n < 20 {
        return TestResult::insufficient(name, 20, n);
    }
    let xs = column(input.samples, 0);
    let first_end = (n / 10).max(1);
    let last_start = n - (n / 2).max(1);
    let (m1, v1) = mean_var(&xs[..first_end]);
    let (m2, v2) = mean_var(&xs[last_start..]);
    let se = (v1 / first_end as f64 + v2 / (n - last_start) as f64).sqrt();
    if se <= 0.0 || !se.is_finite() {
        return TestResult {
            name: name.to_string(),
            passed: false,
            p_value: None,
            statistic: 0.0,
            details: "degenerate standard error (chain is constant)".to_string(),
            grade: 'F',
        };
    }
    let z = (m1 - m2) / se;
    let p = match Normal::new(0.0, 1.0) {
        Ok(normal) => 2.0 * (1.0 - normal.cdf(z.abs())),
        Err(_) => 0.0,
    };
    TestResult {
        name: name.to_string(),
        passed: TestResult::pass_from_p(Some(p), 0.05),
        p_value: Some(p),
        statistic: z,
        details: format!("z={z:.4}, first10%_mean={m1:.4}, last50%_mean={m2:.4}"),
        grade: TestResult::grade_from_p(Some(p)),
    }
}

/// Stationarity via variance ratio: split the post-burn history in half
/// and run an `F`-test on first-half vs second-half variance. A non-
/// stationary (still drifting or not yet equilibrated) chain tends to
/// show a large variance ratio in either direction.
pub fn stationarity_variance_ratio(input: &ChainDiagnosticsInput) -> TestResult {
    let name = "Stationarity Variance Ratio";
    let n = input.samples.len();
    if n < 20 {
        return TestResult::insufficient(name, 20, n);
    }
    let xs = column(input.samples, 0);
    let mid = n / 2;
    let (_, v1) = mean_var(&xs[..mid]);
    let (_, v2) = mean_var(&xs[mid..]);
    if v1 <= 0.0 || v2 <= 0.0 {
        return TestResult {
            name: name.to_string(),
            passed: false,
            p_value: None,
            statistic: 0.0,
            details: "one half has zero variance".to_string(),
            grade: 'F',
        };
    }
    let f_stat = v1.max(v2) / v1.min(v2);
    let d1 = (mid - 1).max(1) as f64;
    let d2 = ((n - mid) - 1).max(1) as f64;
    let p = match FisherSnedecor::new(d1, d2) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(f_stat)).max(0.0),
        Err(_) => 0.0,
    };
    TestResult {
        name: name.to_string(),
        passed: TestResult::pass_from_p(Some(p), 0.01),
        p_value: Some(p),
        statistic: f_stat,
        details: format!("F={f_stat:.4}, var1={v1:.6}, var2={v2:.6}"),
        grade: TestResult::grade_from_p(Some(p)),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// 2. Mixing across chains
// ═══════════════════════════════════════════════════════════════════════════════

/// Gelman-Rubin potential scale reduction factor `R_hat` on dimension 0.
/// With only one chain supplied, `R_hat` is undefined and this reports a
/// neutral pass rather than a spurious failure.
pub fn gelman_rubin_rhat(input: &ChainDiagnosticsInput) -> TestResult {
    let name = "Gelman-Rubin R-hat";
    let m = input.parallel_chains.len();
    if m < 2 {
        return TestResult {
            name: name.to_string(),
            passed: true,
            p_value: None,
            statistic: 1.0,
            details: "only one chain supplied, R-hat undefined".to_string(),
            grade: 'A',
        };
    }
    let n = input.parallel_chains.iter().map(|c| c.len()).min().unwrap_or(0);
    if n < 10 {
        return TestResult::insufficient(name, 10, n);
    }
    let chain_stats: Vec<(f64, f64)> = input
        .parallel_chains
        .iter()
        .map(|c| mean_var(&column(&c[..n], 0)))
        .collect();
    let grand_mean = chain_stats.iter().map(|(mean, _)| mean).sum::<f64>() / m as f64;
    let b = n as f64 / (m as f64 - 1.0)
        * chain_stats.iter().map(|(mean, _)| (mean - grand_mean).powi(2)).sum::<f64>();
    let w = chain_stats.iter().map(|(_, var)| var).sum::<f64>() / m as f64;
    if w <= 0.0 {
        return TestResult {
            name: name.to_string(),
            passed: false,
            p_value: None,
            statistic: f64::INFINITY,
            details: "zero within-chain variance".to_string(),
            grade: 'F',
        };
    }
    let var_hat = ((n as f64 - 1.0) / n as f64) * w + b / n as f64;
    let r_hat = (var_hat / w).sqrt();
    let passed = r_hat < 1.1;
    TestResult {
        name: name.to_string(),
        passed,
        p_value: None,
        statistic: r_hat,
        details: format!("R_hat={r_hat:.4} across {m} chains of length {n}"),
        grade: if r_hat < 1.01 {
            'A'
        } else if r_hat < 1.05 {
            'B'
        } else if r_hat < 1.1 {
            'C'
        } else if r_hat < 1.2 {
            'D'
        } else {
            'F'
        },
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// 3. Sample efficiency
// ═══════════════════════════════════════════════════════════════════════════════

/// Wraps [`ptmcmc_core::ess::effective_sample_size`] as a graded check:
/// `N_eff` below 1% of the chain length suggests the run is still too
/// autocorrelated to trust its posterior summaries.
pub fn effective_sample_size_check(input: &ChainDiagnosticsInput) -> TestResult {
    let name = "Effective Sample Size";
    let n = input.samples.len();
    if n < 32 {
        return TestResult::insufficient(name, 32, n);
    }
    let neff = effective_sample_size(input.samples, 0, input.autocorr);
    let ratio = neff / n as f64;
    let passed = ratio >= 0.01;
    TestResult {
        name: name.to_string(),
        passed,
        p_value: None,
        statistic: neff,
        details: format!("N_eff={neff:.1} of {n} samples ({:.2}%)", ratio * 100.0),
        grade: if ratio >= 0.1 {
            'A'
        } else if ratio >= 0.05 {
            'B'
        } else if ratio >= 0.01 {
            'C'
        } else if ratio >= 0.001 {
            'D'
        } else {
            'F'
        },
    }
}

/// Checks that the windowed autocorrelation function actually decays
/// (rather than staying pinned near 1, which is the signature of a chain
/// that never moves). Reports the lag at which `|rho|` first drops below
/// `0.1`, as a fraction of the chain length.
pub fn autocorrelation_decay(input: &ChainDiagnosticsInput) -> TestResult {
    let name = "Autocorrelation Decay";
    let n = input.samples.len();
    if n < 64 {
        return TestResult::insufficient(name, 64, n);
    }
    let xs = column(input.samples, 0);
    match integrated_autocorr_time(&xs, 5.0) {
        Some(tau) => {
            let ratio = tau / n as f64;
            let passed = ratio < 0.25;
            TestResult {
                name: name.to_string(),
                passed,
                p_value: None,
                statistic: tau,
                details: format!("tau={tau:.2}, chain_len={n} (tau/len={ratio:.4})"),
                grade: if ratio < 0.05 {
                    'A'
                } else if ratio < 0.1 {
                    'B'
                } else if ratio < 0.25 {
                    'C'
                } else if ratio < 0.5 {
                    'D'
                } else {
                    'F'
                },
            }
        }
        None => TestResult {
            name: name.to_string(),
            passed: false,
            p_value: None,
            statistic: f64::INFINITY,
            details: "autocorrelation never stabilized within the chain length".to_string(),
            grade: 'F',
        },
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// 4. Sampler health
// ═══════════════════════════════════════════════════════════════════════════════

/// A within-chain acceptance rate far from the textbook optimum (roughly
/// 20-50% for random-walk Metropolis in moderate dimension) usually means
/// the proposal scale is badly mistuned in one direction or the other.
pub fn acceptance_rate_range(input: &ChainDiagnosticsInput) -> TestResult {
    let name = "Acceptance Rate Range";
    let rate = input.local_accept_rate;
    let passed = (0.1..=0.7).contains(&rate);
    TestResult {
        name: name.to_string(),
        passed,
        p_value: None,
        statistic: rate,
        details: format!("local_accept_rate={rate:.4}"),
        grade: if (0.2..=0.5).contains(&rate) {
            'A'
        } else if (0.15..=0.6).contains(&rate) {
            'B'
        } else if (0.1..=0.7).contains(&rate) {
            'C'
        } else if (0.02..=0.9).contains(&rate) {
            'D'
        } else {
            'F'
        },
    }
}

/// Checks that swap acceptance between adjacent temperature ranks neither
/// collapses to zero (ladder spacing too wide, no mixing between ranks)
/// nor saturates near one (ladder spacing too tight, wasted ranks).
pub fn swap_acceptance_balance(input: &ChainDiagnosticsInput) -> TestResult {
    let name = "Swap Acceptance Balance";
    if input.swap_accept_rates.is_empty() {
        return TestResult {
            name: name.to_string(),
            passed: true,
            p_value: None,
            statistic: 0.0,
            details: "no adjacent-rank pairs (single-chain run)".to_string(),
            grade: 'A',
        };
    }
    let min_rate = input.swap_accept_rates.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_rate = input.swap_accept_rates.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let passed = min_rate >= 0.1 && max_rate <= 0.9;
    TestResult {
        name: name.to_string(),
        passed,
        p_value: None,
        statistic: min_rate,
        details: format!(
            "min={min_rate:.4}, max={max_rate:.4} across {} pairs",
            input.swap_accept_rates.len()
        ),
        grade: if min_rate >= 0.2 && max_rate <= 0.8 {
            'A'
        } else if min_rate >= 0.15 && max_rate <= 0.85 {
            'B'
        } else if min_rate >= 0.1 && max_rate <= 0.9 {
            'C'
        } else if min_rate >= 0.02 {
            'D'
        } else {
            'F'
        },
    }
}

/// Invariant check on the adaptive proposal covariance: it must stay
/// symmetric PSD, mirroring the guard the adaptation engine itself runs
/// before accepting a recomputed `Sigma`.
pub fn covariance_psd_invariant(input: &ChainDiagnosticsInput) -> TestResult {
    let name = "Covariance PSD Invariant";
    if !input.cov.is_symmetric(1e-9) {
        return TestResult {
            name: name.to_string(),
            passed: false,
            p_value: None,
            statistic: 0.0,
            details: "covariance matrix is not symmetric".to_string(),
            grade: 'F',
        };
    }
    let eigen = jacobi_eigen(input.cov, 1e-10, 200);
    let psd = is_psd(&eigen, 1e-8);
    let min_eig = eigen.s.iter().cloned().fold(f64::INFINITY, f64::min);
    TestResult {
        name: name.to_string(),
        passed: psd,
        p_value: None,
        statistic: min_eig,
        details: format!("min_eigenvalue={min_eig:.6e}"),
        grade: if psd { 'A' } else { 'F' },
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Battery
// ═══════════════════════════════════════════════════════════════════════════════

/// Run the full battery and collect every result, in a stable order.
pub fn run_all_tests(input: &ChainDiagnosticsInput) -> Vec<TestResult> {
    vec![
        geweke_test(input),
        stationarity_variance_ratio(input),
        gelman_rubin_rhat(input),
        effective_sample_size_check(input),
        autocorrelation_decay(input),
        acceptance_rate_range(input),
        swap_acceptance_balance(input),
        covariance_psd_invariant(input),
    ]
}

/// Average grade across the battery, mapped to a 0-100 scale
/// (A=100, B=75, C=50, D=25, F=0). Empty input scores zero rather than
/// dividing by zero.
pub fn calculate_quality_score(results: &[TestResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let total: f64 = results
        .iter()
        .map(|r| match r.grade {
            'A' => 100.0,
            'B' => 75.0,
            'C' => 50.0,
            'D' => 25.0,
            _ => 0.0,
        })
        .sum();
    total / results.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptmcmc_core::linalg::Mat;

    struct Lag1;
    impl AutocorrEstimator for Lag1 {
        fn integrated_time(&self, samples: &[f64]) -> Option<f64> {
            let n = samples.len();
            if n < 4 {
                return None;
            }
            let (mean, var) = mean_var(samples);
            if var <= 0.0 {
                return None;
            }
            let cov1: f64 = samples.windows(2).map(|w| (w[0] - mean) * (w[1] - mean)).sum::<f64>()
                / (n - 1) as f64;
            let rho1 = (cov1 / var).clamp(-0.999, 0.999);
            Some(((1.0 + rho1) / (1.0 - rho1)).max(1e-6))
        }
    }

    fn gaussian_chain(n: usize, seed: u64) -> Vec<Vec<f64>> {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state as f64 / u64::MAX as f64) - 0.5
        };
        (0..n).map(|_| vec![next(), next()]).collect()
    }

    #[test]
    fn grade_from_p_matches_thresholds() {
        assert_eq!(TestResult::grade_from_p(Some(0.5)), 'A');
        assert_eq!(TestResult::grade_from_p(Some(0.05)), 'B');
        assert_eq!(TestResult::grade_from_p(Some(0.005)), 'C');
        assert_eq!(TestResult::grade_from_p(Some(0.0005)), 'D');
        assert_eq!(TestResult::grade_from_p(Some(0.00000001)), 'F');
        assert_eq!(TestResult::grade_from_p(None), 'F');
    }

    #[test]
    fn pass_from_p_respects_threshold() {
        assert!(TestResult::pass_from_p(Some(0.05), 0.01));
        assert!(!TestResult::pass_from_p(Some(0.005), 0.01));
        assert!(!TestResult::pass_from_p(None, 0.01));
    }

    #[test]
    fn insufficient_data_is_reported() {
        let cov = Mat::identity(2);
        let estimator = Lag1;
        let samples = gaussian_chain(5, 1);
        let input = ChainDiagnosticsInput {
            samples: &samples,
            parallel_chains: &[],
            local_accept_rate: 0.3,
            swap_accept_rates: &[],
            cov: &cov,
            autocorr: &estimator,
        };
        let result = geweke_test(&input);
        assert!(!result.passed);
        assert!(result.details.contains("insufficient"));
    }

    #[test]
    fn well_mixed_chain_passes_most_of_the_battery() {
        let cov = Mat::identity(2);
        let estimator = Lag1;
        let samples = gaussian_chain(4000, 7);
        let input = ChainDiagnosticsInput {
            samples: &samples,
            parallel_chains: &[samples.clone(), gaussian_chain(4000, 11)],
            local_accept_rate: 0.35,
            swap_accept_rates: &[0.3, 0.4],
            cov: &cov,
            autocorr: &estimator,
        };
        let results = run_all_tests(&input);
        assert_eq!(results.len(), 8);
        let passed_count = results.iter().filter(|r| r.passed).count();
        assert!(
            passed_count >= results.len() - 1,
            "only {passed_count}/{} tests passed",
            results.len()
        );
    }

    #[test]
    fn constant_chain_fails_stationarity_and_acceptance_checks() {
        let cov = Mat::identity(1);
        let estimator = Lag1;
        let samples: Vec<Vec<f64>> = vec![vec![1.0]; 500];
        let input = ChainDiagnosticsInput {
            samples: &samples,
            parallel_chains: &[],
            local_accept_rate: 0.0,
            swap_accept_rates: &[0.0, 0.0],
            cov: &cov,
            autocorr: &estimator,
        };
        assert!(!acceptance_rate_range(&input).passed);
        assert!(!swap_acceptance_balance(&input).passed);
    }

    #[test]
    fn single_chain_rhat_is_a_neutral_pass() {
        let cov = Mat::identity(1);
        let estimator = Lag1;
        let samples = gaussian_chain(200, 3);
        let input = ChainDiagnosticsInput {
            samples: &samples,
            parallel_chains: &[],
            local_accept_rate: 0.3,
            swap_accept_rates: &[],
            cov: &cov,
            autocorr: &estimator,
        };
        let result = gelman_rubin_rhat(&input);
        assert!(result.passed);
        assert_eq!(result.statistic, 1.0);
    }

    #[test]
    fn non_psd_covariance_fails_the_invariant_check() {
        let mut cov = Mat::identity(2);
        cov.set(0, 1, 5.0);
        cov.set(1, 0, 5.0);
        let estimator = Lag1;
        let samples = gaussian_chain(100, 9);
        let input = ChainDiagnosticsInput {
            samples: &samples,
            parallel_chains: &[],
            local_accept_rate: 0.3,
            swap_accept_rates: &[],
            cov: &cov,
            autocorr: &estimator,
        };
        assert!(!covariance_psd_invariant(&input).passed);
    }

    #[test]
    fn quality_score_handles_empty_and_mixed_grades() {
        assert_eq!(calculate_quality_score(&[]), 0.0);
        let results = vec![
            TestResult {
                name: "a".into(),
                passed: true,
                p_value: Some(0.5),
                statistic: 0.0,
                details: String::new(),
                grade: 'A',
            },
            TestResult {
                name: "b".into(),
                passed: false,
                p_value: Some(0.0),
                statistic: 0.0,
                details: String::new(),
                grade: 'F',
            },
        ];
        assert!((calculate_quality_score(&results) - 50.0).abs() < 0.01);
    }
}
