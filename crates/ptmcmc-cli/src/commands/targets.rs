//! Built-in demonstration targets for `ptmcmc run`/`resume` — small
//! closed-form log-likelihood/log-prior pairs so the sampler can be
//! exercised without linking against an external model.

/// All three targets are plain function items (no captured state), so
/// they coerce to the same `fn(&[f64]) -> f64` pointer type and
/// `PtSampler` never needs to be made generic over the CLI's choice.
pub type LogLikelihoodFn = fn(&[f64]) -> f64;
pub type LogPriorFn = fn(&[f64]) -> f64;

/// Standard `ndim`-dimensional normal log-likelihood.
fn gaussian_logl(x: &[f64]) -> f64 {
    -0.5 * x.iter().map(|v| v * v).sum::<f64>()
}

fn flat_logp(_x: &[f64]) -> f64 {
    0.0
}

/// 2D Rosenbrock "banana" density.
fn rosenbrock_logl(x: &[f64]) -> f64 {
    let a = 1.0 - x[0];
    let b = x[1] - x[0] * x[0];
    -(a * a + 100.0 * b * b) / 20.0
}

/// Standard normal likelihood behind a hard unit-ball prior — exercises
/// the prior-rejection path (`logp = -inf` outside `||x|| <= 1`).
fn ball_logp(x: &[f64]) -> f64 {
    let r2: f64 = x.iter().map(|v| v * v).sum();
    if r2 > 1.0 { f64::NEG_INFINITY } else { 0.0 }
}

/// Resolve a `--target` name into its `(logl, logp)` pair.
pub fn resolve(name: &str, ndim: usize) -> Result<(LogLikelihoodFn, LogPriorFn), String> {
    match name {
        "gaussian" => Ok((gaussian_logl, flat_logp)),
        "ball" => Ok((gaussian_logl, ball_logp)),
        "rosenbrock" => {
            if ndim != 2 {
                return Err(format!("target 'rosenbrock' requires --ndim 2, got {ndim}"));
            }
            Ok((rosenbrock_logl, flat_logp))
        }
        other => Err(format!(
            "unknown target {other:?} (expected gaussian, rosenbrock, or ball)"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_peaks_at_origin() {
        assert!(gaussian_logl(&[0.0, 0.0]) > gaussian_logl(&[1.0, 1.0]));
    }

    #[test]
    fn ball_rejects_outside_unit_sphere() {
        assert_eq!(ball_logp(&[2.0, 0.0]), f64::NEG_INFINITY);
        assert_eq!(ball_logp(&[0.5, 0.5]), 0.0);
    }

    #[test]
    fn rosenbrock_peaks_on_the_banana_ridge() {
        assert!(rosenbrock_logl(&[1.0, 1.0]) > rosenbrock_logl(&[0.0, 0.0]));
    }

    #[test]
    fn rosenbrock_rejects_wrong_ndim() {
        assert!(resolve("rosenbrock", 3).is_err());
    }

    #[test]
    fn unknown_target_is_an_error() {
        assert!(resolve("nonexistent", 4).is_err());
    }
}
