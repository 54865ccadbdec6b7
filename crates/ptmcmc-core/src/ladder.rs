//! Temperature ladder construction.

use crate::error::{Result, SamplerError};

/// Build a geometrically spaced temperature ladder of length `k`.
///
/// - `tstep` explicit overrides everything else.
/// - Else if `tmax` is given, `tstep = exp(ln(tmax/tmin)/(k-1))`.
/// - Else `tstep = 1 + sqrt(2/ndim)` (the default spacing tuned for a
///   ~25% swap acceptance rate).
/// - `k == 1` always yields `[tmin]` regardless of the other knobs.
pub fn temperature_ladder(
    k: usize,
    ndim: usize,
    tmin: f64,
    tmax: Option<f64>,
    tstep: Option<f64>,
) -> Result<Vec<f64>> {
    if k == 0 {
        return Err(SamplerError::InvalidLadder("K must be >= 1".into()));
    }
    if tmin <= 0.0 {
        return Err(SamplerError::InvalidLadder("Tmin must be > 0".into()));
    }

    if k == 1 {
        return Ok(vec![tmin]);
    }

    let step = if let Some(t) = tstep {
        t
    } else if let Some(tmax) = tmax {
        if tmax <= tmin {
            return Err(SamplerError::InvalidLadder("Tmax must exceed Tmin".into()));
        }
        ((tmax / tmin).ln() / (k as f64 - 1.0)).exp()
    } else {
        1.0 + (2.0 / ndim as f64).sqrt()
    };

    Ok((0..k).map(|i| tmin * step.powi(i as i32)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_chain_ladder_is_tmin() {
        let ladder = temperature_ladder(1, 5, 1.0, Some(50.0), None).unwrap();
        assert_eq!(ladder, vec![1.0]);
    }

    #[test]
    fn ladder_is_strictly_increasing() {
        let ladder = temperature_ladder(8, 2, 1.0, Some(50.0), None).unwrap();
        assert_eq!(ladder.len(), 8);
        assert!((ladder[0] - 1.0).abs() < 1e-12);
        for w in ladder.windows(2) {
            assert!(w[1] > w[0]);
        }
        assert!((ladder[7] - 50.0).abs() < 1e-6);
    }

    #[test]
    fn default_tstep_uses_sqrt_rule() {
        let ladder = temperature_ladder(3, 4, 1.0, None, None).unwrap();
        let expected_step = 1.0 + (2.0f64 / 4.0).sqrt();
        assert!((ladder[1] / ladder[0] - expected_step).abs() < 1e-12);
    }

    #[test]
    fn rejects_zero_ranks() {
        assert!(temperature_ladder(0, 2, 1.0, None, None).is_err());
    }
}
