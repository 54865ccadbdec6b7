//! Gaussian KDE proposal.

use super::{KernelContext, Proposal};
use rand::RngCore;

pub fn propose(x: &[f64], ctx: &KernelContext, rng: &mut dyn RngCore) -> Proposal {
    let Some(kde) = ctx.kde else {
        return Proposal {
            y: x.to_vec(),
            qxy: 0.0,
        };
    };

    let q = kde.sample(rng);
    let p0 = kde.log_pdf(x);
    let p1 = kde.log_pdf(&q);
    Proposal {
        y: q,
        qxy: p0 - p1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kde::Kde;
    use crate::linalg::{Mat, jacobi_eigen};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct FixedKde {
        draw: Vec<f64>,
    }

    impl Kde for FixedKde {
        fn fit(_samples: &[Vec<f64>]) -> Self {
            unreachable!("not exercised by this test")
        }

        fn sample(&self, _rng: &mut dyn RngCore) -> Vec<f64> {
            self.draw.clone()
        }

        fn log_pdf(&self, x: &[f64]) -> f64 {
            -x.iter().map(|v| v * v).sum::<f64>()
        }
    }

    #[test]
    fn no_ops_without_a_fitted_kde() {
        let cov = Mat::identity(2);
        let eigen = jacobi_eigen(&cov, 1e-12, 100);
        let c = KernelContext {
            ndim: 2,
            beta: 1.0,
            temp: 1.0,
            cov: &cov,
            eigen: &eigen,
            de_buffer: &[],
            kde: None,
        };
        let mut rng = StdRng::seed_from_u64(0);
        let x = vec![1.0, 2.0];
        let prop = propose(&x, &c, &mut rng);
        assert_eq!(prop.y, x);
        assert_eq!(prop.qxy, 0.0);
    }

    #[test]
    fn qxy_is_log_density_ratio_at_x_and_proposed_y() {
        let cov = Mat::identity(2);
        let eigen = jacobi_eigen(&cov, 1e-12, 100);
        let kde = FixedKde {
            draw: vec![0.5, -0.5],
        };
        let c = KernelContext {
            ndim: 2,
            beta: 1.0,
            temp: 1.0,
            cov: &cov,
            eigen: &eigen,
            de_buffer: &[],
            kde: Some(&kde),
        };
        let mut rng = StdRng::seed_from_u64(0);
        let x = vec![1.0, 1.0];
        let prop = propose(&x, &c, &mut rng);
        assert_eq!(prop.y, vec![0.5, -0.5]);
        let expected = kde.log_pdf(&x) - kde.log_pdf(&prop.y);
        assert!((prop.qxy - expected).abs() < 1e-12);
    }
}
