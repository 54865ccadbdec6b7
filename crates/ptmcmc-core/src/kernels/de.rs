//! Differential Evolution (DE).

use super::{KernelContext, Proposal};
use rand::Rng;
use rand::RngCore;

pub fn propose(x: &[f64], ctx: &KernelContext, rng: &mut dyn RngCore) -> Proposal {
    let buf = ctx.de_buffer;
    let b = buf.len();

    // The cycle is responsible for not activating DE before the
    // buffer is populated; propose() stays total and no-ops rather than
    // panicking if it is ever called too early.
    if b < 2 {
        return Proposal {
            y: x.to_vec(),
            qxy: 0.0,
        };
    }

    let mm = rng.random_range(0..b);
    let mut nn = rng.random_range(0..b);
    while nn == mm {
        nn = rng.random_range(0..b);
    }

    let prob: f64 = rng.random();
    let scale = if prob > 0.5 {
        1.0
    } else {
        let u: f64 = rng.random();
        u * 2.4 / (2.0 * ctx.ndim as f64).sqrt() * (1.0 / ctx.beta).sqrt()
    };

    let q: Vec<f64> = (0..ctx.ndim)
        .map(|i| x[i] + scale * (buf[mm][i] - buf[nn][i]))
        .collect();

    Proposal { y: q, qxy: 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{Mat, jacobi_eigen};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn no_ops_before_buffer_is_populated() {
        let cov = Mat::identity(2);
        let eigen = jacobi_eigen(&cov, 1e-12, 100);
        let empty: Vec<Vec<f64>> = Vec::new();
        let c = KernelContext {
            ndim: 2,
            beta: 1.0,
            temp: 1.0,
            cov: &cov,
            eigen: &eigen,
            de_buffer: &empty,
            kde: None,
        };
        let mut rng = StdRng::seed_from_u64(0);
        let x = vec![1.0, 2.0];
        let prop = propose(&x, &c, &mut rng);
        assert_eq!(prop.y, x);
        assert_eq!(prop.qxy, 0.0);
    }

    #[test]
    fn uses_difference_of_two_distinct_buffer_entries() {
        let cov = Mat::identity(2);
        let eigen = jacobi_eigen(&cov, 1e-12, 100);
        let buf = vec![
            vec![0.0, 0.0],
            vec![10.0, 10.0],
            vec![-10.0, -10.0],
        ];
        let c = KernelContext {
            ndim: 2,
            beta: 1.0,
            temp: 1.0,
            cov: &cov,
            eigen: &eigen,
            de_buffer: &buf,
            kde: None,
        };
        let mut rng = StdRng::seed_from_u64(5);
        let x = vec![0.0, 0.0];
        let prop = propose(&x, &c, &mut rng);
        assert_eq!(prop.qxy, 0.0);
        assert!(prop.y.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn deterministic_given_seed() {
        let cov = Mat::identity(2);
        let eigen = jacobi_eigen(&cov, 1e-12, 100);
        let buf = vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![2.0, -1.0]];
        let c = KernelContext {
            ndim: 2,
            beta: 0.5,
            temp: 2.0,
            cov: &cov,
            eigen: &eigen,
            de_buffer: &buf,
            kde: None,
        };
        let x = vec![0.3, -0.3];

        let mut rng_a = StdRng::seed_from_u64(9);
        let mut rng_b = StdRng::seed_from_u64(9);
        let a = propose(&x, &c, &mut rng_a);
        let b = propose(&x, &c, &mut rng_b);
        assert_eq!(a.y, b.y);
    }
}
