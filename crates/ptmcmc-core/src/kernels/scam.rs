//! Single-Component Adaptive Metropolis (SCAM).

use super::{KernelContext, Proposal, draw_scale};
use rand::Rng;
use rand::RngCore;
use rand_distr::StandardNormal;

pub fn propose(x: &[f64], ctx: &KernelContext, rng: &mut dyn RngCore) -> Proposal {
    let d = ctx.ndim;

    let prob: f64 = rng.random();
    let block = if prob > (1.0 - 1.0 / d as f64) {
        d
    } else if prob > (1.0 - 2.0 / d as f64) {
        (d as f64 / 2.0).ceil() as usize
    } else if prob > 0.8 {
        d.min(5)
    } else {
        1
    };

    let scale = draw_scale(rng, ctx.temp);

    // project into the eigenbasis: y = U^T x
    let mut y = ctx.eigen.u.mul_vec_transposed(x);

    let mut ind: Vec<usize> = (0..block).map(|_| rng.random_range(0..d)).collect();
    ind.sort_unstable();
    ind.dedup();
    let n_eff = ind.len();
    let cd = 2.4 / ((2.0 * n_eff as f64).sqrt()) * scale;

    for &i in &ind {
        let xi: f64 = rng.sample(StandardNormal);
        y[i] += xi * cd * ctx.eigen.s[i].max(0.0).sqrt();
    }

    let q = ctx.eigen.u.mul_vec(&y);
    Proposal { y: q, qxy: 0.0 }
}
