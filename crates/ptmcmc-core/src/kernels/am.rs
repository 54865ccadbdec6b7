//! Adaptive Metropolis (AM): `q ~ N(x, c^2 * Σ)`.

use super::{KernelContext, Proposal, draw_scale};
use rand::Rng;
use rand::RngCore;
use rand_distr::StandardNormal;

pub fn propose(x: &[f64], ctx: &KernelContext, rng: &mut dyn RngCore) -> Proposal {
    let d = ctx.ndim;
    let scale = draw_scale(rng, ctx.temp);
    let c = 2.4 / (2.0 * d as f64).sqrt() * scale.sqrt();

    // q = x + c * U * diag(sqrt(S)) * z, z ~ N(0, I) — samples from
    // N(x, c^2 * Sigma) using the eigenbasis already maintained for SCAM,
    // rather than a fresh Cholesky factorization of Sigma.
    let z: Vec<f64> = (0..d).map(|_| rng.sample::<f64, _>(StandardNormal)).collect();
    let scaled: Vec<f64> = (0..d).map(|i| ctx.eigen.s[i].max(0.0).sqrt() * z[i]).collect();
    let delta = ctx.eigen.u.mul_vec(&scaled);

    let q: Vec<f64> = (0..d).map(|i| x[i] + c * delta[i]).collect();
    Proposal { y: q, qxy: 0.0 }
}
