//! Dense linear algebra primitives for small (tens-of-dimensions) covariance
//! matrices: a row-major `Mat`, a Jacobi eigenvalue solver for symmetric
//! matrices, and Welford's running mean/covariance update.
//!
//! The original sampler calls `numpy.linalg.svd` on a symmetric covariance
//! matrix. For a symmetric PSD matrix the SVD and the eigendecomposition
//! coincide (`Σ = U Λ Uᵀ` with `Λ ⪰ 0`), so a Jacobi eigenvalue solver — the
//! classical choice for small dense symmetric systems without a BLAS
//! dependency — stands in for it here.

use std::fmt;

/// A dense row-major square matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Mat {
    pub n: usize,
    data: Vec<f64>,
}

impl Mat {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n);
        for i in 0..n {
            m.set(i, i, 1.0);
        }
        m
    }

    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let n = rows.len();
        let mut m = Self::zeros(n);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), n, "Mat::from_rows requires a square matrix");
            for (j, &v) in row.iter().enumerate() {
                m.set(i, j, v);
            }
        }
        m
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, v: f64) {
        self.data[i * self.n + j] = v;
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.n).map(|i| self.row(i).to_vec()).collect()
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// `y = M x`.
    pub fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        (0..self.n)
            .map(|i| (0..self.n).map(|j| self.get(i, j) * x[j]).sum())
            .collect()
    }

    /// `y = Mᵀ x`.
    pub fn mul_vec_transposed(&self, x: &[f64]) -> Vec<f64> {
        (0..self.n)
            .map(|j| (0..self.n).map(|i| self.get(i, j) * x[i]).sum())
            .collect()
    }

    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }
}

impl fmt::Display for Mat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.n {
            writeln!(f, "{:?}", self.row(i))?;
        }
        Ok(())
    }
}

/// Eigendecomposition of a symmetric matrix: `Σ = U diag(S) Uᵀ`.
///
/// `S` is sorted descending to match `numpy.linalg.svd`'s singular-value
/// ordering convention (the proposal kernels index `S`/`U` assuming this
/// order is stable run to run).
#[derive(Debug, Clone)]
pub struct EigenDecomp {
    /// Eigenvectors as columns: `U.col(k)` is the `k`-th eigenvector.
    pub u: Mat,
    /// Eigenvalues, descending, clamped to `>= 0` (Σ is PSD by invariant).
    pub s: Vec<f64>,
}

impl EigenDecomp {
    pub fn column(&self, k: usize) -> Vec<f64> {
        (0..self.u.n).map(|i| self.u.get(i, k)).collect()
    }
}

/// Cyclic Jacobi eigenvalue algorithm for a real symmetric matrix.
///
/// Converges quadratically for the small (d ≲ few hundred) covariance
/// matrices this sampler works with. `max_sweeps` bounds runtime; a sweep
/// that makes no further progress (all off-diagonal mass below `tol`) stops
/// early.
pub fn jacobi_eigen(m: &Mat, tol: f64, max_sweeps: usize) -> EigenDecomp {
    let n = m.n;
    let mut a = m.clone();
    let mut v = Mat::identity(n);

    for _sweep in 0..max_sweeps {
        let mut off = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off += a.get(p, q) * a.get(p, q);
            }
        }
        if off.sqrt() < tol {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a.get(p, q);
                if apq.abs() < 1e-300 {
                    continue;
                }
                let app = a.get(p, p);
                let aqq = a.get(q, q);
                let theta = (aqq - app) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let t = if theta == 0.0 { 1.0 } else { t };
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for i in 0..n {
                    let aip = a.get(i, p);
                    let aiq = a.get(i, q);
                    a.set(i, p, c * aip - s * aiq);
                    a.set(i, q, s * aip + c * aiq);
                }
                for i in 0..n {
                    let api = a.get(p, i);
                    let aqi = a.get(q, i);
                    a.set(p, i, c * api - s * aqi);
                    a.set(q, i, s * api + c * aqi);
                }
                for i in 0..n {
                    let vip = v.get(i, p);
                    let viq = v.get(i, q);
                    v.set(i, p, c * vip - s * viq);
                    v.set(i, q, s * vip + c * viq);
                }
            }
        }
    }

    let mut idx: Vec<usize> = (0..n).collect();
    idx.sort_by(|&i, &j| a.get(j, j).partial_cmp(&a.get(i, i)).unwrap());

    let mut s = Vec::with_capacity(n);
    let mut u = Mat::zeros(n);
    for (k, &i) in idx.iter().enumerate() {
        s.push(a.get(i, i).max(0.0));
        for row in 0..n {
            u.set(row, k, v.get(row, i));
        }
    }

    EigenDecomp { u, s }
}

/// Welford's online mean/scatter-matrix accumulator.
///
/// `m2 / (count - 1)` is the unbiased sample covariance once `count > 1`.
#[derive(Debug, Clone)]
pub struct Welford {
    pub count: u64,
    pub mean: Vec<f64>,
    pub m2: Mat,
}

impl Welford {
    pub fn new(d: usize) -> Self {
        Self {
            count: 0,
            mean: vec![0.0; d],
            m2: Mat::zeros(d),
        }
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.mean.iter_mut().for_each(|v| *v = 0.0);
        self.m2 = Mat::zeros(self.m2.n);
    }

    /// Fold one more sample vector into the running mean/scatter.
    pub fn update(&mut self, x: &[f64]) {
        let d = self.mean.len();
        self.count += 1;
        let mut delta = vec![0.0; d];
        for j in 0..d {
            delta[j] = x[j] - self.mean[j];
            self.mean[j] += delta[j] / self.count as f64;
        }
        for i in 0..d {
            for j in 0..d {
                let incr = delta[i] * (x[j] - self.mean[j]);
                self.m2.set(i, j, self.m2.get(i, j) + incr);
            }
        }
    }

    /// Sample covariance, or `None` before two samples have been folded in.
    pub fn covariance(&self) -> Option<Mat> {
        if self.count < 2 {
            return None;
        }
        let denom = (self.count - 1) as f64;
        let n = self.m2.n;
        let mut cov = Mat::zeros(n);
        for i in 0..n {
            for j in 0..n {
                cov.set(i, j, self.m2.get(i, j) / denom);
            }
        }
        Some(cov)
    }
}

/// `true` if every eigenvalue of a symmetric matrix is above `-tol`
/// (allows for roundoff near zero; strictly negative eigenvalues below
/// `-tol` indicate a numerically broken update).
pub fn is_psd(eig: &EigenDecomp, tol: f64) -> bool {
    eig.s.iter().all(|&lambda| lambda >= -tol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jacobi_recovers_diagonal_matrix() {
        let m = Mat::from_rows(&[vec![2.0, 0.0], vec![0.0, 5.0]]);
        let eig = jacobi_eigen(&m, 1e-12, 100);
        assert!((eig.s[0] - 5.0).abs() < 1e-9);
        assert!((eig.s[1] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn jacobi_reconstructs_symmetric_matrix() {
        let m = Mat::from_rows(&[vec![4.0, 1.0, 0.5], vec![1.0, 3.0, 0.2], vec![0.5, 0.2, 2.0]]);
        let eig = jacobi_eigen(&m, 1e-12, 200);
        // reconstruct U diag(S) U^T
        let n = m.n;
        let mut recon = Mat::zeros(n);
        for i in 0..n {
            for j in 0..n {
                let mut acc = 0.0;
                for k in 0..n {
                    acc += eig.u.get(i, k) * eig.s[k] * eig.u.get(j, k);
                }
                recon.set(i, j, acc);
            }
        }
        for i in 0..n {
            for j in 0..n {
                assert!((recon.get(i, j) - m.get(i, j)).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn welford_matches_naive_covariance() {
        let samples = [
            vec![1.0, 2.0],
            vec![2.0, 1.0],
            vec![3.0, 4.0],
            vec![0.0, 0.0],
        ];
        let mut w = Welford::new(2);
        for s in &samples {
            w.update(s);
        }
        let cov = w.covariance().unwrap();

        let n = samples.len() as f64;
        let mean: Vec<f64> = (0..2)
            .map(|j| samples.iter().map(|s| s[j]).sum::<f64>() / n)
            .collect();
        let mut expected = Mat::zeros(2);
        for s in &samples {
            for i in 0..2 {
                for j in 0..2 {
                    expected.set(
                        i,
                        j,
                        expected.get(i, j) + (s[i] - mean[i]) * (s[j] - mean[j]),
                    );
                }
            }
        }
        for i in 0..2 {
            for j in 0..2 {
                expected.set(i, j, expected.get(i, j) / (n - 1.0));
            }
        }
        for i in 0..2 {
            for j in 0..2 {
                assert!((cov.get(i, j) - expected.get(i, j)).abs() < 1e-9);
            }
        }
    }
}
