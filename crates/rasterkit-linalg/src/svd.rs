use crate::error::LinalgError;
use crate::matrix::Matrix;

/// Singular values at or below this are treated as zero.
pub const SINGULAR_TOLERANCE: f64 = 1e-10;

/// Upper bound on Jacobi sweeps before giving up on convergence.
const MAX_SWEEPS: usize = 64;

/// Thin singular value decomposition `A = U * diag(sigma) * V^T`.
///
/// For an `m x n` input with `k = min(m, n)`, `U` is `m x k`, `V` is `n x k`
/// and there are `k` singular values.
#[derive(Clone, Debug)]
pub struct Svd {
    /// Left singular vectors.
    pub u: Matrix,
    /// Singular values, unsorted.
    pub singular_values: Vec<f64>,
    /// Right singular vectors.
    pub v: Matrix,
}

impl Matrix {
    /// Singular value decomposition by one-sided Jacobi rotations.
    ///
    /// Pairs of columns are rotated until every pair is orthogonal to within
    /// [`SINGULAR_TOLERANCE`]. Wide matrices are decomposed through their
    /// transpose so `U` always has orthonormal columns.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::EmptyMatrix`] if the matrix has no elements.
    pub fn svd(&self) -> Result<Svd, LinalgError> {
        if self.is_empty() {
            return Err(LinalgError::EmptyMatrix);
        }
        if self.rows() < self.cols() {
            let t = self.transpose().svd()?;
            return Ok(Svd {
                u: t.v,
                singular_values: t.singular_values,
                v: t.u,
            });
        }

        let (m, n) = (self.rows(), self.cols());
        let mut u = self.clone();
        let mut v = Matrix::identity(n);

        let mut sweeps = 0;
        loop {
            let mut rotated = false;
            for i in 0..n {
                for j in i + 1..n {
                    let (mut a, mut b, mut c) = (0.0, 0.0, 0.0);
                    for k in 0..m {
                        let (ui, uj) = (u.at(k, i), u.at(k, j));
                        a += ui * ui;
                        b += uj * uj;
                        c += ui * uj;
                    }
                    if c.abs() <= SINGULAR_TOLERANCE * (a * b).sqrt() || c == 0.0 {
                        continue;
                    }
                    rotated = true;

                    let tau = (b - a) / (2.0 * c);
                    let t = tau.signum() / (tau.abs() + (1.0 + tau * tau).sqrt());
                    let cs = 1.0 / (1.0 + t * t).sqrt();
                    let sn = cs * t;

                    for k in 0..m {
                        let (ui, uj) = (u.at(k, i), u.at(k, j));
                        *u.at_mut(k, i) = cs * ui - sn * uj;
                        *u.at_mut(k, j) = sn * ui + cs * uj;
                    }
                    for k in 0..n {
                        let (vi, vj) = (v.at(k, i), v.at(k, j));
                        *v.at_mut(k, i) = cs * vi - sn * vj;
                        *v.at_mut(k, j) = sn * vi + cs * vj;
                    }
                }
            }
            sweeps += 1;
            if !rotated {
                break;
            }
            if sweeps >= MAX_SWEEPS {
                log::warn!("jacobi svd stopped after {sweeps} sweeps without converging");
                break;
            }
        }
        log::debug!("jacobi svd of a {m}x{n} matrix converged in {sweeps} sweeps");

        let mut singular_values = Vec::with_capacity(n);
        for j in 0..n {
            let norm = (0..m).map(|k| u.at(k, j).powi(2)).sum::<f64>().sqrt();
            if norm > SINGULAR_TOLERANCE {
                for k in 0..m {
                    *u.at_mut(k, j) /= norm;
                }
            }
            singular_values.push(norm);
        }

        Ok(Svd {
            u,
            singular_values,
            v,
        })
    }

    /// Moore-Penrose pseudoinverse `V * diag(1/sigma) * U^T`.
    ///
    /// Singular values at or below [`SINGULAR_TOLERANCE`] are dropped.
    ///
    /// # Errors
    ///
    /// * [`LinalgError::EmptyMatrix`] if the matrix has no elements.
    /// * [`LinalgError::SingularMatrix`] if every singular value is below the tolerance.
    ///
    /// # Examples
    ///
    /// ```
    /// use rasterkit_linalg::Matrix;
    ///
    /// let a = Matrix::from_rows(&[vec![2.0, 0.0], vec![0.0, 4.0]]).unwrap();
    /// let inv = a.pinv().unwrap();
    /// assert!((inv.get(1, 1).unwrap() - 0.25).abs() < 1e-12);
    /// ```
    pub fn pinv(&self) -> Result<Matrix, LinalgError> {
        self.svd()?.pinv()
    }
}

impl Svd {
    /// Number of singular values above [`SINGULAR_TOLERANCE`].
    pub fn rank(&self) -> usize {
        self.singular_values
            .iter()
            .filter(|s| **s > SINGULAR_TOLERANCE)
            .count()
    }

    /// Pseudoinverse of the decomposed matrix, see [`Matrix::pinv`].
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::SingularMatrix`] if the rank is zero.
    pub fn pinv(&self) -> Result<Matrix, LinalgError> {
        if self.rank() == 0 {
            return Err(LinalgError::SingularMatrix);
        }

        let inv_sigma: Vec<f64> = self
            .singular_values
            .iter()
            .map(|s| if *s > SINGULAR_TOLERANCE { 1.0 / s } else { 0.0 })
            .collect();

        let v_sigma = self.v.matmul(&Matrix::diagonal(&inv_sigma))?;
        v_sigma.matmul(&self.u.transpose())
    }
}
