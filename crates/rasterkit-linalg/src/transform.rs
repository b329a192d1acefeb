use crate::error::LinalgError;
use crate::matrix::Matrix;

/// Homogeneous coordinates with a smaller magnitude are treated as points at infinity.
const W_EPSILON: f64 = 1e-12;

type Mat3 = [[f64; 3]; 3];

fn mul3(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, v) in row.iter_mut().enumerate() {
            *v = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// A 3x3 transform acting on homogeneous 2D points.
///
/// Every builder call left-multiplies the accumulated matrix, so operations
/// apply to points in the order they are chained:
/// `Transform::identity().translate(1.0, 0.0).rotate(a)` first translates,
/// then rotates about the origin.
///
/// # Examples
///
/// ```
/// use rasterkit_linalg::Transform;
///
/// let t = Transform::identity().translate(1.0, 0.0).scale(2.0, 2.0);
/// let (x, y) = t.apply(1.0, 1.0).unwrap();
/// assert_eq!((x, y), (4.0, 2.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    m: Mat3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Wrap a raw row-major 3x3 matrix.
    pub fn from_array(m: [[f64; 3]; 3]) -> Self {
        Self { m }
    }

    /// Wrap a [`Matrix`].
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::DimensionMismatch`] unless the matrix is 3x3.
    pub fn from_matrix(matrix: &Matrix) -> Result<Self, LinalgError> {
        if matrix.rows() != 3 || matrix.cols() != 3 {
            return Err(LinalgError::DimensionMismatch(
                matrix.rows(),
                matrix.cols(),
                3,
                3,
            ));
        }
        let mut m = [[0.0; 3]; 3];
        for (r, row) in m.iter_mut().enumerate() {
            row.copy_from_slice(matrix.row(r)?);
        }
        Ok(Self { m })
    }

    /// The raw row-major matrix.
    pub fn as_array(&self) -> [[f64; 3]; 3] {
        self.m
    }

    /// The transform as a [`Matrix`].
    pub fn to_matrix(&self) -> Matrix {
        let mut out = Matrix::zeros(3, 3);
        for (r, row) in self.m.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                *out.at_mut(r, c) = *v;
            }
        }
        out
    }

    fn append(self, op: Mat3) -> Self {
        Self {
            m: mul3(&op, &self.m),
        }
    }

    /// Apply `other` after this transform.
    pub fn then(self, other: &Transform) -> Self {
        self.append(other.m)
    }

    /// Translate by `(tx, ty)`.
    pub fn translate(self, tx: f64, ty: f64) -> Self {
        self.append([[1.0, 0.0, tx], [0.0, 1.0, ty], [0.0, 0.0, 1.0]])
    }

    /// Rotate by `theta` radians about the origin, counter-clockwise positive
    /// in a y-up frame.
    pub fn rotate(self, theta: f64) -> Self {
        let (s, c) = theta.sin_cos();
        self.append([[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Scale the axes by `(sx, sy)`.
    pub fn scale(self, sx: f64, sy: f64) -> Self {
        self.append([[sx, 0.0, 0.0], [0.0, sy, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Shear x by `kx * y` and y by `ky * x`.
    pub fn shear(self, kx: f64, ky: f64) -> Self {
        self.append([[1.0, kx, 0.0], [ky, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Single point perspective with `w = px * x + py * y + 1`.
    pub fn perspective(self, px: f64, py: f64) -> Self {
        self.append([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [px, py, 1.0]])
    }

    /// The projective transform mapping each `src[i]` onto `dst[i]`.
    ///
    /// Solves the eight unknowns of the homography with the bottom-right
    /// entry fixed to one.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::SingularMatrix`] if the correspondences are
    /// degenerate, for instance three collinear source points.
    pub fn from_quad(src: &[(f64, f64); 4], dst: &[(f64, f64); 4]) -> Result<Self, LinalgError> {
        let mut a = Vec::with_capacity(64);
        let mut b = Vec::with_capacity(8);
        for (&(x, y), &(u, v)) in src.iter().zip(dst) {
            a.extend_from_slice(&[x, y, 1.0, 0.0, 0.0, 0.0, -x * u, -y * u]);
            b.push(u);
            a.extend_from_slice(&[0.0, 0.0, 0.0, x, y, 1.0, -x * v, -y * v]);
            b.push(v);
        }
        let h = Matrix::from_vec(8, 8, a)?.solve(&b)?;
        Ok(Self {
            m: [[h[0], h[1], h[2]], [h[3], h[4], h[5]], [h[6], h[7], 1.0]],
        })
    }

    /// Map the point `(x, y)`, dividing by the homogeneous coordinate.
    ///
    /// Returns `None` when the point maps to infinity.
    pub fn apply(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let m = &self.m;
        let w = m[2][0] * x + m[2][1] * y + m[2][2];
        if w.abs() < W_EPSILON {
            return None;
        }
        let px = m[0][0] * x + m[0][1] * y + m[0][2];
        let py = m[1][0] * x + m[1][1] * y + m[1][2];
        Some((px / w, py / w))
    }

    /// The inverse transform, computed through the pseudoinverse.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::SingularMatrix`] if any singular value is at or
    /// below [`crate::svd::SINGULAR_TOLERANCE`], for instance a zero scale.
    pub fn inverse(&self) -> Result<Transform, LinalgError> {
        let svd = self.to_matrix().svd()?;
        if svd.rank() < 3 {
            log::debug!("transform has rank {}, no inverse", svd.rank());
            return Err(LinalgError::SingularMatrix);
        }
        Transform::from_matrix(&svd.pinv()?)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    fn assert_point(t: &Transform, p: (f64, f64), expected: (f64, f64)) {
        let (x, y) = t.apply(p.0, p.1).expect("finite point");
        assert_abs_diff_eq!(x, expected.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, expected.1, epsilon = 1e-9);
    }

    #[test]
    fn chain_applies_in_call_order() {
        let t = Transform::identity().translate(1.0, 0.0).rotate(FRAC_PI_2);
        assert_point(&t, (1.0, 0.0), (0.0, 2.0));

        let t = Transform::identity().rotate(FRAC_PI_2).translate(1.0, 0.0);
        assert_point(&t, (1.0, 0.0), (1.0, 1.0));
    }

    #[test]
    fn then_matches_chaining() {
        let a = Transform::identity().scale(2.0, 3.0);
        let b = Transform::identity().translate(-1.0, 4.0);
        let chained = Transform::identity().scale(2.0, 3.0).translate(-1.0, 4.0);
        assert_eq!(a.then(&b), chained);
        assert_point(&chained, (1.0, 1.0), (1.0, 7.0));
    }

    #[test]
    fn shear_and_perspective() {
        let t = Transform::identity().shear(0.5, 0.0);
        assert_point(&t, (2.0, 4.0), (4.0, 4.0));

        let t = Transform::identity().perspective(1.0, 0.0);
        assert_point(&t, (1.0, 3.0), (0.5, 1.5));
        assert!(t.apply(-1.0, 0.0).is_none());
    }

    #[test]
    fn inverse_round_trip() -> Result<(), LinalgError> {
        let t = Transform::identity()
            .rotate(0.3)
            .scale(1.5, 0.5)
            .translate(10.0, -4.0)
            .perspective(0.001, 0.002);
        let inv = t.inverse()?;
        let (x, y) = t.apply(12.0, 7.0).expect("finite point");
        assert_point(&inv, (x, y), (12.0, 7.0));

        let degenerate = Transform::from_array([[0.0; 3]; 3]);
        assert_eq!(degenerate.inverse(), Err(LinalgError::SingularMatrix));
        Ok(())
    }

    #[test]
    fn rank_deficient_has_no_inverse() {
        let flatten = Transform::identity().scale(0.0, 1.0);
        assert_eq!(flatten.inverse(), Err(LinalgError::SingularMatrix));

        let collapse = Transform::from_array([[1.0, 2.0, 0.0], [2.0, 4.0, 0.0], [0.0, 0.0, 1.0]]);
        assert_eq!(collapse.inverse(), Err(LinalgError::SingularMatrix));
    }

    #[test]
    fn quad_correspondence() -> Result<(), LinalgError> {
        let src = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let dst = [(2.0, 1.0), (20.0, 3.0), (18.0, 25.0), (1.0, 15.0)];
        let t = Transform::from_quad(&src, &dst)?;
        for (s, d) in src.iter().zip(dst.iter()) {
            assert_point(&t, *s, *d);
        }

        let collapsed = [(1.0, 1.0); 4];
        assert_eq!(
            Transform::from_quad(&collapsed, &dst),
            Err(LinalgError::SingularMatrix)
        );
        Ok(())
    }

    #[test]
    fn matrix_round_trip() -> Result<(), LinalgError> {
        let t = Transform::identity().translate(3.0, 4.0);
        assert_eq!(Transform::from_matrix(&t.to_matrix())?, t);
        assert!(Transform::from_matrix(&Matrix::zeros(2, 3)).is_err());
        Ok(())
    }
}
