use crate::error::LinalgError;

/// A dense row-major matrix of `f64`.
///
/// # Examples
///
/// ```
/// use rasterkit_linalg::Matrix;
///
/// let a = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
/// let b = a.matmul(&Matrix::identity(2)).unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// A `rows x cols` matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// The `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Build a matrix from row-major data.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::DimensionMismatch`] if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, LinalgError> {
        if data.len() != rows * cols {
            return Err(LinalgError::DimensionMismatch(rows, cols, data.len(), 1));
        }
        Ok(Self { rows, cols, data })
    }

    /// Build a matrix from a slice of rows.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::DimensionMismatch`] if the rows are ragged.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, LinalgError> {
        let cols = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(LinalgError::DimensionMismatch(rows.len(), cols, 1, row.len()));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Build a square diagonal matrix.
    pub fn diagonal(values: &[f64]) -> Self {
        let n = values.len();
        let mut m = Self::zeros(n, n);
        for (i, v) in values.iter().enumerate() {
            m.data[i * n + i] = *v;
        }
        m
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether the matrix has no elements.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// The elements in row-major order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Read element `(r, c)`.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::IndexOutOfBounds`] outside the matrix.
    pub fn get(&self, r: usize, c: usize) -> Result<f64, LinalgError> {
        if r >= self.rows || c >= self.cols {
            return Err(LinalgError::IndexOutOfBounds(r, c, self.rows, self.cols));
        }
        Ok(self.data[r * self.cols + c])
    }

    /// Write element `(r, c)`.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::IndexOutOfBounds`] outside the matrix.
    pub fn set(&mut self, r: usize, c: usize, value: f64) -> Result<(), LinalgError> {
        if r >= self.rows || c >= self.cols {
            return Err(LinalgError::IndexOutOfBounds(r, c, self.rows, self.cols));
        }
        self.data[r * self.cols + c] = value;
        Ok(())
    }

    /// Borrow row `r`.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::IndexOutOfBounds`] if `r` is not a row.
    pub fn row(&self, r: usize) -> Result<&[f64], LinalgError> {
        if r >= self.rows {
            return Err(LinalgError::IndexOutOfBounds(r, 0, self.rows, self.cols));
        }
        Ok(&self.data[r * self.cols..(r + 1) * self.cols])
    }

    #[inline]
    pub(crate) fn at(&self, r: usize, c: usize) -> f64 {
        self.data[r * self.cols + c]
    }

    #[inline]
    pub(crate) fn at_mut(&mut self, r: usize, c: usize) -> &mut f64 {
        &mut self.data[r * self.cols + c]
    }

    /// The transposed matrix.
    pub fn transpose(&self) -> Matrix {
        let mut t = Matrix::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                *t.at_mut(c, r) = self.at(r, c);
            }
        }
        t
    }

    /// Apply `f` to every element.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| f(*v)).collect(),
        }
    }

    /// Elementwise sum.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::DimensionMismatch`] if the shapes differ.
    pub fn add(&self, other: &Matrix) -> Result<Matrix, LinalgError> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(LinalgError::DimensionMismatch(
                self.rows, self.cols, other.rows, other.cols,
            ));
        }
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(&other.data).map(|(a, b)| a + b).collect(),
        })
    }

    /// Matrix product `self * other`.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::DimensionMismatch`] if `self.cols() != other.rows()`.
    pub fn matmul(&self, other: &Matrix) -> Result<Matrix, LinalgError> {
        if self.cols != other.rows {
            return Err(LinalgError::DimensionMismatch(
                self.rows, self.cols, other.rows, other.cols,
            ));
        }
        let mut out = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.at(i, k);
                if a == 0.0 {
                    continue;
                }
                for j in 0..other.cols {
                    *out.at_mut(i, j) += a * other.at(k, j);
                }
            }
        }
        Ok(out)
    }

    /// Matrix-vector product.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::DimensionMismatch`] if `v.len() != self.cols()`.
    pub fn mul_vec(&self, v: &[f64]) -> Result<Vec<f64>, LinalgError> {
        if v.len() != self.cols {
            return Err(LinalgError::DimensionMismatch(self.rows, self.cols, v.len(), 1));
        }
        Ok((0..self.rows)
            .map(|r| {
                self.data[r * self.cols..(r + 1) * self.cols]
                    .iter()
                    .zip(v)
                    .map(|(a, b)| a * b)
                    .sum()
            })
            .collect())
    }

    /// Solve the square system `self * x = b` by Gaussian elimination with
    /// partial pivoting.
    ///
    /// # Errors
    ///
    /// * [`LinalgError::EmptyMatrix`] for a 0x0 system.
    /// * [`LinalgError::DimensionMismatch`] if the matrix is not square or `b` has the wrong length.
    /// * [`LinalgError::SingularMatrix`] if a pivot vanishes.
    pub fn solve(&self, b: &[f64]) -> Result<Vec<f64>, LinalgError> {
        if self.is_empty() {
            return Err(LinalgError::EmptyMatrix);
        }
        let n = self.rows;
        if self.cols != n || b.len() != n {
            return Err(LinalgError::DimensionMismatch(self.rows, self.cols, b.len(), 1));
        }

        // augmented copy
        let mut a = self.clone();
        let mut x = b.to_vec();
        let scale = self.data.iter().fold(0.0f64, |m, v| m.max(v.abs())).max(1.0);

        for col in 0..n {
            let pivot = (col..n)
                .max_by(|&i, &j| a.at(i, col).abs().total_cmp(&a.at(j, col).abs()))
                .unwrap_or(col);
            if a.at(pivot, col).abs() <= 1e-12 * scale {
                return Err(LinalgError::SingularMatrix);
            }
            if pivot != col {
                for c in 0..n {
                    a.data.swap(pivot * n + c, col * n + c);
                }
                x.swap(pivot, col);
            }
            for r in col + 1..n {
                let factor = a.at(r, col) / a.at(col, col);
                if factor == 0.0 {
                    continue;
                }
                for c in col..n {
                    let v = a.at(col, c);
                    *a.at_mut(r, c) -= factor * v;
                }
                x[r] -= factor * x[col];
            }
        }

        for r in (0..n).rev() {
            let tail: f64 = (r + 1..n).map(|c| a.at(r, c) * x[c]).sum();
            x[r] = (x[r] - tail) / a.at(r, r);
        }
        Ok(x)
    }
}
