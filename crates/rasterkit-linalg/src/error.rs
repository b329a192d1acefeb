/// An error type for the linear algebra module.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    /// The operation needs at least one row and one column.
    #[error("Operation on an empty matrix")]
    EmptyMatrix,

    /// Element or row access outside the matrix.
    #[error("Index ({0}, {1}) out of bounds for a {2}x{3} matrix")]
    IndexOutOfBounds(usize, usize, usize, usize),

    /// Operand shapes are incompatible.
    #[error("Dimension mismatch: {0}x{1} against {2}x{3}")]
    DimensionMismatch(usize, usize, usize, usize),

    /// No singular value exceeds the tolerance, or a linear system has no unique solution.
    #[error("Transform failed: matrix is singular")]
    SingularMatrix,
}
