#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the linear algebra module.
pub mod error;

/// dense row-major matrix of `f64`.
pub mod matrix;

/// singular value decomposition and pseudoinverse.
pub mod svd;

/// composable 3x3 planar transforms.
pub mod transform;

pub use crate::error::LinalgError;
pub use crate::matrix::Matrix;
pub use crate::svd::Svd;
pub use crate::transform::Transform;
