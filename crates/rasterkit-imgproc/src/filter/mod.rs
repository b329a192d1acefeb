//! Filter operations
//!
//! Weighted-sum convolution, order-statistic (rank) filters and gradient
//! based edge detection over edge-replicated neighborhoods.

/// Filter kernels
pub mod kernels;

mod convolution;
pub use convolution::*;

mod edges;
pub use edges::*;

mod rank;
pub use rank::*;
