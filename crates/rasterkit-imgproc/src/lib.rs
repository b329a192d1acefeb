#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// utilities to draw on images.
pub mod draw;

/// image filtering module.
pub mod filter;

/// 2D FFT and frequency domain filtering.
pub mod frequency;

/// compute image histogram module.
pub mod histogram;

/// Hough line detection and line geometry.
pub mod hough;

/// utilities for interpolation.
pub mod interpolation;

/// render real valued grids as images.
pub mod plot;

/// integer points and boxes.
pub mod point;

/// threshold search, region growing, labeling and quad-trees.
pub mod segmentation;

/// image geometric transformations module.
pub mod warp;
