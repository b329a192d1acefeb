//! Hough line transform
//!
//! Lines are in normal form `x cos(theta) + y sin(theta) = rho` with `theta`
//! in `[0, 2pi)`. The accumulator is an image with one row per theta bucket
//! and one column per rho bucket.

mod accumulator;
pub use accumulator::*;

mod geometry;
pub use geometry::*;

mod lines;
pub use lines::*;
