#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the image module.
pub mod error;

/// image representation over a flat pixel array.
pub mod image;

/// flat container with parallel bulk operations.
pub mod parallel;

/// four channel 8-bit pixel type.
pub mod pixel;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
pub use crate::parallel::{Parallelism, PixelArray};
pub use crate::pixel::Pixel;
