#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Bitmap file format decoding and encoding.
///
/// See [`bmp::Bitmap`] for the in-memory representation of a decoded file.
pub mod bmp;

/// Error types for I/O operations.
pub mod error;

/// High-level functions to read and write bitmap files by path.
pub mod functional;

/// Color palette of 8-bit bitmaps.
pub mod palette;

/// Low resolution ANSI color preview of an image in the terminal.
pub mod terminal;

pub use crate::bmp::{BitDepth, Bitmap};
pub use crate::error::IoError;
pub use crate::palette::Palette;
