/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the data length does not match the image size.
    #[error("Data length ({0}) does not match the image size ({1})")]
    DataLengthMismatch(usize, usize),

    /// Error when two arrays combined elementwise differ in length.
    #[error("Array lengths differ: {0} != {1}")]
    SizeMismatch(usize, usize),

    /// Error when two images that must share a size do not.
    #[error("Image size mismatch: ({0}x{1}) != ({2}x{3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when a filter kernel is not odd sized.
    #[error("Filter failed: kernel size must be odd, got {0}x{1}")]
    InvalidKernelSize(usize, usize),

    /// Error when a rank filter index falls outside the window.
    #[error("Filter failed: rank index {0} outside a window of {1} pixels")]
    InvalidRankIndex(usize, usize),

    /// Error when a frequency transform receives a non power-of-two grid.
    #[error("Frequency transform failed: grid {0}x{1} is not a power of two in both axes")]
    NotPowerOfTwo(usize, usize),

    /// Error when an operation requires a non empty image.
    #[error("Image is empty")]
    EmptyImage,

    /// Error when a tunable is outside its accepted range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
