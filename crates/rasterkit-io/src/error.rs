use rasterkit_image::Pixel;

/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Invalid file extension.
    #[error("File does not have a valid extension: {0}")]
    InvalidFileExtension(std::path::PathBuf),

    /// Error to open, read or write the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// The magic number is not `BM`.
    #[error("Decode failed: not a bitmap file (magic {0:#06x})")]
    NotARaster(u16),

    /// Bit depth other than 8 or 24.
    #[error("Decode failed: unsupported bit depth {0}")]
    UnsupportedDepth(u16),

    /// Compressed pixel data.
    #[error("Decode failed: unsupported compression method {0}")]
    UnsupportedCompression(u32),

    /// Width or height that cannot describe an image.
    #[error("Decode failed: invalid dimensions {0}x{1}")]
    InvalidDimensions(i32, i32),

    /// The buffer ends before the data the header announces.
    #[error("Decode failed: expected at least {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes required by the header.
        expected: usize,
        /// Bytes available.
        actual: usize,
    },

    /// A pixel index points past the end of the palette.
    #[error("Decode failed: palette index {0} out of range for {1} entries")]
    InvalidPaletteIndex(u8, usize),

    /// More distinct colors than an 8-bit palette holds.
    #[error("Depth reduction failed: {0} distinct colors exceed the 256 palette entries")]
    TooManyColors(usize),

    /// A pixel color is missing from the palette of an 8-bit image.
    #[error("Encode failed: color {0:?} is not in the palette")]
    ColorNotInPalette(Pixel),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] rasterkit_image::ImageError),
}
