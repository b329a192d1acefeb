use std::path::Path;

use rasterkit_image::{Image, Pixel};

use crate::bmp::Bitmap;
use crate::error::IoError;

fn check_bmp_path(file_path: &Path) -> Result<(), IoError> {
    if file_path
        .extension()
        .map_or(true, |ext| !ext.eq_ignore_ascii_case("bmp"))
    {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }
    Ok(())
}

/// Reads a bitmap file from the given path.
///
/// # Arguments
///
/// * `file_path` - The path to a `.bmp` file.
///
/// # Returns
///
/// The decoded bitmap with its headers and palette.
///
/// # Errors
///
/// Fails if the file is missing, does not end in `.bmp`, or does not decode.
pub fn read_bmp(file_path: impl AsRef<Path>) -> Result<Bitmap, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }
    check_bmp_path(file_path)?;

    let bytes = std::fs::read(file_path)?;
    Bitmap::decode(&bytes)
}

/// Writes a bitmap to the given path, keeping its bit depth.
///
/// # Arguments
///
/// * `file_path` - The path to a `.bmp` file.
/// * `bitmap` - The bitmap to encode.
pub fn write_bmp(file_path: impl AsRef<Path>, bitmap: &Bitmap) -> Result<(), IoError> {
    let file_path = file_path.as_ref();
    check_bmp_path(file_path)?;
    let bytes = bitmap.encode()?;
    std::fs::write(file_path, bytes)?;
    Ok(())
}

/// Reads only the pixels of a bitmap file.
pub fn read_image_bmp(file_path: impl AsRef<Path>) -> Result<Image<Pixel>, IoError> {
    Ok(read_bmp(file_path)?.into_image())
}

/// Writes an image as a 24-bit bitmap file.
pub fn write_image_bmp(file_path: impl AsRef<Path>, image: &Image<Pixel>) -> Result<(), IoError> {
    write_bmp(file_path, &Bitmap::new(image.clone()))
}
