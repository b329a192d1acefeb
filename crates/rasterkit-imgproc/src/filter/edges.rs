use rasterkit_image::{Image, ImageError, Pixel};

use super::convolution::convolve_grid;
use super::kernels;
use crate::color::intensity;

/// Gradient magnitude `sqrt(gx^2 + gy^2)` of the luminance, using the 3x3
/// Sobel kernels, rendered as a gray image clamped to `[0, 255]`.
pub fn sobel_magnitude(src: &Image<Pixel>) -> Result<Image<Pixel>, ImageError> {
    let grid = intensity(src);
    let gx = convolve_grid(&grid, &kernels::sobel_x());
    let gy = convolve_grid(&grid, &kernels::sobel_y());
    let magnitude = gx.zip_map(&gy, |a, b| a.hypot(*b))?;
    Ok(magnitude.map(|m, _, _| Pixel::gray_pixel(m.clamp(0.0, 255.0) as u8)))
}

/// Absolute Laplacian response of the luminance as a gray image.
pub fn laplacian_edges(src: &Image<Pixel>) -> Image<Pixel> {
    let response = convolve_grid(&intensity(src), &kernels::laplacian());
    response.map(|v, _, _| Pixel::gray_pixel(v.abs().clamp(0.0, 255.0) as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(width: usize, height: usize) -> Image<Pixel> {
        Image::from_fn([width, height].into(), |x, _| {
            if x < width / 2 {
                Pixel::BLACK
            } else {
                Pixel::WHITE
            }
        })
    }

    #[test]
    fn sobel_finds_vertical_edge() -> Result<(), ImageError> {
        let edges = sobel_magnitude(&step(8, 4))?;
        assert_eq!(edges.get(0, 1), Some(&Pixel::BLACK));
        assert_eq!(edges.get(7, 1), Some(&Pixel::BLACK));
        assert_eq!(edges.get(3, 1), Some(&Pixel::WHITE));
        assert_eq!(edges.get(4, 1), Some(&Pixel::WHITE));
        Ok(())
    }

    #[test]
    fn laplacian_flat_is_zero() {
        let flat = Image::from_size_val([4, 4].into(), Pixel::gray_pixel(90));
        assert!(laplacian_edges(&flat)
            .as_slice()
            .iter()
            .all(|p| *p == Pixel::BLACK));
        let edges = laplacian_edges(&step(8, 2));
        assert_ne!(edges.get(3, 0), Some(&Pixel::BLACK));
    }
}
