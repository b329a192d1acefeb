use rasterkit_image::{Image, ImageError, Pixel};

/// Order-statistic filter over a `size x size` window.
///
/// For every pixel the edge-clamped window is sorted by descending luminance
/// and the pixel of rank `k` is copied verbatim, all four channels included.
/// Pixels of equal luminance keep their row-major window order.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `size` - The odd window side.
/// * `k` - The zero based rank, `0` picks the brightest pixel.
///
/// # Errors
///
/// * [`ImageError::InvalidKernelSize`] if `size` is even.
/// * [`ImageError::InvalidRankIndex`] if `k >= size * size`.
pub fn rank_filter(src: &Image<Pixel>, size: usize, k: usize) -> Result<Image<Pixel>, ImageError> {
    if size % 2 == 0 {
        return Err(ImageError::InvalidKernelSize(size, size));
    }
    let window_len = size * size;
    if k >= window_len {
        return Err(ImageError::InvalidRankIndex(k, window_len));
    }
    if src.is_empty() {
        return Ok(src.clone());
    }

    let half = (size / 2) as i64;
    Ok(src.map(|_, x, y| {
        let mut window = Vec::with_capacity(window_len);
        for dy in -half..=half {
            for dx in -half..=half {
                window.push(*src.get_clamped(x as i64 + dx, y as i64 + dy));
            }
        }
        window.sort_by(|a, b| b.gray().total_cmp(&a.gray()));
        window[k]
    }))
}

/// Median filter, the rank filter at `k = size * size / 2`.
pub fn median_filter(src: &Image<Pixel>, size: usize) -> Result<Image<Pixel>, ImageError> {
    rank_filter(src, size, size * size / 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_removes_salt() -> Result<(), ImageError> {
        let mut image = Image::from_size_val([5, 5].into(), Pixel::gray_pixel(40));
        image.put(2, 2, Pixel::WHITE);
        image.put(0, 4, Pixel::BLACK);
        let out = median_filter(&image, 3)?;
        assert!(out.as_slice().iter().all(|p| *p == Pixel::gray_pixel(40)));
        Ok(())
    }

    #[test]
    fn rank_extremes() -> Result<(), ImageError> {
        let image = Image::from_fn([3, 3].into(), |x, y| Pixel::gray_pixel((x + 3 * y) as u8 * 10));
        let max = rank_filter(&image, 3, 0)?;
        let min = rank_filter(&image, 3, 8)?;
        assert_eq!(max.get(1, 1), Some(&Pixel::gray_pixel(80)));
        assert_eq!(min.get(1, 1), Some(&Pixel::gray_pixel(0)));
        // the corner window is clamped onto the corner pixel
        assert_eq!(min.get(2, 2), Some(&Pixel::gray_pixel(40)));
        Ok(())
    }

    #[test]
    fn copies_alpha_verbatim() -> Result<(), ImageError> {
        let image = Image::from_size_val([2, 2].into(), Pixel::new(1, 2, 3, 9));
        let out = median_filter(&image, 1)?;
        assert_eq!(out, image);
        Ok(())
    }

    #[test]
    fn invalid_arguments() {
        let image = Image::from_size_val([2, 2].into(), Pixel::BLACK);
        assert_eq!(rank_filter(&image, 2, 0), Err(ImageError::InvalidKernelSize(2, 2)));
        assert_eq!(rank_filter(&image, 3, 9), Err(ImageError::InvalidRankIndex(9, 9)));
    }
}
