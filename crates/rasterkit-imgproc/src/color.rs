use rasterkit_image::{Image, Pixel};

use crate::histogram;

/// A color channel of a [`Pixel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    /// Red channel.
    Red,
    /// Green channel.
    Green,
    /// Blue channel.
    Blue,
}

/// Convert an image to grayscale.
///
/// Every pixel gets its rounded luminance in the three color channels; alpha is kept.
///
/// # Examples
///
/// ```
/// use rasterkit_image::{Image, Pixel};
/// use rasterkit_imgproc::color::grayscale;
///
/// let image = Image::from_size_val([2, 2].into(), Pixel::rgb(255, 0, 0));
/// let gray = grayscale(&image);
/// assert_eq!(gray.get(0, 0), Some(&Pixel::rgb(76, 76, 76)));
/// ```
pub fn grayscale(src: &Image<Pixel>) -> Image<Pixel> {
    src.map(|p, _, _| {
        let level = p.gray_level();
        Pixel::new(level, level, level, p.a)
    })
}

/// Replicate one channel into all three color channels.
pub fn extract_channel(src: &Image<Pixel>, channel: Channel) -> Image<Pixel> {
    src.map(|p, _, _| {
        let v = match channel {
            Channel::Red => p.r,
            Channel::Green => p.g,
            Channel::Blue => p.b,
        };
        Pixel::new(v, v, v, p.a)
    })
}

/// Invert the color channels; alpha is kept.
pub fn invert(src: &Image<Pixel>) -> Image<Pixel> {
    src.map(|p, _, _| Pixel::new(255 - p.r, 255 - p.g, 255 - p.b, p.a))
}

/// The luminance of every pixel as a real valued grid.
pub fn intensity(src: &Image<Pixel>) -> Image<f64> {
    src.map(|p, _, _| p.gray())
}

/// Spread the gray levels of an image over the full range.
///
/// Each gray level `l` is remapped through the cumulative histogram to
/// `round((cdf(l) - cdf_min) / (n - cdf_min) * 255)`. The output is gray.
/// A single-level image has nothing to spread and is returned as its
/// grayscale.
pub fn equalize_histogram(src: &Image<Pixel>) -> Image<Pixel> {
    let hist = histogram::gray_histogram(src);
    let total = src.as_slice().len();

    let mut cdf = [0usize; 256];
    let mut acc = 0;
    for (c, h) in cdf.iter_mut().zip(hist.iter()) {
        acc += h;
        *c = acc;
    }
    let cdf_min = cdf.iter().copied().find(|c| *c > 0).unwrap_or(0);
    if total == cdf_min {
        log::debug!("equalize: single gray level, returning grayscale");
        return grayscale(src);
    }

    let denom = (total - cdf_min) as f64;
    let mut lut = [0u8; 256];
    for (l, c) in lut.iter_mut().zip(cdf.iter()) {
        *l = ((c.saturating_sub(cdf_min)) as f64 / denom * 255.0).round() as u8;
    }

    src.map(|p, _, _| {
        let level = lut[p.gray_level() as usize];
        Pixel::new(level, level, level, p.a)
    })
}
