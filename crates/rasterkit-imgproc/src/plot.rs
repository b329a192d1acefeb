use rasterkit_image::{Image, Pixel};

/// How real values are mapped onto gray levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scaling {
    /// Truncate each value into `[0, 255]`.
    Clamp,
    /// Scale so the maximum value is white. An all-zero grid is black.
    Normalize,
    /// Apply `ln(1 + |v|)` and then [`Scaling::Normalize`].
    LogNormalize,
}

/// Render a real valued grid as an opaque gray image.
///
/// Used to visualize Hough accumulators and frequency spectra.
pub fn plot_grid(grid: &Image<f64>, scaling: Scaling) -> Image<Pixel> {
    let transformed = match scaling {
        Scaling::LogNormalize => grid.map(|v, _, _| v.abs().ln_1p()),
        _ => grid.clone(),
    };
    let max = transformed
        .as_slice()
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);

    transformed.map(|v, _, _| {
        let level = match scaling {
            Scaling::Clamp => v.clamp(0.0, 255.0),
            _ if max > 0.0 => (v / max * 255.0).clamp(0.0, 255.0),
            _ => 0.0,
        };
        Pixel::gray_pixel(level as u8)
    })
}
