use std::f64::consts::TAU;

use rasterkit_image::{Image, ImageError};

use super::complex::Complex;

/// In-place recursive radix-2 FFT.
///
/// The inverse transform is not normalized.
///
/// # Errors
///
/// Returns [`ImageError::NotPowerOfTwo`] unless the length is a power of two.
pub fn fft_1d(values: &mut [Complex], inverse: bool) -> Result<(), ImageError> {
    let n = values.len();
    if !n.is_power_of_two() {
        return Err(ImageError::NotPowerOfTwo(n, 1));
    }
    butterfly(values, inverse);
    Ok(())
}

fn butterfly(values: &mut [Complex], inverse: bool) {
    let n = values.len();
    if n <= 1 {
        return;
    }

    let half = n / 2;
    let mut even: Vec<Complex> = values.iter().step_by(2).copied().collect();
    let mut odd: Vec<Complex> = values.iter().skip(1).step_by(2).copied().collect();
    butterfly(&mut even, inverse);
    butterfly(&mut odd, inverse);

    let sign = if inverse { 1.0 } else { -1.0 };
    for k in 0..half {
        let t = Complex::from_angle(sign * TAU * k as f64 / n as f64) * odd[k];
        values[k] = even[k] + t;
        values[k + half] = even[k] - t;
    }
}

fn transpose(src: &Image<Complex>) -> Image<Complex> {
    let (w, h) = (src.width(), src.height());
    Image::from_fn([h, w].into(), |x, y| src.as_slice()[x * w + y]).with_parallelism(src.parallelism())
}

/// In-place 2D FFT: every row, then every column.
///
/// The inverse transform is normalized by `1 / (width * height)`. Rows are
/// processed in parallel on the grid's parallelism.
///
/// # Errors
///
/// Returns [`ImageError::NotPowerOfTwo`] unless both sides are powers of
/// two; see [`pad_to_power_of_two`](super::pad_to_power_of_two).
pub fn fft_2d(grid: &mut Image<Complex>, inverse: bool) -> Result<(), ImageError> {
    let (w, h) = (grid.width(), grid.height());
    if !w.is_power_of_two() || !h.is_power_of_two() {
        return Err(ImageError::NotPowerOfTwo(w, h));
    }

    grid.for_each_row_mut(|_, row| butterfly(row, inverse));
    let mut columns = transpose(grid);
    columns.for_each_row_mut(|_, column| butterfly(column, inverse));
    *grid = transpose(&columns);

    if inverse {
        let k = 1.0 / (w * h) as f64;
        grid.map_in_place(|v, _, _| v.scale(k));
    }
    Ok(())
}

/// Forward 2D transform of a real grid.
///
/// # Errors
///
/// See [`fft_2d`].
pub fn fft(grid: &Image<f64>) -> Result<Image<Complex>, ImageError> {
    let mut spectrum = grid.map(|v, _, _| Complex::from(*v));
    fft_2d(&mut spectrum, false)?;
    Ok(spectrum)
}

/// Inverse 2D transform, keeping the real part.
///
/// # Errors
///
/// See [`fft_2d`].
pub fn ifft(spectrum: &Image<Complex>) -> Result<Image<f64>, ImageError> {
    let mut grid = spectrum.clone();
    fft_2d(&mut grid, true)?;
    Ok(grid.map(|v, _, _| v.re))
}

/// Zero-extend `grid` to the next power of two in each axis, keeping it in
/// the top-left corner.
pub fn pad_to_power_of_two(grid: &Image<f64>) -> Image<f64> {
    let w = grid.width().next_power_of_two();
    let h = grid.height().next_power_of_two();
    Image::from_fn([w, h].into(), |x, y| grid.get(x, y).copied().unwrap_or(0.0))
        .with_parallelism(grid.parallelism())
}
