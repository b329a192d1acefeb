use rasterkit_image::{Image, ImageError, ImageSize, Pixel};

use crate::draw;

/// Count the pixels at each of the 256 gray levels.
///
/// The counts are accumulated sequentially in index order.
///
/// # Example
///
/// ```
/// use rasterkit_image::{Image, Pixel};
/// use rasterkit_imgproc::histogram::gray_histogram;
///
/// let image = Image::from_size_val([3, 3].into(), Pixel::gray_pixel(128));
/// let hist = gray_histogram(&image);
/// assert_eq!(hist[128], 9);
/// ```
pub fn gray_histogram(src: &Image<Pixel>) -> [usize; 256] {
    let mut hist = [0usize; 256];
    src.data().for_each_sync(|p, _| hist[p.gray_level() as usize] += 1);
    hist
}

/// Draw `values` as a bar chart onto `canvas`.
///
/// The values are grouped into `chunks` consecutive groups; each group is one
/// bar of `canvas.width() / chunks` columns whose height is the group mean
/// relative to the largest group mean. Bars grow from the bottom row. When
/// every value is zero nothing is drawn.
///
/// # Arguments
///
/// * `canvas` - The image to draw on.
/// * `values` - The values to plot.
/// * `chunks` - The number of bars.
/// * `color` - The bar color.
///
/// # Errors
///
/// Returns [`ImageError::InvalidParameter`] if `chunks` is zero, exceeds the
/// number of values or exceeds the canvas width.
pub fn bar_plot(
    canvas: &mut Image<Pixel>,
    values: &[f64],
    chunks: usize,
    color: Pixel,
) -> Result<(), ImageError> {
    if chunks == 0 || chunks > values.len() || chunks > canvas.width() {
        return Err(ImageError::InvalidParameter(format!(
            "cannot plot {} values as {} bars on a canvas {} pixels wide",
            values.len(),
            chunks,
            canvas.width()
        )));
    }

    let bar_width = canvas.width() / chunks;
    let chunk_size = values.len() / chunks;
    let means: Vec<f64> = values
        .chunks(chunk_size)
        .take(chunks)
        .map(|c| c.iter().sum::<f64>() / chunk_size as f64)
        .collect();

    let max = means.iter().copied().fold(0.0f64, f64::max);
    if max <= 0.0 {
        log::debug!("bar plot skipped: all values are zero");
        return Ok(());
    }

    let height = canvas.height();
    for (i, mean) in means.iter().enumerate() {
        let bar_height = ((height as f64 * mean / max) as usize).min(height);
        for y in height - bar_height..height {
            for x in i * bar_width..(i + 1) * bar_width {
                canvas.put(x as i64, y as i64, color);
            }
        }
    }
    Ok(())
}

/// Plot the gray level histogram of `src` as black bars on a white canvas.
///
/// # Errors
///
/// See [`bar_plot`].
pub fn gray_histogram_plot(
    src: &Image<Pixel>,
    width: usize,
    height: usize,
    chunks: usize,
) -> Result<Image<Pixel>, ImageError> {
    let hist = gray_histogram(src);
    let values: Vec<f64> = hist.iter().map(|v| *v as f64).collect();
    let mut canvas = draw::blank_canvas(ImageSize { width, height }, Pixel::WHITE);
    bar_plot(&mut canvas, &values, chunks, Pixel::BLACK)?;
    Ok(canvas)
}
