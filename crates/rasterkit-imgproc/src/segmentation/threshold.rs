use rasterkit_image::{Image, Pixel};

use crate::histogram::gray_histogram;

/// Recolor every pixel to `low` when its gray level is below `threshold` and
/// to `high` otherwise.
///
/// # Examples
///
/// ```
/// use rasterkit_image::{Image, Pixel};
/// use rasterkit_imgproc::segmentation::segment_by_threshold;
///
/// let image = Image::from_fn([4, 1].into(), |x, _| Pixel::gray_pixel(x as u8 * 60));
/// let binary = segment_by_threshold(&image, 100, Pixel::BLACK, Pixel::WHITE);
/// assert_eq!(binary.get(1, 0), Some(&Pixel::BLACK));
/// assert_eq!(binary.get(2, 0), Some(&Pixel::WHITE));
/// ```
pub fn segment_by_threshold(src: &Image<Pixel>, threshold: u32, low: Pixel, high: Pixel) -> Image<Pixel> {
    src.map(|p, _, _| {
        if (p.gray_level() as u32) < threshold {
            low
        } else {
            high
        }
    })
}

/// Parameters of the iterative (isodata) threshold search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IterativeThreshold {
    /// Upper bound on the number of refinement steps.
    pub max_iterations: usize,
    /// The search stops once the threshold moves by less than this.
    pub eps: f64,
    /// Starting threshold.
    pub initial: u32,
}

impl Default for IterativeThreshold {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            eps: 2.0,
            initial: 128,
        }
    }
}

/// Mean gray level and pixel count of the histogram bins in `levels`.
fn class_stats(hist: &[usize; 256], levels: std::ops::Range<usize>) -> (usize, f64) {
    let (count, sum) = hist[levels.clone()]
        .iter()
        .zip(levels)
        .fold((0usize, 0.0f64), |(n, s), (h, l)| (n + h, s + (*h as f64) * l as f64));
    if count == 0 {
        (0, 0.0)
    } else {
        (count, sum / count as f64)
    }
}

/// Find a global threshold by repeatedly averaging the class means.
///
/// At each step the gray levels are split at the current threshold, the mean
/// of each side is computed and the new threshold is the average of the two.
/// The search ends when the threshold moves by less than `eps`, when one side
/// becomes empty or after `max_iterations` steps.
///
/// # Returns
///
/// The rounded threshold, suitable for [`segment_by_threshold`].
pub fn auto_threshold_iteration(src: &Image<Pixel>, params: &IterativeThreshold) -> u32 {
    let hist = gray_histogram(src);
    let mut threshold = params.initial.min(256) as f64;

    for iteration in 0..params.max_iterations {
        let split = (threshold.ceil() as usize).min(256);
        let (n_low, mean_low) = class_stats(&hist, 0..split);
        let (n_high, mean_high) = class_stats(&hist, split..256);
        if n_low == 0 || n_high == 0 {
            log::debug!("iterative threshold: empty class at step {iteration}, stopping at {threshold}");
            break;
        }

        let next = (mean_low + mean_high) / 2.0;
        let delta = (next - threshold).abs();
        threshold = next;
        if delta < params.eps {
            log::debug!("iterative threshold converged to {threshold} after {} steps", iteration + 1);
            break;
        }
    }

    threshold.round() as u32
}

/// Otsu's threshold: the split maximizing the between-class variance.
///
/// Every candidate `t` in `0..=256` splits the gray levels into `l < t` and
/// `l >= t`; the score is `n_low * n_high * (mean_low - mean_high)^2`. The
/// first candidate reaching the maximum wins. A blank or single-level image
/// has no separating split and yields `0`.
pub fn auto_threshold_otsu(src: &Image<Pixel>) -> u32 {
    let hist = gray_histogram(src);
    let total: usize = hist.iter().sum();
    let total_sum: f64 = hist.iter().enumerate().map(|(l, h)| l as f64 * *h as f64).sum();

    let mut best = 0u32;
    let mut best_score = 0.0f64;
    let mut n_low = 0usize;
    let mut sum_low = 0.0f64;

    for t in 0..=256usize {
        if t > 0 {
            n_low += hist[t - 1];
            sum_low += (t - 1) as f64 * hist[t - 1] as f64;
        }
        let n_high = total - n_low;
        if n_low == 0 || n_high == 0 {
            continue;
        }
        let mean_low = sum_low / n_low as f64;
        let mean_high = (total_sum - sum_low) / n_high as f64;
        let score = n_low as f64 * n_high as f64 * (mean_low - mean_high).powi(2);
        if score > best_score {
            best_score = score;
            best = t as u32;
        }
    }

    log::debug!("otsu threshold {best}");
    best
}

#[cfg(test)]
mod tests {
    use rasterkit_image::Parallelism;

    use super::*;

    fn two_level(low: u8, high: u8) -> Image<Pixel> {
        Image::from_fn([8, 8].into(), |x, _| {
            if x < 4 {
                Pixel::gray_pixel(low)
            } else {
                Pixel::gray_pixel(high)
            }
        })
    }

    #[test]
    fn threshold_is_idempotent() {
        let image = Image::from_fn([16, 16].into(), |x, y| Pixel::rgb((x * 16) as u8, (y * 16) as u8, 90))
            .with_parallelism(Parallelism::Workers(3));
        let once = segment_by_threshold(&image, 120, Pixel::BLACK, Pixel::WHITE);
        let twice = segment_by_threshold(&once, 120, Pixel::BLACK, Pixel::WHITE);
        assert_eq!(once, twice);
    }

    #[test]
    fn otsu_separates_two_levels() {
        let t = auto_threshold_otsu(&two_level(50, 200));
        assert!(t > 50 && t < 200);
        assert_eq!(t, 51);
    }

    #[test]
    fn otsu_degenerate_images() {
        assert_eq!(auto_threshold_otsu(&Image::from_size_val([3, 3].into(), Pixel::gray_pixel(90))), 0);
        assert_eq!(auto_threshold_otsu(&Image::from_size_val([0, 0].into(), Pixel::BLACK)), 0);
    }

    #[test]
    fn iteration_converges_between_levels() {
        let t = auto_threshold_iteration(&two_level(50, 200), &IterativeThreshold::default());
        assert_eq!(t, 125);

        // a single class stops immediately at the start value
        let flat = Image::from_size_val([4, 4].into(), Pixel::gray_pixel(10));
        assert_eq!(auto_threshold_iteration(&flat, &IterativeThreshold::default()), 128);
    }
}
