use rasterkit_image::{Image, ImageError, Pixel};

use super::kernels::Kernel;

/// Convolve an image with a matrix of weights.
///
/// See [`filter2d`] for the semantics.
///
/// # Errors
///
/// Returns [`ImageError::InvalidKernelSize`] unless `weights` is an odd by
/// odd square.
///
/// # Examples
///
/// ```
/// use rasterkit_image::{Image, Pixel};
/// use rasterkit_imgproc::filter::apply_kernel;
///
/// let image = Image::from_size_val([4, 4].into(), Pixel::rgb(10, 20, 30));
/// let out = apply_kernel(&image, &[vec![1.0]]).unwrap();
/// assert_eq!(out, image);
/// ```
pub fn apply_kernel(src: &Image<Pixel>, weights: &[Vec<f64>]) -> Result<Image<Pixel>, ImageError> {
    let kernel = Kernel::new(weights)?;
    Ok(filter2d(src, &kernel))
}

/// Convolve the color channels of an image with `kernel`.
///
/// Each output channel is `sum(weight[ky][kx] * src(x + kx - half, y + ky - half))`
/// with out-of-bounds coordinates clamped to the nearest edge pixel. The sums
/// are clamped into `[0, 255]` and truncated; the output alpha is always 255.
/// Returns a new image.
pub fn filter2d(src: &Image<Pixel>, kernel: &Kernel) -> Image<Pixel> {
    if src.is_empty() {
        return src.clone();
    }
    let half = kernel.half() as i64;
    src.map(|_, x, y| {
        let (mut r, mut g, mut b) = (0.0, 0.0, 0.0);
        for ky in 0..kernel.size() {
            for kx in 0..kernel.size() {
                let w = kernel.weight(kx, ky);
                let p = src.get_clamped(x as i64 + kx as i64 - half, y as i64 + ky as i64 - half);
                r += w * p.r as f64;
                g += w * p.g as f64;
                b += w * p.b as f64;
            }
        }
        Pixel::rgb(
            r.clamp(0.0, 255.0) as u8,
            g.clamp(0.0, 255.0) as u8,
            b.clamp(0.0, 255.0) as u8,
        )
    })
}

/// Convolve a real valued grid with `kernel`, edge replicated and unclamped.
pub fn convolve_grid(src: &Image<f64>, kernel: &Kernel) -> Image<f64> {
    if src.is_empty() {
        return src.clone();
    }
    let half = kernel.half() as i64;
    src.map(|_, x, y| {
        let mut acc = 0.0;
        for ky in 0..kernel.size() {
            for kx in 0..kernel.size() {
                acc += kernel.weight(kx, ky)
                    * src.get_clamped(x as i64 + kx as i64 - half, y as i64 + ky as i64 - half);
            }
        }
        acc
    })
}

#[cfg(test)]
mod tests {
    use rasterkit_image::Parallelism;

    use super::*;
    use crate::filter::kernels;

    fn checker(size: usize) -> Image<Pixel> {
        Image::from_fn([size, size].into(), |x, y| {
            if (x + y) % 2 == 0 {
                Pixel::new(250, 10, 128, 7)
            } else {
                Pixel::rgb(0, 240, 3)
            }
        })
    }

    #[test]
    fn identity_kernel_keeps_colors() -> Result<(), ImageError> {
        let image = checker(5);
        let out = apply_kernel(&image, &[vec![1.0]])?;
        for (a, b) in image.as_slice().iter().zip(out.as_slice()) {
            assert_eq!((a.r, a.g, a.b), (b.r, b.g, b.b));
            assert_eq!(b.a, 255);
        }

        let out3 = apply_kernel(&image, &[vec![0.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 0.0]])?;
        assert_eq!(out3, out);
        Ok(())
    }

    #[test]
    fn even_kernel_rejected() {
        let image = checker(3);
        assert_eq!(
            apply_kernel(&image, &[vec![1.0, 1.0], vec![1.0, 1.0]]),
            Err(ImageError::InvalidKernelSize(2, 2))
        );
    }

    #[test]
    fn outputs_stay_in_range() -> Result<(), ImageError> {
        let image = checker(6).with_parallelism(Parallelism::Workers(3));
        let big = vec![vec![9.0, -7.0, 9.0]; 3];
        for weights in [big, vec![vec![-1.0; 3]; 3]] {
            let out = apply_kernel(&image, &weights)?;
            assert!(out.as_slice().iter().all(|p| p.a == 255));
        }
        // a strongly positive kernel saturates white, a negative one black
        let out = apply_kernel(&image, &[vec![10.0]])?;
        assert_eq!(out.get(0, 0), Some(&Pixel::rgb(255, 100, 255)));
        let out = apply_kernel(&image, &[vec![-1.0]])?;
        assert_eq!(out.get(0, 0), Some(&Pixel::BLACK));
        Ok(())
    }

    #[test]
    fn edges_are_replicated() -> Result<(), ImageError> {
        let image = Image::from_fn([3, 1].into(), |x, _| Pixel::gray_pixel((x * 100) as u8));
        // shift right by one: output(x) = input(x - 1), clamped at the left edge
        let shift = Kernel::from_fn(3, |kx, ky| if kx == 0 && ky == 1 { 1.0 } else { 0.0 })?;
        let out = filter2d(&image, &shift);
        let reds: Vec<u8> = out.as_slice().iter().map(|p| p.r).collect();
        assert_eq!(reds, vec![0, 0, 100]);
        Ok(())
    }

    #[test]
    fn grid_convolution_is_signed() -> Result<(), ImageError> {
        let grid = Image::from_fn([3, 3].into(), |x, _| x as f64);
        let gx = convolve_grid(&grid, &kernels::sobel_x());
        assert_eq!(gx.get(1, 1), Some(&8.0));
        assert_eq!(gx.get(0, 1), Some(&4.0));
        let neg = convolve_grid(&grid, &Kernel::from_fn(1, |_, _| -1.0)?);
        assert_eq!(neg.get(2, 2), Some(&-2.0));
        Ok(())
    }
}
