use rasterkit_image::ImageError;

/// A square, odd sized matrix of real weights.
///
/// # Examples
///
/// ```
/// use rasterkit_imgproc::filter::kernels::Kernel;
///
/// let k = Kernel::new(&[vec![0.0, 1.0, 0.0], vec![1.0, -4.0, 1.0], vec![0.0, 1.0, 0.0]]).unwrap();
/// assert_eq!(k.size(), 3);
/// assert_eq!(k.weight(1, 1), -4.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    size: usize,
    weights: Vec<f64>,
}

impl Kernel {
    /// Build a kernel from its rows.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidKernelSize`] unless the rows form a
    /// non-empty odd by odd square.
    pub fn new(rows: &[Vec<f64>]) -> Result<Self, ImageError> {
        let size = rows.len();
        let cols = rows.first().map_or(0, |r| r.len());
        if size % 2 == 0 || rows.iter().any(|r| r.len() != size) {
            return Err(ImageError::InvalidKernelSize(size, cols));
        }
        Ok(Self {
            size,
            weights: rows.concat(),
        })
    }

    /// Build a `size x size` kernel from `f(kx, ky)`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidKernelSize`] if `size` is even.
    pub fn from_fn(size: usize, f: impl Fn(usize, usize) -> f64) -> Result<Self, ImageError> {
        if size % 2 == 0 {
            return Err(ImageError::InvalidKernelSize(size, size));
        }
        let mut weights = Vec::with_capacity(size * size);
        for ky in 0..size {
            for kx in 0..size {
                weights.push(f(kx, ky));
            }
        }
        Ok(Self { size, weights })
    }

    /// The side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance from the center to an edge.
    pub fn half(&self) -> usize {
        self.size / 2
    }

    /// The weight at column `kx` and row `ky`.
    #[inline]
    pub fn weight(&self, kx: usize, ky: usize) -> f64 {
        self.weights[ky * self.size + kx]
    }

    /// The weights in row-major order.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

/// Create a gaussian blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A vector of the kernel.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f64) -> Vec<f64> {
    let mut kernel = Vec::with_capacity(kernel_size);

    let mean = kernel_size.saturating_sub(1) as f64 / 2.0;
    let sigma_sq = sigma * sigma;

    for i in 0..kernel_size {
        let x = i as f64 - mean;
        kernel.push((-(x * x) / (2.0 * sigma_sq)).exp());
    }

    // normalize the kernel
    let norm = kernel.iter().sum::<f64>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

/// The 1x1 identity kernel.
pub fn identity() -> Kernel {
    Kernel {
        size: 1,
        weights: vec![1.0],
    }
}

/// A mean filter of `kernel_size x kernel_size`.
pub fn box_blur(kernel_size: usize) -> Result<Kernel, ImageError> {
    let w = 1.0 / (kernel_size * kernel_size) as f64;
    Kernel::from_fn(kernel_size, |_, _| w)
}

/// A normalized gaussian kernel, the outer product of two 1D kernels.
pub fn gaussian(kernel_size: usize, sigma: f64) -> Result<Kernel, ImageError> {
    let k = gaussian_kernel_1d(kernel_size, sigma);
    Kernel::from_fn(kernel_size, |kx, ky| k[kx] * k[ky])
}

/// A 3x3 sharpening kernel.
pub fn sharpen() -> Kernel {
    Kernel {
        size: 3,
        weights: vec![0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0],
    }
}

/// The 3x3 four-neighbor Laplacian.
pub fn laplacian() -> Kernel {
    Kernel {
        size: 3,
        weights: vec![0.0, 1.0, 0.0, 1.0, -4.0, 1.0, 0.0, 1.0, 0.0],
    }
}

/// The 3x3 Sobel kernel for the horizontal derivative.
pub fn sobel_x() -> Kernel {
    Kernel {
        size: 3,
        weights: vec![-1.0, 0.0, 1.0, -2.0, 0.0, 2.0, -1.0, 0.0, 1.0],
    }
}

/// The 3x3 Sobel kernel for the vertical derivative.
pub fn sobel_y() -> Kernel {
    Kernel {
        size: 3,
        weights: vec![-1.0, -2.0, -1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 1.0],
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn kernel_shape_is_checked() {
        assert!(Kernel::new(&[vec![1.0]]).is_ok());
        assert_eq!(
            Kernel::new(&[vec![1.0, 2.0], vec![3.0, 4.0]]),
            Err(ImageError::InvalidKernelSize(2, 2))
        );
        assert_eq!(
            Kernel::new(&[vec![1.0, 2.0, 3.0]]),
            Err(ImageError::InvalidKernelSize(1, 3))
        );
        assert!(Kernel::new(&[]).is_err());
        assert!(box_blur(4).is_err());
    }

    #[test]
    fn test_gaussian_kernel_1d() {
        let kernel = gaussian_kernel_1d(5, 0.5);
        let expected = [
            0.00026386508,
            0.10645077,
            0.78657067,
            0.10645077,
            0.00026386508,
        ];
        for (k, e) in kernel.iter().zip(expected.iter()) {
            assert_relative_eq!(*k, *e, epsilon = 1e-6);
        }
    }

    #[test]
    fn normalized_kernels_sum_to_one() -> Result<(), ImageError> {
        for k in [box_blur(3)?, gaussian(5, 1.2)?, sharpen()] {
            assert_relative_eq!(k.weights().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        }
        assert_eq!(laplacian().weights().iter().sum::<f64>(), 0.0);
        Ok(())
    }
}
