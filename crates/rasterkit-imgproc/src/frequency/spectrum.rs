use rasterkit_image::{Image, ImageError};

use super::complex::Complex;
use super::fft::{fft, ifft, pad_to_power_of_two};

/// The frequency band a [`CutoffMask`] removes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Band {
    /// Frequencies below the cutoff on both axes, a high-pass filter.
    #[default]
    Low,
    /// Frequencies above the cutoff on both axes, a low-pass filter.
    High,
}

/// How the cutoff window is placed on the unshifted spectrum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MaskSymmetry {
    /// Indices are compared as they are, so only the top-left corner holds
    /// the low frequencies.
    #[default]
    SingleQuadrant,
    /// Indices are folded to `min(i, n - i)`, masking all four mirrored
    /// corners alike.
    AllQuadrants,
}

/// A rectangular frequency cutoff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CutoffMask {
    /// The cutoff radius in frequency bins.
    pub cutoff: f64,
    /// The band to remove.
    pub band: Band,
    /// The value written into removed bins.
    pub fill: f64,
    /// Placement of the window.
    pub symmetry: MaskSymmetry,
}

impl CutoffMask {
    /// A mask removing `band` beyond `cutoff`, filling with zero.
    pub fn new(cutoff: f64, band: Band) -> Self {
        Self {
            cutoff,
            band,
            fill: 0.0,
            symmetry: MaskSymmetry::default(),
        }
    }

    /// Whether the bin at `(x, y)` of a `width x height` spectrum is removed.
    pub fn removes(&self, x: usize, y: usize, width: usize, height: usize) -> bool {
        let (fx, fy) = match self.symmetry {
            MaskSymmetry::SingleQuadrant => (x, y),
            MaskSymmetry::AllQuadrants => (x.min(width - x), y.min(height - y)),
        };
        let (fx, fy) = (fx as f64, fy as f64);
        match self.band {
            Band::Low => fx < self.cutoff && fy < self.cutoff,
            Band::High => fx > self.cutoff && fy > self.cutoff,
        }
    }
}

/// Overwrite the bins of `spectrum` selected by `mask` with `mask.fill`.
pub fn cutoff_frequency(spectrum: &mut Image<Complex>, mask: &CutoffMask) {
    let (w, h) = (spectrum.width(), spectrum.height());
    let fill = Complex::from(mask.fill);
    spectrum.map_in_place(|v, x, y| if mask.removes(x, y, w, h) { fill } else { *v });
}

/// Per-bin magnitude and phase of a spectrum.
pub fn polar_transform(spectrum: &Image<Complex>) -> (Image<f64>, Image<f64>) {
    (
        spectrum.map(|v, _, _| v.magnitude()),
        spectrum.map(|v, _, _| v.phase()),
    )
}

/// Filter a real grid in the frequency domain.
///
/// The grid is zero padded to powers of two, transformed, masked, transformed
/// back and cropped to its original size.
///
/// # Errors
///
/// Returns [`ImageError::EmptyImage`] for an empty grid.
pub fn frequency_filter(grid: &Image<f64>, mask: &CutoffMask) -> Result<Image<f64>, ImageError> {
    if grid.is_empty() {
        return Err(ImageError::EmptyImage);
    }
    let mut spectrum = fft(&pad_to_power_of_two(grid))?;
    cutoff_frequency(&mut spectrum, mask);
    let filtered = ifft(&spectrum)?;
    Ok(Image::from_fn(grid.size(), |x, y| {
        filtered.get(x, y).copied().unwrap_or(0.0)
    })
    .with_parallelism(grid.parallelism()))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn ones(w: usize, h: usize) -> Image<Complex> {
        Image::from_size_val([w, h].into(), Complex::new(1.0, 1.0))
    }

    fn removed(spectrum: &Image<Complex>) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for y in 0..spectrum.height() {
            for x in 0..spectrum.width() {
                if spectrum.get(x, y) == Some(&Complex::new(0.0, 0.0)) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn single_quadrant_masks() {
        let mut s = ones(4, 4);
        cutoff_frequency(&mut s, &CutoffMask::new(1.5, Band::Low));
        assert_eq!(removed(&s), vec![(0, 0), (1, 0), (0, 1), (1, 1)]);

        let mut s = ones(4, 4);
        cutoff_frequency(&mut s, &CutoffMask::new(2.0, Band::High));
        assert_eq!(removed(&s), vec![(3, 3)]);
    }

    #[test]
    fn mirrored_masks() {
        let mask = CutoffMask {
            symmetry: MaskSymmetry::AllQuadrants,
            ..CutoffMask::new(1.0, Band::Low)
        };
        let mut s = ones(4, 4);
        cutoff_frequency(&mut s, &mask);
        assert_eq!(removed(&s), vec![(0, 0)]);

        let mask = CutoffMask {
            symmetry: MaskSymmetry::AllQuadrants,
            fill: 5.0,
            ..CutoffMask::new(1.0, Band::High)
        };
        let mut s = ones(4, 4);
        cutoff_frequency(&mut s, &mask);
        assert_eq!(s.get(2, 2), Some(&Complex::new(5.0, 0.0)));
        assert_eq!(s.get(1, 2), Some(&Complex::new(1.0, 1.0)));
    }

    #[test]
    fn removing_dc_centers_the_grid() -> Result<(), ImageError> {
        let grid = Image::from_fn([6, 3].into(), |x, _| 10.0 + x as f64);
        let filtered = frequency_filter(&grid, &CutoffMask::new(0.5, Band::Low))?;
        assert_eq!((filtered.width(), filtered.height()), (6, 3));
        let padded = pad_to_power_of_two(&grid);
        // the padded mean is removed from every cell
        let mean = padded.as_slice().iter().sum::<f64>() / padded.as_slice().len() as f64;
        for (a, b) in grid.as_slice().iter().zip(filtered.as_slice()) {
            assert_relative_eq!(*a - mean, *b, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn polar_of_known_values() {
        let s = Image::from_size_val([2, 1].into(), Complex::new(0.0, -2.0));
        let (mag, phase) = polar_transform(&s);
        assert_relative_eq!(mag.as_slice()[0], 2.0);
        assert_relative_eq!(phase.as_slice()[1], -std::f64::consts::FRAC_PI_2);
    }
}
