//! Frequency domain filtering
//!
//! Radix-2 FFT over power-of-two grids, spectrum masking and the polar form
//! of a spectrum.

mod complex;
pub use complex::Complex;

mod fft;
pub use fft::*;

mod spectrum;
pub use spectrum::*;
