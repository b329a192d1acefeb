/// A pixel with four 8-bit channels.
///
/// Pixels are plain values: they are hashable and totally ordered so they can
/// key palette maps and color sets directly.
///
/// # Examples
///
/// ```
/// use rasterkit_image::Pixel;
///
/// let p = Pixel::rgb(255, 0, 0);
/// assert_eq!(p.a, 255);
/// assert_eq!(p.gray_level(), 76);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pixel {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Pixel {
    /// Opaque black.
    pub const BLACK: Pixel = Pixel::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Pixel = Pixel::rgb(255, 255, 255);
    /// Opaque red.
    pub const RED: Pixel = Pixel::rgb(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Pixel = Pixel::rgb(0, 255, 0);
    /// Opaque blue.
    pub const BLUE: Pixel = Pixel::rgb(0, 0, 255);

    /// Create a pixel from all four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque pixel.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create an opaque gray pixel with all color channels set to `level`.
    pub const fn gray_pixel(level: u8) -> Self {
        Self::rgb(level, level, level)
    }

    /// Luminance weighted gray value `0.299R + 0.587G + 0.114B`.
    ///
    /// This is the only gray formula used across the toolkit.
    #[inline]
    pub fn gray(&self) -> f64 {
        0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64
    }

    /// The gray value rounded to the nearest integer level.
    #[inline]
    pub fn gray_level(&self) -> u8 {
        // the weights sum to one so the value never exceeds 255
        self.gray().round() as u8
    }

    /// Euclidean distance over the four channels.
    pub fn distance(&self, other: &Pixel) -> f64 {
        let dr = self.r as f64 - other.r as f64;
        let dg = self.g as f64 - other.g as f64;
        let db = self.b as f64 - other.b as f64;
        let da = self.a as f64 - other.a as f64;
        (dr * dr + dg * dg + db * db + da * da).sqrt()
    }

    /// Channels as an `[r, g, b, a]` array.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Pixel {
    fn from(c: [u8; 4]) -> Self {
        Pixel::new(c[0], c[1], c[2], c[3])
    }
}

impl From<[u8; 3]> for Pixel {
    fn from(c: [u8; 3]) -> Self {
        Pixel::rgb(c[0], c[1], c[2])
    }
}
