use crate::error::ImageError;
use crate::parallel::{Parallelism, PixelArray};

/// Image size in pixels
///
/// # Examples
///
/// ```
/// use rasterkit_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Number of pixels covered by this size.
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// A row-major 2D view over a [`PixelArray`], origin at the top-left.
///
/// The element type is generic so the same container holds color rasters
/// (`Image<Pixel>`), intensity grids (`Image<f64>`) and spectra.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T> {
    size: ImageSize,
    data: PixelArray<T>,
}

impl<T> Image<T> {
    /// Create a new image from a size and row-major pixel data.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::DataLengthMismatch`] if `data.len()` is not
    /// `width * height`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rasterkit_image::{Image, ImageSize};
    ///
    /// let image = Image::new(ImageSize { width: 2, height: 3 }, vec![0u8; 6]).unwrap();
    /// assert_eq!(image.width(), 2);
    /// assert_eq!(image.height(), 3);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        if data.len() != size.area() {
            return Err(ImageError::DataLengthMismatch(data.len(), size.area()));
        }
        Ok(Self {
            size,
            data: PixelArray::from_vec(data),
        })
    }

    /// Create an image filled with `val`.
    pub fn from_size_val(size: ImageSize, val: T) -> Self
    where
        T: Clone,
    {
        Self {
            size,
            data: PixelArray::from_elem(size.area(), val),
        }
    }

    /// Create an image by evaluating `f(x, y)` for every pixel in row-major order.
    pub fn from_fn(size: ImageSize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(size.area());
        for y in 0..size.height {
            for x in 0..size.width {
                data.push(f(x, y));
            }
        }
        Self {
            size,
            data: PixelArray::from_vec(data),
        }
    }

    /// Replace the parallelism used by bulk operations on this image.
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.data.set_parallelism(parallelism);
        self
    }

    /// The parallelism used by bulk operations on this image.
    pub fn parallelism(&self) -> Parallelism {
        self.data.parallelism()
    }

    /// The size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// The height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Alias of [`Image::width`].
    pub fn cols(&self) -> usize {
        self.size.width
    }

    /// Alias of [`Image::height`].
    pub fn rows(&self) -> usize {
        self.size.height
    }

    /// Whether the image holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat index of `(x, y)`; the caller guarantees the point is inside.
    #[inline]
    pub fn index_of(&self, x: usize, y: usize) -> usize {
        y * self.size.width + x
    }

    /// The `(x, y)` coordinates of a flat index.
    #[inline]
    pub fn coords_of(&self, index: usize) -> (usize, usize) {
        (index % self.size.width, index / self.size.width)
    }

    /// Whether the signed coordinates fall inside the image.
    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.size.width && (y as usize) < self.size.height
    }

    /// Borrow the pixel at `(x, y)`, or `None` outside the image.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.size.width && y < self.size.height {
            self.data.get(self.index_of(x, y))
        } else {
            None
        }
    }

    /// Mutably borrow the pixel at `(x, y)`, or `None` outside the image.
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x < self.size.width && y < self.size.height {
            let index = self.index_of(x, y);
            self.data.get_mut(index)
        } else {
            None
        }
    }

    /// Borrow the pixel at signed coordinates clamped to the image edges.
    ///
    /// The image must not be empty.
    #[inline]
    pub fn get_clamped(&self, x: i64, y: i64) -> &T {
        let cx = x.clamp(0, self.size.width as i64 - 1) as usize;
        let cy = y.clamp(0, self.size.height as i64 - 1) as usize;
        &self.data[self.index_of(cx, cy)]
    }

    /// Write `value` at signed coordinates, ignoring points outside the image.
    #[inline]
    pub fn put(&mut self, x: i64, y: i64, value: T) {
        if self.contains(x, y) {
            let index = self.index_of(x as usize, y as usize);
            self.data[index] = value;
        }
    }

    /// The underlying pixel array.
    pub fn data(&self) -> &PixelArray<T> {
        &self.data
    }

    /// The underlying pixel array, mutably.
    pub fn data_mut(&mut self) -> &mut PixelArray<T> {
        &mut self.data
    }

    /// The pixels as a row-major slice.
    pub fn as_slice(&self) -> &[T] {
        self.data.as_slice()
    }

    /// The pixels as a mutable row-major slice.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        self.data.as_slice_mut()
    }

    /// Borrow row `y`.
    pub fn row(&self, y: usize) -> Option<&[T]> {
        let start = y.checked_mul(self.size.width)?;
        self.as_slice().get(start..start + self.size.width)
    }

    /// Consume the image and return its row-major pixels.
    pub fn into_vec(self) -> Vec<T> {
        self.data.into_vec()
    }
}

impl<T: Send + Sync> Image<T> {
    /// Return a new image of `f(&pixel, x, y)` for every pixel.
    ///
    /// Runs on the image's [`Parallelism`].
    pub fn map<U, F>(&self, f: F) -> Image<U>
    where
        U: Send,
        F: Fn(&T, usize, usize) -> U + Send + Sync,
    {
        let width = self.size.width.max(1);
        Image {
            size: self.size,
            data: self.data.map(|v, i| f(v, i % width, i / width)),
        }
    }

    /// Replace every pixel with `f(&pixel, x, y)`.
    pub fn map_in_place<F>(&mut self, f: F)
    where
        F: Fn(&T, usize, usize) -> T + Send + Sync,
    {
        let width = self.size.width.max(1);
        self.data.map_in_place(|v, i| f(v, i % width, i / width));
    }

    /// Run `f(y, row)` over every row, each row written by one worker.
    pub fn for_each_row_mut<F>(&mut self, f: F)
    where
        F: Fn(usize, &mut [T]) + Send + Sync,
    {
        let width = self.size.width;
        self.data.for_each_block_mut(width, f);
    }

    /// Combine two same-size images pixel by pixel.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidImageSize`] if the sizes differ.
    pub fn zip_map<S, U, F>(&self, other: &Image<S>, f: F) -> Result<Image<U>, ImageError>
    where
        S: Send + Sync,
        U: Send,
        F: Fn(&T, &S) -> U + Send + Sync,
    {
        if self.size != other.size {
            return Err(ImageError::InvalidImageSize(
                self.width(),
                self.height(),
                other.width(),
                other.height(),
            ));
        }
        Ok(Image {
            size: self.size,
            data: PixelArray::binary_op(&self.data, &other.data, f)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::Pixel;

    #[test]
    fn image_size() {
        let image_size = ImageSize {
            width: 10,
            height: 20,
        };
        assert_eq!(image_size.width, 10);
        assert_eq!(image_size.height, 20);
        assert_eq!(image_size.area(), 200);
    }

    #[test]
    fn image_smoke() -> Result<(), ImageError> {
        let image = Image::new([2, 3].into(), vec![0u8; 6])?;
        assert_eq!(image.size().width, 2);
        assert_eq!(image.size().height, 3);

        let bad = Image::new([2, 3].into(), vec![0u8; 5]);
        assert_eq!(bad, Err(ImageError::DataLengthMismatch(5, 6)));
        Ok(())
    }

    #[test]
    fn accessors() {
        let mut image = Image::from_fn([3, 2].into(), |x, y| (x + 10 * y) as i32);
        assert_eq!(image.get(2, 1), Some(&12));
        assert_eq!(image.get(3, 0), None);
        assert_eq!(*image.get_clamped(-5, 9), 10);
        assert_eq!(*image.get_clamped(7, -1), 2);
        assert_eq!(image.row(1), Some(&[10, 11, 12][..]));

        image.put(1, 1, -1);
        image.put(-1, 0, 99);
        assert_eq!(image.get(1, 1), Some(&-1));
        assert_eq!(image.coords_of(4), (1, 1));
    }

    #[test]
    fn map_passes_coordinates() {
        let image = Image::from_size_val([4, 3].into(), Pixel::BLACK).with_parallelism(Parallelism::Workers(2));
        let out = image.map(|_, x, y| x * 100 + y);
        assert_eq!(out.get(3, 2), Some(&302));
        assert_eq!(out.get(0, 1), Some(&1));
    }

    #[test]
    fn zip_map_checks_size() -> Result<(), ImageError> {
        let a = Image::from_size_val([2, 2].into(), 1.0f64);
        let b = Image::from_size_val([2, 2].into(), 2.0f64);
        let c = a.zip_map(&b, |x, y| x + y)?;
        assert_eq!(c.as_slice(), &[3.0; 4]);

        let d = Image::from_size_val([1, 4].into(), 2.0f64);
        assert!(a.zip_map(&d, |x, y| x + y).is_err());
        Ok(())
    }
}
