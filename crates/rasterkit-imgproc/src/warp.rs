use rasterkit_image::{Image, ImageSize, Pixel};
use rasterkit_linalg::{LinalgError, Transform};

use crate::interpolation::bilinear;

/// Resample `src` through `transform` into an image of `dst_size`.
///
/// Every output pixel `(x, y)` is mapped through the pseudoinverse of
/// `transform`, divided by its homogeneous coordinate and sampled with
/// [`bilinear`]. Samples that fall outside the source, or map to infinity,
/// read `background`.
///
/// # Errors
///
/// Returns [`LinalgError::SingularMatrix`] when the transform has no usable
/// inverse.
pub fn try_linear_transform_to(
    src: &Image<Pixel>,
    transform: &Transform,
    dst_size: ImageSize,
    background: Pixel,
) -> Result<Image<Pixel>, LinalgError> {
    let inverse = transform.inverse()?;
    let dst = Image::from_size_val(dst_size, background).with_parallelism(src.parallelism());
    Ok(dst.map(|_, x, y| match inverse.apply(x as f64, y as f64) {
        Some((sx, sy)) => bilinear(src, sx, sy, background),
        None => background,
    }))
}

/// [`try_linear_transform_to`] with the output the size of the input.
pub fn try_linear_transform(
    src: &Image<Pixel>,
    transform: &Transform,
    background: Pixel,
) -> Result<Image<Pixel>, LinalgError> {
    try_linear_transform_to(src, transform, src.size(), background)
}

/// Resample `src` through `transform` into an image of `dst_size`.
///
/// A transform without inverse produces an image filled with `background`.
pub fn linear_transform_to(
    src: &Image<Pixel>,
    transform: &Transform,
    dst_size: ImageSize,
    background: Pixel,
) -> Image<Pixel> {
    match try_linear_transform_to(src, transform, dst_size, background) {
        Ok(dst) => dst,
        Err(e) => {
            log::warn!("transform failed, output is background only: {e}");
            Image::from_size_val(dst_size, background).with_parallelism(src.parallelism())
        }
    }
}

/// Apply an affine or projective transform to an image, keeping its size.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `transform` - The forward transform from source to output coordinates.
/// * `background` - The color of output pixels with no source.
///
/// # Examples
///
/// ```
/// use rasterkit_image::{Image, Pixel};
/// use rasterkit_imgproc::warp::linear_transform;
/// use rasterkit_linalg::Transform;
///
/// let image = Image::from_fn([4, 1].into(), |x, _| Pixel::gray_pixel(x as u8 * 50));
/// let moved = linear_transform(&image, &Transform::identity().translate(1.0, 0.0), Pixel::BLACK);
/// assert_eq!(moved.get(2, 0), Some(&Pixel::gray_pixel(50)));
/// ```
pub fn linear_transform(src: &Image<Pixel>, transform: &Transform, background: Pixel) -> Image<Pixel> {
    linear_transform_to(src, transform, src.size(), background)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use rasterkit_image::Parallelism;

    use super::*;

    fn numbered(width: usize, height: usize) -> Image<Pixel> {
        Image::from_fn([width, height].into(), |x, y| Pixel::rgb(x as u8 * 10, y as u8 * 10, 1))
    }

    #[test]
    fn identity_keeps_image() {
        let image = numbered(5, 4).with_parallelism(Parallelism::Workers(2));
        assert_eq!(linear_transform(&image, &Transform::identity(), Pixel::BLACK), image);
    }

    #[test]
    fn translation_moves_content() {
        let image = numbered(5, 4);
        let bg = Pixel::new(1, 2, 3, 4);
        let out = linear_transform(&image, &Transform::identity().translate(2.0, 1.0), bg);
        assert_eq!(out.get(0, 0), Some(&bg));
        assert_eq!(out.get(2, 1), image.get(0, 0));
        assert_eq!(out.get(4, 3), image.get(2, 2));
    }

    #[test]
    fn chain_order_is_respected() {
        // translate first, then rotate a quarter turn about the origin
        let image = numbered(8, 8);
        let t = Transform::identity().translate(1.0, 0.0).rotate(FRAC_PI_2);
        let out = linear_transform(&image, &t, Pixel::BLACK);
        // source (2, 0) -> (3, 0) -> (0, 3)
        assert_eq!(out.get(0, 3), image.get(2, 0));
    }

    #[test]
    fn singular_transform_gives_background() {
        let image = numbered(3, 3);
        let t = Transform::from_array([[0.0; 3]; 3]);
        assert_eq!(
            try_linear_transform(&image, &t, Pixel::BLACK),
            Err(LinalgError::SingularMatrix)
        );
        let out = linear_transform(&image, &t, Pixel::RED);
        assert!(out.as_slice().iter().all(|p| *p == Pixel::RED));
    }

    #[test]
    fn flattening_transform_gives_background() {
        let image = numbered(4, 4);
        let flatten = Transform::identity().scale(0.0, 1.0);
        assert_eq!(
            try_linear_transform(&image, &flatten, Pixel::BLACK),
            Err(LinalgError::SingularMatrix)
        );
        let out = linear_transform(&image, &flatten, Pixel::BLUE);
        assert!(out.as_slice().iter().all(|p| *p == Pixel::BLUE));
    }

    #[test]
    fn quad_rectification() -> Result<(), LinalgError> {
        let image = numbered(10, 10);
        // map the quad at (2, 2)..(6, 6) onto a 5x5 output
        let src = [(2.0, 2.0), (6.0, 2.0), (6.0, 6.0), (2.0, 6.0)];
        let dst = [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)];
        let t = Transform::from_quad(&src, &dst)?;
        let out = try_linear_transform_to(&image, &t, [5, 5].into(), Pixel::BLACK)?;
        assert_eq!((out.width(), out.height()), (5, 5));
        assert_eq!(out.get(0, 0), image.get(2, 2));
        assert_eq!(out.get(4, 4), image.get(6, 6));
        Ok(())
    }
}
