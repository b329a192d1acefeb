use rasterkit_image::{Image, Pixel};

/// Coordinates closer than this to an integer sample that integer exactly.
const SNAP_EPSILON: f64 = 1e-9;

fn snap(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < SNAP_EPSILON {
        r
    } else {
        v
    }
}

/// Sample `src` at a real valued location by bilinear interpolation.
///
/// The four taps are the floor and ceil of each coordinate, weighted by the
/// fractional offsets. Taps outside the image read `background`, so samples
/// near the border blend towards it. All four channels are interpolated and
/// truncated.
///
/// # Examples
///
/// ```
/// use rasterkit_image::{Image, Pixel};
/// use rasterkit_imgproc::interpolation::bilinear;
///
/// let image = Image::from_fn([2, 1].into(), |x, _| Pixel::gray_pixel(x as u8 * 100));
/// let p = bilinear(&image, 0.5, 0.0, Pixel::BLACK);
/// assert_eq!(p, Pixel::gray_pixel(50));
/// ```
pub fn bilinear(src: &Image<Pixel>, x: f64, y: f64, background: Pixel) -> Pixel {
    if !x.is_finite() || !y.is_finite() {
        return background;
    }

    let tap = |xi: f64, yi: f64| -> Pixel {
        if xi < 0.0 || yi < 0.0 || xi >= src.width() as f64 || yi >= src.height() as f64 {
            return background;
        }
        src.get(xi as usize, yi as usize).copied().unwrap_or(background)
    };

    let (x, y) = (snap(x), snap(y));
    let (x0, y0) = (x.floor(), y.floor());
    let (x1, y1) = (x.ceil(), y.ceil());
    let (fx, fy) = (x - x0, y - y0);

    let p00 = tap(x0, y0);
    let p10 = tap(x1, y0);
    let p01 = tap(x0, y1);
    let p11 = tap(x1, y1);

    let w00 = (1.0 - fx) * (1.0 - fy);
    let w10 = fx * (1.0 - fy);
    let w01 = (1.0 - fx) * fy;
    let w11 = fx * fy;

    let blend = |c00: u8, c10: u8, c01: u8, c11: u8| -> u8 {
        let v = w00 * c00 as f64 + w10 * c10 as f64 + w01 * c01 as f64 + w11 * c11 as f64;
        v.clamp(0.0, 255.0) as u8
    };

    Pixel::new(
        blend(p00.r, p10.r, p01.r, p11.r),
        blend(p00.g, p10.g, p01.g, p11.g),
        blend(p00.b, p10.b, p01.b, p11.b),
        blend(p00.a, p10.a, p01.a, p11.a),
    )
}
