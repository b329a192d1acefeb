use rasterkit_image::{Image, ImageSize, Pixel};

use crate::point::{Point, Rect};

/// Create an image of `size` filled with `color`.
pub fn blank_canvas(size: ImageSize, color: Pixel) -> Image<Pixel> {
    Image::from_size_val(size, color)
}

/// Color a single pixel, ignoring points outside the image.
#[inline]
pub fn draw_point(img: &mut Image<Pixel>, p: Point, color: Pixel) {
    img.put(p.x, p.y, color);
}

/// Color every point of `points` that falls inside the image.
pub fn draw_points<'a>(
    img: &mut Image<Pixel>,
    points: impl IntoIterator<Item = &'a Point>,
    color: Pixel,
) {
    for p in points {
        draw_point(img, *p, color);
    }
}

/// Draws a line on an image inplace using Bresenham's line algorithm.
///
/// Both end points are included. The segment is clipped to the image before
/// rasterizing, so far away end points cost nothing extra.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `p0` - The start point of the line.
/// * `p1` - The end point of the line.
/// * `color` - The color of the line.
pub fn draw_line(img: &mut Image<Pixel>, p0: Point, p1: Point, color: Pixel) {
    let Some((p0, p1)) = clip_segment(p0, p1, img.width(), img.height()) else {
        return;
    };
    let (mut x0, mut y0) = (p0.x, p0.y);
    let (x1, y1) = (p1.x, p1.y);

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;

    loop {
        img.put(x0, y0, color);

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Liang-Barsky clipping of a segment to `[0, width - 1] x [0, height - 1]`.
///
/// Segments already inside come back unchanged; `None` means nothing is
/// visible.
fn clip_segment(p0: Point, p1: Point, width: usize, height: usize) -> Option<(Point, Point)> {
    if width == 0 || height == 0 {
        return None;
    }
    let (xmax, ymax) = ((width - 1) as f64, (height - 1) as f64);
    let (x0, y0) = (p0.x as f64, p0.y as f64);
    let (dx, dy) = (p1.x as f64 - x0, p1.y as f64 - y0);

    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [(-dx, x0), (dx, xmax - x0), (-dy, y0), (dy, ymax - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| {
        Point::new(
            (x0 + t * dx).round().clamp(0.0, xmax) as i64,
            (y0 + t * dy).round().clamp(0.0, ymax) as i64,
        )
    };
    let start = if t0 == 0.0 { p0 } else { at(t0) };
    let end = if t1 == 1.0 { p1 } else { at(t1) };
    Some((start, end))
}

/// Draw the outline of a box.
pub fn draw_box(img: &mut Image<Pixel>, rect: &Rect, color: Pixel) {
    if rect.width() == 0 || rect.height() == 0 {
        return;
    }
    let (l, t) = (rect.left as i64, rect.top as i64);
    let (r, b) = (rect.right as i64 - 1, rect.bottom as i64 - 1);
    draw_polygon(
        img,
        &[Point::new(l, t), Point::new(r, t), Point::new(r, b), Point::new(l, b)],
        color,
    );
}

/// Draw a closed polygon through `vertices`.
pub fn draw_polygon(img: &mut Image<Pixel>, vertices: &[Point], color: Pixel) {
    for (i, p) in vertices.iter().enumerate() {
        let q = vertices[(i + 1) % vertices.len()];
        draw_line(img, *p, q, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(img: &Image<Pixel>, color: Pixel) -> usize {
        img.as_slice().iter().filter(|p| **p == color).count()
    }

    #[test]
    fn test_draw_line() {
        let mut img = blank_canvas([5, 5].into(), Pixel::BLACK);
        draw_line(&mut img, Point::new(0, 0), Point::new(4, 4), Pixel::WHITE);
        assert_eq!(count(&img, Pixel::WHITE), 5);
        for i in 0..5 {
            assert_eq!(img.get(i, i), Some(&Pixel::WHITE));
        }

        let mut img = blank_canvas([5, 5].into(), Pixel::BLACK);
        draw_line(&mut img, Point::new(4, 2), Point::new(0, 2), Pixel::RED);
        assert_eq!(count(&img, Pixel::RED), 5);
    }

    #[test]
    fn line_is_clipped() {
        let mut img = blank_canvas([3, 3].into(), Pixel::BLACK);
        draw_line(&mut img, Point::new(-5, 1), Point::new(10, 1), Pixel::WHITE);
        assert_eq!(count(&img, Pixel::WHITE), 3);
    }

    #[test]
    fn far_end_points_are_clipped_first() {
        let mut img = blank_canvas([5, 5].into(), Pixel::BLACK);
        let far = 1_000_000_000_000;
        draw_line(&mut img, Point::new(-far, 2), Point::new(far, 2), Pixel::WHITE);
        assert_eq!(count(&img, Pixel::WHITE), 5);
        assert!((0..5).all(|x| img.get(x, 2) == Some(&Pixel::WHITE)));

        let mut img = blank_canvas([5, 5].into(), Pixel::BLACK);
        draw_line(&mut img, Point::new(-100, -100), Point::new(100, 100), Pixel::RED);
        assert_eq!(count(&img, Pixel::RED), 5);
        assert!((0..5).all(|i| img.get(i, i) == Some(&Pixel::RED)));

        let mut img = blank_canvas([5, 5].into(), Pixel::BLACK);
        draw_line(&mut img, Point::new(-far, -1), Point::new(far, -1), Pixel::RED);
        draw_line(&mut img, Point::new(6, -10), Point::new(20, 4), Pixel::RED);
        assert_eq!(count(&img, Pixel::RED), 0);
    }

    #[test]
    fn test_draw_box() {
        let mut img = blank_canvas([6, 6].into(), Pixel::BLACK);
        draw_box(&mut img, &Rect::new(1, 5, 1, 4), Pixel::GREEN);
        // perimeter of a 4x3 box
        assert_eq!(count(&img, Pixel::GREEN), 10);
        assert_eq!(img.get(2, 2), Some(&Pixel::BLACK));
        assert_eq!(img.get(4, 3), Some(&Pixel::GREEN));
    }

    #[test]
    fn test_draw_points() {
        let mut img = blank_canvas([3, 3].into(), Pixel::BLACK);
        let points = [Point::new(0, 0), Point::new(2, 1), Point::new(7, 7)];
        draw_points(&mut img, &points, Pixel::BLUE);
        assert_eq!(count(&img, Pixel::BLUE), 2);
    }
}
