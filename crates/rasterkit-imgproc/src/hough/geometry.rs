use std::f64::consts::PI;

use super::lines::Line;
use crate::point::Point;

/// Determinants with a smaller magnitude mark parallel lines.
const PARALLEL_EPSILON: f64 = 1e-12;

/// Intersections farther from the origin along either axis are dropped.
const MAX_COORDINATE: f64 = i32::MAX as f64;

/// Intersection of two lines, rounded to the nearest pixel.
///
/// Returns `None` for parallel lines and for nearly parallel lines meeting
/// beyond the `i32` range.
///
/// # Examples
///
/// ```
/// use std::f64::consts::FRAC_PI_2;
/// use rasterkit_imgproc::hough::{intersect, Line};
/// use rasterkit_imgproc::point::Point;
///
/// let vertical = Line::new(0.0, 4.0);
/// let horizontal = Line::new(FRAC_PI_2, 7.0);
/// assert_eq!(intersect(&vertical, &horizontal), Some(Point::new(4, 7)));
/// ```
pub fn intersect(a: &Line, b: &Line) -> Option<Point> {
    let (sa, ca) = a.theta.sin_cos();
    let (sb, cb) = b.theta.sin_cos();
    let det = ca * sb - sa * cb;
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }
    let x = (a.rho * sb - b.rho * sa) / det;
    let y = (ca * b.rho - cb * a.rho) / det;
    if !(x.abs() <= MAX_COORDINATE && y.abs() <= MAX_COORDINATE) {
        return None;
    }
    Some(Point::new(x.round() as i64, y.round() as i64))
}

/// Pairwise intersections of `lines`.
///
/// Pairs whose angles differ by less than `parallel_tolerance` radians,
/// modulo pi, are skipped, as are intersections with a negative coordinate.
pub fn all_intersects(lines: &[Line], parallel_tolerance: f64) -> Vec<Point> {
    let mut points = Vec::new();
    for (i, a) in lines.iter().enumerate() {
        for b in lines.iter().skip(i + 1) {
            let diff = (a.theta - b.theta).rem_euclid(PI);
            if diff < parallel_tolerance || PI - diff < parallel_tolerance {
                continue;
            }
            match intersect(a, b) {
                Some(p) if p.x >= 0 && p.y >= 0 => points.push(p),
                _ => {}
            }
        }
    }
    points
}

fn cross(o: Point, a: Point, b: Point) -> i128 {
    let (ax, ay) = ((a.x - o.x) as i128, (a.y - o.y) as i128);
    let (bx, by) = ((b.x - o.x) as i128, (b.y - o.y) as i128);
    ax * by - ay * bx
}

/// Convex hull by Andrew's monotone chain.
///
/// The hull starts at the smallest point (by `x`, then `y`) and turns
/// counter-clockwise in the `(x, y)` frame, which is clockwise on screen
/// where `y` grows downwards. Collinear and duplicate points are dropped.
pub fn hull(points: &[Point]) -> Vec<Point> {
    let mut sorted = points.to_vec();
    sorted.sort();
    sorted.dedup();
    if sorted.len() <= 2 {
        return sorted;
    }

    let mut lower: Vec<Point> = Vec::with_capacity(sorted.len());
    for p in sorted.iter() {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], *p) <= 0 {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<Point> = Vec::with_capacity(sorted.len());
    for p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], *p) <= 0 {
            upper.pop();
        }
        upper.push(*p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Find a quadrilateral outlined by `lines`.
///
/// The pairwise intersections are reduced to their convex hull and the four
/// extreme hull points are picked as corners.
///
/// # Returns
///
/// The corners ordered top-left, top-right, bottom-right, bottom-left, or
/// `None` when fewer than four distinct corners exist.
pub fn detect_quadrilateral(lines: &[Line], parallel_tolerance: f64) -> Option<[Point; 4]> {
    let hull = hull(&all_intersects(lines, parallel_tolerance));
    if hull.len() < 4 {
        log::debug!("quadrilateral: hull has only {} points", hull.len());
        return None;
    }

    let by = |key: fn(&Point) -> i64, largest: bool| {
        let it = hull.iter().copied();
        if largest {
            it.max_by_key(key)
        } else {
            it.min_by_key(key)
        }
    };
    let top_left = by(|p| p.x + p.y, false)?;
    let bottom_right = by(|p| p.x + p.y, true)?;
    let top_right = by(|p| p.x - p.y, true)?;
    let bottom_left = by(|p| p.x - p.y, false)?;

    let corners = [top_left, top_right, bottom_right, bottom_left];
    let distinct = corners
        .iter()
        .enumerate()
        .all(|(i, c)| corners[i + 1..].iter().all(|o| o != c));
    distinct.then_some(corners)
}
