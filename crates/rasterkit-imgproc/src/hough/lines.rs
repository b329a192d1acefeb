use std::collections::VecDeque;
use std::f64::consts::TAU;

use rasterkit_image::{Image, Pixel};

use super::accumulator::{AngleFilter, HoughAccumulator};
use crate::draw;
use crate::point::Point;

/// A line in normal form `x cos(theta) + y sin(theta) = rho`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    /// Angle of the normal in radians.
    pub theta: f64,
    /// Signed distance from the origin.
    pub rho: f64,
}

impl Line {
    /// Create a line.
    pub const fn new(theta: f64, rho: f64) -> Self {
        Self { theta, rho }
    }
}

/// Vote threshold for line extraction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LineThreshold {
    /// A fixed vote count.
    Absolute(f64),
    /// A fraction of the largest vote.
    Auto(f64),
}

impl Default for LineThreshold {
    fn default() -> Self {
        LineThreshold::Auto(0.5)
    }
}

impl LineThreshold {
    /// The vote count this threshold stands for on `acc`.
    pub fn resolve(&self, acc: &HoughAccumulator) -> f64 {
        match self {
            LineThreshold::Absolute(t) => *t,
            LineThreshold::Auto(ratio) => acc.max_value() * ratio,
        }
    }
}

/// Report every accumulator cell above the threshold that is a strict local
/// maximum of its 3x3 window: a neighbor equal to the cell disqualifies it,
/// so plateaus and ridges report nothing. Theta wraps around; rho does not.
///
/// # Examples
///
/// ```
/// use rasterkit_image::Image;
/// use rasterkit_imgproc::hough::{get_lines, hough_transform, AngleFilter, HoughParams, LineThreshold};
///
/// let grid = Image::from_fn([16, 16].into(), |x, _| if x == 5 { 1.0 } else { 0.0 });
/// let params = HoughParams { theta_steps: 180, rho_steps: 128, rho_max: None };
/// let acc = hough_transform(&grid, &params, AngleFilter::All).unwrap();
/// let lines = get_lines(&acc, LineThreshold::default());
/// assert!(lines.iter().any(|l| l.theta == 0.0));
/// ```
pub fn get_lines(acc: &HoughAccumulator, threshold: LineThreshold) -> Vec<Line> {
    let threshold = threshold.resolve(acc);
    let (theta_steps, rho_steps) = (acc.theta_steps(), acc.rho_steps());

    let mut lines = Vec::new();
    for t in 0..theta_steps {
        for r in 0..rho_steps {
            let value = acc.get(t, r);
            if value <= threshold {
                continue;
            }
            let is_peak = (-1i64..=1).all(|dt| {
                (-1i64..=1).all(|dr| {
                    let nr = r as i64 + dr;
                    if (dt == 0 && dr == 0) || nr < 0 || nr >= rho_steps as i64 {
                        return true;
                    }
                    let nt = (t as i64 + dt).rem_euclid(theta_steps as i64) as usize;
                    acc.get(nt, nr as usize) < value
                })
            });
            if is_peak {
                lines.push(Line::new(acc.theta_of(t), acc.rho_of(r)));
            }
        }
    }
    log::debug!("hough peaks: {} lines above {threshold}", lines.len());
    lines
}

/// Cluster the cells above the threshold and report one line per cluster.
///
/// Each unvisited cell above the threshold seeds a breadth-first flood over
/// cells within `spread` buckets, theta wrapping around, that are also above
/// the threshold. The cluster centroid becomes the line. With an
/// [`AngleFilter::AxisAligned`] filter the threshold is halved for seeds
/// at accepted angles, which favors horizontal and vertical lines.
pub fn get_lines_bfs(
    acc: &HoughAccumulator,
    spread: usize,
    threshold: LineThreshold,
    filter: AngleFilter,
) -> Vec<Line> {
    let base = threshold.resolve(acc);
    let (theta_steps, rho_steps) = (acc.theta_steps(), acc.rho_steps());
    let spread = spread as i64;

    let mut visited = Image::from_size_val([rho_steps, theta_steps].into(), false);
    let mut lines = Vec::new();
    for t in 0..theta_steps {
        for r in 0..rho_steps {
            let theta = acc.theta_of(t);
            let limit = match filter {
                AngleFilter::AxisAligned { .. } if filter.accepts(theta) => base / 2.0,
                _ => base,
            };
            if acc.get(t, r) <= limit || visited.get(r, t).copied().unwrap_or(true) {
                continue;
            }

            // theta indices are kept unwrapped so a cluster across 0 averages correctly
            let mut queue = VecDeque::from([(t as i64, r as i64)]);
            visited.put(r as i64, t as i64, true);
            let (mut n, mut sum_t, mut sum_r) = (0usize, 0i64, 0i64);
            while let Some((ct, cr)) = queue.pop_front() {
                n += 1;
                sum_t += ct;
                sum_r += cr;
                for dt in -spread..=spread {
                    for dr in -spread..=spread {
                        let (ut, nr) = (ct + dt, cr + dr);
                        if nr < 0 || nr >= rho_steps as i64 {
                            continue;
                        }
                        let nt = ut.rem_euclid(theta_steps as i64);
                        if *visited.get_clamped(nr, nt) || acc.get(nt as usize, nr as usize) <= limit {
                            continue;
                        }
                        visited.put(nr, nt, true);
                        queue.push_back((ut, nr));
                    }
                }
            }

            let mean_t = sum_t as f64 / n as f64;
            let mean_r = sum_r as f64 / n as f64;
            let theta = (mean_t * TAU / theta_steps as f64).rem_euclid(TAU);
            let rho = mean_r * acc.rho_resolution() - acc.rho_max();
            lines.push(Line::new(theta, rho));
        }
    }
    log::debug!("hough clusters: {} lines", lines.len());
    lines
}

/// The two points where `line` crosses the border of a `width x height` image.
fn border_points(line: &Line, width: usize, height: usize) -> Option<(Point, Point)> {
    let (sin, cos) = line.theta.sin_cos();
    let (w, h) = ((width as f64) - 1.0, (height as f64) - 1.0);
    let mut points: Vec<Point> = Vec::with_capacity(4);
    let mut push = |x: f64, y: f64| {
        if (0.0..=w).contains(&x) && (0.0..=h).contains(&y) {
            let p = Point::new(x.round() as i64, y.round() as i64);
            if !points.contains(&p) {
                points.push(p);
            }
        }
    };
    if sin.abs() > 1e-6 {
        push(0.0, line.rho / sin);
        push(w, (line.rho - w * cos) / sin);
    }
    if cos.abs() > 1e-6 {
        push(line.rho / cos, 0.0);
        push((line.rho - h * sin) / cos, h);
    }
    match points.as_slice() {
        [a, b, ..] => Some((*a, *b)),
        _ => None,
    }
}

/// Draw each line across `image` where it crosses the image; lines that miss
/// the image are skipped.
pub fn draw_lines(image: &Image<Pixel>, lines: &[Line], color: Pixel) -> Image<Pixel> {
    let mut out = image.clone();
    for line in lines {
        if let Some((a, b)) = border_points(line, image.width(), image.height()) {
            draw::draw_line(&mut out, a, b, color);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use rasterkit_image::{ImageError, Parallelism};

    use super::*;
    use crate::hough::{hough_transform, HoughParams};

    fn diagonal() -> Image<f64> {
        Image::from_fn([64, 64].into(), |x, y| if x == y { 1.0 } else { 0.0 })
    }

    #[test]
    fn diagonal_line_is_found() -> Result<(), ImageError> {
        let params = HoughParams {
            theta_steps: 360,
            rho_steps: 256,
            rho_max: None,
        };
        let grid = diagonal().with_parallelism(Parallelism::Workers(4));
        let acc = hough_transform(&grid, &params, AngleFilter::All)?;
        let lines = get_lines(&acc, LineThreshold::default());
        assert!(!lines.is_empty());

        let dt = acc.theta_resolution();
        for line in &lines {
            let near = [3.0 * PI / 4.0, 7.0 * PI / 4.0]
                .iter()
                .any(|t| (line.theta - t).abs() <= dt + 1e-9);
            assert!(near, "unexpected theta {}", line.theta);
            assert!(line.rho.abs() <= acc.rho_resolution() + 1e-9, "unexpected rho {}", line.rho);
        }
        Ok(())
    }

    #[test]
    fn flat_ridge_has_no_peak() -> Result<(), ImageError> {
        // a point at the origin votes rho = 0 at every theta
        let mut grid = Image::from_size_val([8, 8].into(), 0.0);
        grid.put(0, 0, 1.0);
        let params = HoughParams {
            theta_steps: 36,
            rho_steps: 64,
            rho_max: None,
        };
        let acc = hough_transform(&grid, &params, AngleFilter::All)?;
        assert_eq!(acc.max_value(), 1.0);
        assert!(get_lines(&acc, LineThreshold::Absolute(0.5)).is_empty());
        Ok(())
    }

    #[test]
    fn bfs_merges_plateaus() -> Result<(), ImageError> {
        // a vertical line at x = 6 spreads over a few theta buckets around 0
        let grid = Image::from_fn([20, 20].into(), |x, _| if x == 6 { 1.0 } else { 0.0 });
        let params = HoughParams {
            theta_steps: 720,
            rho_steps: 64,
            rho_max: None,
        };
        let acc = hough_transform(&grid, &params, AngleFilter::All)?;
        let lines = get_lines_bfs(&acc, 1, LineThreshold::Auto(0.9), AngleFilter::All);
        assert_eq!(lines.len(), 2);

        // the cluster around theta = 0 straddles the wrap and averages to 0
        let zero = lines
            .iter()
            .find(|l| l.theta < 0.1 || l.theta > TAU - 0.1)
            .ok_or(ImageError::EmptyImage)?;
        assert!(zero.theta < 0.02 || zero.theta > TAU - 0.02);
        assert!((zero.rho - 6.0).abs() < 1.0);

        // the opposite normal carries the same line with negative rho
        assert!(lines.iter().any(|l| (l.theta - PI).abs() < 0.02 && (l.rho + 6.0).abs() < 1.0));
        Ok(())
    }

    #[test]
    fn axis_filter_lowers_the_bar() -> Result<(), ImageError> {
        let mut grid = Image::from_size_val([32, 32].into(), 0.0);
        for i in 0..32 {
            grid.put(i, i, 1.0);
        }
        for y in 0..20 {
            grid.put(25, y, 1.0);
        }
        let params = HoughParams {
            theta_steps: 360,
            rho_steps: 128,
            rho_max: None,
        };
        let acc = hough_transform(&grid, &params, AngleFilter::All)?;
        let strict = get_lines_bfs(&acc, 1, LineThreshold::Auto(0.7), AngleFilter::All);
        assert!(strict.iter().all(|l| l.theta.sin().abs() > 0.5));

        let favored = get_lines_bfs(
            &acc,
            1,
            LineThreshold::Auto(0.7),
            AngleFilter::AxisAligned { tolerance: 0.05 },
        );
        assert!(favored.iter().any(|l| l.theta.sin().abs() < 0.05));
        Ok(())
    }

    #[test]
    fn draws_across_the_image() {
        let image = Image::from_size_val([10, 8].into(), Pixel::BLACK);
        let out = draw_lines(
            &image,
            &[Line::new(0.0, 3.0), Line::new(FRAC_PI_2, 5.0), Line::new(0.0, 40.0)],
            Pixel::RED,
        );
        for y in 0..8 {
            assert_eq!(out.get(3, y), Some(&Pixel::RED));
        }
        for x in 0..10 {
            assert_eq!(out.get(x, 5), Some(&Pixel::RED));
        }
        assert_eq!(out.get(0, 0), Some(&Pixel::BLACK));
        assert_eq!(image.get(3, 0), Some(&Pixel::BLACK));
    }
}
