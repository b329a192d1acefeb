use std::f64::consts::{FRAC_PI_2, TAU};

use rasterkit_image::{Image, ImageError};

/// Sources with an intensity at or below this do not vote.
const VOTE_EPSILON: f64 = 1e-5;

/// Resolution of the Hough space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoughParams {
    /// Number of theta buckets over `[0, 2pi)`.
    pub theta_steps: usize,
    /// Number of rho buckets over `[-rho_max, rho_max)`.
    pub rho_steps: usize,
    /// Largest absolute rho; the source diagonal when `None`.
    pub rho_max: Option<f64>,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            theta_steps: 1440,
            rho_steps: 1024,
            rho_max: None,
        }
    }
}

/// Restriction of the line angles taken into account.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum AngleFilter {
    /// Every angle.
    #[default]
    All,
    /// Only angles within `tolerance` radians of a multiple of `pi / 2`.
    AxisAligned {
        /// Angular tolerance in radians.
        tolerance: f64,
    },
}

impl AngleFilter {
    /// Whether lines at `theta` pass the filter.
    pub fn accepts(&self, theta: f64) -> bool {
        match self {
            AngleFilter::All => true,
            AngleFilter::AxisAligned { tolerance } => {
                let off = theta.rem_euclid(FRAC_PI_2);
                off.min(FRAC_PI_2 - off) <= *tolerance
            }
        }
    }
}

/// Votes of a Hough transform.
#[derive(Clone, Debug, PartialEq)]
pub struct HoughAccumulator {
    theta_steps: usize,
    rho_steps: usize,
    rho_max: f64,
    cells: Image<f64>,
}

impl HoughAccumulator {
    /// Number of theta buckets.
    pub fn theta_steps(&self) -> usize {
        self.theta_steps
    }

    /// Number of rho buckets.
    pub fn rho_steps(&self) -> usize {
        self.rho_steps
    }

    /// Largest absolute rho.
    pub fn rho_max(&self) -> f64 {
        self.rho_max
    }

    /// The votes, `rho_steps` wide and `theta_steps` high.
    pub fn cells(&self) -> &Image<f64> {
        &self.cells
    }

    /// The vote count at a theta and rho bucket.
    pub fn get(&self, theta_idx: usize, rho_idx: usize) -> f64 {
        self.cells.get(rho_idx, theta_idx).copied().unwrap_or(0.0)
    }

    /// The largest vote.
    pub fn max_value(&self) -> f64 {
        self.cells.as_slice().iter().copied().fold(0.0, f64::max)
    }

    /// Angle of a theta bucket.
    pub fn theta_of(&self, theta_idx: usize) -> f64 {
        theta_idx as f64 * TAU / self.theta_steps as f64
    }

    /// Rho at the lower edge of a rho bucket.
    pub fn rho_of(&self, rho_idx: usize) -> f64 {
        rho_idx as f64 * (2.0 * self.rho_max) / self.rho_steps as f64 - self.rho_max
    }

    /// Width of a rho bucket.
    pub fn rho_resolution(&self) -> f64 {
        2.0 * self.rho_max / self.rho_steps as f64
    }

    /// Width of a theta bucket in radians.
    pub fn theta_resolution(&self) -> f64 {
        TAU / self.theta_steps as f64
    }

    /// The rho bucket holding `rho`, if within range.
    pub fn rho_bucket(&self, rho: f64) -> Option<usize> {
        rho_bucket(rho, self.rho_max, self.rho_steps)
    }
}

fn rho_bucket(rho: f64, rho_max: f64, rho_steps: usize) -> Option<usize> {
    let r = ((rho + rho_max) * rho_steps as f64 / (2.0 * rho_max)).floor();
    (r >= 0.0 && r < rho_steps as f64).then_some(r as usize)
}

/// Accumulate the Hough votes of a real valued grid.
///
/// Every cell above a small epsilon votes with its intensity for each theta
/// bucket accepted by `filter`, into the rho bucket of
/// `x cos(theta) + y sin(theta)`. Theta rows are filled in parallel on the
/// grid's parallelism.
///
/// # Arguments
///
/// * `grid` - The source intensities, usually an edge map.
/// * `params` - The accumulator resolution.
/// * `filter` - The accepted line angles.
///
/// # Errors
///
/// Returns [`ImageError::InvalidParameter`] if a step count is zero or the
/// rho range is empty, which happens for an empty grid without explicit
/// `rho_max`.
pub fn hough_transform(
    grid: &Image<f64>,
    params: &HoughParams,
    filter: AngleFilter,
) -> Result<HoughAccumulator, ImageError> {
    if params.theta_steps == 0 || params.rho_steps == 0 {
        return Err(ImageError::InvalidParameter(format!(
            "hough resolution {}x{} must be positive",
            params.theta_steps, params.rho_steps
        )));
    }
    let rho_max = params
        .rho_max
        .unwrap_or_else(|| (grid.width() as f64).hypot(grid.height() as f64));
    if rho_max.is_nan() || rho_max <= 0.0 {
        return Err(ImageError::InvalidParameter(format!(
            "hough rho range {rho_max} must be positive"
        )));
    }

    let mut votes = Vec::new();
    grid.data().for_each_sync(|v, i| {
        if *v > VOTE_EPSILON {
            let (x, y) = grid.coords_of(i);
            votes.push((x as f64, y as f64, *v));
        }
    });

    let (theta_steps, rho_steps) = (params.theta_steps, params.rho_steps);
    let mut cells = Image::from_size_val([rho_steps, theta_steps].into(), 0.0)
        .with_parallelism(grid.parallelism());
    cells.for_each_row_mut(|t_i, row| {
        let theta = t_i as f64 * TAU / theta_steps as f64;
        if !filter.accepts(theta) {
            return;
        }
        let (sin, cos) = theta.sin_cos();
        for (x, y, v) in votes.iter() {
            if let Some(r_i) = rho_bucket(x * cos + y * sin, rho_max, rho_steps) {
                row[r_i] += v;
            }
        }
    });

    log::debug!(
        "hough: {} voters over {}x{} buckets, rho_max {rho_max}",
        votes.len(),
        params.theta_steps,
        params.rho_steps
    );
    Ok(HoughAccumulator {
        theta_steps,
        rho_steps,
        rho_max,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn single_point_votes_once_per_theta() -> Result<(), ImageError> {
        let mut grid = Image::from_size_val([10, 10].into(), 0.0);
        grid.put(3, 4, 2.0);
        let params = HoughParams {
            theta_steps: 8,
            rho_steps: 32,
            rho_max: None,
        };
        let acc = hough_transform(&grid, &params, AngleFilter::All)?;
        assert_eq!((acc.cells().width(), acc.cells().height()), (32, 8));
        assert_relative_eq!(acc.rho_max(), 200f64.sqrt());
        assert_relative_eq!(acc.cells().as_slice().iter().sum::<f64>(), 16.0);
        for t in 0..8 {
            let row = acc.cells().row(t).ok_or(ImageError::EmptyImage)?;
            assert_eq!(row.iter().filter(|v| **v > 0.0).count(), 1);
        }

        // theta = 0 gives rho = x
        let r = (0..32).find(|r| acc.get(0, *r) > 0.0).ok_or(ImageError::EmptyImage)?;
        assert!(acc.rho_of(r) <= 3.0 && 3.0 < acc.rho_of(r) + acc.rho_resolution());
        Ok(())
    }

    #[test]
    fn axis_aligned_filter() -> Result<(), ImageError> {
        let filter = AngleFilter::AxisAligned { tolerance: 0.05 };
        assert!(filter.accepts(0.0));
        assert!(filter.accepts(PI + 0.04));
        assert!(filter.accepts(1.5 * PI - 0.01));
        assert!(!filter.accepts(PI / 4.0));

        let mut grid = Image::from_size_val([4, 4].into(), 0.0);
        grid.put(1, 1, 1.0);
        let params = HoughParams {
            theta_steps: 16,
            rho_steps: 16,
            rho_max: Some(8.0),
        };
        let acc = hough_transform(&grid, &params, filter)?;
        // only the 0, pi/2, pi and 3pi/2 rows vote
        let voting: Vec<usize> = (0..16)
            .filter(|t| acc.cells().row(*t).is_some_and(|r| r.iter().any(|v| *v > 0.0)))
            .collect();
        assert_eq!(voting, vec![0, 4, 8, 12]);
        Ok(())
    }

    #[test]
    fn rejects_degenerate_parameters() {
        let grid = Image::from_size_val([4, 4].into(), 1.0);
        let zero = HoughParams {
            theta_steps: 0,
            ..Default::default()
        };
        assert!(hough_transform(&grid, &zero, AngleFilter::All).is_err());

        let empty = Image::from_size_val([0, 0].into(), 1.0);
        assert!(hough_transform(&empty, &HoughParams::default(), AngleFilter::All).is_err());
    }
}
