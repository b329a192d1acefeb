use std::collections::BTreeSet;

use rasterkit_image::{Image, Pixel};

use crate::point::Point;

/// Neighborhood used to find the next candidates of a region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Connectivity {
    /// Horizontal and vertical neighbors.
    Four,
    /// Horizontal, vertical and diagonal neighbors.
    #[default]
    Eight,
}

impl Connectivity {
    /// The neighbor offsets, in a fixed order.
    pub fn offsets(self) -> &'static [(i64, i64)] {
        const FOUR: [(i64, i64); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];
        const EIGHT: [(i64, i64); 8] = [
            (-1, -1),
            (0, -1),
            (1, -1),
            (-1, 0),
            (1, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
        ];
        match self {
            Connectivity::Four => &FOUR,
            Connectivity::Eight => &EIGHT,
        }
    }
}

/// Options of [`grow_region`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrowthOptions {
    /// Neighborhood of the frontier.
    pub connectivity: Connectivity,
    /// Hard cap on the number of growth rounds.
    pub max_rounds: usize,
}

impl Default for GrowthOptions {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::Eight,
            max_rounds: 1280,
        }
    }
}

/// The in-image neighbors of `points` that are not part of `region`.
fn outer_neighbors<'a>(
    src: &Image<Pixel>,
    offsets: &[(i64, i64)],
    points: impl Iterator<Item = &'a Point>,
    region: &BTreeSet<Point>,
) -> BTreeSet<Point> {
    let mut out = BTreeSet::new();
    for p in points {
        for (dx, dy) in offsets {
            let q = p.offset(*dx, *dy);
            if src.contains(q.x, q.y) && !region.contains(&q) {
                out.insert(q);
            }
        }
    }
    out
}

/// Grow a region from `seeds` by breadth-first rounds.
///
/// Each round collects the frontier, the in-image neighbors of the region not
/// yet part of it, and offers every frontier point to `admit` in ascending
/// point order. `admit` receives the point, the image, the region as it was at
/// the start of the round and the accumulator `state`, and returns whether
/// the point joins together with the updated accumulator. Growth stops after a
/// round that admits nothing or after `options.max_rounds` rounds.
///
/// Evaluation is sequential, so the same inputs always give the same region.
///
/// # Arguments
///
/// * `src` - The image the region lives in.
/// * `seeds` - The initial region; seeds outside the image are dropped.
/// * `options` - Connectivity and round cap.
/// * `state` - The initial accumulator.
/// * `admit` - The admission predicate.
///
/// # Returns
///
/// The grown region and the final accumulator.
pub fn grow_region<S, F>(
    src: &Image<Pixel>,
    seeds: &BTreeSet<Point>,
    options: &GrowthOptions,
    mut state: S,
    admit: F,
) -> (BTreeSet<Point>, S)
where
    F: Fn(Point, &Image<Pixel>, &BTreeSet<Point>, S) -> (bool, S),
{
    let offsets = options.connectivity.offsets();
    let mut region: BTreeSet<Point> = seeds
        .iter()
        .copied()
        .filter(|p| src.contains(p.x, p.y))
        .collect();

    let mut frontier = outer_neighbors(src, offsets, region.iter(), &region);
    let mut rounds = 0;
    while rounds < options.max_rounds && !frontier.is_empty() {
        rounds += 1;

        let mut admitted = Vec::new();
        for q in frontier.iter() {
            let (accept, next) = admit(*q, src, &region, state);
            state = next;
            if accept {
                admitted.push(*q);
            }
        }
        if admitted.is_empty() {
            break;
        }

        for q in admitted.iter() {
            frontier.remove(q);
            region.insert(*q);
        }
        let grown = outer_neighbors(src, offsets, admitted.iter(), &region);
        frontier.extend(grown);
    }

    if rounds == options.max_rounds {
        log::debug!("region growth stopped at the cap of {rounds} rounds");
    }
    (region, state)
}

/// Running gray level range of a region, an accumulator for [`grow_region`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrayRange {
    /// Smallest gray level seen.
    pub min: u8,
    /// Largest gray level seen.
    pub max: u8,
}

impl GrayRange {
    /// The range covered by `points`, or `None` if no point lies in the image.
    pub fn from_points<'a>(src: &Image<Pixel>, points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        points
            .into_iter()
            .filter(|p| p.x >= 0 && p.y >= 0)
            .filter_map(|p| src.get(p.x as usize, p.y as usize))
            .map(|p| p.gray_level())
            .fold(None, |acc: Option<GrayRange>, l| {
                Some(match acc {
                    Some(r) => GrayRange {
                        min: r.min.min(l),
                        max: r.max.max(l),
                    },
                    None => GrayRange { min: l, max: l },
                })
            })
    }

    /// Admit `level` if the range stays within `max_spread`.
    ///
    /// Returns whether the level was admitted and the range, widened only on
    /// admission.
    pub fn admit(self, level: u8, max_spread: u8) -> (bool, Self) {
        let widened = GrayRange {
            min: self.min.min(level),
            max: self.max.max(level),
        };
        if widened.max - widened.min <= max_spread {
            (true, widened)
        } else {
            (false, self)
        }
    }
}
