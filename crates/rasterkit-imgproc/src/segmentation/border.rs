use std::collections::BTreeSet;

use rasterkit_image::{Image, Pixel};

use super::growth::Connectivity;
use super::label::{is_foreground, split_region};
use crate::point::Point;

/// Step order of a trace: the direct neighbors first, then the diagonals.
const TRACE_STEPS: [(i64, i64); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (1, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
];

/// The border of each region: its points with at least one horizontal or
/// vertical neighbor outside the region.
pub fn region_borders(regions: &[BTreeSet<Point>]) -> Vec<BTreeSet<Point>> {
    regions
        .iter()
        .map(|region| {
            region
                .iter()
                .filter(|p| {
                    Connectivity::Four
                        .offsets()
                        .iter()
                        .any(|(dx, dy)| !region.contains(&p.offset(*dx, *dy)))
                })
                .copied()
                .collect()
        })
        .collect()
}

/// Split `src` into connected regions and return the border of each.
///
/// See [`split_region`] and [`region_borders`].
pub fn get_borders(src: &Image<Pixel>, background: Pixel, tolerance: f64) -> Vec<BTreeSet<Point>> {
    region_borders(&split_region(src, background, tolerance))
}

/// Trace chains of border pixels.
///
/// A foreground pixel is a border pixel if one of its eight neighbors is
/// background; the outside of the image counts as background. Starting from
/// each unvisited border pixel in raster order, the trace repeatedly steps to
/// the nearest unvisited border neighbor until none is left. Traces of two
/// pixels or fewer are dropped.
pub fn border_trace(src: &Image<Pixel>, background: Pixel, tolerance: f64) -> Vec<Vec<Point>> {
    let foreground = |x: i64, y: i64| {
        src.contains(x, y)
            && is_foreground(src.get_clamped(x, y), background, tolerance)
    };
    let is_border = src.map(|p, x, y| {
        let (x, y) = (x as i64, y as i64);
        is_foreground(p, background, tolerance)
            && Connectivity::Eight
                .offsets()
                .iter()
                .any(|(dx, dy)| !foreground(x + dx, y + dy))
    });

    let mut visited = Image::from_size_val(src.size(), false);
    let mut traces = Vec::new();
    for y in 0..src.height() {
        for x in 0..src.width() {
            if !is_border.get(x, y).copied().unwrap_or(false) || visited.get(x, y).copied().unwrap_or(true) {
                continue;
            }

            let mut trace = Vec::new();
            let mut current = Point::new(x as i64, y as i64);
            loop {
                visited.put(current.x, current.y, true);
                trace.push(current);

                let next = TRACE_STEPS.iter().map(|(dx, dy)| current.offset(*dx, *dy)).find(|q| {
                    src.contains(q.x, q.y)
                        && *is_border.get_clamped(q.x, q.y)
                        && !*visited.get_clamped(q.x, q.y)
                });
                match next {
                    Some(q) => current = q,
                    None => break,
                }
            }

            if trace.len() > 2 {
                traces.push(trace);
            }
        }
    }
    log::debug!("border trace found {} chains", traces.len());
    traces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Image<Pixel> {
        Image::from_fn([5, 5].into(), |x, y| {
            if (1..4).contains(&x) && (1..4).contains(&y) {
                Pixel::WHITE
            } else {
                Pixel::BLACK
            }
        })
    }

    #[test]
    fn borders_skip_the_interior() {
        let borders = get_borders(&square(), Pixel::BLACK, 1.0);
        assert_eq!(borders.len(), 1);
        assert_eq!(borders[0].len(), 8);
        assert!(!borders[0].contains(&Point::new(2, 2)));
    }

    #[test]
    fn region_borders_of_a_line() {
        let line: BTreeSet<Point> = (0..4).map(|x| Point::new(x, 0)).collect();
        let borders = region_borders(&[line.clone()]);
        assert_eq!(borders[0], line);
    }

    #[test]
    fn trace_walks_the_ring() {
        let traces = border_trace(&square(), Pixel::BLACK, 1.0);
        assert_eq!(traces.len(), 1);
        let trace = &traces[0];
        assert_eq!(trace.len(), 8);
        assert_eq!(trace[0], Point::new(1, 1));
        assert_eq!(trace[1], Point::new(2, 1));
        assert_eq!(trace[7], Point::new(1, 2));
    }

    #[test]
    fn short_traces_are_dropped() {
        let mut image = Image::from_size_val([6, 6].into(), Pixel::BLACK);
        image.put(1, 1, Pixel::WHITE);
        image.put(4, 4, Pixel::WHITE);
        image.put(4, 3, Pixel::WHITE);
        assert!(border_trace(&image, Pixel::BLACK, 1.0).is_empty());

        // a full white image is all border along the frame
        let full = Image::from_size_val([3, 3].into(), Pixel::WHITE);
        let traces = border_trace(&full, Pixel::BLACK, 1.0);
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].len(), 8);
    }
}
