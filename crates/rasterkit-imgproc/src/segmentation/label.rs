use std::collections::BTreeSet;

use rasterkit_image::{Image, Pixel};

use super::union_find::UnionFind;
use crate::point::Point;

/// Already visited neighbors in a raster scan: north, north-west, west and
/// north-east.
const CAUSAL_MASK: [(i64, i64); 4] = [(0, -1), (-1, -1), (-1, 0), (1, -1)];

/// Per-pixel component labels.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelMap {
    /// `0` for background, `1..=count` for components in order of their
    /// first pixel in a raster scan.
    pub labels: Image<u32>,
    /// Number of components.
    pub count: usize,
}

/// Whether `p` belongs to the foreground, i.e. is at least `tolerance` away
/// from `background`.
pub fn is_foreground(p: &Pixel, background: Pixel, tolerance: f64) -> bool {
    p.distance(&background) >= tolerance
}

/// Label the 8-connected foreground components of `src`.
///
/// A first raster pass joins every foreground pixel with its foreground
/// neighbors in the causal mask through a union-find forest; a second pass
/// replaces each root by a sequential label.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `background` - The background color.
/// * `tolerance` - Pixels closer than this to `background` are background.
pub fn label_components(src: &Image<Pixel>, background: Pixel, tolerance: f64) -> LabelMap {
    let foreground: Vec<bool> = src
        .as_slice()
        .iter()
        .map(|p| is_foreground(p, background, tolerance))
        .collect();

    let mut uf = UnionFind::new(foreground.len());
    for (i, _) in foreground.iter().enumerate().filter(|(_, fg)| **fg) {
        let (x, y) = src.coords_of(i);
        for (dx, dy) in CAUSAL_MASK {
            let (nx, ny) = (x as i64 + dx, y as i64 + dy);
            if !src.contains(nx, ny) {
                continue;
            }
            let j = src.index_of(nx as usize, ny as usize);
            if foreground[j] {
                uf.union(i, j);
            }
        }
    }

    let mut root_label = vec![0u32; foreground.len()];
    let mut count = 0usize;
    let mut labels = vec![0u32; foreground.len()];
    for (i, fg) in foreground.iter().enumerate() {
        if !fg {
            continue;
        }
        let root = uf.find(i);
        if root_label[root] == 0 {
            count += 1;
            root_label[root] = count as u32;
        }
        labels[i] = root_label[root];
    }

    log::debug!("labeled {count} components");
    let labels = Image::from_fn(src.size(), |x, y| labels[y * src.width() + x])
        .with_parallelism(src.parallelism());
    LabelMap { labels, count }
}

/// Split the foreground of `src` into its connected regions.
///
/// Regions are ordered by their first pixel in a raster scan. Together they
/// cover every foreground pixel exactly once.
///
/// # Examples
///
/// ```
/// use rasterkit_image::{Image, Pixel};
/// use rasterkit_imgproc::segmentation::split_region;
///
/// let image = Image::from_fn([5, 1].into(), |x, _| if x == 2 { Pixel::BLACK } else { Pixel::WHITE });
/// let regions = split_region(&image, Pixel::BLACK, 1.0);
/// assert_eq!(regions.len(), 2);
/// ```
pub fn split_region(src: &Image<Pixel>, background: Pixel, tolerance: f64) -> Vec<BTreeSet<Point>> {
    let map = label_components(src, background, tolerance);
    let mut regions = vec![BTreeSet::new(); map.count];
    map.labels.data().for_each_sync(|label, i| {
        if *label > 0 {
            let (x, y) = map.labels.coords_of(i);
            regions[*label as usize - 1].insert(Point::new(x as i64, y as i64));
        }
    });
    regions
}
