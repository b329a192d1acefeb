use rasterkit_image::{Image, ImageError, Pixel};

use crate::point::Rect;

/// A node of a quad-tree decomposition.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadTreeNode {
    /// The box covered by the node.
    pub rect: Rect,
    /// The four quadrants, top-left, top-right, bottom-left and bottom-right,
    /// or `None` for a leaf.
    pub children: Option<Box<[QuadTreeNode; 4]>>,
}

impl QuadTreeNode {
    /// Whether the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Recursively split `rect` into quadrants until `homogeneous` accepts a box.
///
/// A box whose width or height is at most `min_size` is a leaf whatever the
/// predicate says, which bounds the recursion.
///
/// # Arguments
///
/// * `src` - The image passed to the predicate.
/// * `rect` - The root box; must lie within the image.
/// * `min_size` - The side length at which boxes stop splitting, at least 1.
/// * `homogeneous` - The acceptance predicate.
///
/// # Errors
///
/// Returns [`ImageError::InvalidParameter`] if `min_size` is zero or `rect`
/// reaches outside the image.
pub fn build_quad_tree<F>(
    src: &Image<Pixel>,
    rect: Rect,
    min_size: usize,
    homogeneous: F,
) -> Result<QuadTreeNode, ImageError>
where
    F: Fn(&Image<Pixel>, &Rect) -> bool,
{
    if min_size == 0 {
        return Err(ImageError::InvalidParameter(
            "quad-tree minimum box size must be at least 1".to_string(),
        ));
    }
    if rect.right > src.width() || rect.bottom > src.height() || rect.left > rect.right || rect.top > rect.bottom {
        return Err(ImageError::InvalidParameter(format!(
            "quad-tree box {rect:?} does not fit in a {} image",
            src.size()
        )));
    }
    Ok(split(src, rect, min_size, &homogeneous))
}

fn split<F>(src: &Image<Pixel>, rect: Rect, min_size: usize, homogeneous: &F) -> QuadTreeNode
where
    F: Fn(&Image<Pixel>, &Rect) -> bool,
{
    if rect.width() <= min_size || rect.height() <= min_size || homogeneous(src, &rect) {
        return QuadTreeNode { rect, children: None };
    }
    let [tl, tr, bl, br] = rect.quadrants();
    QuadTreeNode {
        rect,
        children: Some(Box::new([
            split(src, tl, min_size, homogeneous),
            split(src, tr, min_size, homogeneous),
            split(src, bl, min_size, homogeneous),
            split(src, br, min_size, homogeneous),
        ])),
    }
}

/// The boxes of all leaves, depth first in quadrant order.
pub fn leaf_boxes(node: &QuadTreeNode) -> Vec<Rect> {
    let mut out = Vec::new();
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        match &n.children {
            // reversed so the top-left quadrant is visited first
            Some(children) => stack.extend(children.iter().rev()),
            None => out.push(n.rect),
        }
    }
    out
}

/// Variance of the gray levels inside `rect`; zero for an empty box.
pub fn gray_variance(src: &Image<Pixel>, rect: &Rect) -> f64 {
    let (n, sum, sum_sq) = rect
        .pixels()
        .filter_map(|(x, y)| src.get(x, y))
        .map(|p| p.gray())
        .fold((0usize, 0.0, 0.0), |(n, s, s2), g| (n + 1, s + g, s2 + g * g));
    if n == 0 {
        return 0.0;
    }
    let mean = sum / n as f64;
    (sum_sq / n as f64 - mean * mean).max(0.0)
}

/// A predicate for [`build_quad_tree`] accepting boxes whose gray variance is
/// at most `max_variance`.
pub fn variance_below(max_variance: f64) -> impl Fn(&Image<Pixel>, &Rect) -> bool {
    move |src: &Image<Pixel>, rect: &Rect| gray_variance(src, rect) <= max_variance
}
