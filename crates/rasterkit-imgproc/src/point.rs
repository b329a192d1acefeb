/// An integer pixel location; `y` grows downwards.
///
/// Points order by `x` then `y`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    /// Column.
    pub x: i64,
    /// Row.
    pub y: i64,
}

impl Point {
    /// Create a point.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// The point shifted by `(dx, dy)`.
    pub fn offset(self, dx: i64, dy: i64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<(i64, i64)> for Point {
    fn from((x, y): (i64, i64)) -> Self {
        Self::new(x, y)
    }
}

/// A half-open box covering columns `left..right` and rows `top..bottom`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    /// First column.
    pub left: usize,
    /// One past the last column.
    pub right: usize,
    /// First row.
    pub top: usize,
    /// One past the last row.
    pub bottom: usize,
}

impl Rect {
    /// Create a box.
    pub const fn new(left: usize, right: usize, top: usize, bottom: usize) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Number of columns covered.
    pub fn width(&self) -> usize {
        self.right.saturating_sub(self.left)
    }

    /// Number of rows covered.
    pub fn height(&self) -> usize {
        self.bottom.saturating_sub(self.top)
    }

    /// Number of pixels covered.
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// The four quadrants split at the midpoints: top-left, top-right,
    /// bottom-left, bottom-right.
    pub fn quadrants(&self) -> [Rect; 4] {
        let mid_x = self.left + self.width() / 2;
        let mid_y = self.top + self.height() / 2;
        [
            Rect::new(self.left, mid_x, self.top, mid_y),
            Rect::new(mid_x, self.right, self.top, mid_y),
            Rect::new(self.left, mid_x, mid_y, self.bottom),
            Rect::new(mid_x, self.right, mid_y, self.bottom),
        ]
    }

    /// Iterate the covered pixel coordinates row by row.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.top..self.bottom).flat_map(move |y| (self.left..self.right).map(move |x| (x, y)))
    }
}
