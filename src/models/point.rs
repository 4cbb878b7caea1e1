/// Sub-pixel image position used by the QR sampler
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Squared distance, for comparisons
    pub fn distance_squared(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Round to the nearest pixel
    pub fn round(&self) -> PointI {
        PointI::new(self.x.round() as i32, self.y.round() as i32)
    }
}

/// Pixel position; polygon vertices are expressed in these
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PointI {
    /// X coordinate
    pub x: i32,
    /// Y coordinate
    pub y: i32,
}

impl PointI {
    /// Create a new integer point
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for PointI {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<PointI> for Point {
    fn from(p: PointI) -> Self {
        Self::new(p.x as f32, p.y as f32)
    }
}
