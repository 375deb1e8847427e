//! Planar points, rectangles and polygon measures
//!
//! Polygons are plain vertex slices without a repeated closing vertex. Winding
//! order is free; measures that depend on it use the signed area.

use std::ops::{Add, Mul, Sub};

/// Point in field coordinates (x to the right, y downwards)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Point {
    /// Create a point from its coordinates
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Dot product treating both points as vectors
    pub fn dot(self, other: Self) -> f64 {
        self.x.mul_add(other.x, self.y * other.y)
    }

    /// Midpoint between two points
    pub const fn midpoint(self, other: Self) -> Self {
        Self::new(0.5 * (self.x + other.x), 0.5 * (self.y + other.y))
    }

    /// Whether both coordinates are finite
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Coordinates as an array, as stored in spatial indices
    pub const fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl From<[f64; 2]> for Point {
    fn from(value: [f64; 2]) -> Self {
        let [x, y] = value;
        Self::new(x, y)
    }
}

/// Axis-aligned rectangle given by its minimum and maximum corner
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    /// Corner with the smallest coordinates
    pub min: Point,
    /// Corner with the largest coordinates
    pub max: Point,
}

impl Rect {
    /// Create a rectangle from `[x0, y0, x1, y1]`
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            min: Point::new(x0, y0),
            max: Point::new(x1, y1),
        }
    }

    /// Rectangle `[0, 0, width, height]`
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Horizontal extent
    pub const fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Vertical extent
    pub const fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Whether the rectangle encloses a positive, finite area
    pub const fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.width() > 0.0 && self.height() > 0.0
    }

    /// Closed containment test
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Corners in drawing order, starting at the minimum corner
    pub const fn corners(&self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }

    /// Clamp a point into the half-open rectangle `[min, max)`
    ///
    /// The upper edge is excluded so that positions stay valid sample
    /// coordinates of a field with the same extent.
    pub fn clamp_half_open(&self, point: Point) -> Point {
        let upper_x = self.max.x - self.width() * f64::EPSILON;
        let upper_y = self.max.y - self.height() * f64::EPSILON;
        Point::new(
            point.x.max(self.min.x).min(upper_x),
            point.y.max(self.min.y).min(upper_y),
        )
    }
}

/// Twice the signed area of a polygon
///
/// Positive for counter-clockwise winding in a y-up frame.
pub fn signed_double_area(polygon: &[Point]) -> f64 {
    let Some(&last) = polygon.last() else {
        return 0.0;
    };
    let mut previous = last;
    let mut sum = 0.0;
    for &current in polygon {
        sum += previous.x.mul_add(current.y, -(current.x * previous.y));
        previous = current;
    }
    sum
}

/// Absolute area of a polygon
pub fn polygon_area(polygon: &[Point]) -> f64 {
    0.5 * signed_double_area(polygon).abs()
}

/// Area centroid of a polygon
///
/// Falls back to the vertex mean when the polygon has no area (fewer than
/// three vertices or all vertices collinear). Returns `None` for an empty
/// polygon.
pub fn polygon_centroid(polygon: &[Point]) -> Option<Point> {
    let &last = polygon.last()?;
    let mut previous = last;
    let mut double_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for &current in polygon {
        let k = previous.x.mul_add(current.y, -(current.x * previous.y));
        double_area += k;
        cx += (previous.x + current.x) * k;
        cy += (previous.y + current.y) * k;
        previous = current;
    }

    let scale = polygon
        .iter()
        .map(|p| p.x.abs().max(p.y.abs()))
        .fold(1.0_f64, f64::max);
    if double_area.abs() <= f64::EPSILON * scale * scale {
        return Some(vertex_mean(polygon));
    }

    let factor = 1.0 / (3.0 * double_area);
    Some(Point::new(cx * factor, cy * factor))
}

fn vertex_mean(polygon: &[Point]) -> Point {
    let n = polygon.len().max(1) as f64;
    let sum = polygon
        .iter()
        .fold(Point::default(), |acc, &point| acc + point);
    sum * (1.0 / n)
}

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x).mul_add(b.y - o.y, -((a.y - o.y) * (b.x - o.x)))
}

/// Convex hull by monotone chain
///
/// Collinear and repeated vertices are dropped. Inputs with fewer than three
/// distinct points are returned deduplicated.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut sorted: Vec<Point> = points.iter().copied().filter(|p| p.is_finite()).collect();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();

    if sorted.len() < 3 {
        return sorted;
    }

    let mut lower: Vec<Point> = Vec::with_capacity(sorted.len());
    for &point in &sorted {
        while let [.., a, b] = lower.as_slice() {
            if cross(*a, *b, point) > 0.0 {
                break;
            }
            lower.pop();
        }
        lower.push(point);
    }

    let mut upper: Vec<Point> = Vec::with_capacity(sorted.len());
    for &point in sorted.iter().rev() {
        while let [.., a, b] = upper.as_slice() {
            if cross(*a, *b, point) > 0.0 {
                break;
            }
            upper.pop();
        }
        upper.push(point);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Even-odd containment test
///
/// Points exactly on an edge may fall either way.
pub fn polygon_contains(polygon: &[Point], point: Point) -> bool {
    let Some(&last) = polygon.last() else {
        return false;
    };
    let mut inside = false;
    let mut previous = last;
    for &current in polygon {
        if (current.y > point.y) != (previous.y > point.y)
            && point.x
                < (previous.x - current.x) * (point.y - current.y) / (previous.y - current.y)
                    + current.x
        {
            inside = !inside;
        }
        previous = current;
    }
    inside
}

/// Axis-aligned bounding box of a polygon
pub fn polygon_bounds(polygon: &[Point]) -> Option<Rect> {
    let first = *polygon.first()?;
    let mut bounds = Rect {
        min: first,
        max: first,
    };
    for point in polygon {
        bounds.min.x = bounds.min.x.min(point.x);
        bounds.min.y = bounds.min.y.min(point.y);
        bounds.max.x = bounds.max.x.max(point.x);
        bounds.max.y = bounds.max.y.max(point.y);
    }
    Some(bounds)
}

/// Bounding box rounded to integer coordinates, as `(min_x, min_y, max_x, max_y)`
///
/// Negative coordinates are clamped to zero.
pub fn integer_bounds(polygon: &[Point]) -> Option<(usize, usize, usize, usize)> {
    let bounds = polygon_bounds(polygon)?;
    let round = |v: f64| v.round().max(0.0) as usize;
    Some((
        round(bounds.min.x),
        round(bounds.min.y),
        round(bounds.max.x),
        round(bounds.max.y),
    ))
}
