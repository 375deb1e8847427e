//! Stipples, stipple generations and random seeding

use std::f64::consts::PI;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::geometry::polygon::Point;
use crate::io::configuration::INITIAL_STIPPLE_FILL;

/// One point sample of the stippling
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Stipple {
    /// Horizontal position in field coordinates
    pub x: f64,
    /// Vertical position in field coordinates
    pub y: f64,
    /// Mass accumulated from the field, normalized to [0, 1] at convergence
    pub density: f64,
    /// `x / width`, set at convergence
    pub relative_x: f64,
    /// `y / height`, set at convergence
    pub relative_y: f64,
}

impl Stipple {
    /// Stipple at a position with no mass
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            density: 0.0,
            relative_x: 0.0,
            relative_y: 0.0,
        }
    }

    /// Stipple at a point with no mass
    pub const fn at(point: Point) -> Self {
        Self::new(point.x, point.y)
    }

    /// Position as a point
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Stipples of one relaxation iteration
///
/// Every iteration produces a new generation; a generation is never edited
/// once the next one exists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Generation {
    index: usize,
    stipples: Vec<Stipple>,
}

impl Generation {
    /// Wrap the stipples of generation `index`
    pub const fn new(index: usize, stipples: Vec<Stipple>) -> Self {
        Self { index, stipples }
    }

    /// Generation counter, 0 for the seeded stipples
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Stipples of this generation
    pub fn stipples(&self) -> &[Stipple] {
        &self.stipples
    }

    /// Number of stipples
    pub fn len(&self) -> usize {
        self.stipples.len()
    }

    /// Whether the generation has no stipples
    pub fn is_empty(&self) -> bool {
        self.stipples.is_empty()
    }

    /// Stipple positions in index order
    pub fn positions(&self) -> Vec<Point> {
        self.stipples.iter().map(Stipple::position).collect()
    }

    /// Take the stipples
    pub fn into_stipples(self) -> Vec<Stipple> {
        self.stipples
    }
}

/// Number of stipples seeded for a field of the given area
///
/// `round(fill · area / (π·r²))` with the configured initial fill factor.
pub fn initial_stipple_count(width: usize, height: usize, stipple_radius: f64) -> usize {
    let area = (width * height) as f64;
    let stipple_area = PI * stipple_radius * stipple_radius;
    (INITIAL_STIPPLE_FILL * area / stipple_area).round() as usize
}

/// Deterministic source of uniformly placed stipples
#[derive(Clone, Debug)]
pub struct StippleSeeder {
    rng: StdRng,
}

impl StippleSeeder {
    /// Create a seeder from a fixed seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// One stipple uniformly placed in `[0, width) × [0, height)`
    pub fn random_stipple(&mut self, width: usize, height: usize) -> Stipple {
        let x = self.rng.random::<f64>() * width as f64;
        let y = self.rng.random::<f64>() * height as f64;
        Stipple::new(x, y)
    }

    /// `count` stipples uniformly placed in `[0, width) × [0, height)`
    pub fn random_stipples(&mut self, count: usize, width: usize, height: usize) -> Vec<Stipple> {
        (0..count)
            .map(|_| self.random_stipple(width, height))
            .collect()
    }
}
