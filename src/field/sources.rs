//! Density sources other than images: synthetic gradients and point datasets

use ndarray::Array2;

use crate::field::density::{DensityField, validate_dimensions};
use crate::geometry::polygon::Point;
use crate::io::error::{Result, invalid_input, invalid_parameter};

/// Linear black to white gradient between two points
///
/// Density is 0 at `from`, 1 at `to`, and constant beyond either end along
/// the gradient axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearGradient {
    /// Start of the gradient (density 0)
    pub from: Point,
    /// End of the gradient (density 1)
    pub to: Point,
}

impl LinearGradient {
    /// Gradient running from the left edge to the right edge of a field
    pub const fn horizontal(width: usize) -> Self {
        Self {
            from: Point::new(0.0, 0.0),
            to: Point::new(width as f64, 0.0),
        }
    }

    /// Gradient value at a point, in [0, 1]
    pub fn value_at(&self, point: Point) -> f64 {
        let axis = self.to - self.from;
        let length2 = axis.dot(axis);
        if length2 <= 0.0 {
            return 0.0;
        }
        ((point - self.from).dot(axis) / length2).clamp(0.0, 1.0)
    }

    /// Render the gradient at pixel centres and normalize it
    ///
    /// # Errors
    ///
    /// Returns an error if both end points coincide or are not finite, or if
    /// the rendered field is empty, oversized or has no mass
    pub fn render(&self, width: usize, height: usize) -> Result<DensityField> {
        if !self.from.is_finite() || !self.to.is_finite() || self.from == self.to {
            return Err(invalid_parameter(
                "gradient",
                &format!("{:?} -> {:?}", self.from, self.to),
                &"end points must be finite and distinct",
            ));
        }

        validate_dimensions(width, height)?;

        let centres: Vec<Point> = (0..height)
            .flat_map(|y| (0..width).map(move |x| Point::new(x as f64 + 0.5, y as f64 + 0.5)))
            .collect();
        DensityField::from_samples(&centres, width, |&p| self.value_at(p))
    }
}

/// How per-pixel point counts become densities
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RasterScaling {
    /// Every pixel holding at least one point has density 1
    #[default]
    Binary,
    /// Counts are divided by the largest count
    MaxScaled,
}

/// Point dataset rendered onto a pixel grid
///
/// Besides the density field, the raster remembers which data points fell
/// into each pixel so that stipple cells can be traced back to their data.
#[derive(Clone, Debug)]
pub struct PointRaster {
    field: DensityField,
    location_to_data: Vec<Vec<usize>>,
    skipped: usize,
}

impl PointRaster {
    /// Rasterize points, scaling their bounding box onto the pixel grid
    ///
    /// The bounding box of all finite points is mapped onto
    /// `[0, width - 1] × [0, height - 1]`. A degenerate axis maps to 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid is empty or oversized, or if no point
    /// lands on it
    pub fn from_points(
        points: &[Point],
        width: usize,
        height: usize,
        scaling: RasterScaling,
    ) -> Result<Self> {
        let finite = points.iter().filter(|p| p.is_finite());
        let (min, max) = finite.fold(
            (
                Point::new(f64::INFINITY, f64::INFINITY),
                Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            ),
            |(min, max), p| {
                (
                    Point::new(min.x.min(p.x), min.y.min(p.y)),
                    Point::new(max.x.max(p.x), max.y.max(p.y)),
                )
            },
        );
        let target_x = width.saturating_sub(1) as f64;
        let target_y = height.saturating_sub(1) as f64;

        Self::from_points_with(points, width, height, scaling, |p| {
            Some(Point::new(
                scale_to_range(min.x, max.x, target_x, p.x),
                scale_to_range(min.y, max.y, target_y, p.y),
            ))
        })
    }

    /// Rasterize points through a caller mapping into pixel coordinates
    ///
    /// The mapping may reject a point by returning `None`, as a projection
    /// does for locations it does not cover. Points mapped outside the grid
    /// and points with non-finite coordinates are skipped and counted.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid is empty or oversized, or if no point
    /// lands on it
    pub fn from_points_with<F>(
        points: &[Point],
        width: usize,
        height: usize,
        scaling: RasterScaling,
        map_location: F,
    ) -> Result<Self>
    where
        F: Fn(Point) -> Option<Point>,
    {
        validate_dimensions(width, height)?;

        let mut counts = Array2::<f64>::zeros((height, width));
        let mut location_to_data = vec![Vec::new(); width * height];
        let mut skipped = 0;

        for (index, &point) in points.iter().enumerate() {
            let Some(pixel) = point
                .is_finite()
                .then(|| map_location(point))
                .flatten()
                .and_then(|p| pixel_of(p, width, height))
            else {
                skipped += 1;
                continue;
            };
            let (x, y) = pixel;
            if let (Some(count), Some(data)) = (
                counts.get_mut([y, x]),
                location_to_data.get_mut(y * width + x),
            ) {
                *count += 1.0;
                data.push(index);
            }
        }

        if skipped > 0 {
            log::debug!("{skipped} of {} points fell outside the raster", points.len());
        }

        let max = counts.iter().copied().fold(0.0, f64::max);
        if max <= 0.0 {
            return Err(invalid_input(&"no point lies inside the raster"));
        }
        let densities = match scaling {
            RasterScaling::Binary => counts.mapv_into(|c| c.min(1.0)),
            RasterScaling::MaxScaled => counts.mapv_into(|c| c / max),
        };

        Ok(Self {
            field: DensityField::from_array(densities)?,
            location_to_data,
            skipped,
        })
    }

    /// Rendered density field
    pub const fn field(&self) -> &DensityField {
        &self.field
    }

    /// Take the density field, dropping the location index
    pub fn into_field(self) -> DensityField {
        self.field
    }

    /// Indices of the data points that fell into pixel `(x, y)`
    pub fn data_at(&self, x: usize, y: usize) -> &[usize] {
        if x >= self.field.width() {
            return &[];
        }
        self.location_to_data
            .get(y * self.field.width() + x)
            .map_or(&[], Vec::as_slice)
    }

    /// Every rasterized data point with the pixel it landed in
    pub fn located_data(&self) -> impl Iterator<Item = (usize, Point)> + '_ {
        let width = self.field.width();
        self.location_to_data
            .iter()
            .enumerate()
            .flat_map(move |(pixel, data)| {
                let location = Point::new((pixel % width) as f64, (pixel / width) as f64);
                data.iter().map(move |&index| (index, location))
            })
    }

    /// Number of points that did not land on the raster
    pub const fn skipped(&self) -> usize {
        self.skipped
    }
}

const fn scale_to_range(min: f64, max: f64, target_max: f64, value: f64) -> f64 {
    if max > min {
        (value - min) / (max - min) * target_max
    } else {
        0.0
    }
}

fn pixel_of(point: Point, width: usize, height: usize) -> Option<(usize, usize)> {
    let x = point.x.floor();
    let y = point.y.floor();
    if !point.is_finite() || x < 0.0 || y < 0.0 || x >= width as f64 || y >= height as f64 {
        return None;
    }
    Some((x as usize, y as usize))
}
