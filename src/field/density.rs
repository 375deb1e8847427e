//! Normalized 2D scalar field used as the stippling target
//!
//! Values live in an `ndarray` grid indexed `[y, x]` (row-major, one row per
//! field line) and are within [0, 1] once constructed. Fields are never
//! renormalized or mutated afterwards.

use ndarray::Array2;

use crate::geometry::polygon::{Point, integer_bounds, polygon_contains};
use crate::io::configuration::{
    LUMINANCE_BLUE, LUMINANCE_GREEN, LUMINANCE_RED, MAX_FIELD_DIMENSION,
};
use crate::io::error::{AlgorithmError, Result, invalid_input};

/// One pixel sample with red, green, blue and alpha channels in [0, 255]
pub type Rgba = [u8; 4];

/// Perceptual luminance of an RGBA sample in [0, 1]
///
/// Alpha is ignored.
pub fn luminance(sample: &Rgba) -> f64 {
    let [r, g, b, _alpha] = *sample;
    LUMINANCE_BLUE.mul_add(
        f64::from(b),
        LUMINANCE_RED.mul_add(f64::from(r), LUMINANCE_GREEN * f64::from(g)),
    ) / 255.0
}

/// Immutable grid of normalized density values
#[derive(Clone, Debug, PartialEq)]
pub struct DensityField {
    data: Array2<f64>,
}

impl DensityField {
    /// Build a field from raw samples, normalizing by the largest mapped value
    ///
    /// Every sample is mapped through `to_density` and the results are divided
    /// by their maximum, so the densest sample becomes 1.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `width` is zero or does not divide the sample count
    /// - There are no samples
    /// - A mapped value is negative or not finite
    /// - Every mapped value is zero
    pub fn from_samples<S, F>(samples: &[S], width: usize, to_density: F) -> Result<Self>
    where
        F: Fn(&S) -> f64,
    {
        let height = flat_height(samples.len(), width)?;
        let raw: Vec<f64> = samples.iter().map(to_density).collect();

        if let Some(index) = raw.iter().position(|v| !v.is_finite() || *v < 0.0) {
            return Err(invalid_input(&format!(
                "sample {index} maps to an invalid density {}",
                raw.get(index).copied().unwrap_or(f64::NAN)
            )));
        }

        let max = raw.iter().copied().fold(0.0, f64::max);
        if max <= 0.0 {
            return Err(invalid_input(&"all samples map to zero density"));
        }

        let data = Array2::from_shape_vec((height, width), raw)
            .map_err(|e| invalid_input(&e))?
            .mapv_into(|v| v / max);
        Self::from_array(data)
    }

    /// Build a field from RGBA pixels using perceptual luminance
    ///
    /// # Errors
    ///
    /// Same as [`DensityField::from_samples`]
    pub fn from_rgba(samples: &[Rgba], width: usize) -> Result<Self> {
        Self::from_samples(samples, width, luminance)
    }

    /// Build a field from row-major values already in [0, 1]
    ///
    /// `stride` is the field width. Values are taken as they are.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout is malformed, a value lies outside
    /// [0, 1], or all values are zero
    pub fn from_flat(data: Vec<f64>, stride: usize) -> Result<Self> {
        let height = flat_height(data.len(), stride)?;
        let grid = Array2::from_shape_vec((height, stride), data).map_err(|e| invalid_input(&e))?;
        Self::from_array(grid)
    }

    /// Build a field from rows of values already in [0, 1]
    ///
    /// `grid[y][x]` is the value at `(x, y)`; all rows must have equal length.
    ///
    /// # Errors
    ///
    /// Returns an error if rows are ragged or empty, a value lies outside
    /// [0, 1], or all values are zero
    pub fn from_grid(grid: &[Vec<f64>]) -> Result<Self> {
        let width = grid.first().map_or(0, Vec::len);
        if let Some(row) = grid.iter().position(|row| row.len() != width) {
            return Err(invalid_input(&format!(
                "row {row} has a different length than row 0 ({width})"
            )));
        }
        Self::from_flat(grid.concat(), width)
    }

    /// Build a field from an `[y, x]` array of values already in [0, 1]
    ///
    /// # Errors
    ///
    /// Returns an error if the array is empty or too large, a value lies
    /// outside [0, 1], or all values are zero
    pub fn from_array(data: Array2<f64>) -> Result<Self> {
        let (height, width) = data.dim();
        validate_dimensions(width, height)?;

        if let Some(((y, x), value)) = data
            .indexed_iter()
            .find(|(_, v)| !v.is_finite() || **v < 0.0 || **v > 1.0)
        {
            return Err(invalid_input(&format!(
                "value {value} at ({x}, {y}) is outside [0, 1]"
            )));
        }
        if data.iter().all(|v| *v == 0.0) {
            return Err(invalid_input(&"field has no mass (all values are zero)"));
        }

        Ok(Self {
            data: data.as_standard_layout().into_owned(),
        })
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Dimensions as `(width, height)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    /// Underlying `[y, x]` grid
    pub const fn values(&self) -> &Array2<f64> {
        &self.data
    }

    /// Value at integer coordinates
    ///
    /// # Errors
    ///
    /// Returns an error if `(x, y)` lies outside the field
    pub fn density(&self, x: usize, y: usize) -> Result<f64> {
        self.data
            .get([y, x])
            .copied()
            .ok_or_else(|| AlgorithmError::OutOfBounds {
                x,
                y,
                dimensions: self.dimensions(),
            })
    }

    /// Sum of values at integer points strictly inside `polygon`
    ///
    /// Only the polygon's rounded bounding box is visited, with the upper
    /// bounds excluded. Points outside the field contribute nothing.
    pub fn area_density(&self, polygon: &[Point]) -> f64 {
        let Some((min_x, min_y, max_x, max_y)) = integer_bounds(polygon) else {
            return 0.0;
        };
        let max_x = max_x.min(self.width());
        let max_y = max_y.min(self.height());

        let mut density = 0.0;
        for y in min_y..max_y {
            for x in min_x..max_x {
                if polygon_contains(polygon, Point::new(x as f64, y as f64)) {
                    density += self.data.get([y, x]).copied().unwrap_or(0.0);
                }
            }
        }
        density
    }

    /// Sum of all values
    pub fn total_mass(&self) -> f64 {
        self.data.sum()
    }

    /// Largest value (1 for sample-derived fields)
    pub fn max_value(&self) -> f64 {
        self.data.iter().copied().fold(0.0, f64::max)
    }
}

/// Reject empty fields and fields beyond [`MAX_FIELD_DIMENSION`]
pub(crate) fn validate_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(invalid_input(&format!(
            "field must have a positive area, got {width}x{height}"
        )));
    }
    if width > MAX_FIELD_DIMENSION || height > MAX_FIELD_DIMENSION {
        return Err(invalid_input(&format!(
            "field {width}x{height} exceeds the maximum dimension {MAX_FIELD_DIMENSION}"
        )));
    }
    Ok(())
}

fn flat_height(len: usize, width: usize) -> Result<usize> {
    if width == 0 || len == 0 {
        return Err(invalid_input(&format!(
            "field must have a positive area, got {len} values with stride {width}"
        )));
    }
    if len % width != 0 {
        return Err(invalid_input(&format!(
            "{len} values cannot be split into rows of {width}"
        )));
    }
    Ok(len / width)
}
