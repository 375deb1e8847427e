//! Accumulation of field mass into Voronoi cells
//!
//! The scan strategies visit every integer point of the field in row-major
//! order and ask the tessellation for its owner. Consecutive points almost
//! always share an owner with the point directly above or the point just
//! visited, so those owners seed the search and keep it to a step or two.

use rayon::prelude::*;

use crate::algorithm::stipple::Stipple;
use crate::field::density::DensityField;
use crate::geometry::polygon::{Point, convex_hull};
use crate::geometry::tessellation::Tessellation;
use crate::io::error::{Result, geometry_inconsistency};

/// How field mass is attributed to cells
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AssignmentStrategy {
    /// Single row-major scan with owner hints
    #[default]
    Scan,
    /// Rows split into bands scanned in parallel, then summed
    BandedScan,
    /// Per-cell sum over the cell's convex hull, in parallel
    ///
    /// Points on shared edges may be counted by no cell or by two.
    CellArea,
}

/// Per-column cache of the last owner found, plus the previous scan result
#[derive(Clone, Debug)]
pub struct ColumnHints {
    columns: Vec<Option<usize>>,
    last: usize,
}

impl ColumnHints {
    /// Empty cache for a field `width` columns wide
    pub fn new(width: usize) -> Self {
        Self {
            columns: vec![None; width],
            last: 0,
        }
    }

    /// Owner hint for column `x`
    ///
    /// The owner of the point directly above if known, otherwise the owner
    /// of the previously scanned point.
    pub fn hint(&self, x: usize) -> usize {
        self.columns.get(x).copied().flatten().unwrap_or(self.last)
    }

    /// Remember the owner found in column `x`
    pub fn record(&mut self, x: usize, owner: usize) {
        if let Some(column) = self.columns.get_mut(x) {
            *column = Some(owner);
        }
        self.last = owner;
    }
}

/// Writes each cell's share of the field mass into its stipple
#[derive(Clone, Copy, Debug, Default)]
pub struct CellAssigner {
    strategy: AssignmentStrategy,
}

impl CellAssigner {
    /// Assigner using the given strategy
    pub const fn new(strategy: AssignmentStrategy) -> Self {
        Self { strategy }
    }

    /// Strategy in use
    pub const fn strategy(&self) -> AssignmentStrategy {
        self.strategy
    }

    /// Reset every stipple density and accumulate the field into the cells
    ///
    /// Stipple `i` receives the mass of cell `i`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stipple and cell counts differ, or if a field
    /// point has no owning cell
    pub fn assign<T>(
        &self,
        field: &DensityField,
        tessellation: &T,
        stipples: &mut [Stipple],
    ) -> Result<()>
    where
        T: Tessellation + Sync,
    {
        if stipples.len() != tessellation.len() {
            return Err(geometry_inconsistency(
                stipples.len(),
                tessellation.len(),
                &"stipple and cell counts differ",
            ));
        }
        for stipple in stipples.iter_mut() {
            stipple.density = 0.0;
        }

        let densities = match self.strategy {
            AssignmentStrategy::Scan => scan_rows(field, tessellation, 0..field.height())?,
            AssignmentStrategy::BandedScan => banded_scan(field, tessellation)?,
            AssignmentStrategy::CellArea => cell_areas(field, tessellation, stipples.len())?,
        };

        for (stipple, density) in stipples.iter_mut().zip(densities) {
            stipple.density = density;
        }
        Ok(())
    }
}

fn scan_rows<T: Tessellation>(
    field: &DensityField,
    tessellation: &T,
    rows: std::ops::Range<usize>,
) -> Result<Vec<f64>> {
    let mut densities = vec![0.0; tessellation.len()];
    let mut hints = ColumnHints::new(field.width());

    for y in rows {
        for (x, &value) in field.values().row(y).iter().enumerate() {
            let point = Point::new(x as f64, y as f64);
            let owner = tessellation
                .find_owner(point, hints.hint(x))
                .ok_or_else(|| {
                    geometry_inconsistency(
                        densities.len(),
                        tessellation.len(),
                        &format!("no cell owns field point ({x}, {y})"),
                    )
                })?;
            let Some(density) = densities.get_mut(owner) else {
                return Err(geometry_inconsistency(
                    densities.len(),
                    tessellation.len(),
                    &format!("owner {owner} of field point ({x}, {y}) is not a cell"),
                ));
            };
            *density += value;
            hints.record(x, owner);
        }
    }

    Ok(densities)
}

fn banded_scan<T: Tessellation + Sync>(field: &DensityField, tessellation: &T) -> Result<Vec<f64>> {
    let height = field.height();
    let bands = rayon::current_num_threads().clamp(1, height.max(1));
    let rows_per_band = height.div_ceil(bands);

    (0..bands)
        .into_par_iter()
        .map(|band| {
            let start = (band * rows_per_band).min(height);
            let end = (start + rows_per_band).min(height);
            scan_rows(field, tessellation, start..end)
        })
        .try_reduce(
            || vec![0.0; tessellation.len()],
            |mut total, band| {
                for (sum, value) in total.iter_mut().zip(band) {
                    *sum += value;
                }
                Ok(total)
            },
        )
}

fn cell_areas<T: Tessellation + Sync>(
    field: &DensityField,
    tessellation: &T,
    stipple_count: usize,
) -> Result<Vec<f64>> {
    (0..tessellation.len())
        .into_par_iter()
        .map(|index| {
            tessellation
                .cell_polygon(index)
                .map(|polygon| field.area_density(&convex_hull(polygon)))
                .ok_or_else(|| {
                    geometry_inconsistency(
                        stipple_count,
                        tessellation.len(),
                        &format!("cell {index} has no polygon"),
                    )
                })
        })
        .collect()
}
