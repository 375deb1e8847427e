//! Geometry provider contract consumed by the stippling engine
//!
//! A provider builds a tessellation from the current stipple positions. Cell
//! `i` of the tessellation always belongs to site `i`; the correspondence is
//! positional and only valid for the generation it was built from.

use crate::geometry::polygon::{Point, Rect};
use crate::io::error::Result;

/// Voronoi tessellation of a set of sites inside a bounding rectangle
pub trait Tessellation {
    /// Number of cells (equal to the number of sites it was built from)
    fn len(&self) -> usize;

    /// Whether the tessellation has no cells
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Polygon of the cell at `index`, clipped to the bounds
    ///
    /// Returns `None` for an index outside the tessellation. A cell may be
    /// empty when its site coincides with a site of lower index.
    fn cell_polygon(&self, index: usize) -> Option<&[Point]>;

    /// Index of the site nearest to `point`
    ///
    /// `hint` is a cell index likely to be at or near the answer; a good hint
    /// shortens the search but never changes the result. Returns `None` when
    /// the tessellation is empty.
    fn find_owner(&self, point: Point, hint: usize) -> Option<usize>;
}

/// Builds tessellations for the relaxation loop
pub trait GeometryProvider {
    /// Tessellation type produced by this provider
    type Output: Tessellation + Sync;

    /// Build the tessellation of `sites` clipped to `bounds`
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds are degenerate or a site is not finite
    fn build(&self, sites: &[Point], bounds: Rect) -> Result<Self::Output>;
}
