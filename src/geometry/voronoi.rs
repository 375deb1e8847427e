//! Bounded Voronoi diagram built cell by cell from nearest neighbours
//!
//! Every cell starts as the bounding rectangle and is clipped by the bisector
//! of each neighbouring site, nearest first, until the next neighbour is
//! farther than twice the cell's safety radius (the largest distance from the
//! site to a cell vertex). No global Delaunay structure is built; cells are
//! independent and constructed in parallel.
//!
//! Each cell records which neighbours contributed an edge. The owner query
//! walks this adjacency greedily, which always ends at the nearest site for
//! query points inside the bounds: the segment from the current site to the
//! query leaves the current cell through an edge shared with a site that is
//! strictly closer to the query.

use bitvec::prelude::*;
use rayon::prelude::*;
use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::geometry::polygon::{Point, Rect};
use crate::geometry::tessellation::{GeometryProvider, Tessellation};
use crate::io::error::{Result, invalid_parameter};

type IndexedSite = GeomWithData<[f64; 2], usize>;

/// Geometry provider producing [`BoundedVoronoi`] tessellations
#[derive(Clone, Copy, Debug, Default)]
pub struct VoronoiProvider;

impl GeometryProvider for VoronoiProvider {
    type Output = BoundedVoronoi;

    fn build(&self, sites: &[Point], bounds: Rect) -> Result<BoundedVoronoi> {
        BoundedVoronoi::new(sites, bounds)
    }
}

/// One vertex of a cell polygon together with the edge leaving it
#[derive(Clone, Copy, Debug)]
struct CellVertex {
    point: Point,
    /// Site on the other side of the edge starting here (`None` on the bounds)
    edge: Option<usize>,
}

#[derive(Clone, Debug, Default)]
struct VoronoiCell {
    polygon: Vec<Point>,
    neighbors: Vec<usize>,
}

/// Voronoi diagram of a point set clipped to a rectangle
#[derive(Clone, Debug)]
pub struct BoundedVoronoi {
    sites: Vec<Point>,
    bounds: Rect,
    cells: Vec<VoronoiCell>,
    /// Sites coinciding with a site of lower index
    shadowed: BitVec,
}

impl BoundedVoronoi {
    /// Build the diagram of `sites` clipped to `bounds`
    ///
    /// Sites outside the bounds are accepted but their cells only cover the
    /// part of their region inside the bounds (possibly nothing).
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds do not enclose a positive finite area
    /// or a site has a non-finite coordinate
    pub fn new(sites: &[Point], bounds: Rect) -> Result<Self> {
        if !bounds.is_valid() {
            return Err(invalid_parameter(
                "bounds",
                &format!("{bounds:?}"),
                &"must enclose a positive, finite area",
            ));
        }
        if let Some(index) = sites.iter().position(|site| !site.is_finite()) {
            return Err(invalid_parameter(
                "sites",
                &index,
                &"site coordinates must be finite",
            ));
        }

        let tree = RTree::bulk_load(
            sites
                .iter()
                .enumerate()
                .map(|(index, site)| IndexedSite::new(site.to_array(), index))
                .collect(),
        );
        let shadowed = shadowed_sites(sites, &tree);

        let cells = (0..sites.len())
            .into_par_iter()
            .map(|index| build_cell(index, sites, &tree, &shadowed, bounds))
            .collect();

        Ok(Self {
            sites: sites.to_vec(),
            bounds,
            cells,
            shadowed,
        })
    }

    /// Sites in cell order
    pub fn sites(&self) -> &[Point] {
        &self.sites
    }

    /// Clipping rectangle
    pub const fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Indices of the sites sharing an edge with the cell at `index`
    pub fn neighbors(&self, index: usize) -> Option<&[usize]> {
        self.cells.get(index).map(|cell| cell.neighbors.as_slice())
    }

    fn is_shadowed(&self, index: usize) -> bool {
        self.shadowed.get(index).as_deref() == Some(&true)
    }

    fn site_distance(&self, index: usize, point: Point) -> f64 {
        self.sites
            .get(index)
            .map_or(f64::INFINITY, |site| site.distance_squared(point))
    }
}

impl Tessellation for BoundedVoronoi {
    fn len(&self) -> usize {
        self.sites.len()
    }

    fn cell_polygon(&self, index: usize) -> Option<&[Point]> {
        self.cells.get(index).map(|cell| cell.polygon.as_slice())
    }

    fn find_owner(&self, point: Point, hint: usize) -> Option<usize> {
        if self.sites.is_empty() {
            return None;
        }

        // Site 0 is never shadowed, so it is always a valid start
        let mut current = if hint < self.sites.len() && !self.is_shadowed(hint) {
            hint
        } else {
            0
        };
        let mut best = self.site_distance(current, point);

        loop {
            let mut next = None;
            for &neighbor in self.neighbors(current).unwrap_or(&[]) {
                let distance = self.site_distance(neighbor, point);
                if distance < best {
                    best = distance;
                    next = Some(neighbor);
                }
            }
            match next {
                Some(neighbor) => current = neighbor,
                None => return Some(current),
            }
        }
    }
}

// Marks every site that sits exactly on top of a site with a smaller index
fn shadowed_sites(sites: &[Point], tree: &RTree<IndexedSite>) -> BitVec {
    let mut shadowed = bitvec![0; sites.len()];
    for (index, site) in sites.iter().enumerate() {
        let duplicated = tree
            .nearest_neighbor_iter(&site.to_array())
            .take_while(|other| Point::from(*other.geom()) == *site)
            .any(|other| other.data < index);
        shadowed.set(index, duplicated);
    }
    shadowed
}

fn build_cell(
    index: usize,
    sites: &[Point],
    tree: &RTree<IndexedSite>,
    shadowed: &BitSlice,
    bounds: Rect,
) -> VoronoiCell {
    let Some(&site) = sites.get(index) else {
        return VoronoiCell::default();
    };
    if shadowed.get(index).as_deref() == Some(&true) {
        return VoronoiCell::default();
    }

    let mut polygon: Vec<CellVertex> = bounds
        .corners()
        .into_iter()
        .map(|point| CellVertex { point, edge: None })
        .collect();
    let mut safety_radius2 = max_radius2(site, &polygon);

    for neighbor in tree.nearest_neighbor_iter(&site.to_array()) {
        let other_index = neighbor.data;
        if other_index == index || shadowed.get(other_index).as_deref() == Some(&true) {
            continue;
        }
        let other = Point::from(*neighbor.geom());
        let distance2 = site.distance_squared(other);
        if distance2 == 0.0 {
            // Coincident site with a larger index; this cell keeps the region
            continue;
        }
        if distance2 > 4.0 * safety_radius2 {
            break;
        }
        if clip_by_bisector(&mut polygon, site, other, other_index) {
            if polygon.is_empty() {
                break;
            }
            safety_radius2 = max_radius2(site, &polygon);
        }
    }

    let mut neighbors: Vec<usize> = polygon.iter().filter_map(|vertex| vertex.edge).collect();
    neighbors.sort_unstable();
    neighbors.dedup();

    VoronoiCell {
        polygon: polygon.into_iter().map(|vertex| vertex.point).collect(),
        neighbors,
    }
}

fn max_radius2(site: Point, polygon: &[CellVertex]) -> f64 {
    polygon
        .iter()
        .map(|vertex| vertex.point.distance_squared(site))
        .fold(0.0, f64::max)
}

/// Keep the part of `polygon` closer to `site` than to `other`
///
/// Returns whether any vertex was removed.
fn clip_by_bisector(
    polygon: &mut Vec<CellVertex>,
    site: Point,
    other: Point,
    other_index: usize,
) -> bool {
    let normal = other - site;
    let midpoint = site.midpoint(other);
    let side = |point: Point| (point - midpoint).dot(normal);

    if polygon.iter().all(|vertex| side(vertex.point) <= 0.0) {
        return false;
    }

    let mut clipped = Vec::with_capacity(polygon.len() + 1);
    let count = polygon.len();
    for (i, &start) in polygon.iter().enumerate() {
        let Some(&end) = polygon.get((i + 1) % count) else {
            continue;
        };
        let da = side(start.point);
        let db = side(end.point);

        if da <= 0.0 {
            // An edge leaving the bisector towards the outside runs along it
            let edge = if da == 0.0 && db > 0.0 {
                Some(other_index)
            } else {
                start.edge
            };
            clipped.push(CellVertex {
                point: start.point,
                edge,
            });
        }

        if (da < 0.0 && db > 0.0) || (da > 0.0 && db < 0.0) {
            let t = da / (da - db);
            let crossing = start.point + (end.point - start.point) * t;
            let edge = if da < 0.0 { Some(other_index) } else { start.edge };
            clipped.push(CellVertex {
                point: crossing,
                edge,
            });
        }
    }

    *polygon = clipped;
    true
}
