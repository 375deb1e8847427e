//! Split heuristic for overfull cells

use crate::geometry::polygon::Point;

/// Positions of the two stipples replacing an overfull cell
///
/// Takes the cell vertices farthest and second farthest from `centroid` and
/// places one child halfway between the centroid and each of them. A single
/// vertex serves as both. Returns `None` for an empty polygon.
///
/// Both children lie in the convex hull of the polygon and its centroid.
pub fn split_cell(polygon: &[Point], centroid: Point) -> Option<[Point; 2]> {
    let mut farthest: Option<(f64, Point)> = None;
    let mut second: Option<(f64, Point)> = None;

    for &vertex in polygon {
        let distance = vertex.distance_squared(centroid);
        match farthest {
            Some((best, _)) if distance <= best => {
                if second.is_none_or(|(runner_up, _)| distance > runner_up) {
                    second = Some((distance, vertex));
                }
            }
            _ => {
                second = farthest;
                farthest = Some((distance, vertex));
            }
        }
    }

    let (_, first) = farthest?;
    let second = second.map_or(first, |(_, vertex)| vertex);
    let child = |vertex: Point| centroid + (vertex - centroid) * 0.5;

    Some([child(first), child(second)])
}
