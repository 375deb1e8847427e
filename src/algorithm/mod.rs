/// Accumulation of field mass into Voronoi cells
pub mod assignment;
/// Split/merge relaxation loop and its results
pub mod relaxation;
/// Split heuristic for overfull cells
pub mod split;
/// Stipples, generations and random seeding
pub mod stipple;
