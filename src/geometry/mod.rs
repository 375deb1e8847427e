/// Points, rectangles and polygon measures
pub mod polygon;
/// Tessellation and geometry provider contracts
pub mod tessellation;
/// Bounded Voronoi diagram provider
pub mod voronoi;
