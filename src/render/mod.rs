mod blend;
mod canvas;
mod geometry;
mod painter;

pub(crate) use blend::compute_fill;
pub(crate) use canvas::Canvas;
pub(crate) use geometry::ShapeGeometry;
pub(crate) use painter::Painter;
