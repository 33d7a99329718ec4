use super::blend::Fill;
use super::geometry::{ShapeGeometry, Viewport};
use crate::color::Rgba;

/// A grid of opaque pixels the shape gets rasterized into.
#[derive(Clone, Debug)]
pub(crate) struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl Canvas {
    pub(crate) fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![Rgba::BLACK; width * height] }
    }

    pub(crate) fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn height(&self) -> usize {
        self.height
    }

    pub(crate) fn viewport(&self) -> Viewport {
        Viewport::new(self.width as f64, self.height as f64)
    }

    pub(crate) fn resize(&mut self, width: usize, height: usize) {
        if (width, height) != (self.width, self.height) {
            *self = Self::new(width, height);
        }
    }

    pub(crate) fn pixel(&self, x: usize, y: usize) -> Rgba {
        self.pixels[y * self.width + x]
    }

    /// Rasterize the shape. Pixels outside of it take the background color.
    pub(crate) fn paint(&mut self, geometry: &ShapeGeometry, fill: &Fill, background: &Rgba) {
        let backdrop = background.over(&Rgba::BLACK);
        let (center_x, center_y) = match *geometry {
            ShapeGeometry::Circle { center_x, center_y, .. } => (center_x, center_y),
            ShapeGeometry::Rectangle { .. } => (self.width as f64 / 2.0, self.height as f64 / 2.0),
        };
        let (span_top, span_height) = match *geometry {
            ShapeGeometry::Rectangle { top, height } => (top, height),
            ShapeGeometry::Circle { center_y, radius, .. } => (center_y - radius, radius * 2.0),
        };
        for y in 0..self.height {
            let pixel_y = y as f64 + 0.5;
            for x in 0..self.width {
                let pixel_x = x as f64 + 0.5;
                let color = if !geometry.contains(pixel_x, pixel_y) {
                    backdrop
                } else {
                    let color = match *fill {
                        Fill::Solid(color) => color,
                        Fill::LinearGradient { top, bottom } => {
                            let fraction = fraction_of(pixel_y - span_top, span_height);
                            top.interpolate(&bottom, fraction)
                        }
                        Fill::RadialGradient { inner, outer, radius } => {
                            let distance = (pixel_x - center_x).hypot(pixel_y - center_y);
                            inner.interpolate(&outer, fraction_of(distance, radius))
                        }
                    };
                    color.over(background)
                };
                self.pixels[y * self.width + x] = color;
            }
        }
    }
}

fn fraction_of(value: f64, total: f64) -> f64 {
    if total <= 0.0 { 0.0 } else { (value / total).clamp(0.0, 1.0) }
}
