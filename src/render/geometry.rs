use crate::config::AnimationShape;

/// The drawable area, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Viewport {
    pub(crate) width: f64,
    pub(crate) height: f64,
}

impl Viewport {
    pub(crate) fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// How much a circle has to grow past the short side to reach the viewport's corners.
    pub(crate) fn max_scale(&self) -> f64 {
        let short = self.width.min(self.height);
        if short <= 0.0 {
            return 1.0;
        }
        self.width.max(self.height) / short
    }
}

/// Where the shape sits for a given progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ShapeGeometry {
    /// Full width rectangle anchored at the bottom of the viewport.
    Rectangle { top: f64, height: f64 },

    Circle { center_x: f64, center_y: f64, radius: f64 },
}

impl ShapeGeometry {
    pub(crate) fn new(shape: AnimationShape, progress: f64, viewport: &Viewport) -> Self {
        let progress = progress.clamp(0.0, 1.0);
        match shape {
            AnimationShape::Rectangle => {
                let height = viewport.height * progress;
                Self::Rectangle { top: viewport.height - height, height }
            }
            AnimationShape::Circle => {
                let diameter = viewport.width.min(viewport.height) * progress * viewport.max_scale();
                Self::Circle { center_x: viewport.width / 2.0, center_y: viewport.height / 2.0, radius: diameter / 2.0 }
            }
        }
    }

    /// The radius radial gradients extend to; zero for rectangles.
    pub(crate) fn radius(&self) -> f64 {
        match self {
            Self::Rectangle { .. } => 0.0,
            Self::Circle { radius, .. } => *radius,
        }
    }

    /// Whether the pixel centered at `(x, y)` is covered by the shape.
    pub(crate) fn contains(&self, x: f64, y: f64) -> bool {
        match *self {
            Self::Rectangle { top, height } => height > 0.0 && y >= top,
            Self::Circle { center_x, center_y, radius } => {
                let (dx, dy) = (x - center_x, y - center_y);
                radius > 0.0 && dx * dx + dy * dy <= radius * radius
            }
        }
    }
}
