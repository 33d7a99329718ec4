use crate::config::AnimationMode;

/// A cubic Bezier timing curve anchored at (0, 0) and (1, 1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct CubicBezier {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl CubicBezier {
    /// The standard ease-in-out curve.
    pub(crate) const EASE_IN_OUT: CubicBezier = CubicBezier::new(0.42, 0.0, 0.58, 1.0);

    const NEWTON_ITERATIONS: usize = 8;
    const EPSILON: f64 = 1e-7;

    pub(crate) const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Map elapsed time (the curve's x) into progress (the curve's y).
    pub(crate) fn apply(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);
        if x == 0.0 || x == 1.0 {
            return x;
        }
        let t = self.solve_t(x);
        Self::sample(self.y1, self.y2, t)
    }

    fn solve_t(&self, x: f64) -> f64 {
        let mut t = x;
        for _ in 0..Self::NEWTON_ITERATIONS {
            let error = Self::sample(self.x1, self.x2, t) - x;
            if error.abs() < Self::EPSILON {
                return t;
            }
            let slope = Self::slope(self.x1, self.x2, t);
            if slope.abs() < 1e-6 {
                break;
            }
            t -= error / slope;
        }

        // Newton didn't converge, bisect instead. x(t) is monotonic for control points within [0, 1].
        let (mut low, mut high) = (0.0, 1.0);
        t = x;
        while high - low > Self::EPSILON {
            let value = Self::sample(self.x1, self.x2, t);
            if (value - x).abs() < Self::EPSILON {
                break;
            }
            if value < x {
                low = t;
            } else {
                high = t;
            }
            t = (low + high) / 2.0;
        }
        t
    }

    // B(t) = 3(1-t)^2 t p1 + 3(1-t) t^2 p2 + t^3
    fn sample(p1: f64, p2: f64, t: f64) -> f64 {
        let inverse = 1.0 - t;
        3.0 * inverse * inverse * t * p1 + 3.0 * inverse * t * t * p2 + t * t * t
    }

    fn slope(p1: f64, p2: f64, t: f64) -> f64 {
        let inverse = 1.0 - t;
        3.0 * inverse * inverse * p1 + 6.0 * inverse * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
    }
}

impl AnimationMode {
    /// Apply this mode's curve to a linear fraction of elapsed time.
    pub(crate) fn curve(self, fraction: f64) -> f64 {
        match self {
            Self::Linear => fraction.clamp(0.0, 1.0),
            Self::Eased => CubicBezier::EASE_IN_OUT.apply(fraction),
        }
    }
}
