use crate::breathing::BreathingPhase;
use crate::color::Rgba;
use crate::config::{AnimationShape, ColorFillType, Settings};

/// How the shape is painted for a single frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Fill {
    Solid(Rgba),

    /// Vertical gradient spanning the shape, `top` at its upper edge.
    LinearGradient { top: Rgba, bottom: Rgba },

    /// Gradient going from `inner` at the center to `outer` at `radius`.
    RadialGradient { inner: Rgba, outer: Rgba, radius: f64 },
}

/// The shape color for the given phase and progress, before any gradient is applied.
pub(crate) fn shape_color(phase: BreathingPhase, progress: f64, settings: &Settings) -> Rgba {
    let is_inhale = phase.is_inhale_side();
    let (initial, secondary) = if is_inhale {
        (settings.inhale_color, settings.exhale_color)
    } else {
        (settings.exhale_color, settings.inhale_color)
    };
    if !settings.color_transition_enabled {
        return initial;
    }
    let fraction = if is_inhale { progress } else { 1.0 - progress };
    secondary.interpolate(&initial, fraction)
}

/// Compute the fill for the current frame.
///
/// `radius` is the current circle radius and is only used for radial gradients.
pub(crate) fn compute_fill(phase: BreathingPhase, progress: f64, settings: &Settings, radius: f64) -> Fill {
    let color = shape_color(phase, progress, settings);
    match (settings.color_fill_type, settings.shape) {
        (ColorFillType::Constant, _) => Fill::Solid(color),
        (ColorFillType::Gradient, AnimationShape::Rectangle) => {
            Fill::LinearGradient { top: color, bottom: settings.background_color }
        }
        (ColorFillType::Gradient, AnimationShape::Circle) => {
            Fill::RadialGradient { inner: settings.background_color, outer: color, radius }
        }
    }
}
