use crate::config::Settings;
use std::time::Duration;
use strum::{Display, EnumIter};

/// Inhale and exhale never run shorter than this, no matter how much drift has shrunk them.
pub(crate) const MIN_BREATH_DURATION: f64 = 0.5;

/// No phase runs longer than this, no matter how much drift has stretched it.
pub(crate) const MAX_PHASE_DURATION: f64 = 3600.0;

/// One of the four segments of a breathing cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
pub(crate) enum BreathingPhase {
    #[strum(to_string = "Inhale")]
    Inhale,
    #[strum(to_string = "Hold")]
    HoldAfterInhale,
    #[strum(to_string = "Exhale")]
    Exhale,
    #[strum(to_string = "Hold")]
    HoldAfterExhale,
}

impl BreathingPhase {
    /// The phase that follows this one.
    pub(crate) fn next(self) -> Self {
        match self {
            Self::Inhale => Self::HoldAfterInhale,
            Self::HoldAfterInhale => Self::Exhale,
            Self::Exhale => Self::HoldAfterExhale,
            Self::HoldAfterExhale => Self::Inhale,
        }
    }

    /// The duration configured for this phase, in seconds.
    pub(crate) fn configured_duration(self, settings: &Settings) -> f64 {
        match self {
            Self::Inhale => settings.inhale_duration,
            Self::HoldAfterInhale => settings.post_inhale_hold_duration,
            Self::Exhale => settings.exhale_duration,
            Self::HoldAfterExhale => settings.post_exhale_hold_duration,
        }
    }

    /// The duration this phase actually lasts during the given cycle.
    ///
    /// Drift is applied once per completed cycle. Every phase saturates at
    /// [MAX_PHASE_DURATION]; breathing phases are floored at [MIN_BREATH_DURATION], holds are not.
    pub(crate) fn duration(self, settings: &Settings, cycle: u32) -> Duration {
        let exponent = i32::try_from(cycle).unwrap_or(i32::MAX);
        let seconds = self.configured_duration(settings) * settings.drift.powi(exponent);
        // `max` maps NaN (zero times an overflowed drift factor) to zero.
        let seconds = seconds.max(0.0).min(MAX_PHASE_DURATION);
        let seconds = if self.is_breath() { seconds.max(MIN_BREATH_DURATION) } else { seconds };
        Duration::from_secs_f64(seconds)
    }

    /// The progress value this phase animates towards.
    pub(crate) fn target_progress(self) -> f64 {
        match self {
            Self::Inhale | Self::HoldAfterInhale => 1.0,
            Self::Exhale | Self::HoldAfterExhale => 0.0,
        }
    }

    /// Whether this phase belongs to the inhale half of the cycle.
    pub(crate) fn is_inhale_side(self) -> bool {
        matches!(self, Self::Inhale | Self::HoldAfterInhale)
    }

    fn is_breath(self) -> bool {
        matches!(self, Self::Inhale | Self::Exhale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    fn settings() -> Settings {
        Settings {
            inhale_duration: 4.0,
            post_inhale_hold_duration: 2.0,
            exhale_duration: 6.0,
            post_exhale_hold_duration: 1.0,
            ..Default::default()
        }
    }

    #[rstest]
    #[case::inhale(BreathingPhase::Inhale, 4.0)]
    #[case::hold_after_inhale(BreathingPhase::HoldAfterInhale, 2.0)]
    #[case::exhale(BreathingPhase::Exhale, 6.0)]
    #[case::hold_after_exhale(BreathingPhase::HoldAfterExhale, 1.0)]
    fn duration_lookup(#[case] phase: BreathingPhase, #[case] expected: f64) {
        let settings = settings();
        assert_eq!(phase.configured_duration(&settings), expected);
        assert_eq!(phase.duration(&settings, 0), Duration::from_secs_f64(expected));
    }

    #[test]
    fn cyclic_order() {
        let mut phase = BreathingPhase::Inhale;
        let mut seen = Vec::new();
        for _ in 0..8 {
            seen.push(phase);
            phase = phase.next();
        }
        let expected: Vec<_> = BreathingPhase::iter().chain(BreathingPhase::iter()).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn no_drift_keeps_durations_constant() {
        let settings = settings();
        for phase in BreathingPhase::iter() {
            let first = phase.duration(&settings, 0);
            for cycle in 1..20 {
                assert_eq!(phase.duration(&settings, cycle), first, "{phase:?} changed in cycle {cycle}");
            }
        }
    }

    #[test]
    fn drift_shrinks_durations_down_to_floor() {
        let settings = Settings { drift: 0.8, ..settings() };
        for phase in BreathingPhase::iter() {
            let mut previous = phase.duration(&settings, 0);
            for cycle in 1..10 {
                let current = phase.duration(&settings, cycle);
                if phase.is_breath() && previous.as_secs_f64() <= MIN_BREATH_DURATION {
                    assert_eq!(current.as_secs_f64(), MIN_BREATH_DURATION);
                } else {
                    assert!(current < previous, "{phase:?} didn't shrink in cycle {cycle}");
                }
                previous = current;
            }
        }
        assert_eq!(BreathingPhase::Inhale.duration(&settings, 100).as_secs_f64(), MIN_BREATH_DURATION);
        assert_eq!(BreathingPhase::Exhale.duration(&settings, 100).as_secs_f64(), MIN_BREATH_DURATION);
        assert!(BreathingPhase::HoldAfterInhale.duration(&settings, 100).as_secs_f64() < MIN_BREATH_DURATION);
    }

    #[test]
    fn floor_applies_to_short_configured_breaths() {
        let settings = Settings { inhale_duration: 0.1, post_inhale_hold_duration: 0.1, ..settings() };
        assert_eq!(BreathingPhase::Inhale.duration(&settings, 0), Duration::from_millis(500));
        assert_eq!(BreathingPhase::HoldAfterInhale.duration(&settings, 0), Duration::from_secs_f64(0.1));
    }

    #[rstest]
    #[case::huge(1e300, 1.0, 0)]
    #[case::beyond_instant(1e19, 1.0, 0)]
    #[case::infinite(f64::INFINITY, 1.0, 0)]
    #[case::stretched_by_drift(60.0, 2.0, 5000)]
    fn extreme_durations_saturate(#[case] seconds: f64, #[case] drift: f64, #[case] cycle: u32) {
        let settings = Settings {
            inhale_duration: seconds,
            post_inhale_hold_duration: seconds,
            exhale_duration: seconds,
            post_exhale_hold_duration: seconds,
            drift,
            ..Default::default()
        };
        for phase in BreathingPhase::iter() {
            assert_eq!(phase.duration(&settings, cycle).as_secs_f64(), MAX_PHASE_DURATION, "{phase:?}");
        }
    }

    #[test]
    fn unusable_values_keep_the_floor() {
        let settings = Settings {
            inhale_duration: f64::NAN,
            post_inhale_hold_duration: -3.0,
            exhale_duration: -1e300,
            post_exhale_hold_duration: 0.0,
            drift: 2.0,
            ..Default::default()
        };
        assert_eq!(BreathingPhase::Inhale.duration(&settings, 0).as_secs_f64(), MIN_BREATH_DURATION);
        assert_eq!(BreathingPhase::Exhale.duration(&settings, 0).as_secs_f64(), MIN_BREATH_DURATION);
        assert_eq!(BreathingPhase::HoldAfterInhale.duration(&settings, 0), Duration::ZERO);
        // Zero times an overflowed drift factor stays a zero length hold.
        assert_eq!(BreathingPhase::HoldAfterExhale.duration(&settings, 5000), Duration::ZERO);
    }

    #[test]
    fn targets_and_sides() {
        assert_eq!(BreathingPhase::Inhale.target_progress(), 1.0);
        assert_eq!(BreathingPhase::HoldAfterInhale.target_progress(), 1.0);
        assert_eq!(BreathingPhase::Exhale.target_progress(), 0.0);
        assert_eq!(BreathingPhase::HoldAfterExhale.target_progress(), 0.0);
        assert!(BreathingPhase::HoldAfterInhale.is_inhale_side());
        assert!(!BreathingPhase::HoldAfterExhale.is_inhale_side());
    }
}
