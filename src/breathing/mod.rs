mod easing;
mod phase;
mod timer;

pub(crate) use phase::BreathingPhase;
pub(crate) use timer::{PhaseTimer, PollableState, ScheduleHandle};
