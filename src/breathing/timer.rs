use super::phase::BreathingPhase;
use crate::config::{AnimationMode, Settings};
use std::mem;
use std::time::{Duration, Instant};

/// The outcome of polling the timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PollableState {
    /// Nothing changed since the last poll.
    Unmodified,

    /// Progress moved but the phase didn't change.
    Modified,

    /// At least one phase transition happened.
    Transitioned,
}

/// Identifies one run of the breathing cycle, as returned by [PhaseTimer::start].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ScheduleHandle(u64);

/// Emitted every time a phase is entered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PhaseEntry {
    pub(crate) phase: BreathingPhase,
    pub(crate) cycle: u32,
    pub(crate) target_progress: f64,
    pub(crate) duration: Duration,
}

#[derive(Debug)]
struct Segment {
    entry: PhaseEntry,
    from: f64,
    started: Instant,
    mode: AnimationMode,
}

#[derive(Clone, Copy, Debug)]
struct ScheduledTransition {
    generation: u64,
    deadline: Instant,
}

/// Drives the breathing cycle from the host's event loop.
///
/// At most one transition is scheduled at any point. Durations, the animation curve and
/// drift are read from the settings passed in when a phase is entered, so edits only take
/// effect on the next phase.
#[derive(Debug, Default)]
pub(crate) struct PhaseTimer {
    generation: u64,
    cycle: u32,
    segment: Option<Segment>,
    scheduled: Option<ScheduledTransition>,
    entries: Vec<PhaseEntry>,
}

impl PhaseTimer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// (Re)start the cycle at `now`, dropping whatever transition was pending.
    pub(crate) fn start(&mut self, now: Instant, settings: &Settings) -> ScheduleHandle {
        if self.scheduled.take().is_some() {
            log::debug!("restarting cycle, cancelled pending transition of run {}", self.generation);
        }
        self.generation += 1;
        self.cycle = 0;
        self.segment = None;
        self.enter(BreathingPhase::Inhale, 0.0, now, settings);
        ScheduleHandle(self.generation)
    }

    /// Cancel the pending transition of the run `handle` refers to.
    ///
    /// Returns false if that run has already been superseded or cancelled. The active segment
    /// keeps animating towards its target, but no further phase is entered.
    pub(crate) fn cancel(&mut self, handle: ScheduleHandle) -> bool {
        match self.scheduled {
            Some(scheduled) if scheduled.generation == handle.0 => {
                self.scheduled = None;
                true
            }
            _ => false,
        }
    }

    /// Fire every transition whose deadline is at or before `now`.
    pub(crate) fn poll(&mut self, now: Instant, settings: &Settings) -> PollableState {
        let mut transitioned = false;
        while let Some(scheduled) = self.due_transition(now) {
            let Some(segment) = &self.segment else {
                break;
            };
            let finished = segment.entry.phase;
            if finished == BreathingPhase::HoldAfterExhale {
                self.cycle = self.cycle.saturating_add(1);
            }
            // Chain off the deadline rather than `now` so a late poll doesn't stretch the cycle.
            self.enter(finished.next(), finished.target_progress(), scheduled.deadline, settings);
            transitioned = true;
        }
        if transitioned {
            PollableState::Transitioned
        } else if self.is_animating(now) {
            PollableState::Modified
        } else {
            PollableState::Unmodified
        }
    }

    /// Animation progress at `now`, always within `[0, 1]`.
    pub(crate) fn progress(&self, now: Instant) -> f64 {
        let Some(segment) = &self.segment else {
            return 0.0;
        };
        let duration = segment.entry.duration;
        let fraction = if duration.is_zero() {
            1.0
        } else {
            now.saturating_duration_since(segment.started).as_secs_f64() / duration.as_secs_f64()
        };
        let eased = segment.mode.curve(fraction);
        let progress = segment.from + (segment.entry.target_progress - segment.from) * eased;
        progress.clamp(0.0, 1.0)
    }

    pub(crate) fn phase(&self) -> BreathingPhase {
        self.segment.as_ref().map(|s| s.entry.phase).unwrap_or(BreathingPhase::Inhale)
    }

    /// The number of full cycles completed since the last start.
    pub(crate) fn cycle_count(&self) -> u32 {
        self.cycle
    }

    /// Time left until the next transition, if one is scheduled.
    pub(crate) fn remaining(&self, now: Instant) -> Option<Duration> {
        self.scheduled.map(|s| s.deadline.saturating_duration_since(now))
    }

    /// Take the phase entries emitted since the last call.
    pub(crate) fn take_entries(&mut self) -> Vec<PhaseEntry> {
        mem::take(&mut self.entries)
    }

    fn due_transition(&self, now: Instant) -> Option<ScheduledTransition> {
        self.scheduled.filter(|s| s.generation == self.generation && s.deadline <= now)
    }

    fn is_animating(&self, now: Instant) -> bool {
        match (&self.segment, self.scheduled) {
            (Some(segment), Some(scheduled)) => segment.from != segment.entry.target_progress && now < scheduled.deadline,
            _ => false,
        }
    }

    fn enter(&mut self, phase: BreathingPhase, from: f64, at: Instant, settings: &Settings) {
        let duration = phase.duration(settings, self.cycle);
        let entry = PhaseEntry { phase, cycle: self.cycle, target_progress: phase.target_progress(), duration };
        self.segment = Some(Segment { entry, from, started: at, mode: settings.animation_mode });
        self.scheduled = match at.checked_add(duration) {
            Some(deadline) => Some(ScheduledTransition { generation: self.generation, deadline }),
            None => {
                log::warn!("{phase:?} deadline doesn't fit in an instant, stopping the cycle");
                None
            }
        };
        self.entries.push(entry);
    }
}
