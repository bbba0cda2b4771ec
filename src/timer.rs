use std::collections::VecDeque;
use std::time::{Duration, Instant};

// ============================================================================
// Timer Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TimerKind {
    FocusShort,
    FocusLong,
    BreakShort,
    BreakLong,
}

impl TimerKind {
    pub const ALL: [TimerKind; 4] = [
        Self::FocusShort,
        Self::FocusLong,
        Self::BreakShort,
        Self::BreakLong,
    ];

    /// Completions of focus-type timers are logged; breaks are not.
    pub fn is_focus(self) -> bool {
        matches!(self, Self::FocusShort | Self::FocusLong)
    }

    /// Key used in the config file's timer table.
    pub fn label(self) -> &'static str {
        match self {
            Self::FocusShort => "Focus-Short",
            Self::FocusLong => "Focus-Long",
            Self::BreakShort => "Break-Short",
            Self::BreakLong => "Break-Long",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::FocusShort => "🎯 SHORT FOCUS",
            Self::FocusLong => "🎯 LONG FOCUS",
            Self::BreakShort => "☕ SHORT BREAK",
            Self::BreakLong => "🌴 LONG BREAK",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    Idle,
    Running,
    Paused,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TimerEvent {
    /// Periodic display refresh while running.
    Tick { remaining: Duration },
    /// Fired exactly once per run that reaches zero.
    Completed { kind: TimerKind, configured: Duration },
}

// ============================================================================
// Timer Engine
// ============================================================================

/// Countdown state machine: Idle -> Running <-> Paused, back to Idle on
/// stop or completion. All time-dependent transitions take `now` explicitly
/// so the engine never reads the clock itself.
pub struct TimerEngine {
    kind: TimerKind,
    configured: Duration,
    /// Frozen remaining time; authoritative while Idle or Paused.
    remaining: Duration,
    /// Wall deadline; Some exactly while Running.
    deadline: Option<Instant>,
    status: Status,
    events: VecDeque<TimerEvent>,
}

impl TimerEngine {
    pub fn new(kind: TimerKind, duration: Duration) -> Self {
        Self {
            kind,
            configured: duration,
            remaining: duration,
            deadline: None,
            status: Status::Idle,
            events: VecDeque::new(),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    pub fn configured(&self) -> Duration {
        self.configured
    }

    /// Reconfigure kind and duration. Only allowed while Idle; callers must
    /// stop a live countdown first. Returns false (and changes nothing)
    /// otherwise.
    pub fn configure(&mut self, kind: TimerKind, duration: Duration) -> bool {
        if self.status != Status::Idle {
            return false;
        }
        self.kind = kind;
        self.configured = duration;
        self.remaining = duration;
        true
    }

    /// Begin counting down from Idle, or continue from Paused with the
    /// exact remaining time captured at pause. No-op while Running.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.status == Status::Running {
            return false;
        }
        self.deadline = Some(now + self.remaining);
        self.status = Status::Running;
        true
    }

    /// Freeze the countdown, capturing remaining time exact to the instant.
    /// No-op unless Running.
    pub fn pause(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.deadline else {
            return false;
        };
        self.remaining = deadline.saturating_duration_since(now);
        self.deadline = None;
        self.status = Status::Paused;
        true
    }

    /// Abandon the current run: remaining resets to the configured duration
    /// and no completion fires. No-op while Idle.
    pub fn stop(&mut self) -> bool {
        if self.status == Status::Idle {
            return false;
        }
        self.reset();
        true
    }

    /// Periodic update. Emits a Tick event while Running, or a single
    /// Completed event when the deadline has passed, after which the engine
    /// is Idle again with remaining back at the configured duration.
    pub fn tick(&mut self, now: Instant) {
        let Some(deadline) = self.deadline else {
            return;
        };
        if now >= deadline {
            self.events.push_back(TimerEvent::Completed {
                kind: self.kind,
                configured: self.configured,
            });
            self.reset();
        } else {
            self.events.push_back(TimerEvent::Tick {
                remaining: deadline - now,
            });
        }
    }

    /// Drain pending events in the order they fired.
    pub fn poll_event(&mut self) -> Option<TimerEvent> {
        self.events.pop_front()
    }

    /// Time left on the countdown at `now`.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.deadline {
            Some(deadline) => deadline.saturating_duration_since(now),
            None => self.remaining,
        }
    }

    /// Remaining time floored to whole (minutes, seconds) for display.
    pub fn display(&self, now: Instant) -> (u64, u64) {
        let secs = self.remaining(now).as_secs();
        (secs / 60, secs % 60)
    }

    /// Fraction of the run elapsed, for the progress gauge.
    pub fn progress(&self, now: Instant) -> f64 {
        let total = self.configured.as_secs_f64();
        if total == 0.0 {
            return 0.0;
        }
        let remaining = self.remaining(now).as_secs_f64();
        (1.0 - remaining / total).clamp(0.0, 1.0)
    }

    fn reset(&mut self) {
        self.remaining = self.configured;
        self.deadline = None;
        self.status = Status::Idle;
    }
}

// ============================================================================
// Tests
// ============================================================================
