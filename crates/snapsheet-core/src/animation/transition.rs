#![forbid(unsafe_code)]

//! Transition: a pausable, scrubbable, reversible timed animation.
//!
//! A [`Transition`] moves a progress value between 0.0 (the origin state)
//! and 1.0 (the target state). Time drives it while `Running`; a gesture
//! drives it while `Paused`. Resuming runs the remaining distance to either
//! end and reports a [`TransitionOutcome`] when it lands.
//!
//! # States
//!
//! ```text
//!            start()            pause()
//! Inactive ----------> Running ---------> Paused
//!     ^                 |   ^                |
//!     |   lands at 0/1  |   |    resume()    |
//!     +-----------------+   +----------------+
//! ```
//!
//! # Invariants
//!
//! 1. `progress()` is always within [0.0, 1.0].
//! 2. Landing sets progress to exactly 0.0 or 1.0 and returns to `Inactive`.
//! 3. `scrub()` is relative to the progress captured by the last `pause()`.
//! 4. Out-of-order calls return [`SheetError::InvalidState`] and leave the
//!    engine untouched.
//!
//! # Failure Modes
//!
//! - Zero duration: the segment lands on the next `advance()`, even with a
//!   zero `dt`.
//! - Non-finite scrub delta: treated as zero.

use std::fmt;
use std::time::Duration;

use super::Easing;
use crate::error::{Result, SheetError};
use crate::geometry::finite_or_zero;
use crate::panel::PanelState;

/// Lifecycle of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EngineState {
    Inactive,
    Running,
    Paused,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inactive => "inactive",
            Self::Running => "running",
            Self::Paused => "paused",
        })
    }
}

/// Where a transition landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TransitionOutcome {
    /// Finished at the end position; the target state is now current.
    CompletedAtTarget,
    /// Finished back at the start position; the origin state stays current.
    AbortedToStart,
}

/// Duration policy when resuming from a paused scrub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResumeTiming {
    /// Full duration scaled by the distance left to cover.
    #[default]
    Residual,
    /// The full configured duration regardless of distance.
    Full,
}

/// One time-driven leg of a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    from: f32,
    to: f32,
    duration: Duration,
    elapsed: Duration,
}

impl Segment {
    fn linear_t(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let t = self.elapsed.as_nanos() as f64 / self.duration.as_nanos() as f64;
        (t as f32).clamp(0.0, 1.0)
    }
}

/// Scale a duration by a unit factor with nanosecond rounding.
fn scale(duration: Duration, factor: f32) -> Duration {
    let nanos = duration.as_nanos() as f64 * f64::from(factor.clamp(0.0, 1.0));
    Duration::from_nanos(nanos.round() as u64)
}

/// The animation engine behind a panel transition.
#[derive(Debug, Clone)]
pub struct Transition {
    duration: Duration,
    easing: Easing,
    state: EngineState,
    origin: PanelState,
    target: PanelState,
    progress: f32,
    baseline: f32,
    reversed: bool,
    segment: Option<Segment>,
}

impl Transition {
    /// Create an inactive engine.
    #[must_use]
    pub fn new(duration: Duration, easing: Easing) -> Self {
        Self {
            duration,
            easing,
            state: EngineState::Inactive,
            origin: PanelState::Collapsed,
            target: PanelState::Collapsed,
            progress: 0.0,
            baseline: 0.0,
            reversed: false,
            segment: None,
        }
    }

    /// Begin a fresh transition from `origin` toward `target`, running.
    pub fn start(&mut self, origin: PanelState, target: PanelState) -> Result<()> {
        if self.state != EngineState::Inactive {
            return Err(SheetError::invalid("begin_transition", self.state));
        }
        self.origin = origin;
        self.target = target;
        self.progress = 0.0;
        self.baseline = 0.0;
        self.reversed = false;
        self.segment = Some(Segment {
            from: 0.0,
            to: 1.0,
            duration: self.duration,
            elapsed: Duration::ZERO,
        });
        self.state = EngineState::Running;
        Ok(())
    }

    /// Freeze a running transition. Returns the captured baseline.
    pub fn pause(&mut self) -> Result<f32> {
        if self.state != EngineState::Running {
            return Err(SheetError::invalid("pause", self.state));
        }
        self.segment = None;
        self.baseline = self.progress;
        self.state = EngineState::Paused;
        Ok(self.baseline)
    }

    /// Set progress to `baseline + delta`, clamped to [0, 1].
    pub fn scrub(&mut self, delta: f32) -> Result<f32> {
        if self.state != EngineState::Paused {
            return Err(SheetError::invalid("scrub", self.state));
        }
        self.progress = (self.baseline + finite_or_zero(delta)).clamp(0.0, 1.0);
        Ok(self.progress)
    }

    /// Resume a paused transition toward the target, or back to the origin
    /// when `reversed`.
    pub fn resume(&mut self, reversed: bool, timing: ResumeTiming) -> Result<()> {
        if self.state != EngineState::Paused {
            return Err(SheetError::invalid("commit", self.state));
        }
        let to = if reversed { 0.0 } else { 1.0 };
        let duration = match timing {
            ResumeTiming::Residual => scale(self.duration, (to - self.progress).abs()),
            ResumeTiming::Full => self.duration,
        };
        self.reversed = reversed;
        self.segment = Some(Segment {
            from: self.progress,
            to,
            duration,
            elapsed: Duration::ZERO,
        });
        self.state = EngineState::Running;
        Ok(())
    }

    /// Advance a running transition by `dt`.
    ///
    /// Returns the outcome on the tick the transition lands; `None` while in
    /// flight, paused, or inactive.
    pub fn advance(&mut self, dt: Duration) -> Option<TransitionOutcome> {
        if self.state != EngineState::Running {
            return None;
        }
        let segment = self.segment.as_mut()?;
        segment.elapsed = segment.elapsed.saturating_add(dt);
        let t = segment.linear_t();
        let eased = self.easing.apply(t);
        self.progress = (segment.from + (segment.to - segment.from) * eased).clamp(0.0, 1.0);

        if t < 1.0 {
            return None;
        }

        let landed_at_end = segment.to >= 1.0;
        self.progress = if landed_at_end { 1.0 } else { 0.0 };
        self.segment = None;
        self.state = EngineState::Inactive;
        Some(if landed_at_end {
            TransitionOutcome::CompletedAtTarget
        } else {
            TransitionOutcome::AbortedToStart
        })
    }

    /// Time left in the current running segment.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        match (self.state, self.segment) {
            (EngineState::Running, Some(seg)) => seg.duration.saturating_sub(seg.elapsed),
            _ => Duration::ZERO,
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// True while running or paused.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state != EngineState::Inactive
    }

    #[inline]
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    #[inline]
    #[must_use]
    pub fn baseline(&self) -> f32 {
        self.baseline
    }

    #[inline]
    #[must_use]
    pub fn origin(&self) -> PanelState {
        self.origin
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> PanelState {
        self.target
    }

    /// Whether the last resume headed back to the origin.
    #[inline]
    #[must_use]
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Change timing for subsequent transitions. Does not affect one in flight.
    pub fn set_timing(&mut self, duration: Duration, easing: Easing) {
        self.duration = duration;
        self.easing = easing;
    }
}
