#![forbid(unsafe_code)]

//! Panel state machine: the authoritative Collapsed/Expanded state and every
//! transition between them.
//!
//! [`PanelStateMachine`] wraps a single [`Transition`] engine. The discrete
//! state only changes when the engine lands at its end position; scrubbing
//! and reversals never touch it. Landing is handled by one fixed handler
//! that consumes the engine's [`TransitionOutcome`].
//!
//! # Invariants
//!
//! 1. At most one transition exists per panel, and `toggle()` only starts
//!    one while the engine is inactive.
//! 2. `current_state()` changes only on [`TransitionOutcome::CompletedAtTarget`].
//! 3. Contract violations are returned, logged at `warn`, and change nothing.

use std::fmt;
use std::time::Duration;

use crate::animation::{EngineState, ResumeTiming, Transition, TransitionOutcome};
use crate::config::SheetConfig;
use crate::error::{Result, SheetError};
use crate::geometry::{LatestVelocity, Motion, PanelGeometry, lerp};
use crate::observable::{Observable, StateWatch};

/// The two stable states of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PanelState {
    #[default]
    Collapsed,
    Expanded,
}

impl PanelState {
    /// The other state. Applying it twice is the identity.
    #[inline]
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Collapsed => Self::Expanded,
            Self::Expanded => Self::Collapsed,
        }
    }
}

impl fmt::Display for PanelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Collapsed => "collapsed",
            Self::Expanded => "expanded",
        })
    }
}

/// How a released drag decides between completing and reversing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum CompletionPolicy {
    /// Direction of the last non-zero velocity alone decides; the scrubbed
    /// fraction is ignored.
    #[default]
    VelocityOnly,
    /// Like `VelocityOnly`, except releases slower than `min_velocity`
    /// reverse when progress is below `threshold`.
    PositionFallback { min_velocity: f32, threshold: f32 },
}

impl CompletionPolicy {
    /// Whether a released drag should snap back to where it started.
    #[must_use]
    pub fn should_reverse(&self, state: PanelState, velocity: LatestVelocity, progress: f32) -> bool {
        if let Self::PositionFallback {
            min_velocity,
            threshold,
        } = *self
            && velocity.get().abs() < min_velocity
        {
            return progress < threshold;
        }
        matches!(
            (state, velocity.motion()),
            (PanelState::Expanded, Some(Motion::TowardCollapsed))
                | (PanelState::Collapsed, Some(Motion::TowardExpanded))
        )
    }
}

/// Result of a transition landing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Settled {
    pub outcome: TransitionOutcome,
    /// State after the landing was applied.
    pub state: PanelState,
}

/// Owns the discrete panel state and mediates all transitions.
pub struct PanelStateMachine {
    state: Observable<PanelState>,
    engine: Transition,
    geometry: PanelGeometry,
    completion: CompletionPolicy,
    /// Extents captured when the current transition began.
    from_extent: f32,
    to_extent: f32,
}

impl fmt::Debug for PanelStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelStateMachine")
            .field("state", &self.current_state())
            .field("engine", &self.engine.state())
            .field("progress", &self.engine.progress())
            .field("geometry", &self.geometry)
            .finish()
    }
}

impl PanelStateMachine {
    /// Create a collapsed panel.
    #[must_use]
    pub fn new(config: &SheetConfig, geometry: PanelGeometry) -> Self {
        let initial = geometry.extent_for(PanelState::Collapsed);
        Self {
            state: Observable::new(PanelState::Collapsed),
            engine: Transition::new(config.transition_duration(), config.easing),
            geometry,
            completion: config.completion,
            from_extent: initial,
            to_extent: initial,
        }
    }

    /// Start in `state` instead of collapsed.
    #[must_use]
    pub fn with_initial_state(self, state: PanelState) -> Self {
        self.state.set(state);
        self
    }

    #[inline]
    #[must_use]
    pub fn current_state(&self) -> PanelState {
        self.state.get()
    }

    /// Read-only handle for hosts that react to state changes.
    #[must_use]
    pub fn watch(&self) -> StateWatch<PanelState> {
        self.state.watch()
    }

    #[inline]
    #[must_use]
    pub fn engine(&self) -> &Transition {
        &self.engine
    }

    #[inline]
    #[must_use]
    pub fn engine_state(&self) -> EngineState {
        self.engine.state()
    }

    #[inline]
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.engine.progress()
    }

    /// Target of the active transition, if any.
    #[must_use]
    pub fn target(&self) -> Option<PanelState> {
        self.engine.is_active().then(|| self.engine.target())
    }

    #[inline]
    #[must_use]
    pub fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    /// Update the resting geometry. A transition in flight keeps the extents
    /// it started with.
    pub fn set_geometry(&mut self, geometry: PanelGeometry) {
        self.geometry = geometry;
    }

    #[inline]
    #[must_use]
    pub fn completion(&self) -> CompletionPolicy {
        self.completion
    }

    /// Apply new timing and completion settings to future transitions.
    pub fn reconfigure(&mut self, config: &SheetConfig) {
        self.engine
            .set_timing(config.transition_duration(), config.easing);
        self.completion = config.completion;
    }

    /// Extent the host should render right now.
    #[must_use]
    pub fn extent(&self) -> f32 {
        if self.engine.is_active() {
            lerp(self.from_extent, self.to_extent, self.engine.progress())
        } else {
            self.geometry.extent_for(self.current_state())
        }
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Begin a transition to the other state. Returns the target.
    pub fn toggle(&mut self) -> Result<PanelState> {
        if self.engine.is_active() {
            return reported(Err(SheetError::invalid("toggle", self.engine.state())));
        }
        let target = self.current_state().toggled();
        self.begin_transition(target)?;
        Ok(target)
    }

    /// Start a running transition from the current geometry to `target`.
    pub fn begin_transition(&mut self, target: PanelState) -> Result<()> {
        let origin = self.current_state();
        reported(self.engine.start(origin, target))?;
        self.from_extent = self.geometry.extent_for(origin);
        self.to_extent = self.geometry.extent_for(target);
        tracing::debug!(
            target: "snapsheet.panel",
            origin = %origin,
            target = %target,
            duration_ms = self.engine.duration().as_millis() as u64,
            "transition started"
        );
        Ok(())
    }

    /// Freeze the running transition for scrubbing. Returns the baseline.
    pub fn pause(&mut self) -> Result<f32> {
        let baseline = reported(self.engine.pause())?;
        tracing::debug!(target: "snapsheet.panel", baseline, "transition paused");
        Ok(baseline)
    }

    /// Set progress to `baseline + delta`, clamped to [0, 1].
    pub fn scrub(&mut self, delta: f32) -> Result<f32> {
        let progress = reported(self.engine.scrub(delta))?;
        tracing::trace!(target: "snapsheet.panel", delta, progress, "scrub");
        Ok(progress)
    }

    /// Resume the paused transition toward its target, or back to its origin
    /// when `reversed`.
    pub fn commit(&mut self, reversed: bool, timing: ResumeTiming) -> Result<()> {
        reported(self.engine.resume(reversed, timing))?;
        tracing::debug!(
            target: "snapsheet.panel",
            reversed,
            progress = self.engine.progress(),
            remaining_ms = self.engine.remaining().as_millis() as u64,
            "transition committed"
        );
        Ok(())
    }

    /// Completion decision for a drag released with `velocity`.
    #[must_use]
    pub fn should_reverse(&self, velocity: LatestVelocity) -> bool {
        self.completion
            .should_reverse(self.current_state(), velocity, self.engine.progress())
    }

    /// Advance time. Returns the landing when the transition finishes.
    pub fn tick(&mut self, dt: Duration) -> Option<Settled> {
        let outcome = self.engine.advance(dt)?;
        Some(self.on_landed(outcome))
    }

    fn on_landed(&mut self, outcome: TransitionOutcome) -> Settled {
        if outcome == TransitionOutcome::CompletedAtTarget {
            self.state.set(self.engine.target());
        }
        let state = self.current_state();
        tracing::info!(
            target: "snapsheet.panel",
            outcome = ?outcome,
            state = %state,
            "transition landed"
        );
        Settled { outcome, state }
    }
}

fn reported<T>(result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        tracing::warn!(target: "snapsheet.panel", error = %err, "engine contract violation");
    }
    result
}
