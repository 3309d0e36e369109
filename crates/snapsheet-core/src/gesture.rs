#![forbid(unsafe_code)]

//! Gesture arbitration: turns raw drag samples into panel transitions.
//!
//! [`GestureArbiter`] receives drag events from two surfaces, the panel body
//! and the nested scrollable content, and drives a [`PanelStateMachine`].
//! Each drag is tracked by a [`DragSession`] created when it begins and
//! dropped when it ends, so velocity and translation offsets never leak from
//! one gesture into the next.
//!
//! # Ownership
//!
//! The nested surface's drag runs alongside its native scroll gesture. On
//! every sample the arbiter decides who consumes the touch:
//!
//! - **Collapsed**: the panel. The nested offset is pinned to zero so the
//!   inner list never scrolls while the panel is collapsed.
//! - **Expanded, offset > 0**: the nested content. Ordinary inner scrolling;
//!   the panel transition is left alone.
//! - **Expanded, offset ≤ 0**: the panel. The list is at its top and the
//!   user keeps pulling down, so the pull collapses the panel.
//!
//! # Invariants
//!
//! 1. Only the session that paused the engine scrubs it or commits it.
//! 2. A session that owns the transition always commits it when its gesture
//!    ends, even if the nested content reclaimed the final samples.
//! 3. Ownership is re-evaluated on every sample, never cached.
//! 4. `toggle()` is only issued while the engine is inactive.
//!
//! # Failure Modes
//!
//! - Missing `Began`: the first `Changed` opens the session.
//! - Missing `Ended` on the panel: the next `Began` releases the old
//!   session before opening a new one.
//! - A nested source without concurrent recognition is ignored; handing off
//!   would otherwise fight the native scroll gesture over one touch stream.

use crate::animation::{EngineState, ResumeTiming};
use crate::event::{DragEvent, GesturePhase, Surface};
use crate::geometry::LatestVelocity;
use crate::host::NestedScrollSurface;
use crate::panel::{PanelState, PanelStateMachine};

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Per-gesture state threaded through `Changed` and `Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragSession {
    /// Progress captured when this session paused the engine.
    baseline: Option<f32>,
    /// Translation at the moment this session took the transition; later
    /// samples are measured from here.
    translation_correction: f32,
    velocity: LatestVelocity,
}

impl DragSession {
    /// Whether this session paused the engine and now drives it.
    #[inline]
    #[must_use]
    pub fn owns_transition(&self) -> bool {
        self.baseline.is_some()
    }

    #[inline]
    #[must_use]
    pub fn baseline(&self) -> Option<f32> {
        self.baseline
    }

    #[inline]
    #[must_use]
    pub fn translation_correction(&self) -> f32 {
        self.translation_correction
    }

    #[inline]
    #[must_use]
    pub fn latest_velocity(&self) -> LatestVelocity {
        self.velocity
    }

    /// Take control of the transition: start one if none is active, then
    /// pause it. Fails if another session already holds it paused.
    fn claim(&mut self, machine: &mut PanelStateMachine, translation_y: f32) -> bool {
        match machine.engine_state() {
            EngineState::Inactive => {
                if machine.toggle().is_err() {
                    return false;
                }
            }
            // A committed transition still in flight: catch it.
            EngineState::Running => {}
            EngineState::Paused => return false,
        }
        match machine.pause() {
            Ok(baseline) => {
                self.baseline = Some(baseline);
                self.translation_correction = translation_y;
                true
            }
            Err(_) => false,
        }
    }

    /// Scrub the owned transition to the gesture's current translation.
    fn drive(&self, machine: &mut PanelStateMachine, translation_y: f32) {
        let fraction = machine
            .geometry()
            .fraction_for(translation_y - self.translation_correction, machine.current_state());
        let _ = machine.scrub(fraction);
    }

    /// Release the transition with the velocity heuristic.
    fn finish(self, surface: Surface, machine: &mut PanelStateMachine) {
        if !self.owns_transition() || machine.engine_state() != EngineState::Paused {
            return;
        }
        let reversed = machine.should_reverse(self.velocity);
        tracing::debug!(
            target: "snapsheet.gesture",
            surface = ?surface,
            velocity = self.velocity.get(),
            progress = machine.progress(),
            reversed,
            "drag released"
        );
        let _ = machine.commit(reversed, ResumeTiming::Residual);
    }
}

/// Who consumes the current nested-surface touch sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Owner {
    /// The panel transition.
    Panel,
    /// The nested content's own scrolling.
    #[default]
    NestedContent,
}

/// Per-nested-gesture state: the drag session plus current ownership.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollOwnershipContext {
    session: DragSession,
    owner: Owner,
}

impl ScrollOwnershipContext {
    #[inline]
    #[must_use]
    pub fn owner(&self) -> Owner {
        self.owner
    }

    #[inline]
    #[must_use]
    pub fn session(&self) -> &DragSession {
        &self.session
    }

    /// Translation offset compensating for a nested gesture that was already
    /// underway when the panel took over.
    #[inline]
    #[must_use]
    pub fn first_translation_y(&self) -> f32 {
        self.session.translation_correction
    }

    fn set_owner(&mut self, owner: Owner) {
        if self.owner != owner {
            tracing::debug!(
                target: "snapsheet.gesture",
                from = ?self.owner,
                to = ?owner,
                "nested ownership changed"
            );
            self.owner = owner;
        }
    }
}

// ---------------------------------------------------------------------------
// GestureArbiter
// ---------------------------------------------------------------------------

/// Routes tap and drag events from both surfaces into a [`PanelStateMachine`].
#[derive(Debug, Default)]
pub struct GestureArbiter {
    panel: Option<DragSession>,
    nested: Option<ScrollOwnershipContext>,
}

impl GestureArbiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session of the panel drag in progress.
    #[must_use]
    pub fn panel_session(&self) -> Option<&DragSession> {
        self.panel.as_ref()
    }

    /// Context of the nested drag in progress.
    #[must_use]
    pub fn nested_context(&self) -> Option<&ScrollOwnershipContext> {
        self.nested.as_ref()
    }

    /// Tap on the panel. Returns `true` if a transition started.
    pub fn on_tap(&mut self, machine: &mut PanelStateMachine) -> bool {
        if machine.engine().is_active() {
            tracing::debug!(
                target: "snapsheet.gesture",
                engine = %machine.engine_state(),
                "tap ignored while a transition is active"
            );
            return false;
        }
        machine.toggle().is_ok()
    }

    /// Drag on the panel body.
    pub fn on_panel_drag(&mut self, machine: &mut PanelStateMachine, event: DragEvent) {
        let event = event.sanitized();
        match event.phase {
            GesturePhase::Began => {
                // A missed `Ended` must not strand the previous session's pause.
                if let Some(stale) = self.panel.take() {
                    stale.finish(Surface::Panel, machine);
                }
                let mut session = DragSession::default();
                session.claim(machine, event.translation.y);
                self.panel = Some(session);
            }
            GesturePhase::Changed => {
                let session = self.panel.get_or_insert_with(DragSession::default);
                if !session.owns_transition() {
                    session.claim(machine, event.translation.y);
                }
                if session.owns_transition() {
                    session.drive(machine, event.translation.y);
                }
                session.velocity.observe(event.velocity.y);
            }
            GesturePhase::Ended | GesturePhase::Cancelled => {
                if let Some(mut session) = self.panel.take() {
                    session.velocity.observe(event.velocity.y);
                    session.finish(Surface::Panel, machine);
                }
            }
        }
    }

    /// Drag on the nested scrollable content. Returns who consumed the
    /// sample.
    pub fn on_nested_drag<N>(
        &mut self,
        machine: &mut PanelStateMachine,
        nested: &mut N,
        event: DragEvent,
    ) -> Owner
    where
        N: NestedScrollSurface + ?Sized,
    {
        if !nested.capabilities().concurrent {
            tracing::debug!(
                target: "snapsheet.gesture",
                "nested source lacks concurrent recognition; leaving touches to the content"
            );
            return Owner::NestedContent;
        }

        let event = event.sanitized();
        let state = machine.current_state();

        if event.phase.is_terminal() {
            if state == PanelState::Collapsed {
                nested.set_scroll_offset_y(0.0);
            }
            nested.set_scroll_indicator_visible(true);
            return match self.nested.take() {
                Some(mut ctx) => {
                    if ctx.owner == Owner::Panel {
                        ctx.session.velocity.observe(event.velocity.y);
                    }
                    ctx.session.finish(Surface::Nested, machine);
                    ctx.owner
                }
                None => Owner::NestedContent,
            };
        }

        let ctx = self
            .nested
            .get_or_insert_with(ScrollOwnershipContext::default);

        if state == PanelState::Collapsed {
            nested.set_scroll_offset_y(0.0);
        } else if nested.scroll_offset_y() > 0.0 {
            nested.set_scroll_indicator_visible(true);
            ctx.set_owner(Owner::NestedContent);
            return Owner::NestedContent;
        }

        nested.set_scroll_indicator_visible(false);
        ctx.set_owner(Owner::Panel);

        if event.phase == GesturePhase::Changed {
            if !ctx.session.owns_transition() {
                ctx.session.claim(machine, event.translation.y);
            }
            if ctx.session.owns_transition() {
                ctx.session.drive(machine, event.translation.y);
            }
            ctx.session.velocity.observe(event.velocity.y);
        }
        Owner::Panel
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Easing, TransitionOutcome};
    use crate::config::SheetConfig;
    use crate::event::SurfaceCapabilities;
    use crate::geometry::PanelGeometry;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct FakeList {
        offset: f32,
        indicator: bool,
        exclusive: bool,
    }

    impl NestedScrollSurface for FakeList {
        fn scroll_offset_y(&self) -> f32 {
            self.offset
        }
        fn set_scroll_offset_y(&mut self, value: f32) {
            self.offset = value;
        }
        fn set_scroll_indicator_visible(&mut self, visible: bool) {
            self.indicator = visible;
        }
        fn capabilities(&self) -> SurfaceCapabilities {
            if self.exclusive {
                SurfaceCapabilities::EXCLUSIVE
            } else {
                SurfaceCapabilities::CONCURRENT
            }
        }
    }

    fn machine() -> PanelStateMachine {
        let config = SheetConfig::default().with_easing(Easing::Linear);
        PanelStateMachine::new(&config, PanelGeometry::new(800.0, 200.0))
    }

    fn expanded() -> PanelStateMachine {
        machine().with_initial_state(PanelState::Expanded)
    }

    fn settle(m: &mut PanelStateMachine) -> Option<TransitionOutcome> {
        (0..100).find_map(|_| m.tick(Duration::from_millis(16)).map(|s| s.outcome))
    }

    // --- Tap ---

    #[test]
    fn tap_toggles_when_idle() {
        let mut m = machine();
        let mut arbiter = GestureArbiter::new();
        assert!(arbiter.on_tap(&mut m));
        assert_eq!(m.engine_state(), EngineState::Running);
        assert!(!arbiter.on_tap(&mut m), "second tap while running is ignored");
        assert_eq!(m.target(), Some(PanelState::Expanded));
    }

    // --- Panel surface ---

    #[test]
    fn panel_began_toggles_and_pauses() {
        let mut m = machine();
        let mut arbiter = GestureArbiter::new();
        arbiter.on_panel_drag(&mut m, DragEvent::began());
        assert_eq!(m.engine_state(), EngineState::Paused);
        assert_eq!(m.target(), Some(PanelState::Expanded));
        assert_eq!(arbiter.panel_session().unwrap().baseline(), Some(0.0));
    }

    #[test]
    fn panel_drag_up_scrubs_toward_expanded() {
        let mut m = machine();
        let mut arbiter = GestureArbiter::new();
        arbiter.on_panel_drag(&mut m, DragEvent::began());
        arbiter.on_panel_drag(&mut m, DragEvent::changed(-300.0, -2.0));
        assert!((m.progress() - 0.5).abs() < 1e-4);
        assert!((m.extent() - 500.0).abs() < 1e-2);
        assert_eq!(m.current_state(), PanelState::Collapsed);
    }

    #[test]
    fn panel_drag_down_from_expanded_scrubs_forward() {
        let mut m = expanded();
        let mut arbiter = GestureArbiter::new();
        arbiter.on_panel_drag(&mut m, DragEvent::began());
        arbiter.on_panel_drag(&mut m, DragEvent::changed(150.0, 1.0));
        assert!((m.progress() - 0.25).abs() < 1e-4);
        assert_eq!(m.target(), Some(PanelState::Collapsed));
    }

    #[test]
    fn panel_release_without_reversal_completes() {
        let mut m = machine();
        let mut arbiter = GestureArbiter::new();
        arbiter.on_panel_drag(&mut m, DragEvent::began());
        arbiter.on_panel_drag(&mut m, DragEvent::changed(-120.0, 4.0));
        arbiter.on_panel_drag(&mut m, DragEvent::ended(-120.0, 0.0));
        assert!(arbiter.panel_session().is_none());
        assert_eq!(m.engine_state(), EngineState::Running);
        assert_eq!(settle(&mut m), Some(TransitionOutcome::CompletedAtTarget));
        assert_eq!(m.current_state(), PanelState::Expanded);
    }

    #[test]
    fn panel_release_expanded_moving_down_reverses() {
        let mut m = expanded();
        let mut arbiter = GestureArbiter::new();
        arbiter.on_panel_drag(&mut m, DragEvent::began());
        arbiter.on_panel_drag(&mut m, DragEvent::changed(200.0, 5.0));
        arbiter.on_panel_drag(&mut m, DragEvent::ended(200.0, 0.0));
        assert!(m.engine().is_reversed());
        assert_eq!(settle(&mut m), Some(TransitionOutcome::AbortedToStart));
        assert_eq!(m.current_state(), PanelState::Expanded);
    }

    #[test]
    fn panel_release_collapsed_moving_up_reverses() {
        let mut m = machine();
        let mut arbiter = GestureArbiter::new();
        arbiter.on_panel_drag(&mut m, DragEvent::began());
        arbiter.on_panel_drag(&mut m, DragEvent::changed(-500.0, -5.0));
        arbiter.on_panel_drag(&mut m, DragEvent::ended(-500.0, 0.0));
        assert_eq!(settle(&mut m), Some(TransitionOutcome::AbortedToStart));
        assert_eq!(m.current_state(), PanelState::Collapsed);
    }

    #[test]
    fn velocity_does_not_leak_into_next_gesture() {
        let mut m = machine();
        let mut arbiter = GestureArbiter::new();
        arbiter.on_panel_drag(&mut m, DragEvent::began());
        arbiter.on_panel_drag(&mut m, DragEvent::changed(-50.0, -9.0));
        arbiter.on_panel_drag(&mut m, DragEvent::ended(-50.0, 0.0));
        settle(&mut m);

        arbiter.on_panel_drag(&mut m, DragEvent::began());
        let session = arbiter.panel_session().unwrap();
        assert_eq!(session.latest_velocity(), LatestVelocity::default());
    }

    #[test]
    fn panel_grab_catches_running_transition() {
        let mut m = machine();
        let mut arbiter = GestureArbiter::new();
        assert!(arbiter.on_tap(&mut m));
        m.tick(Duration::from_millis(150));
        arbiter.on_panel_drag(&mut m, DragEvent::began());
        assert_eq!(m.engine_state(), EngineState::Paused);
        assert_eq!(m.target(), Some(PanelState::Expanded));
        let baseline = arbiter.panel_session().unwrap().baseline().unwrap();
        assert!((baseline - 0.5).abs() < 1e-4);
    }

    #[test]
    fn changed_without_began_opens_session() {
        let mut m = machine();
        let mut arbiter = GestureArbiter::new();
        arbiter.on_panel_drag(&mut m, DragEvent::changed(-30.0, -1.0));
        assert_eq!(m.engine_state(), EngineState::Paused);
        let session = arbiter.panel_session().unwrap();
        assert_eq!(session.translation_correction(), -30.0);
        assert_eq!(m.progress(), 0.0);
    }

    // --- Nested surface ---

    #[test]
    fn collapsed_pins_nested_offset_to_zero() {
        let mut m = machine();
        let mut arbiter = GestureArbiter::new();
        let mut list = FakeList {
            offset: 120.0,
            ..FakeList::default()
        };
        for event in [
            DragEvent::began(),
            DragEvent::changed(-10.0, -1.0),
            DragEvent::ended(-10.0, 0.0),
        ] {
            list.offset = 42.0;
            arbiter.on_nested_drag(&mut m, &mut list, event);
            assert_eq!(list.offset, 0.0);
        }
    }

    #[test]
    fn expanded_with_scrolled_list_leaves_panel_alone() {
        let mut m = expanded();
        let mut arbiter = GestureArbiter::new();
        let mut list = FakeList {
            offset: 80.0,
            ..FakeList::default()
        };
        let owner = arbiter.on_nested_drag(&mut m, &mut list, DragEvent::changed(30.0, 2.0));
        assert_eq!(owner, Owner::NestedContent);
        assert!(list.indicator);
        assert_eq!(list.offset, 80.0);
        assert_eq!(m.engine_state(), EngineState::Inactive);
    }

    #[test]
    fn expanded_at_top_hands_off_to_panel() {
        let mut m = expanded();
        let mut arbiter = GestureArbiter::new();
        let mut list = FakeList {
            indicator: true,
            ..FakeList::default()
        };
        arbiter.on_nested_drag(&mut m, &mut list, DragEvent::began());
        let owner = arbiter.on_nested_drag(&mut m, &mut list, DragEvent::changed(40.0, 3.0));
        assert_eq!(owner, Owner::Panel);
        assert_eq!(m.engine_state(), EngineState::Paused);
        assert_eq!(m.target(), Some(PanelState::Collapsed));
        assert!(!list.indicator);
        let ctx = arbiter.nested_context().unwrap();
        assert_eq!(ctx.first_translation_y(), 40.0);
        assert_eq!(m.progress(), 0.0, "handoff sample itself does not move the panel");
    }

    #[test]
    fn nested_translation_is_measured_from_handoff() {
        let mut m = expanded();
        let mut arbiter = GestureArbiter::new();
        let mut list = FakeList {
            offset: 50.0,
            ..FakeList::default()
        };
        // Inner scrolling first.
        arbiter.on_nested_drag(&mut m, &mut list, DragEvent::began());
        arbiter.on_nested_drag(&mut m, &mut list, DragEvent::changed(50.0, 4.0));
        assert_eq!(m.engine_state(), EngineState::Inactive);
        // The list reaches its top; the pull continues.
        list.offset = 0.0;
        arbiter.on_nested_drag(&mut m, &mut list, DragEvent::changed(100.0, 4.0));
        arbiter.on_nested_drag(&mut m, &mut list, DragEvent::changed(250.0, 4.0));
        assert!((m.progress() - 0.25).abs() < 1e-4, "got {}", m.progress());
    }

    #[test]
    fn nested_release_restores_indicator_and_commits() {
        let mut m = expanded();
        let mut arbiter = GestureArbiter::new();
        let mut list = FakeList::default();
        arbiter.on_nested_drag(&mut m, &mut list, DragEvent::began());
        arbiter.on_nested_drag(&mut m, &mut list, DragEvent::changed(10.0, -2.0));
        arbiter.on_nested_drag(&mut m, &mut list, DragEvent::changed(400.0, -2.0));
        arbiter.on_nested_drag(&mut m, &mut list, DragEvent::ended(400.0, 0.0));
        assert!(list.indicator);
        assert!(arbiter.nested_context().is_none());
        assert_eq!(m.engine_state(), EngineState::Running);
        assert_eq!(settle(&mut m), Some(TransitionOutcome::CompletedAtTarget));
        assert_eq!(m.current_state(), PanelState::Collapsed);
    }

    #[test]
    fn owned_transition_commits_even_if_list_reclaims_last_sample() {
        let mut m = expanded();
        let mut arbiter = GestureArbiter::new();
        let mut list = FakeList::default();
        arbiter.on_nested_drag(&mut m, &mut list, DragEvent::changed(20.0, 2.0));
        assert_eq!(m.engine_state(), EngineState::Paused);
        list.offset = 15.0;
        arbiter.on_nested_drag(&mut m, &mut list, DragEvent::changed(-10.0, -2.0));
        arbiter.on_nested_drag(&mut m, &mut list, DragEvent::ended(-10.0, 0.0));
        assert_ne!(m.engine_state(), EngineState::Paused);
        settle(&mut m);
        assert_eq!(m.engine_state(), EngineState::Inactive);
    }

    #[test]
    fn surfaces_do_not_fight_over_one_transition() {
        let mut m = machine();
        let mut arbiter = GestureArbiter::new();
        let mut list = FakeList::default();
        arbiter.on_panel_drag(&mut m, DragEvent::began());
        arbiter.on_panel_drag(&mut m, DragEvent::changed(-60.0, -1.0));
        let before = m.progress();
        arbiter.on_nested_drag(&mut m, &mut list, DragEvent::changed(-400.0, -1.0));
        assert_eq!(m.progress(), before, "nested session must not scrub a panel-owned transition");
        assert!(!arbiter.nested_context().unwrap().session().owns_transition());
    }

    #[test]
    fn exclusive_nested_source_is_ignored() {
        let mut m = machine();
        let mut arbiter = GestureArbiter::new();
        let mut list = FakeList {
            offset: 30.0,
            exclusive: true,
            ..FakeList::default()
        };
        let owner = arbiter.on_nested_drag(&mut m, &mut list, DragEvent::changed(-50.0, -1.0));
        assert_eq!(owner, Owner::NestedContent);
        assert_eq!(list.offset, 30.0);
        assert_eq!(m.engine_state(), EngineState::Inactive);
    }
}
