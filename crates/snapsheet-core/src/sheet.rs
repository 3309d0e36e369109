#![forbid(unsafe_code)]

//! [`BottomSheet`]: the panel state machine wired to a host.
//!
//! The sheet owns a [`PanelStateMachine`], a [`GestureArbiter`] and the two
//! host surfaces. After every event or clock tick that can move the panel it
//! pushes the current extent to the host. The host drives time, either with
//! explicit deltas through [`BottomSheet::tick`] or with frame timestamps
//! through [`BottomSheet::frame`].

use std::time::Duration;

use web_time::Instant;

use crate::animation::EngineState;
use crate::config::SheetConfig;
use crate::error::Result;
use crate::event::DragEvent;
use crate::gesture::{GestureArbiter, Owner};
use crate::host::{HostSurface, NestedScrollSurface};
use crate::observable::StateWatch;
use crate::panel::{PanelState, PanelStateMachine, Settled};

/// A bottom sheet bound to its host surfaces.
#[derive(Debug)]
pub struct BottomSheet<H, N> {
    machine: PanelStateMachine,
    arbiter: GestureArbiter,
    host: H,
    nested: N,
    last_frame: Option<Instant>,
}

impl<H: HostSurface, N: NestedScrollSurface> BottomSheet<H, N> {
    /// Validate `config`, build a collapsed sheet and render its initial
    /// extent.
    pub fn new(config: &SheetConfig, host: H, nested: N) -> Result<Self> {
        Self::with_state(config, host, nested, PanelState::Collapsed)
    }

    /// Like [`BottomSheet::new`], resting in `initial` instead.
    pub fn with_state(
        config: &SheetConfig,
        host: H,
        nested: N,
        initial: PanelState,
    ) -> Result<Self> {
        config.validate()?;
        let machine =
            PanelStateMachine::new(config, host.geometry()).with_initial_state(initial);
        let mut sheet = Self {
            machine,
            arbiter: GestureArbiter::new(),
            host,
            nested,
            last_frame: None,
        };
        sheet.present();
        tracing::debug!(
            target: "snapsheet.sheet",
            total_height = sheet.machine.geometry().total_height,
            collapsed_height = sheet.machine.geometry().collapsed_height,
            state = %initial,
            "sheet created"
        );
        Ok(sheet)
    }

    /// Replace the timing and completion settings for future transitions.
    pub fn reconfigure(&mut self, config: &SheetConfig) -> Result<()> {
        config.validate()?;
        self.machine.reconfigure(config);
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn current_state(&self) -> PanelState {
        self.machine.current_state()
    }

    #[must_use]
    pub fn watch(&self) -> StateWatch<PanelState> {
        self.machine.watch()
    }

    #[inline]
    #[must_use]
    pub fn machine(&self) -> &PanelStateMachine {
        &self.machine
    }

    #[inline]
    #[must_use]
    pub fn arbiter(&self) -> &GestureArbiter {
        &self.arbiter
    }

    #[inline]
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    #[inline]
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[inline]
    #[must_use]
    pub fn nested(&self) -> &N {
        &self.nested
    }

    #[inline]
    pub fn nested_mut(&mut self) -> &mut N {
        &mut self.nested
    }

    /// Programmatic toggle. Fails while a transition is active.
    pub fn toggle(&mut self) -> Result<PanelState> {
        self.sync_geometry();
        let target = self.machine.toggle()?;
        self.present();
        Ok(target)
    }

    /// Tap on the panel. Returns `true` if a transition started.
    pub fn on_tap(&mut self) -> bool {
        self.sync_geometry();
        self.arbiter.on_tap(&mut self.machine)
    }

    pub fn on_panel_drag(&mut self, event: DragEvent) {
        self.sync_geometry();
        self.arbiter.on_panel_drag(&mut self.machine, event);
        self.present();
    }

    pub fn on_nested_drag(&mut self, event: DragEvent) -> Owner {
        self.sync_geometry();
        let owner = self
            .arbiter
            .on_nested_drag(&mut self.machine, &mut self.nested, event);
        self.present();
        owner
    }

    /// Advance the running transition by `dt` and render.
    pub fn tick(&mut self, dt: Duration) -> Option<Settled> {
        let was_active = self.machine.engine().is_active();
        let settled = self.machine.tick(dt);
        if was_active {
            self.present();
        }
        if let Some(settled) = settled {
            tracing::debug!(
                target: "snapsheet.sheet",
                outcome = ?settled.outcome,
                state = %settled.state,
                "sheet settled"
            );
        }
        settled
    }

    /// Advance by the time elapsed since the previous frame.
    ///
    /// The clock only accumulates while the engine is running, so a long
    /// pause or idle period never produces a jump on the next frame.
    pub fn frame(&mut self, now: Instant) -> Option<Settled> {
        if self.machine.engine_state() != EngineState::Running {
            self.last_frame = None;
            return None;
        }
        let dt = self
            .last_frame
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_frame = Some(now);
        let settled = self.tick(dt);
        if settled.is_some() {
            self.last_frame = None;
        }
        settled
    }

    /// Pick up host size changes before the next event is applied.
    fn sync_geometry(&mut self) {
        let geometry = self.host.geometry();
        if geometry != self.machine.geometry() {
            tracing::debug!(
                target: "snapsheet.sheet",
                total_height = geometry.total_height,
                collapsed_height = geometry.collapsed_height,
                "geometry changed"
            );
            self.machine.set_geometry(geometry);
        }
    }

    fn present(&mut self) {
        self.host.set_panel_extent(self.machine.extent());
    }
}
