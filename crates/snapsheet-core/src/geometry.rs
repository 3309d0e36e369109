#![forbid(unsafe_code)]

//! Geometric primitives and gesture-to-progress math.
//!
//! All coordinates use the host's reference frame: `y` grows downward, so a
//! positive vertical velocity moves the panel toward [`PanelState::Collapsed`].

use crate::panel::PanelState;

/// Collapsed panel height used when the host does not override it.
pub const DEFAULT_COLLAPSED_HEIGHT: f32 = 200.0;

/// A 2D vector for drag translations and velocities.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Vertical-only vector.
    #[inline]
    pub const fn vertical(y: f32) -> Self {
        Self { x: 0.0, y }
    }

    /// Replace non-finite components with zero.
    #[inline]
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            x: finite_or_zero(self.x),
            y: finite_or_zero(self.y),
        }
    }
}

#[inline]
pub(crate) fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}

// ---------------------------------------------------------------------------
// Panel geometry
// ---------------------------------------------------------------------------

/// The two extents a panel snaps between.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PanelGeometry {
    /// Extent at [`PanelState::Expanded`]; the full travel range.
    pub total_height: f32,
    /// Extent at [`PanelState::Collapsed`].
    pub collapsed_height: f32,
}

impl PanelGeometry {
    #[inline]
    pub const fn new(total_height: f32, collapsed_height: f32) -> Self {
        Self {
            total_height,
            collapsed_height,
        }
    }

    /// Geometry with the default collapsed height.
    #[inline]
    pub const fn with_total_height(total_height: f32) -> Self {
        Self::new(total_height, DEFAULT_COLLAPSED_HEIGHT)
    }

    /// Distance the panel travels between its two states. Never negative.
    #[inline]
    #[must_use]
    pub fn travel(&self) -> f32 {
        let travel = finite_or_zero(self.total_height - self.collapsed_height);
        travel.max(0.0)
    }

    /// Resting extent for a settled state.
    #[inline]
    #[must_use]
    pub fn extent_for(&self, state: PanelState) -> f32 {
        match state {
            PanelState::Collapsed => self.collapsed_height,
            PanelState::Expanded => self.total_height,
        }
    }

    /// Convert a vertical translation into a progress delta.
    ///
    /// Dragging up (negative `y`) moves forward out of `Collapsed`; dragging
    /// down moves forward out of `Expanded`, hence the sign flip. A degenerate
    /// travel range yields zero.
    #[must_use]
    pub fn fraction_for(&self, translation_y: f32, state: PanelState) -> f32 {
        let travel = self.travel();
        if travel <= f32::EPSILON {
            return 0.0;
        }
        let fraction = -finite_or_zero(translation_y) / travel;
        match state {
            PanelState::Collapsed => fraction,
            PanelState::Expanded => -fraction,
        }
    }
}

impl Default for PanelGeometry {
    fn default() -> Self {
        Self::with_total_height(DEFAULT_COLLAPSED_HEIGHT)
    }
}

/// Linear interpolation between two extents.
#[inline]
pub(crate) fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

// ---------------------------------------------------------------------------
// Velocity
// ---------------------------------------------------------------------------

/// Direction of vertical motion relative to the panel states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    TowardCollapsed,
    TowardExpanded,
}

impl Motion {
    /// The state this motion heads for.
    #[must_use]
    pub const fn heading(self) -> PanelState {
        match self {
            Self::TowardCollapsed => PanelState::Collapsed,
            Self::TowardExpanded => PanelState::Expanded,
        }
    }
}

/// Last non-zero vertical velocity seen during a drag.
///
/// Zero and non-finite samples are ignored so a finger that stops just
/// before lift-off still reports the direction it was last moving in.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LatestVelocity(f32);

impl LatestVelocity {
    /// Record a sample. Returns `true` if it replaced the stored value.
    pub fn observe(&mut self, velocity_y: f32) -> bool {
        if velocity_y != 0.0 && velocity_y.is_finite() {
            self.0 = velocity_y;
            true
        } else {
            false
        }
    }

    #[inline]
    #[must_use]
    pub fn get(&self) -> f32 {
        self.0
    }

    /// Direction of the last sample, `None` before any motion.
    #[must_use]
    pub fn motion(&self) -> Option<Motion> {
        if self.0 > 0.0 {
            Some(Motion::TowardCollapsed)
        } else if self.0 < 0.0 {
            Some(Motion::TowardExpanded)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn fraction_collapsed_drag_up_is_positive() {
        let g = PanelGeometry::new(800.0, 200.0);
        let f = g.fraction_for(-100.0, PanelState::Collapsed);
        assert!(approx(f, 100.0 / 600.0), "got {f}");
    }

    #[test]
    fn fraction_expanded_same_translation_negates() {
        let g = PanelGeometry::new(800.0, 200.0);
        let f = g.fraction_for(-100.0, PanelState::Expanded);
        assert!(approx(f, -100.0 / 600.0), "got {f}");
    }

    #[test]
    fn fraction_degenerate_travel_is_zero() {
        let g = PanelGeometry::new(200.0, 200.0);
        assert_eq!(g.fraction_for(-50.0, PanelState::Collapsed), 0.0);
        let inverted = PanelGeometry::new(100.0, 200.0);
        assert_eq!(inverted.travel(), 0.0);
        assert_eq!(inverted.fraction_for(-50.0, PanelState::Collapsed), 0.0);
    }

    #[test]
    fn fraction_ignores_non_finite_translation() {
        let g = PanelGeometry::new(800.0, 200.0);
        assert_eq!(g.fraction_for(f32::NAN, PanelState::Collapsed), 0.0);
        assert_eq!(g.fraction_for(f32::INFINITY, PanelState::Expanded), 0.0);
    }

    #[test]
    fn extents_match_states() {
        let g = PanelGeometry::with_total_height(900.0);
        assert_eq!(g.extent_for(PanelState::Collapsed), DEFAULT_COLLAPSED_HEIGHT);
        assert_eq!(g.extent_for(PanelState::Expanded), 900.0);
    }

    #[test]
    fn latest_velocity_keeps_last_non_zero() {
        let mut v = LatestVelocity::default();
        assert_eq!(v.motion(), None);
        assert!(v.observe(-3.0));
        assert!(!v.observe(0.0));
        assert!(!v.observe(f32::NAN));
        assert_eq!(v.get(), -3.0);
        assert_eq!(v.motion(), Some(Motion::TowardExpanded));
        v.observe(5.0);
        assert_eq!(v.motion(), Some(Motion::TowardCollapsed));
        assert_eq!(Motion::TowardCollapsed.heading(), PanelState::Collapsed);
    }

    #[test]
    fn vec2_sanitized_drops_non_finite() {
        let v = Vec2::new(f32::NEG_INFINITY, 4.0).sanitized();
        assert_eq!(v, Vec2::new(0.0, 4.0));
        assert_eq!(Vec2::vertical(2.0), Vec2::new(0.0, 2.0));
    }
}
