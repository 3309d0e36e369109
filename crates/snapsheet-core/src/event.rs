#![forbid(unsafe_code)]

//! Canonical drag events delivered by the host toolkit.
//!
//! Each recognizer reports a serialized `Began → Changed* → Ended` sequence
//! (or `Cancelled` in place of `Ended`). Translation is cumulative from the
//! gesture's start point; velocity is instantaneous. Both are in the host's
//! reference frame, `y` growing downward.

use crate::geometry::Vec2;

/// Recognizer phase of a drag sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    /// The toolkit aborted the gesture. Handled like `Ended`.
    Cancelled,
}

impl GesturePhase {
    /// True for the final event of a gesture.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled)
    }
}

/// One drag sample.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragEvent {
    pub phase: GesturePhase,
    #[cfg_attr(feature = "serde", serde(default))]
    pub translation: Vec2,
    #[cfg_attr(feature = "serde", serde(default))]
    pub velocity: Vec2,
}

impl DragEvent {
    #[must_use]
    pub const fn new(phase: GesturePhase, translation: Vec2, velocity: Vec2) -> Self {
        Self {
            phase,
            translation,
            velocity,
        }
    }

    #[must_use]
    pub const fn began() -> Self {
        Self::new(GesturePhase::Began, Vec2::ZERO, Vec2::ZERO)
    }

    /// Vertical-only `Changed` sample.
    #[must_use]
    pub const fn changed(translation_y: f32, velocity_y: f32) -> Self {
        Self::new(
            GesturePhase::Changed,
            Vec2::vertical(translation_y),
            Vec2::vertical(velocity_y),
        )
    }

    /// Vertical-only `Ended` sample.
    #[must_use]
    pub const fn ended(translation_y: f32, velocity_y: f32) -> Self {
        Self::new(
            GesturePhase::Ended,
            Vec2::vertical(translation_y),
            Vec2::vertical(velocity_y),
        )
    }

    #[must_use]
    pub const fn cancelled() -> Self {
        Self::new(GesturePhase::Cancelled, Vec2::ZERO, Vec2::ZERO)
    }

    /// Copy with non-finite components zeroed.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            phase: self.phase,
            translation: self.translation.sanitized(),
            velocity: self.velocity.sanitized(),
        }
    }
}

/// Which surface produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Surface {
    /// The panel body's own drag recognizer.
    Panel,
    /// The custom drag recognizer on the nested scrollable content.
    Nested,
}

/// What a surface's event source guarantees about recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceCapabilities {
    /// The source keeps delivering events while a second consumer (the
    /// nested content's native scroll gesture) interprets the same touches.
    pub concurrent: bool,
}

impl SurfaceCapabilities {
    pub const CONCURRENT: Self = Self { concurrent: true };
    pub const EXCLUSIVE: Self = Self { concurrent: false };
}

impl Default for SurfaceCapabilities {
    fn default() -> Self {
        Self::CONCURRENT
    }
}
