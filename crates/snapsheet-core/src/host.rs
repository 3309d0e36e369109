#![forbid(unsafe_code)]

//! The host-surface contract consumed from the rendering toolkit.
//!
//! The core never lays anything out. It reads the travel range from a
//! [`HostSurface`] and pushes one number back: the panel extent. Nested
//! scrollable content is reached through [`NestedScrollSurface`].

use crate::event::SurfaceCapabilities;
use crate::geometry::{DEFAULT_COLLAPSED_HEIGHT, PanelGeometry};

/// The rendered panel and its container.
pub trait HostSurface {
    /// Height of the available travel range (the expanded extent).
    fn total_height(&self) -> f32;

    /// Extent at the collapsed state.
    fn collapsed_height(&self) -> f32 {
        DEFAULT_COLLAPSED_HEIGHT
    }

    /// Apply `value` to the rendered panel. Called on every animation tick
    /// and after every gesture sample.
    fn set_panel_extent(&mut self, value: f32);

    fn geometry(&self) -> PanelGeometry {
        PanelGeometry::new(self.total_height(), self.collapsed_height())
    }
}

/// Scrollable content embedded in the panel.
pub trait NestedScrollSurface {
    fn scroll_offset_y(&self) -> f32;

    fn set_scroll_offset_y(&mut self, value: f32);

    fn set_scroll_indicator_visible(&mut self, visible: bool);

    /// Recognition guarantees of this surface's drag event source.
    fn capabilities(&self) -> SurfaceCapabilities {
        SurfaceCapabilities::CONCURRENT
    }
}

impl<T: HostSurface + ?Sized> HostSurface for &mut T {
    fn total_height(&self) -> f32 {
        (**self).total_height()
    }

    fn collapsed_height(&self) -> f32 {
        (**self).collapsed_height()
    }

    fn set_panel_extent(&mut self, value: f32) {
        (**self).set_panel_extent(value);
    }
}

impl<T: NestedScrollSurface + ?Sized> NestedScrollSurface for &mut T {
    fn scroll_offset_y(&self) -> f32 {
        (**self).scroll_offset_y()
    }

    fn set_scroll_offset_y(&mut self, value: f32) {
        (**self).set_scroll_offset_y(value);
    }

    fn set_scroll_indicator_visible(&mut self, visible: bool) {
        (**self).set_scroll_indicator_visible(visible);
    }

    fn capabilities(&self) -> SurfaceCapabilities {
        (**self).capabilities()
    }
}
