#![forbid(unsafe_code)]

//! In-memory host surfaces that record everything the sheet asks of them.

use snapsheet_core::{HostSurface, NestedScrollSurface, PanelGeometry, SurfaceCapabilities};

/// Panel surface recording every extent it is given.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingPanel {
    geometry: PanelGeometry,
    extents: Vec<f32>,
}

impl RecordingPanel {
    #[must_use]
    pub fn new(geometry: PanelGeometry) -> Self {
        Self {
            geometry,
            extents: Vec::new(),
        }
    }

    /// Change the container height, as a window resize would.
    pub fn resize(&mut self, total_height: f32) {
        self.geometry.total_height = total_height;
    }

    #[must_use]
    pub fn extents(&self) -> &[f32] {
        &self.extents
    }

    #[must_use]
    pub fn last_extent(&self) -> Option<f32> {
        self.extents.last().copied()
    }
}

impl HostSurface for RecordingPanel {
    fn total_height(&self) -> f32 {
        self.geometry.total_height
    }

    fn collapsed_height(&self) -> f32 {
        self.geometry.collapsed_height
    }

    fn set_panel_extent(&mut self, value: f32) {
        self.extents.push(value);
    }
}

/// Nested scroll surface recording offset writes and indicator toggles.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordingContent {
    offset: f32,
    indicator_visible: bool,
    offset_writes: Vec<f32>,
    indicator_changes: Vec<bool>,
    capabilities: SurfaceCapabilities,
}

impl RecordingContent {
    #[must_use]
    pub fn new(offset: f32) -> Self {
        Self {
            offset,
            indicator_visible: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: SurfaceCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Native scrolling by the user; not recorded as a sheet write.
    pub fn scroll_to(&mut self, y: f32) {
        self.offset = y;
    }

    #[must_use]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    #[must_use]
    pub fn indicator_visible(&self) -> bool {
        self.indicator_visible
    }

    #[must_use]
    pub fn offset_writes(&self) -> &[f32] {
        &self.offset_writes
    }

    /// Indicator visibility transitions, excluding repeated writes.
    #[must_use]
    pub fn indicator_changes(&self) -> &[bool] {
        &self.indicator_changes
    }
}

impl NestedScrollSurface for RecordingContent {
    fn scroll_offset_y(&self) -> f32 {
        self.offset
    }

    fn set_scroll_offset_y(&mut self, value: f32) {
        self.offset = value;
        self.offset_writes.push(value);
    }

    fn set_scroll_indicator_visible(&mut self, visible: bool) {
        if visible != self.indicator_visible {
            self.indicator_changes.push(visible);
        }
        self.indicator_visible = visible;
    }

    fn capabilities(&self) -> SurfaceCapabilities {
        self.capabilities
    }
}
