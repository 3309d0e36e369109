#![forbid(unsafe_code)]

//! Gesture scripts: a JSON description of a host and the events it delivers.
//!
//! ```json
//! {
//!   "name": "drag-up",
//!   "geometry": { "total_height": 800.0, "collapsed_height": 200.0 },
//!   "steps": [
//!     { "op": "panel", "phase": "began" },
//!     { "op": "panel", "phase": "changed", "translation": { "y": -300.0 }, "velocity": { "y": -4.0 } },
//!     { "op": "panel", "phase": "ended" },
//!     { "op": "run", "frame_ms": 16 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use snapsheet_core::{DragEvent, PanelGeometry, PanelState, SheetConfig};

use crate::error::{HarnessError, Result};

/// Upper bound on frames a `run` step may advance before giving up.
pub const MAX_RUN_FRAMES: u32 = 10_000;

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Tap on the panel body.
    Tap,
    /// Programmatic toggle.
    Toggle,
    /// Drag sample from the panel's recognizer.
    Panel(DragEvent),
    /// Drag sample from the nested content's recognizer.
    Nested(DragEvent),
    /// Advance the clock once.
    Tick { ms: u64 },
    /// Advance in fixed frames until the transition lands.
    Run {
        #[serde(default = "default_frame_ms")]
        frame_ms: u64,
    },
    /// The user scrolled the nested content natively.
    ScrollTo { y: f32 },
    /// The host's container changed size.
    Resize { total_height: f32 },
}

fn default_frame_ms() -> u64 {
    16
}

fn default_geometry() -> PanelGeometry {
    PanelGeometry::new(800.0, 200.0)
}

impl Step {
    /// Short label used in reports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tap => "tap",
            Self::Toggle => "toggle",
            Self::Panel(_) => "panel",
            Self::Nested(_) => "nested",
            Self::Tick { .. } => "tick",
            Self::Run { .. } => "run",
            Self::ScrollTo { .. } => "scroll_to",
            Self::Resize { .. } => "resize",
        }
    }
}

/// A named sequence of steps against a fixed starting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureScript {
    pub name: String,
    #[serde(default = "default_geometry")]
    pub geometry: PanelGeometry,
    #[serde(default)]
    pub config: SheetConfig,
    #[serde(default)]
    pub initial_state: PanelState,
    #[serde(default)]
    pub initial_scroll_offset: f32,
    /// Checksum a replay must reproduce, if pinned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect_checksum: Option<String>,
    pub steps: Vec<Step>,
}

impl GestureScript {
    /// Parse and validate a script document.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let script: Self = serde_json::from_str(s)?;
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| HarnessError::InvalidScript {
            name: self.name.clone(),
            message,
        };
        let PanelGeometry {
            total_height,
            collapsed_height,
        } = self.geometry;
        if !total_height.is_finite() || !collapsed_height.is_finite() || collapsed_height < 0.0 {
            return Err(invalid(format!(
                "geometry must be finite and non-negative, got {total_height}/{collapsed_height}"
            )));
        }
        if total_height < collapsed_height {
            return Err(invalid(format!(
                "total_height {total_height} is below collapsed_height {collapsed_height}"
            )));
        }
        self.config.validate()?;
        for (index, step) in self.steps.iter().enumerate() {
            match *step {
                Step::Run { frame_ms: 0 } => {
                    return Err(invalid(format!("step {index}: run needs a non-zero frame_ms")));
                }
                Step::Resize { total_height } if !total_height.is_finite() => {
                    return Err(invalid(format!("step {index}: non-finite resize")));
                }
                _ => {}
            }
        }
        Ok(())
    }
}
