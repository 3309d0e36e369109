#![forbid(unsafe_code)]

//! Deterministic replay of [`GestureScript`]s against recording hosts.
//!
//! Replays never read a wall clock: time advances only through `tick` and
//! `run` steps. Each step is summarized in a [`StepRecord`], and the whole
//! run is folded into a blake3 checksum so two replays of the same script
//! can be compared with one string.
//!
//! # Failure Modes
//!
//! - Rejected `toggle` steps are recorded with `accepted: false`; they do
//!   not abort the replay.
//! - A `run` step that does not land within [`MAX_RUN_FRAMES`] frames
//!   aborts with [`HarnessError::InvalidScript`].

use std::time::Duration;

use serde::Serialize;
use snapsheet_core::{BottomSheet, EngineState, Owner, PanelState, TransitionOutcome};
use tracing::info_span;

use crate::error::{HarnessError, Result};
use crate::host::{RecordingContent, RecordingPanel};
use crate::script::{GestureScript, MAX_RUN_FRAMES, Step};

/// Observable effect of one script step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub index: usize,
    pub op: &'static str,
    pub state: PanelState,
    pub engine: EngineState,
    pub progress: f32,
    /// Last extent the host was given.
    pub extent: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settled: Option<TransitionOutcome>,
    /// Frames consumed by a `run` step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames: Option<u32>,
}

impl StepRecord {
    fn canonical_line(&self) -> String {
        format!(
            "{}|{}|{}|{}|{:.4}|{:.3}|{:?}|{:?}|{:?}|{:?}\n",
            self.index,
            self.op,
            self.state,
            self.engine,
            self.progress,
            self.extent,
            self.owner,
            self.accepted,
            self.settled,
            self.frames,
        )
    }
}

/// Outcome of a full replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub name: String,
    pub final_state: PanelState,
    pub final_engine: EngineState,
    pub steps: Vec<StepRecord>,
    /// Every extent the panel surface received, in order.
    pub extents: Vec<f32>,
    pub scroll_offset: f32,
    pub indicator_visible: bool,
    /// Hex blake3 digest over the step records and extents.
    pub checksum: String,
}

impl ReplayReport {
    /// Fail unless `checksum` matches `expected`.
    pub fn verify(&self, expected: &str) -> Result<()> {
        if self.checksum == expected {
            Ok(())
        } else {
            Err(HarnessError::ChecksumMismatch {
                name: self.name.clone(),
                expected: expected.to_string(),
                actual: self.checksum.clone(),
            })
        }
    }

    /// Landings in step order.
    pub fn landings(&self) -> impl Iterator<Item = TransitionOutcome> + '_ {
        self.steps.iter().filter_map(|s| s.settled)
    }
}

/// Replay `script` from a fresh sheet.
pub fn replay(script: &GestureScript) -> Result<ReplayReport> {
    script.validate()?;
    let _span = info_span!("replay", script = %script.name, steps = script.steps.len()).entered();

    let panel = RecordingPanel::new(script.geometry);
    let content = RecordingContent::new(script.initial_scroll_offset);
    let mut sheet = BottomSheet::with_state(&script.config, panel, content, script.initial_state)?;

    let mut steps = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.iter().enumerate() {
        let mut owner = None;
        let mut accepted = None;
        let mut settled = None;
        let mut frames = None;

        match *step {
            Step::Tap => accepted = Some(sheet.on_tap()),
            Step::Toggle => accepted = Some(sheet.toggle().is_ok()),
            Step::Panel(event) => sheet.on_panel_drag(event),
            Step::Nested(event) => owner = Some(sheet.on_nested_drag(event)),
            Step::Tick { ms } => {
                settled = sheet.tick(Duration::from_millis(ms)).map(|s| s.outcome);
            }
            Step::Run { frame_ms } => {
                let (landing, count) = run_until_landed(&mut sheet, frame_ms, &script.name)?;
                settled = landing;
                frames = Some(count);
            }
            Step::ScrollTo { y } => sheet.nested_mut().scroll_to(y),
            Step::Resize { total_height } => sheet.host_mut().resize(total_height),
        }

        let record = StepRecord {
            index,
            op: step.label(),
            state: sheet.current_state(),
            engine: sheet.machine().engine_state(),
            progress: sheet.machine().progress(),
            extent: sheet.host().last_extent().unwrap_or(sheet.machine().extent()),
            owner,
            accepted,
            settled,
            frames,
        };
        tracing::trace!(
            target: "snapsheet.replay",
            index,
            op = record.op,
            state = %record.state,
            engine = %record.engine,
            progress = record.progress,
            "step"
        );
        steps.push(record);
    }

    let mut hasher = blake3::Hasher::new();
    hasher.update(script.name.as_bytes());
    for record in &steps {
        hasher.update(record.canonical_line().as_bytes());
    }
    for extent in sheet.host().extents() {
        hasher.update(format!("{extent:.3};").as_bytes());
    }
    let checksum = hasher.finalize().to_hex().to_string();

    let report = ReplayReport {
        name: script.name.clone(),
        final_state: sheet.current_state(),
        final_engine: sheet.machine().engine_state(),
        steps,
        extents: sheet.host().extents().to_vec(),
        scroll_offset: sheet.nested().offset(),
        indicator_visible: sheet.nested().indicator_visible(),
        checksum,
    };
    tracing::info!(
        target: "snapsheet.replay",
        script = %report.name,
        final_state = %report.final_state,
        checksum = %report.checksum,
        "replay finished"
    );

    if let Some(expected) = &script.expect_checksum {
        report.verify(expected)?;
    }
    Ok(report)
}

fn run_until_landed(
    sheet: &mut BottomSheet<RecordingPanel, RecordingContent>,
    frame_ms: u64,
    name: &str,
) -> Result<(Option<TransitionOutcome>, u32)> {
    let frame = Duration::from_millis(frame_ms);
    let mut count = 0;
    while sheet.machine().engine_state() == EngineState::Running {
        if count >= MAX_RUN_FRAMES {
            return Err(HarnessError::InvalidScript {
                name: name.to_string(),
                message: format!("transition did not land within {MAX_RUN_FRAMES} frames"),
            });
        }
        count += 1;
        if let Some(settled) = sheet.tick(frame) {
            return Ok((Some(settled.outcome), count));
        }
    }
    Ok((None, count))
}
