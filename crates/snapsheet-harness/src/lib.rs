#![forbid(unsafe_code)]

//! Replay harness for `snapsheet-core`.
//!
//! Scripts describe a host, a configuration and a sequence of taps, drags
//! and clock steps. [`replay`] runs them against recording host surfaces
//! with a fully simulated clock and condenses the result into a
//! [`ReplayReport`] whose blake3 checksum is stable across runs.

pub mod cli;
pub mod error;
pub mod host;
pub mod logging;
pub mod replay;
pub mod script;

pub use cli::{run, run_from_env};
pub use error::{HarnessError, Result};
pub use host::{RecordingContent, RecordingPanel};
pub use logging::{LogFormat, init_tracing};
pub use replay::{ReplayReport, StepRecord, replay};
pub use script::{GestureScript, Step};
