#![forbid(unsafe_code)]

//! Core: a gesture-driven bottom sheet with two snap states.
//!
//! # Role in SnapSheet
//! `snapsheet-core` owns the panel's discrete state, the scrubbable
//! transition engine, and the arbitration between the panel's own drag
//! gesture and a nested scrollable region. Rendering and layout belong to
//! the host toolkit, which is reached only through the traits in [`host`].
//!
//! # Primary responsibilities
//! - **PanelStateMachine**: Collapsed/Expanded state, toggle, pause, scrub,
//!   commit, and the velocity-based completion decision.
//! - **Transition**: the pausable, reversible timed animation engine.
//! - **GestureArbiter**: turns raw drag samples from two surfaces into
//!   progress deltas and decides which surface owns the touch stream.
//! - **BottomSheet**: facade wiring the above to a host surface.
//!
//! # Threading
//! Everything here is single-threaded and event-ordered. Shared state uses
//! `Rc`, so the main types are neither `Send` nor `Sync`.

pub mod animation;
pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod host;
pub mod observable;
pub mod panel;
pub mod sheet;

pub use animation::{Easing, EngineState, ResumeTiming, Transition, TransitionOutcome};
pub use config::{ConfigError, SheetConfig};
pub use error::{Result, SheetError};
pub use event::{DragEvent, GesturePhase, Surface, SurfaceCapabilities};
pub use geometry::{LatestVelocity, Motion, PanelGeometry, Vec2};
pub use gesture::{DragSession, GestureArbiter, Owner, ScrollOwnershipContext};
pub use host::{HostSurface, NestedScrollSurface};
pub use observable::{Observable, StateWatch, Subscription};
pub use panel::{CompletionPolicy, PanelState, PanelStateMachine, Settled};
pub use sheet::BottomSheet;
