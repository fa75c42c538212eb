//! Runtime: the two clocks and the wiring between them.
//!
//! A frame task runs once per display refresh (physics, gaze raycast,
//! indicator). A slower interval task runs the dwell controller. Both live on
//! one logical thread and communicate only through the hover state.
//!
//! # Invariants
//! - Within one pump the frame task runs before any interval tick it causes.
//! - Dropping a task guard cancels the task; nothing fires after teardown.
//! - Physics stepping is fixed-rate regardless of frame duration.

mod clock;
mod config;
mod room;
mod runtime;

pub use clock::{Dispatch, FrameClock, TaskGuard, TaskId};
pub use config::{ConfigError, RuntimeConfig};
pub use room::{Room, build_room, resting_on_floor};
pub use runtime::{FrameReport, Runtime, RuntimeError};

pub fn crate_info() -> &'static str {
    "dwellspace-runtime v0.1.0"
}
