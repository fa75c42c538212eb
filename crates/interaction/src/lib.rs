//! Interaction: what is being looked at, for how long, and what happens when
//! the dwell completes.
//!
//! Two clocks drive this crate. The render frame runs [`GazeRaycaster`],
//! which writes the current target into [`HoverState`]. A slower fixed
//! interval runs [`DwellController`], which reads that target and owns the
//! lock and the progress. [`SessionGate`] decides whether the controller is
//! allowed to do anything at all.
//!
//! # Invariants
//! - Each HoverState field has exactly one writer: the raycaster writes the
//!   current target, the controller writes the lock and the progress.
//! - Progress only grows while the current target equals the locked target;
//!   any mismatch resets it to zero within one controller tick.
//! - A target's action fires at most once per completed dwell and never while
//!   the session is inactive.
//! - The indicator is a pure function of HoverState.

mod dwell;
mod hover;
mod indicator;
mod raycaster;
mod session;
mod target;

pub use dwell::{DwellConfig, DwellController, DwellOutcome};
pub use hover::HoverState;
pub use indicator::{IndicatorState, IndicatorStyle};
pub use raycaster::{GazeConfig, GazeHit, GazeRaycaster};
pub use session::{SessionGate, SessionState};
pub use target::{InteractionError, InteractionRegistry, InteractiveTarget, Invocable, TargetId};

pub fn crate_info() -> &'static str {
    "dwellspace-interaction v0.1.0"
}
