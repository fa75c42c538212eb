//! Rendering adapter: renderer-agnostic interface over the scene.
//!
//! # Invariants
//! - A renderer never mutates the scene.
//! - Output derives only from the scene and the view.
//!
//! The only backend here is a debug text renderer used by the headless host
//! and in tests. A GPU backend implements the same trait.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "dwellspace-render v0.1.0"
}
