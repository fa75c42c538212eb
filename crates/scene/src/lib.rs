//! Scene: the visual side of the runtime.
//!
//! Meshes are stored in a BTreeMap for deterministic iteration order. A mesh
//! carries a transform and a hit-testable volume; the scene never simulates
//! anything by itself. Physics writes transforms in, the gaze raycaster reads
//! volumes out.
//!
//! # Invariants
//! - Mesh ids are stable for the lifetime of the scene.
//! - Ray distances are measured in world units along a unit direction.

mod camera;
mod ray;
mod store;

pub use camera::CameraRig;
pub use ray::{Ray, intersect_volume};
pub use store::{Mesh, Scene, SceneError, Volume};

pub fn crate_info() -> &'static str {
    "dwellspace-scene v0.1.0"
}
