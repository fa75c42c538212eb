//! Physics: fixed-step rigid body stepping and body -> mesh synchronization.
//!
//! # Invariants
//! - Simulation step size is fixed and independent of the render frame rate.
//! - PhysicsSync is the only writer of physics-derived transforms onto bound
//!   meshes. Sync is one-directional: body -> mesh, never mesh -> body.
//! - A body pose that is not finite is never copied onto its mesh.

mod engine;
mod sync;
mod timestep;

pub use engine::{
    BodyDesc, BodyKind, BodyPose, PhysicsConfig, PhysicsEngine, PhysicsError, PhysicsWorld,
};
pub use sync::{PhysicsBinding, PhysicsSync, SyncStats};
pub use timestep::FixedTimestep;

pub fn crate_info() -> &'static str {
    "dwellspace-physics v0.1.0"
}
