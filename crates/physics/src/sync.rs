use dwellspace_common::EntityId;
use dwellspace_scene::Scene;
use glam::{Quat, Vec3};

use crate::engine::{BodyDesc, PhysicsConfig, PhysicsEngine, PhysicsError, PhysicsWorld};
use crate::timestep::FixedTimestep;

/// Pairs one visual mesh with one physics body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBinding {
    pub mesh: EntityId,
    pub body: EntityId,
}

/// What one step/advance did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Fixed steps taken.
    pub steps: u32,
    /// Meshes whose transform was overwritten from their body.
    pub synced: usize,
    /// Bindings skipped because the body pose was not finite.
    pub skipped_degenerate: usize,
    /// Bindings whose mesh or body no longer exists.
    pub missing: usize,
}

/// Steps the physics engine at a fixed rate and copies body poses onto meshes.
///
/// Owns the bindings. The engine owns body state and the scene owns mesh
/// state; this is the only code that writes physics-derived transforms onto
/// bound meshes, and it never reads mesh transforms back into bodies.
pub struct PhysicsSync<E: PhysicsEngine = PhysicsWorld> {
    engine: E,
    bindings: Vec<PhysicsBinding>,
    timestep: FixedTimestep,
}

impl PhysicsSync<PhysicsWorld> {
    /// Built-in world configured from `config`.
    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self::new(PhysicsWorld::new(config), config)
    }
}

impl<E: PhysicsEngine> PhysicsSync<E> {
    pub fn new(engine: E, config: &PhysicsConfig) -> Self {
        Self {
            engine,
            bindings: Vec::new(),
            timestep: FixedTimestep::new(config.fixed_step, config.max_substeps),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn bindings(&self) -> &[PhysicsBinding] {
        &self.bindings
    }

    pub fn fixed_step(&self) -> f32 {
        self.timestep.step()
    }

    /// Give `mesh` a box body of the given full `bounds` and `mass`, starting
    /// at the mesh's current position and orientation. Mass zero is static.
    pub fn add_box(
        &mut self,
        scene: &Scene,
        mesh: EntityId,
        bounds: [f32; 3],
        mass: f32,
    ) -> Result<PhysicsBinding, PhysicsError> {
        let transform = scene
            .get(mesh)
            .ok_or(PhysicsError::MeshNotFound(mesh))?
            .transform;
        let body = self.engine.add_body(BodyDesc {
            half_extents: Vec3::from_array(bounds) * 0.5,
            mass,
            position: transform.position,
            rotation: transform.rotation,
        })?;
        let binding = PhysicsBinding { mesh, body };
        self.bindings.push(binding);
        tracing::debug!(mesh = %mesh.short(), body = %body.short(), mass, "physics binding created");
        Ok(binding)
    }

    /// Advance by exactly one fixed step, then sync.
    pub fn step(&mut self, scene: &mut Scene) -> SyncStats {
        self.engine.step(self.timestep.step());
        let mut stats = self.sync(scene);
        stats.steps = 1;
        stats
    }

    /// Per-frame entry point: convert `frame_dt` seconds into whole fixed
    /// steps, run them, then sync once.
    pub fn advance(&mut self, frame_dt: f32, scene: &mut Scene) -> SyncStats {
        let _span = tracing::trace_span!("physics_advance", frame_dt).entered();
        let steps = self.timestep.advance(frame_dt);
        let dt = self.timestep.step();
        for _ in 0..steps {
            self.engine.step(dt);
        }
        let mut stats = self.sync(scene);
        stats.steps = steps;
        stats
    }

    /// Copy every bound body's pose onto its mesh.
    ///
    /// Non-finite poses are skipped and logged; the mesh keeps its last good
    /// transform. Scale is never touched.
    pub fn sync(&self, scene: &mut Scene) -> SyncStats {
        let mut stats = SyncStats::default();
        for binding in &self.bindings {
            let Some(pose) = self.engine.body_pose(binding.body) else {
                stats.missing += 1;
                continue;
            };
            let Some(mesh) = scene.get_mut(binding.mesh) else {
                stats.missing += 1;
                continue;
            };
            if !pose.is_finite() {
                tracing::warn!(
                    mesh = %binding.mesh.short(),
                    body = %binding.body.short(),
                    "skipping degenerate body pose"
                );
                stats.skipped_degenerate += 1;
                continue;
            }
            mesh.transform.position = pose.position;
            mesh.transform.rotation = normalize_or_identity(pose.rotation);
            stats.synced += 1;
        }
        stats
    }
}

fn normalize_or_identity(q: Quat) -> Quat {
    let len = q.length();
    if len > 0.0 { q / len } else { Quat::IDENTITY }
}
