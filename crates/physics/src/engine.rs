use dwellspace_common::EntityId;
use glam::{Quat, Vec3};
use rapier3d::na::{Isometry3, Quaternion, Translation3, UnitQuaternion, Vector3};
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Physics tuning shared by the world and the fixed-step driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: [f32; 3],
    /// Seconds of simulated time per step.
    pub fixed_step: f32,
    /// Upper bound on steps taken for one render frame.
    pub max_substeps: u32,
    pub ground_friction: f32,
    pub ground_restitution: f32,
    /// Contact material of every box collider.
    pub box_friction: f32,
    pub box_restitution: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.82, 0.0],
            fixed_step: 1.0 / 60.0,
            max_substeps: 10,
            ground_friction: 0.5,
            ground_restitution: 0.2,
            box_friction: 0.0,
            box_restitution: 0.2,
        }
    }
}

/// Errors from body creation and binding.
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    #[error("invalid mass {0}: must be finite and >= 0")]
    InvalidMass(f32),
    #[error("invalid box bounds {0:?}: every extent must be finite and > 0")]
    InvalidBounds([f32; 3]),
    #[error("mesh {0:?} not found in scene")]
    MeshNotFound(EntityId),
    #[error("body {0:?} not found")]
    BodyNotFound(EntityId),
}

/// Position and orientation of a body, the only state copied onto meshes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl BodyPose {
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Never moves. Mass zero.
    Static,
    Dynamic,
}

/// Description of a box body to add to an engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub half_extents: Vec3,
    pub mass: f32,
    pub position: Vec3,
    pub rotation: Quat,
}

impl BodyDesc {
    pub fn kind(&self) -> BodyKind {
        if self.mass > 0.0 {
            BodyKind::Dynamic
        } else {
            BodyKind::Static
        }
    }

    fn validate(&self) -> Result<(), PhysicsError> {
        if !self.mass.is_finite() || self.mass < 0.0 {
            return Err(PhysicsError::InvalidMass(self.mass));
        }
        let he = self.half_extents;
        if !he.is_finite() || he.min_element() <= 0.0 {
            return Err(PhysicsError::InvalidBounds((he * 2.0).to_array()));
        }
        Ok(())
    }
}

/// The engine boundary: everything PhysicsSync needs from a rigid body solver.
pub trait PhysicsEngine {
    /// Add a body, returning its handle.
    fn add_body(&mut self, desc: BodyDesc) -> Result<EntityId, PhysicsError>;

    /// Advance the simulation by exactly `dt` seconds.
    fn step(&mut self, dt: f32);

    /// Current pose of a body, if it exists.
    fn body_pose(&self, id: EntityId) -> Option<BodyPose>;
}

/// Rapier-backed world: box bodies, box-box contacts and a ground half-space
/// at y = 0.
///
/// Handles are kept in a BTreeMap keyed by entity so lookups and iteration do
/// not depend on insertion order.
pub struct PhysicsWorld {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    handles: BTreeMap<EntityId, RigidBodyHandle>,
    ground: Option<ColliderHandle>,
    gravity: Vector3<f32>,
    box_friction: f32,
    box_restitution: f32,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    steps: u64,
}

impl PhysicsWorld {
    /// Empty world with the configured gravity and a ground half-space at y = 0.
    pub fn new(config: &PhysicsConfig) -> Self {
        let mut world = Self::empty(config);
        // Max combine so box friction never weakens the ground's.
        let ground = ColliderBuilder::halfspace(Vector3::y_axis())
            .friction(config.ground_friction)
            .friction_combine_rule(CoefficientCombineRule::Max)
            .restitution(config.ground_restitution)
            .build();
        world.ground = Some(world.colliders.insert(ground));
        world
    }

    /// World without a ground plane.
    pub fn without_ground(gravity: Vec3) -> Self {
        Self::empty(&PhysicsConfig {
            gravity: gravity.to_array(),
            ..PhysicsConfig::default()
        })
    }

    fn empty(config: &PhysicsConfig) -> Self {
        let [gx, gy, gz] = config.gravity;
        Self {
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            handles: BTreeMap::new(),
            ground: None,
            gravity: Vector3::new(gx, gy, gz),
            box_friction: config.box_friction,
            box_restitution: config.box_restitution,
            params: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            steps: 0,
        }
    }

    pub fn gravity(&self) -> Vec3 {
        Vec3::new(self.gravity.x, self.gravity.y, self.gravity.z)
    }

    pub fn has_ground(&self) -> bool {
        self.ground.is_some()
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn body_count(&self) -> usize {
        self.handles.len()
    }

    pub fn body_kind(&self, id: EntityId) -> Option<BodyKind> {
        let body = self.body(id)?;
        Some(if body.is_dynamic() {
            BodyKind::Dynamic
        } else {
            BodyKind::Static
        })
    }

    pub fn linear_velocity(&self, id: EntityId) -> Option<Vec3> {
        let v = self.body(id)?.linvel();
        Some(Vec3::new(v.x, v.y, v.z))
    }

    /// Set a body's velocity directly, waking it if it sleeps.
    pub fn set_velocity(
        &mut self,
        id: EntityId,
        linear: Vec3,
        angular: Vec3,
    ) -> Result<(), PhysicsError> {
        let body = self
            .handles
            .get(&id)
            .and_then(|h| self.bodies.get_mut(*h))
            .ok_or(PhysicsError::BodyNotFound(id))?;
        body.set_linvel(Vector3::new(linear.x, linear.y, linear.z), true);
        body.set_angvel(Vector3::new(angular.x, angular.y, angular.z), true);
        Ok(())
    }

    fn body(&self, id: EntityId) -> Option<&RigidBody> {
        self.bodies.get(*self.handles.get(&id)?)
    }
}

impl fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("bodies", &self.handles.len())
            .field("gravity", &self.gravity())
            .field("ground", &self.has_ground())
            .field("steps", &self.steps)
            .finish()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(&PhysicsConfig::default())
    }
}

impl PhysicsEngine for PhysicsWorld {
    fn add_body(&mut self, desc: BodyDesc) -> Result<EntityId, PhysicsError> {
        desc.validate()?;
        let kind = desc.kind();

        let rotation = if desc.rotation.is_finite() && desc.rotation.length() > 0.0 {
            desc.rotation.normalize()
        } else {
            Quat::IDENTITY
        };
        let p = desc.position;
        let pose = Isometry3::from_parts(
            Translation3::new(p.x, p.y, p.z),
            UnitQuaternion::from_quaternion(Quaternion::new(
                rotation.w, rotation.x, rotation.y, rotation.z,
            )),
        );
        let builder = match kind {
            BodyKind::Static => RigidBodyBuilder::fixed(),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
        };
        let handle = self.bodies.insert(builder.position(pose).build());

        let he = desc.half_extents;
        let mut collider = ColliderBuilder::cuboid(he.x, he.y, he.z)
            .friction(self.box_friction)
            .restitution(self.box_restitution);
        if kind == BodyKind::Dynamic {
            collider = collider.mass(desc.mass);
        }
        self.colliders
            .insert_with_parent(collider.build(), handle, &mut self.bodies);

        let id = EntityId::new();
        self.handles.insert(id, handle);
        tracing::debug!(body = %id.short(), ?kind, mass = desc.mass, "added body");
        Ok(id)
    }

    fn step(&mut self, dt: f32) {
        self.params.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &(),
        );
        self.steps += 1;
    }

    fn body_pose(&self, id: EntityId) -> Option<BodyPose> {
        let body = self.body(id)?;
        let t = body.translation();
        let r = body.rotation();
        Some(BodyPose {
            position: Vec3::new(t.x, t.y, t.z),
            rotation: Quat::from_xyzw(r.i, r.j, r.k, r.w),
        })
    }
}
