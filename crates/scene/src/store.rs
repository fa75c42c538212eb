use dwellspace_common::{Color, EntityId, Transform};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Local-space shape used for gaze hit-testing.
///
/// Volumes are centered on the mesh origin and scaled/rotated by the mesh
/// transform when tested.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Volume {
    Box { half_extents: [f32; 3] },
    Sphere { radius: f32 },
    /// Finite double-sided plane in local XY, normal along +Z.
    Plane { width: f32, height: f32 },
    /// Never hit by rays (indicators, decorations).
    None,
}

impl Volume {
    /// Box volume from full bounds, the way meshes are usually described.
    pub fn cuboid(bounds: [f32; 3]) -> Self {
        Self::Box {
            half_extents: [bounds[0] * 0.5, bounds[1] * 0.5, bounds[2] * 0.5],
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::Box {
            half_extents: [0.5, 0.5, 0.5],
        }
    }
}

/// A visual mesh: what the renderer draws and the raycaster tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub transform: Transform,
    pub volume: Volume,
    pub color: Color,
    pub visible: bool,
}

impl Mesh {
    pub fn new(name: impl Into<String>, volume: Volume) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            volume,
            color: Color::default(),
            visible: true,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Errors from scene lookups.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("mesh {0:?} not found")]
    MeshNotFound(EntityId),
}

/// Mesh storage for one scene.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    meshes: BTreeMap<EntityId, Mesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh. Returns its id.
    pub fn add(&mut self, mesh: Mesh) -> EntityId {
        let id = EntityId::new();
        tracing::debug!(mesh = %id.short(), name = %mesh.name, "mesh added");
        self.meshes.insert(id, mesh);
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Mesh> {
        self.meshes.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Mesh> {
        self.meshes.get_mut(&id)
    }

    /// Look up a mesh by id, failing with `MeshNotFound`.
    pub fn require(&self, id: EntityId) -> Result<&Mesh, SceneError> {
        self.meshes.get(&id).ok_or(SceneError::MeshNotFound(id))
    }

    /// First mesh with the given name, in id order.
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.meshes
            .iter()
            .find(|(_, m)| m.name == name)
            .map(|(id, _)| *id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.meshes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Read-only access to all meshes (BTreeMap for deterministic iteration).
    pub fn meshes(&self) -> &BTreeMap<EntityId, Mesh> {
        &self.meshes
    }
}
