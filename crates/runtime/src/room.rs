use std::f32::consts::FRAC_PI_2;

use dwellspace_common::{Color, EntityId, Transform};
use dwellspace_scene::{Mesh, Volume};
use glam::{Quat, Vec3};

use crate::runtime::{Runtime, RuntimeError};

/// Side length of the floor plane.
const FLOOR_SIZE: f32 = 100.0;

/// Meshes every room starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Room {
    pub floor: EntityId,
    pub indicator: EntityId,
}

/// Add the floor and the dwell indicator ring to `runtime`'s scene.
///
/// The floor is visual only; the physics world carries its own ground plane
/// at y = 0. Neither mesh is registered as a gaze target.
pub fn build_room(runtime: &mut Runtime) -> Result<Room, RuntimeError> {
    let floor = runtime.scene_mut().add(
        Mesh::new(
            "floor",
            Volume::Plane {
                width: FLOOR_SIZE,
                height: FLOOR_SIZE,
            },
        )
        .with_transform(Transform {
            rotation: Quat::from_rotation_x(-FRAC_PI_2),
            ..Transform::default()
        })
        .with_color(Color::LIGHT_GREY),
    );

    let searching = runtime.config().indicator.searching_color;
    let indicator = runtime
        .scene_mut()
        .add(Mesh::new("indicator", Volume::None).with_color(searching));
    runtime.attach_indicator(indicator)?;

    tracing::debug!(floor = %floor.short(), indicator = %indicator.short(), "room built");
    Ok(Room { floor, indicator })
}

/// Position just above the floor for a box of the given full `bounds`.
pub fn resting_on_floor(x: f32, z: f32, bounds: [f32; 3]) -> Vec3 {
    Vec3::new(x, bounds[1] * 0.5, z)
}
