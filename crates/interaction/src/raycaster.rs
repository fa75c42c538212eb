use dwellspace_common::EntityId;
use dwellspace_scene::{CameraRig, Ray, Scene, intersect_volume};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::hover::HoverState;
use crate::target::{InteractionRegistry, TargetId};

/// Range limits for the gaze ray.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    /// Hits closer than this are ignored (camera near plane).
    pub min_distance: f32,
    /// Hits farther than this are ignored (camera far plane).
    pub max_distance: f32,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            min_distance: 0.1,
            max_distance: 200.0,
        }
    }
}

/// The winning intersection of one gaze raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeHit {
    pub target: TargetId,
    pub mesh: EntityId,
    pub distance: f32,
    pub point: Vec3,
}

/// Casts the gaze ray against every registered target once per frame.
#[derive(Debug, Clone, Default)]
pub struct GazeRaycaster {
    config: GazeConfig,
}

impl GazeRaycaster {
    pub fn new(config: GazeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GazeConfig {
        &self.config
    }

    /// Nearest registered target along `ray`.
    ///
    /// Every target is tested and the smallest distance wins; on an exact tie
    /// the earlier registration is kept. Hidden meshes, meshes missing from
    /// the scene, and hits outside the configured range are skipped.
    pub fn cast(&self, ray: &Ray, scene: &Scene, registry: &InteractionRegistry) -> Option<GazeHit> {
        let mut best: Option<GazeHit> = None;
        for (id, target) in registry.iter() {
            let Some(mesh) = scene.get(target.mesh) else {
                tracing::trace!(target_id = id.0, "target mesh not in scene");
                continue;
            };
            if !mesh.visible {
                continue;
            }
            let Some(t) = intersect_volume(ray, &mesh.transform, &mesh.volume) else {
                continue;
            };
            if t < self.config.min_distance || t > self.config.max_distance {
                continue;
            }
            if best.is_none_or(|b| t < b.distance) {
                best = Some(GazeHit {
                    target: id,
                    mesh: target.mesh,
                    distance: t,
                    point: ray.at(t),
                });
            }
        }
        best
    }

    /// Raycast from the camera's current world pose and publish the result as
    /// the hover state's current target.
    pub fn update(
        &self,
        camera: &CameraRig,
        scene: &Scene,
        registry: &InteractionRegistry,
        hover: &mut HoverState,
    ) -> Option<GazeHit> {
        let hit = self.cast(&camera.gaze_ray(), scene, registry);
        let target = hit.map(|h| h.target);
        if target != hover.current_target() {
            tracing::trace!(from = ?hover.current_target(), to = ?target, "gaze target changed");
        }
        hover.set_current(target);
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Invocable;
    use dwellspace_common::Transform;
    use dwellspace_scene::{Mesh, Volume};

    fn panel_at(scene: &mut Scene, name: &str, z: f32) -> EntityId {
        scene.add(
            Mesh::new(name, Volume::cuboid([1.0, 1.0, 0.2]))
                .with_transform(Transform::from_position(Vec3::new(0.0, 0.0, z))),
        )
    }

    fn forward() -> Ray {
        Ray::new(Vec3::ZERO, Vec3::NEG_Z)
    }

    #[test]
    fn empty_registry_hits_nothing() {
        let scene = Scene::new();
        let reg = InteractionRegistry::new();
        assert!(GazeRaycaster::default().cast(&forward(), &scene, &reg).is_none());
    }

    #[test]
    fn nearest_hit_wins_regardless_of_registration_order() {
        let mut scene = Scene::new();
        let far = panel_at(&mut scene, "far", -2.1);
        let near = panel_at(&mut scene, "near", -1.1);

        let mut reg = InteractionRegistry::new();
        reg.register(far, Invocable::noop());
        let near_id = reg.register(near, Invocable::noop());

        let hit = GazeRaycaster::default()
            .cast(&forward(), &scene, &reg)
            .unwrap();
        assert_eq!(hit.target, near_id);
        assert!((hit.distance - 1.0).abs() < 1e-4);
    }

    #[test]
    fn overlapping_volumes_pick_closer_entry() {
        let mut scene = Scene::new();
        let big = scene.add(
            Mesh::new("big", Volume::cuboid([4.0, 4.0, 4.0]))
                .with_transform(Transform::from_position(Vec3::new(0.0, 0.0, -4.0))),
        );
        let small = panel_at(&mut scene, "small", -3.0);

        let mut reg = InteractionRegistry::new();
        let big_id = reg.register(big, Invocable::noop());
        reg.register(small, Invocable::noop());

        // Big box front face at 2.0, small panel at 2.9.
        let hit = GazeRaycaster::default()
            .cast(&forward(), &scene, &reg)
            .unwrap();
        assert_eq!(hit.target, big_id);
    }

    #[test]
    fn exact_tie_keeps_first_registered() {
        let mut scene = Scene::new();
        let a = panel_at(&mut scene, "a", -2.0);
        let b = panel_at(&mut scene, "b", -2.0);
        let mut reg = InteractionRegistry::new();
        let a_id = reg.register(a, Invocable::noop());
        reg.register(b, Invocable::noop());

        let hit = GazeRaycaster::default()
            .cast(&forward(), &scene, &reg)
            .unwrap();
        assert_eq!(hit.target, a_id);
    }

    #[test]
    fn hidden_and_out_of_range_targets_are_skipped() {
        let mut scene = Scene::new();
        let hidden = panel_at(&mut scene, "hidden", -1.0);
        scene.get_mut(hidden).unwrap().visible = false;
        let distant = panel_at(&mut scene, "distant", -50.0);

        let mut reg = InteractionRegistry::new();
        reg.register(hidden, Invocable::noop());
        reg.register(distant, Invocable::noop());

        let caster = GazeRaycaster::new(GazeConfig {
            min_distance: 0.1,
            max_distance: 10.0,
        });
        assert!(caster.cast(&forward(), &scene, &reg).is_none());
    }

    #[test]
    fn update_writes_current_target() {
        let mut scene = Scene::new();
        let panel = panel_at(&mut scene, "panel", -3.0);
        let mut reg = InteractionRegistry::new();
        let id = reg.register(panel, Invocable::noop());
        let mut hover = HoverState::new();
        let mut camera = CameraRig::default();
        let caster = GazeRaycaster::default();

        caster.update(&camera, &scene, &reg, &mut hover);
        assert_eq!(hover.current_target(), Some(id));

        camera.look_at(Vec3::new(10.0, 0.0, 0.0));
        caster.update(&camera, &scene, &reg, &mut hover);
        assert_eq!(hover.current_target(), None);
    }

    #[test]
    fn update_never_touches_lock() {
        let mut scene = Scene::new();
        let panel = panel_at(&mut scene, "panel", -3.0);
        let mut reg = InteractionRegistry::new();
        let id = reg.register(panel, Invocable::noop());
        let mut hover = HoverState::new();
        hover.lock(id);
        hover.advance(0.01, 1.0);

        let mut camera = CameraRig::default();
        camera.look_at(Vec3::new(0.0, 10.0, 0.0));
        GazeRaycaster::default().update(&camera, &scene, &reg, &mut hover);
        assert_eq!(hover.locked_target(), Some(id));
        assert!(hover.dwell_progress() > 0.0);
    }
}
