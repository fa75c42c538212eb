use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use dwellspace_common::{Color, Transform};
use dwellspace_interaction::TargetId;
use dwellspace_runtime::{Runtime, build_room, resting_on_floor};
use dwellspace_scene::{Mesh, Volume};
use glam::{Quat, Vec3};

const EYE_HEIGHT: f32 = 1.6;
const PANEL_BOUNDS: [f32; 3] = [0.8, 0.8, 0.05];
const CRATE_BOUNDS: [f32; 3] = [0.6, 0.6, 0.6];

const PANELS: [(&str, u32, f32); 3] = [
    ("red", 0xe04040, -1.2),
    ("green", 0x40c060, 0.0),
    ("blue", 0x4060e0, 1.2),
];

/// Selections in the order they fired, shared with the panel actions.
pub type SelectionLog = Rc<RefCell<Vec<String>>>;

pub struct Demo {
    /// Panel name to gaze target and look-at point.
    pub panels: BTreeMap<String, (TargetId, Vec3)>,
    pub selections: SelectionLog,
}

/// Floor, a few falling crates, and three selectable panels at eye height
/// 2.5m in front of a standing viewer.
pub fn build(runtime: &mut Runtime) -> anyhow::Result<Demo> {
    build_room(runtime)?;
    runtime.camera_mut().head.position = Vec3::new(0.0, EYE_HEIGHT, 0.0);

    for (i, x) in [-2.0_f32, 0.5, 2.5].into_iter().enumerate() {
        let mut start = resting_on_floor(x, -5.0, CRATE_BOUNDS);
        start.y += 2.0 + i as f32;
        let mesh = runtime.scene_mut().add(
            Mesh::new(format!("crate-{i}"), Volume::cuboid(CRATE_BOUNDS))
                .with_transform(Transform {
                    position: start,
                    rotation: Quat::from_rotation_y(0.3 * i as f32),
                    ..Transform::default()
                })
                .with_color(Color::rgb(150, 110, 70)),
        );
        runtime.add_physics_box(mesh, CRATE_BOUNDS, 1.0)?;
    }

    let selections: SelectionLog = Rc::default();
    let mut panels = BTreeMap::new();
    for (name, color, x) in PANELS {
        let position = Vec3::new(x, EYE_HEIGHT, -2.5);
        let mesh = runtime.scene_mut().add(
            Mesh::new(name, Volume::cuboid(PANEL_BOUNDS))
                .with_transform(Transform::from_position(position))
                .with_color(Color(color)),
        );
        let log = Rc::clone(&selections);
        let label = name.to_string();
        let target = runtime.register_target(mesh, move || {
            tracing::info!(panel = %label, "panel selected");
            log.borrow_mut().push(label.clone());
        })?;
        panels.insert(name.to_string(), (target, position));
    }

    Ok(Demo {
        panels,
        selections,
    })
}

impl Demo {
    /// Point the head at the named panel, or up at the empty sky for `None`.
    pub fn aim(&self, runtime: &mut Runtime, target: Option<&str>) -> anyhow::Result<()> {
        let point = match target {
            Some(name) => match self.panels.get(name) {
                Some((_, position)) => *position,
                None => anyhow::bail!(
                    "unknown panel '{name}', expected one of: {}",
                    self.panels.keys().cloned().collect::<Vec<_>>().join(", ")
                ),
            },
            None => runtime.camera().world_position() + Vec3::new(0.0, 10.0, -1.0),
        };
        runtime.camera_mut().look_at(point);
        Ok(())
    }

    pub fn panel_name(&self, target: TargetId) -> Option<&str> {
        self.panels
            .iter()
            .find(|(_, (id, _))| *id == target)
            .map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dwellspace_runtime::RuntimeConfig;
    use std::time::Duration;

    #[test]
    fn demo_room_has_three_targets_and_bodies() {
        let mut rt = Runtime::new(RuntimeConfig::default()).unwrap();
        let demo = build(&mut rt).unwrap();
        assert_eq!(rt.registry().len(), 3);
        assert_eq!(rt.physics().bindings().len(), 3);
        assert_eq!(demo.panels.len(), 3);
        assert!(rt.scene().find_by_name("floor").is_some());
    }

    #[test]
    fn aiming_at_a_panel_selects_it() {
        let mut rt = Runtime::new(RuntimeConfig::default()).unwrap();
        let demo = build(&mut rt).unwrap();
        rt.session_started();
        rt.mount();
        demo.aim(&mut rt, Some("green")).unwrap();

        for _ in 0..100 {
            rt.pump(Duration::from_millis(20)).unwrap();
        }
        assert_eq!(*demo.selections.borrow(), vec!["green".to_string()]);
    }

    #[test]
    fn aiming_at_nothing_hits_nothing() {
        let mut rt = Runtime::new(RuntimeConfig::default()).unwrap();
        let demo = build(&mut rt).unwrap();
        rt.mount();
        demo.aim(&mut rt, None).unwrap();
        assert!(rt.pump(Duration::from_millis(20)).unwrap().gaze.is_none());
        assert!(demo.aim(&mut rt, Some("purple")).is_err());
    }
}
