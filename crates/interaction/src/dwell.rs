use dwellspace_common::EntityId;
use dwellspace_scene::{CameraRig, Scene};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::hover::HoverState;
use crate::indicator::{IndicatorState, IndicatorStyle};
use crate::session::SessionState;
use crate::target::{InteractionError, InteractionRegistry, TargetId};

/// Dwell timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DwellConfig {
    /// Period of the dwell interval in milliseconds.
    pub interval_ms: u64,
    /// Progress added per interval tick on the locked target.
    pub step: f32,
    /// Progress at which the dwell completes.
    pub threshold: f32,
}

impl Default for DwellConfig {
    fn default() -> Self {
        Self {
            interval_ms: 20,
            step: 0.01,
            threshold: 1.0,
        }
    }
}

impl DwellConfig {
    /// Consecutive ticks needed to complete a dwell. The tick that acquires a
    /// target counts as the first one.
    pub fn ticks_to_complete(&self) -> u32 {
        // Tolerance keeps 1.0 / 0.01 at 100 despite f32 rounding.
        let ratio = self.threshold / self.step;
        (ratio - 1e-4).ceil().max(1.0) as u32
    }
}

/// What a single controller tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DwellOutcome {
    /// Session inactive: nothing read, nothing written.
    Suspended,
    /// Nothing locked and nothing under the gaze.
    Idle,
    /// A new target was locked; its first tick is already counted.
    Acquired { target: TargetId, progress: f32 },
    /// Still on the locked target.
    Progressed { target: TargetId, progress: f32 },
    /// Gaze left the locked target; the progress shown was discarded.
    Reset { target: TargetId, progress: f32 },
    /// Threshold reached, the action fired, back to idle.
    Completed { target: TargetId },
}

/// Fixed-interval dwell state machine.
///
/// Idle -> Dwelling when the gaze rests on a target; Dwelling accumulates
/// one step per tick while the gaze stays; any other current target (or
/// none) drops back to Idle with progress zero; reaching the threshold fires
/// the action once and returns to Idle in the same tick. While the session is
/// inactive every tick is a no-op and the dwell is frozen as it stands.
#[derive(Debug)]
pub struct DwellController {
    config: DwellConfig,
    ticks_to_complete: u32,
    style: IndicatorStyle,
    indicator: Option<EntityId>,
    completions: u64,
}

impl DwellController {
    pub fn new(config: DwellConfig, style: IndicatorStyle) -> Self {
        let ticks_to_complete = config.ticks_to_complete();
        Self {
            config,
            ticks_to_complete,
            style,
            indicator: None,
            completions: 0,
        }
    }

    pub fn config(&self) -> &DwellConfig {
        &self.config
    }

    pub fn ticks_to_complete(&self) -> u32 {
        self.ticks_to_complete
    }

    /// Dwells completed so far.
    pub fn completions(&self) -> u64 {
        self.completions
    }

    /// Wire a scene mesh in as the visual indicator.
    pub fn attach_indicator(&mut self, mesh: EntityId) {
        self.indicator = Some(mesh);
    }

    pub fn indicator_mesh(&self) -> Option<EntityId> {
        self.indicator
    }

    /// One interval tick.
    pub fn tick(
        &mut self,
        hover: &mut HoverState,
        session: SessionState,
        registry: &mut InteractionRegistry,
    ) -> Result<DwellOutcome, InteractionError> {
        if !session.is_active() {
            return Ok(DwellOutcome::Suspended);
        }
        hover.assert_consistent();

        let (step, threshold) = (self.config.step, self.config.threshold);
        let outcome = match (hover.locked_target(), hover.current_target()) {
            (None, None) => DwellOutcome::Idle,
            (None, Some(target)) => {
                hover.lock(target);
                hover.advance(step, threshold);
                tracing::debug!(target_id = target.0, "dwell target acquired");
                DwellOutcome::Acquired {
                    target,
                    progress: hover.dwell_progress(),
                }
            }
            (Some(locked), Some(current)) if locked == current => {
                hover.advance(step, threshold);
                DwellOutcome::Progressed {
                    target: locked,
                    progress: hover.dwell_progress(),
                }
            }
            (Some(locked), _) => {
                let progress = hover.dwell_progress();
                hover.release();
                tracing::debug!(target_id = locked.0, progress, "dwell reset");
                DwellOutcome::Reset {
                    target: locked,
                    progress,
                }
            }
        };

        let outcome = match outcome {
            DwellOutcome::Acquired { target, .. } | DwellOutcome::Progressed { target, .. }
                if hover.dwell_ticks() >= self.ticks_to_complete =>
            {
                hover.release();
                registry.invoke(target)?;
                self.completions += 1;
                tracing::info!(target_id = target.0, completions = self.completions, "dwell completed");
                DwellOutcome::Completed { target }
            }
            other => other,
        };

        hover.assert_consistent();
        Ok(outcome)
    }

    /// Drop any dwell in flight along with the last gaze result, as when the
    /// host stops ticking. Returns the target that was locked, if any.
    pub fn cancel(&self, hover: &mut HoverState) -> Option<TargetId> {
        let locked = hover.locked_target();
        if let Some(target) = locked {
            tracing::debug!(target_id = target.0, progress = hover.dwell_progress(), "dwell cancelled");
        }
        hover.release();
        hover.set_current(None);
        hover.assert_consistent();
        locked
    }

    /// Indicator appearance for the current hover state.
    pub fn indicator(&self, hover: &HoverState) -> IndicatorState {
        self.style.resolve(hover, self.config.threshold)
    }

    /// Place the attached indicator mesh in front of the eye and apply the
    /// resolved scale and color. Called once per render frame.
    pub fn render_indicator(&self, hover: &HoverState, camera: &CameraRig, scene: &mut Scene) {
        let Some(mesh) = self.indicator.and_then(|id| scene.get_mut(id)) else {
            return;
        };
        let state = self.indicator(hover);
        let pose = camera.world_pose();
        mesh.transform.position = pose.position + camera.forward() * self.style.distance;
        mesh.transform.rotation = pose.rotation;
        mesh.transform.scale = Vec3::splat(state.scale);
        mesh.color = state.color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dwellspace_scene::{Mesh, Volume};
    use std::cell::Cell;
    use std::rc::Rc;

    struct Rig {
        controller: DwellController,
        hover: HoverState,
        registry: InteractionRegistry,
        fired: Vec<Rc<Cell<u32>>>,
        ids: Vec<TargetId>,
    }

    impl Rig {
        fn with_targets(n: usize) -> Self {
            let mut registry = InteractionRegistry::new();
            let mut fired = Vec::new();
            let mut ids = Vec::new();
            for _ in 0..n {
                let count = Rc::new(Cell::new(0));
                let c = count.clone();
                ids.push(registry.register(EntityId::new(), move || c.set(c.get() + 1)));
                fired.push(count);
            }
            Self {
                controller: DwellController::new(DwellConfig::default(), IndicatorStyle::default()),
                hover: HoverState::new(),
                registry,
                fired,
                ids,
            }
        }

        /// Report `target` as the gaze result, then run one active tick.
        fn tick_on(&mut self, target: Option<TargetId>) -> DwellOutcome {
            self.tick_with(target, SessionState::Active)
        }

        fn tick_with(&mut self, target: Option<TargetId>, session: SessionState) -> DwellOutcome {
            self.hover.set_current(target);
            self.controller
                .tick(&mut self.hover, session, &mut self.registry)
                .unwrap()
        }
    }

    #[test]
    fn default_dwell_takes_one_hundred_ticks() {
        assert_eq!(DwellConfig::default().ticks_to_complete(), 100);
        let odd = DwellConfig {
            step: 0.3,
            ..DwellConfig::default()
        };
        assert_eq!(odd.ticks_to_complete(), 4);
    }

    #[test]
    fn cancel_drops_lock_progress_and_gaze() {
        let mut rig = Rig::with_targets(1);
        let t = rig.ids[0];
        for _ in 0..40 {
            rig.tick_on(Some(t));
        }
        assert_eq!(rig.controller.cancel(&mut rig.hover), Some(t));
        assert!(rig.hover.locked_target().is_none());
        assert!(rig.hover.current_target().is_none());
        assert_eq!(rig.hover.dwell_progress(), 0.0);
        assert_eq!(rig.controller.cancel(&mut rig.hover), None);

        // A fresh dwell needs the full tick count again.
        for _ in 0..99 {
            rig.tick_on(Some(t));
        }
        assert_eq!(rig.fired[0].get(), 0);
        assert_eq!(rig.tick_on(Some(t)), DwellOutcome::Completed { target: t });
    }

    #[test]
    fn idle_without_target() {
        let mut rig = Rig::with_targets(1);
        assert_eq!(rig.tick_on(None), DwellOutcome::Idle);
        assert!(rig.hover.locked_target().is_none());
    }

    #[test]
    fn hundred_ticks_fire_exactly_once() {
        let mut rig = Rig::with_targets(1);
        let t = rig.ids[0];
        for i in 0..99 {
            let outcome = rig.tick_on(Some(t));
            assert!(!matches!(outcome, DwellOutcome::Completed { .. }), "early completion at {i}");
        }
        assert_eq!(rig.fired[0].get(), 0);

        assert_eq!(rig.tick_on(Some(t)), DwellOutcome::Completed { target: t });
        assert_eq!(rig.fired[0].get(), 1);
        assert_eq!(rig.hover.dwell_progress(), 0.0);
        assert!(rig.hover.locked_target().is_none());
        assert_eq!(rig.controller.completions(), 1);
    }

    #[test]
    fn continued_gaze_needs_a_fresh_full_dwell() {
        let mut rig = Rig::with_targets(1);
        let t = rig.ids[0];
        for _ in 0..100 {
            rig.tick_on(Some(t));
        }
        assert_eq!(rig.fired[0].get(), 1);
        for _ in 0..99 {
            rig.tick_on(Some(t));
        }
        assert_eq!(rig.fired[0].get(), 1);
        rig.tick_on(Some(t));
        assert_eq!(rig.fired[0].get(), 2);
    }

    #[test]
    fn progress_only_grows_while_on_locked_target() {
        let mut rig = Rig::with_targets(1);
        let t = rig.ids[0];
        let mut last = 0.0;
        for _ in 0..60 {
            rig.tick_on(Some(t));
            let p = rig.hover.dwell_progress();
            assert!(p > last);
            last = p;
        }
    }

    #[test]
    fn looking_away_for_one_tick_resets() {
        let mut rig = Rig::with_targets(1);
        let t = rig.ids[0];
        for _ in 0..50 {
            rig.tick_on(Some(t));
        }
        assert!((rig.hover.dwell_progress() - 0.5).abs() < 1e-5);

        let outcome = rig.tick_on(None);
        assert!(matches!(outcome, DwellOutcome::Reset { target, .. } if target == t));
        assert!(rig.hover.locked_target().is_none());
        assert_eq!(rig.hover.dwell_progress(), 0.0);

        for _ in 0..99 {
            rig.tick_on(Some(t));
        }
        assert_eq!(rig.fired[0].get(), 0);
        rig.tick_on(Some(t));
        assert_eq!(rig.fired[0].get(), 1);
    }

    #[test]
    fn switching_target_resets_then_acquires_new() {
        let mut rig = Rig::with_targets(2);
        let (a, b) = (rig.ids[0], rig.ids[1]);
        for _ in 0..30 {
            rig.tick_on(Some(a));
        }
        assert!(matches!(rig.tick_on(Some(b)), DwellOutcome::Reset { target, .. } if target == a));
        assert_eq!(rig.hover.dwell_progress(), 0.0);
        assert!(matches!(rig.tick_on(Some(b)), DwellOutcome::Acquired { target, .. } if target == b));
        assert_eq!(rig.hover.locked_target(), Some(b));
    }

    #[test]
    fn inactive_session_freezes_progress() {
        let mut rig = Rig::with_targets(1);
        let t = rig.ids[0];
        for _ in 0..30 {
            rig.tick_on(Some(t));
        }
        let frozen = rig.hover.dwell_progress();
        assert!((frozen - 0.3).abs() < 1e-5);

        for target in [Some(t), None, Some(t)] {
            assert_eq!(rig.tick_with(target, SessionState::Inactive), DwellOutcome::Suspended);
            assert_eq!(rig.hover.dwell_progress(), frozen);
            assert_eq!(rig.hover.locked_target(), Some(t));
        }

        // Resumed with the gaze still on the target: carry on from 0.30.
        rig.tick_on(Some(t));
        assert!((rig.hover.dwell_progress() - 0.31).abs() < 1e-5);
    }

    #[test]
    fn never_fires_while_inactive() {
        let mut rig = Rig::with_targets(1);
        let t = rig.ids[0];
        for _ in 0..99 {
            rig.tick_on(Some(t));
        }
        for _ in 0..500 {
            rig.tick_with(Some(t), SessionState::Inactive);
        }
        assert_eq!(rig.fired[0].get(), 0);
        rig.tick_on(Some(t));
        assert_eq!(rig.fired[0].get(), 1);
    }

    #[test]
    fn unknown_locked_target_surfaces_error_and_releases() {
        let mut controller = DwellController::new(
            DwellConfig {
                step: 1.0,
                ..DwellConfig::default()
            },
            IndicatorStyle::default(),
        );
        let mut registry = InteractionRegistry::new();
        let mut hover = HoverState::new();
        hover.set_current(Some(TargetId(7)));
        let err = controller
            .tick(&mut hover, SessionState::Active, &mut registry)
            .unwrap_err();
        assert!(matches!(err, InteractionError::UnknownTarget(TargetId(7))));
        assert!(hover.locked_target().is_none());
    }

    #[test]
    fn indicator_follows_gaze_and_progress() {
        let mut scene = Scene::new();
        let ring = scene.add(Mesh::new("ring", Volume::None));
        let mut rig = Rig::with_targets(1);
        rig.controller.attach_indicator(ring);
        let camera = CameraRig::default();

        rig.controller.render_indicator(&rig.hover, &camera, &mut scene);
        let mesh = scene.get(ring).unwrap();
        assert_eq!(mesh.color, IndicatorStyle::default().searching_color);
        assert_eq!(mesh.transform.scale, Vec3::ONE);
        assert!((mesh.transform.position - Vec3::new(0.0, 0.0, -1.5)).length() < 1e-5);

        let t = rig.ids[0];
        for _ in 0..50 {
            rig.tick_on(Some(t));
        }
        rig.controller.render_indicator(&rig.hover, &camera, &mut scene);
        let mesh = scene.get(ring).unwrap();
        assert_eq!(mesh.color, IndicatorStyle::default().locked_color);
        assert!((mesh.transform.scale.x - 0.5).abs() < 1e-4);
    }
}
