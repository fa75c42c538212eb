use std::time::Duration;

use dwellspace_common::EntityId;
use dwellspace_interaction::{
    DwellController, DwellOutcome, GazeHit, GazeRaycaster, HoverState, InteractionError,
    InteractionRegistry, Invocable, SessionGate, SessionState, TargetId,
};
use dwellspace_physics::{PhysicsBinding, PhysicsError, PhysicsSync, SyncStats};
use dwellspace_scene::{CameraRig, Scene, SceneError};

use crate::clock::{Dispatch, FrameClock, TaskGuard};
use crate::config::{ConfigError, RuntimeConfig};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Physics(#[from] PhysicsError),
    #[error(transparent)]
    Interaction(#[from] InteractionError),
}

/// What one display refresh did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    /// Whether the frame task ran (false while unmounted).
    pub rendered: bool,
    pub physics: SyncStats,
    pub gaze: Option<GazeHit>,
    /// Outcomes of the dwell ticks that fell due during this refresh, in order.
    pub dwell: Vec<DwellOutcome>,
    pub current_target: Option<TargetId>,
    pub locked_target: Option<TargetId>,
    pub progress: f32,
    pub session: SessionState,
}

impl FrameReport {
    /// Targets whose action fired during this refresh.
    pub fn completions(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.dwell.iter().filter_map(|o| match o {
            DwellOutcome::Completed { target } => Some(*target),
            _ => None,
        })
    }
}

struct Mounted {
    frame: TaskGuard,
    dwell: TaskGuard,
}

/// Owns every component and wires the frame task and the dwell interval
/// onto one [`FrameClock`].
///
/// Frame task, per refresh: step physics and sync meshes, cast the gaze ray,
/// place the indicator. Interval task, every `dwell.interval_ms`: tick the
/// dwell controller. The two share nothing but the [`HoverState`].
pub struct Runtime {
    config: RuntimeConfig,
    clock: FrameClock,
    mounted: Option<Mounted>,
    scene: Scene,
    camera: CameraRig,
    physics: PhysicsSync,
    registry: InteractionRegistry,
    hover: HoverState,
    raycaster: GazeRaycaster,
    dwell: DwellController,
    session: SessionGate,
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        config.validate()?;
        let mut camera = CameraRig::default();
        camera.near = config.gaze.min_distance;
        camera.far = config.gaze.max_distance;
        Ok(Self {
            clock: FrameClock::new(),
            mounted: None,
            scene: Scene::new(),
            camera,
            physics: PhysicsSync::from_config(&config.physics),
            registry: InteractionRegistry::new(),
            hover: HoverState::new(),
            raycaster: GazeRaycaster::new(config.gaze.clone()),
            dwell: DwellController::new(config.dwell.clone(), config.indicator.clone()),
            session: SessionGate::new(),
            config,
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    /// Head pose and dolly are written by the host between refreshes.
    pub fn camera_mut(&mut self) -> &mut CameraRig {
        &mut self.camera
    }

    pub fn physics(&self) -> &PhysicsSync {
        &self.physics
    }

    pub fn registry(&self) -> &InteractionRegistry {
        &self.registry
    }

    pub fn hover(&self) -> &HoverState {
        &self.hover
    }

    pub fn dwell(&self) -> &DwellController {
        &self.dwell
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Make a scene mesh selectable by gaze.
    pub fn register_target(
        &mut self,
        mesh: EntityId,
        action: impl Into<Invocable>,
    ) -> Result<TargetId, RuntimeError> {
        self.scene.require(mesh)?;
        Ok(self.registry.register(mesh, action))
    }

    /// Give a scene mesh a box body. Mass zero makes it static.
    pub fn add_physics_box(
        &mut self,
        mesh: EntityId,
        bounds: [f32; 3],
        mass: f32,
    ) -> Result<PhysicsBinding, RuntimeError> {
        Ok(self.physics.add_box(&self.scene, mesh, bounds, mass)?)
    }

    pub fn attach_indicator(&mut self, mesh: EntityId) -> Result<(), RuntimeError> {
        self.scene.require(mesh)?;
        self.dwell.attach_indicator(mesh);
        Ok(())
    }

    pub fn session_started(&mut self) -> bool {
        self.session.session_started()
    }

    pub fn session_ended(&mut self) -> bool {
        self.session.session_ended()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Start the frame task and the dwell interval. Returns false if already
    /// mounted.
    pub fn mount(&mut self) -> bool {
        if self.mounted.is_some() {
            tracing::debug!("runtime already mounted");
            return false;
        }
        let frame = self.clock.schedule_frame();
        let dwell = self.clock.schedule_interval(self.config.dwell_interval());
        tracing::info!(
            interval_ms = self.config.dwell.interval_ms,
            targets = self.registry.len(),
            "runtime mounted"
        );
        self.mounted = Some(Mounted { frame, dwell });
        true
    }

    /// Cancel both tasks and drop any dwell in flight. Nothing fires after
    /// this returns, and a later mount starts from an idle hover state.
    pub fn teardown(&mut self) -> bool {
        match self.mounted.take() {
            Some(_) => {
                self.dwell.cancel(&mut self.hover);
                self.dwell
                    .render_indicator(&self.hover, &self.camera, &mut self.scene);
                tracing::info!(frames = self.clock.frames(), "runtime torn down");
                true
            }
            None => false,
        }
    }

    /// Run one display refresh of length `frame_dt`.
    pub fn pump(&mut self, frame_dt: Duration) -> Result<FrameReport, RuntimeError> {
        let dispatches = self.clock.advance(frame_dt);
        let mut report = FrameReport {
            frame: self.clock.frames(),
            ..FrameReport::default()
        };
        let _span = tracing::debug_span!("pump", frame = report.frame).entered();

        for dispatch in dispatches {
            let Some((frame_task, dwell_task)) = self
                .mounted
                .as_ref()
                .map(|m| (m.frame.id(), m.dwell.id()))
            else {
                break;
            };
            match dispatch {
                Dispatch::Frame { task, dt, .. } if task == frame_task => {
                    self.run_frame(dt, &mut report);
                }
                Dispatch::Interval { task, seq } if task == dwell_task => {
                    let _tick = tracing::trace_span!("dwell_tick", seq).entered();
                    let outcome = self
                        .dwell
                        .tick(&mut self.hover, self.session.state(), &mut self.registry)?;
                    report.dwell.push(outcome);
                }
                other => tracing::trace!(task = other.task().0, "stale dispatch ignored"),
            }
        }

        report.current_target = self.hover.current_target();
        report.locked_target = self.hover.locked_target();
        report.progress = self.hover.dwell_progress();
        report.session = self.session.state();
        Ok(report)
    }

    fn run_frame(&mut self, dt: Duration, report: &mut FrameReport) {
        report.rendered = true;
        report.physics = self.physics.advance(dt.as_secs_f32(), &mut self.scene);
        report.gaze = self
            .raycaster
            .update(&self.camera, &self.scene, &self.registry, &mut self.hover);
        self.dwell
            .render_indicator(&self.hover, &self.camera, &mut self.scene);
    }
}
