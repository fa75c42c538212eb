use std::fmt::Write as _;

use dwellspace_scene::{CameraRig, Scene};
use glam::{Mat4, Vec2, Vec3};

/// Camera state a renderer needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    pub eye: Vec3,
    pub forward: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub view_proj: Mat4,
}

impl RenderView {
    pub fn from_camera(camera: &CameraRig) -> Self {
        Self {
            eye: camera.world_position(),
            forward: camera.forward(),
            fov_degrees: camera.fov.to_degrees(),
            view_proj: camera.projection_matrix() * camera.view_matrix(),
        }
    }

    /// Normalized device coordinates of `point`, or None when it is behind
    /// the eye or outside the frustum.
    pub fn project(&self, point: Vec3) -> Option<Vec2> {
        let clip = self.view_proj * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let inside = ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0 && (0.0..=1.0).contains(&ndc.z);
        inside.then(|| Vec2::new(ndc.x, ndc.y))
    }
}

impl Default for RenderView {
    fn default() -> Self {
        Self::from_camera(&CameraRig::default())
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and a view, then produces output. It never
/// mutates the scene.
pub trait Renderer {
    type Output;

    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Text renderer for the headless host and tests: one line per mesh with
/// its pose, color, and whether it lands on screen.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// Include hidden meshes in the listing.
    pub show_hidden: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Scene ({} meshes) ===", scene.len());
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) forward=({:.2}, {:.2}, {:.2}) fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.forward.x,
            view.forward.y,
            view.forward.z,
            view.fov_degrees
        );

        for (id, mesh) in scene.meshes() {
            if !mesh.visible && !self.show_hidden {
                continue;
            }
            let t = &mesh.transform;
            let p = t.position;
            let screen = match view.project(p) {
                Some(ndc) => format!("({:+.2}, {:+.2})", ndc.x, ndc.y),
                None => "off".to_string(),
            };
            let _ = writeln!(
                out,
                "  [{}] {:<12} pos=({:.2}, {:.2}, {:.2}) scale={:.2} color={}{} screen={}",
                id.short(),
                mesh.name,
                p.x,
                p.y,
                p.z,
                t.scale.x,
                mesh.color.to_hex(),
                if mesh.visible { "" } else { " hidden" },
                screen
            );
        }
        tracing::trace!(meshes = scene.len(), bytes = out.len(), "debug frame rendered");
        out
    }
}
