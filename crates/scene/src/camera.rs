use dwellspace_common::Transform;
use glam::{Mat4, Quat, Vec3};

use crate::ray::Ray;

/// Camera carried by a dolly.
///
/// The dolly is the locomotion transform (where the player stands in the
/// room). The head pose is local to the dolly and comes from the XR runtime
/// each frame, or from `look_at` on desktop and in headless runs.
/// Camera forward is -Z, matching the XR convention.
#[derive(Debug, Clone, Copy)]
pub struct CameraRig {
    pub dolly: Transform,
    pub head: Transform,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            dolly: Transform::default(),
            head: Transform::default(),
            fov: 50.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 200.0,
        }
    }
}

impl CameraRig {
    /// Replace the head pose with one reported by the XR runtime.
    pub fn set_head_pose(&mut self, position: Vec3, rotation: Quat) {
        self.head.position = position;
        self.head.rotation = rotation;
    }

    /// Camera pose in world space.
    pub fn world_pose(&self) -> Transform {
        self.dolly.mul_transform(&self.head)
    }

    pub fn world_position(&self) -> Vec3 {
        self.world_pose().position
    }

    pub fn forward(&self) -> Vec3 {
        (self.world_pose().rotation * Vec3::NEG_Z).normalize()
    }

    /// Ray from the eye along the view direction.
    pub fn gaze_ray(&self) -> Ray {
        let pose = self.world_pose();
        Ray::new(pose.position, pose.rotation * Vec3::NEG_Z)
    }

    /// Turn the head so the camera faces `point` in world space.
    /// Does nothing if the point coincides with the eye.
    pub fn look_at(&mut self, point: Vec3) {
        let eye = self.world_position();
        let dir = point - eye;
        if dir.length_squared() < 1e-12 {
            return;
        }
        let world_rot = Quat::from_rotation_arc(Vec3::NEG_Z, dir.normalize());
        self.head.rotation = self.dolly.rotation.inverse() * world_rot;
    }

    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.world_position();
        Mat4::look_at_rh(eye, eye + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Update the aspect ratio after a viewport resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}
