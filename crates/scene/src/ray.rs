use dwellspace_common::Transform;
use glam::Vec3;

use crate::store::Volume;

const EPSILON: f32 = 1e-8;

/// A ray in world space. The direction is always unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at distance `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Distance along `ray` to the first intersection with `volume` placed by
/// `transform`, or `None` on a miss.
///
/// The ray is carried into the volume's local space without renormalizing
/// the direction, so the returned parameter is already a world distance.
/// Non-finite results (degenerate transforms) count as misses.
pub fn intersect_volume(ray: &Ray, transform: &Transform, volume: &Volume) -> Option<f32> {
    let inv_rot = transform.rotation.inverse();
    let origin = inv_rot * (ray.origin - transform.position) / transform.scale;
    let dir = inv_rot * ray.direction / transform.scale;
    if !origin.is_finite() || !dir.is_finite() {
        return None;
    }

    let t = match *volume {
        Volume::Box { half_extents } => {
            let h = Vec3::from_array(half_extents);
            intersect_box(origin, dir, -h, h)
        }
        Volume::Sphere { radius } => intersect_sphere(origin, dir, radius),
        Volume::Plane { width, height } => intersect_plane(origin, dir, width, height),
        Volume::None => None,
    }?;

    t.is_finite().then_some(t)
}

fn intersect_box(origin: Vec3, dir: Vec3, box_min: Vec3, box_max: Vec3) -> Option<f32> {
    // Clamp near-zero components so parallel rays become +/- infinity slabs.
    let inv_dir = Vec3::new(
        safe_recip(dir.x),
        safe_recip(dir.y),
        safe_recip(dir.z),
    );

    let t_min = (box_min - origin) * inv_dir;
    let t_max = (box_max - origin) * inv_dir;

    let t1 = t_min.min(t_max);
    let t2 = t_min.max(t_max);

    let t_near = t1.x.max(t1.y).max(t1.z);
    let t_far = t2.x.min(t2.y).min(t2.z);

    if t_near > t_far || t_far < 0.0 {
        return None;
    }

    // Origin inside the box: the exit point is the hit.
    if t_near < 0.0 { Some(t_far) } else { Some(t_near) }
}

fn safe_recip(v: f32) -> f32 {
    if v.abs() < EPSILON {
        1.0 / EPSILON.copysign(v)
    } else {
        1.0 / v
    }
}

fn intersect_sphere(origin: Vec3, dir: Vec3, radius: f32) -> Option<f32> {
    let a = dir.dot(dir);
    if a < EPSILON {
        return None;
    }
    let b = 2.0 * origin.dot(dir);
    let c = origin.dot(origin) - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let t0 = (-b - sqrt_disc) / (2.0 * a);
    let t1 = (-b + sqrt_disc) / (2.0 * a);
    if t0 >= 0.0 {
        Some(t0)
    } else if t1 >= 0.0 {
        Some(t1)
    } else {
        None
    }
}

fn intersect_plane(origin: Vec3, dir: Vec3, width: f32, height: f32) -> Option<f32> {
    if dir.z.abs() < EPSILON {
        return None;
    }
    let t = -origin.z / dir.z;
    if t < 0.0 {
        return None;
    }
    let hit = origin + dir * t;
    let (hw, hh) = (width * 0.5, height * 0.5);
    if hit.x < -hw || hit.x > hw || hit.y < -hh || hit.y > hh {
        return None;
    }
    Some(t)
}
