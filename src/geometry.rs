//! Geometry primitives for picking.
//!
//! Rays, axis-aligned boxes, the display transform that places the model in
//! the world, and the intersection tests the picking pipeline runs against
//! meshes and hotspot spheres.

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Triangles whose determinant falls below this are treated as parallel to the ray.
const PARALLEL_EPSILON: f32 = 1e-8;

// ============================================================================
// Ray
// ============================================================================

/// A half-line with a normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray; the direction is normalized.
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

    /// Distance to the closest intersection with a sphere, if any.
    ///
    /// A ray starting inside the sphere reports the exit point.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrt_d = discriminant.sqrt();
        let near = -b - sqrt_d;
        if near >= 0.0 {
            return Some(near);
        }
        let far = -b + sqrt_d;
        (far >= 0.0).then_some(far)
    }

    /// Möller-Trumbore ray/triangle test. Both faces count as hits.
    pub fn intersect_triangle(&self, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let s = self.origin - v0;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = edge2.dot(q) * inv_det;
        (t >= 0.0).then_some(t)
    }

    /// Slab test against a box. Returns the entry distance (0 when inside).
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<f32> {
        let inv = self.direction.recip();
        let t1 = (aabb.min - self.origin) * inv;
        let t2 = (aabb.max - self.origin) * inv;
        let t_min = t1.min(t2);
        let t_max = t1.max(t2);
        // NaN components come from a zero direction axis with the origin on a slab plane
        let enter = [t_min.x, t_min.y, t_min.z]
            .into_iter()
            .filter(|t| !t.is_nan())
            .fold(f32::NEG_INFINITY, f32::max);
        let exit = [t_max.x, t_max.y, t_max.z]
            .into_iter()
            .filter(|t| !t.is_nan())
            .fold(f32::INFINITY, f32::min);
        if exit < enter.max(0.0) {
            return None;
        }
        Some(enter.max(0.0))
    }
}

// ============================================================================
// Axis-Aligned Bounding Box
// ============================================================================

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// An inverted box that any `grow` call will replace.
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.grow(*p);
        }
        aabb
    }

    pub fn grow(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

// ============================================================================
// Display Transform
// ============================================================================

/// Uniform scale followed by a translation; places the model in the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayTransform {
    pub scale: f32,
    pub offset: Vec3,
}

impl DisplayTransform {
    pub fn new(scale: f32, offset: Vec3) -> Self {
        Self { scale, offset }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.offset) * Mat4::from_scale(Vec3::splat(self.scale))
    }

    /// Model-local point to world.
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        local * self.scale + self.offset
    }

    /// World point to model-local.
    pub fn to_local(&self, world: Vec3) -> Vec3 {
        (world - self.offset) / self.scale
    }

    /// Remove only the translation; the result is still in display scale.
    pub fn untranslate(&self, world: Vec3) -> Vec3 {
        world - self.offset
    }

    /// Bring a world ray into model-local space.
    ///
    /// The direction is unchanged by a uniform scale, so a local distance `t`
    /// corresponds to a world distance of `t * scale`.
    pub fn ray_to_local(&self, ray: &Ray) -> Ray {
        Ray {
            origin: self.to_local(ray.origin),
            direction: ray.direction,
        }
    }
}

impl Default for DisplayTransform {
    fn default() -> Self {
        Self::new(1.0, Vec3::ZERO)
    }
}

// ============================================================================
// Screen Space
// ============================================================================

/// Axis-aligned rectangle in screen pixels (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of the given size centered on a point.
    pub fn centered(center: Vec2, width: f32, height: f32) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}
