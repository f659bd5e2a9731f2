//! Orbit camera.
//!
//! Orbits a target point with yaw/pitch, zooms along the view axis within
//! distance limits and optionally pans the target in the view plane. Provides
//! the view/projection matrices for rendering, pointer rays for picking and
//! world-to-screen projection for label layout. Screen coordinates are pixels
//! with the origin at the top-left corner.

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

use crate::config::CameraConfig;
use crate::constants::{CAMERA_FAR, CAMERA_NEAR, ORBIT_SENSITIVITY, ZOOM_STEP};
use crate::geometry::Ray;

/// Keeps the camera off the poles so `look_at` stays well defined.
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pose {
    target: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,
}

/// Perspective camera orbiting a target.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pose: Pose,
    home: Pose,
    fov_y: f32,
    min_distance: f32,
    max_distance: f32,
    enable_pan: bool,
    enable_zoom: bool,
}

impl OrbitCamera {
    pub fn new(config: &CameraConfig) -> Self {
        let target = Vec3::ZERO;
        let offset = Vec3::from_array(config.position) - target;
        let distance = offset.length().clamp(config.min_distance, config.max_distance);
        let dir = offset.normalize_or(Vec3::Z);
        let pose = Pose {
            target,
            yaw: dir.x.atan2(dir.z),
            pitch: dir.y.clamp(-1.0, 1.0).asin().clamp(-PITCH_LIMIT, PITCH_LIMIT),
            distance,
        };
        Self {
            pose,
            home: pose,
            fov_y: config.fov_degrees.to_radians(),
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            enable_pan: config.enable_pan,
            enable_zoom: config.enable_zoom,
        }
    }

    pub fn position(&self) -> Vec3 {
        let Pose {
            target,
            yaw,
            pitch,
            distance,
        } = self.pose;
        target + distance * Vec3::new(pitch.cos() * yaw.sin(), pitch.sin(), pitch.cos() * yaw.cos())
    }

    pub fn target(&self) -> Vec3 {
        self.pose.target
    }

    pub fn distance(&self) -> f32 {
        self.pose.distance
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    // ========================================================================
    // Controls
    // ========================================================================

    /// Rotate around the target by a pointer drag in pixels.
    pub fn orbit(&mut self, delta: Vec2) {
        self.pose.yaw -= delta.x * ORBIT_SENSITIVITY;
        self.pose.pitch =
            (self.pose.pitch + delta.y * ORBIT_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Zoom by wheel lines; positive moves closer.
    pub fn zoom(&mut self, lines: f32) {
        if !self.enable_zoom {
            return;
        }
        self.pose.distance =
            (self.pose.distance * ZOOM_STEP.powf(lines)).clamp(self.min_distance, self.max_distance);
    }

    /// Move the target in the view plane so the scene follows the pointer.
    pub fn pan(&mut self, delta: Vec2, viewport: Vec2) {
        if !self.enable_pan || viewport.y <= 0.0 {
            return;
        }
        let world_per_pixel = 2.0 * self.pose.distance * (self.fov_y / 2.0).tan() / viewport.y;
        let forward = (self.pose.target - self.position()).normalize_or(Vec3::NEG_Z);
        let right = forward.cross(Vec3::Y).normalize_or(Vec3::X);
        let up = right.cross(forward);
        self.pose.target += (-right * delta.x + up * delta.y) * world_per_pixel;
    }

    /// Return to the configured starting view.
    pub fn reset(&mut self) {
        self.pose = self.home;
    }

    // ========================================================================
    // Matrices
    // ========================================================================

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.pose.target, Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect.max(f32::EPSILON), CAMERA_NEAR, CAMERA_FAR)
    }

    pub fn view_projection(&self, viewport: Vec2) -> Mat4 {
        self.projection(aspect(viewport)) * self.view()
    }

    /// World-space ray from the camera through a pixel.
    pub fn ray_through(&self, pixel: Vec2, viewport: Vec2) -> Ray {
        let ndc = Vec2::new(
            2.0 * pixel.x / viewport.x.max(1.0) - 1.0,
            1.0 - 2.0 * pixel.y / viewport.y.max(1.0),
        );
        let inverse = self.view_projection(viewport).inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray::new(near, far - near)
    }

    /// Pixel position of a world point; `None` behind the camera.
    pub fn project(&self, world: Vec3, viewport: Vec2) -> Option<Vec2> {
        let clip = self.view_projection(viewport) * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) / 2.0 * viewport.x,
            (1.0 - ndc.y) / 2.0 * viewport.y,
        ))
    }
}

fn aspect(viewport: Vec2) -> f32 {
    if viewport.y > 0.0 {
        viewport.x / viewport.y
    } else {
        1.0
    }
}
