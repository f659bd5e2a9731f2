//! Shared uniform types for the mesh pipeline.

use bytemuck::{Pod, Zeroable};

const IDENTITY: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Per-frame camera and lighting data.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniform {
    /// Column-major view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Camera position in world space (w unused).
    pub camera_position: [f32; 4],
    /// Normalized light travel direction (xyz) and ambient term (w).
    pub light: [f32; 4],
}

impl FrameUniform {
    pub fn new(view_proj: [[f32; 4]; 4], camera_position: [f32; 3]) -> Self {
        Self {
            view_proj,
            camera_position: [camera_position[0], camera_position[1], camera_position[2], 1.0],
            light: [0.0, -1.0, 0.0, 0.4],
        }
    }

    /// Set the light direction and ambient term.
    pub fn with_light(mut self, direction: [f32; 3], ambient: f32) -> Self {
        let len = (direction[0] * direction[0]
            + direction[1] * direction[1]
            + direction[2] * direction[2])
            .sqrt()
            .max(f32::EPSILON);
        self.light = [
            direction[0] / len,
            direction[1] / len,
            direction[2] / len,
            ambient,
        ];
        self
    }
}

impl Default for FrameUniform {
    fn default() -> Self {
        Self::new(IDENTITY, [0.0, 0.0, 0.0])
    }
}

/// Per-object transform and material colors.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ObjectUniform {
    /// Column-major model matrix.
    pub model: [[f32; 4]; 4],
    /// Linear RGBA base color.
    pub color: [f32; 4],
    /// Linear RGB emissive color (w unused).
    pub emissive: [f32; 4],
}

impl ObjectUniform {
    pub fn new(model: [[f32; 4]; 4], color: [f32; 3], emissive: [f32; 3]) -> Self {
        Self {
            model,
            color: [color[0], color[1], color[2], 1.0],
            emissive: [emissive[0], emissive[1], emissive[2], 0.0],
        }
    }
}

impl Default for ObjectUniform {
    fn default() -> Self {
        Self::new(IDENTITY, [0.8, 0.8, 0.8], [0.0, 0.0, 0.0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<FrameUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<ObjectUniform>() % 16, 0);
    }

    #[test]
    fn test_light_direction_is_normalized() {
        let frame = FrameUniform::default().with_light([3.0, 0.0, 4.0], 0.25);
        assert!((frame.light[0] - 0.6).abs() < 1e-6);
        assert!((frame.light[2] - 0.8).abs() < 1e-6);
        assert_eq!(frame.light[3], 0.25);
    }
}
