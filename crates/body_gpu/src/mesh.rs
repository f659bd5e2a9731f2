//! GPU mesh buffers and procedural primitives.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::bindings::mesh::{NORMAL_LOCATION, POSITION_LOCATION};
use crate::error::{GpuError, Result};

/// Vertex layout consumed by the mesh pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        POSITION_LOCATION => Float32x3,
        NORMAL_LOCATION => Float32x3
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Indexed triangle mesh uploaded to the GPU.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl GpuMesh {
    /// Upload vertices and 32-bit indices.
    pub fn upload(
        device: &wgpu::Device,
        label: &str,
        vertices: &[MeshVertex],
        indices: &[u32],
    ) -> Result<Self> {
        if vertices.is_empty() || indices.is_empty() {
            return Err(GpuError::MeshUpload(format!("mesh '{}' is empty", label)));
        }
        if indices.len() % 3 != 0 {
            return Err(GpuError::MeshUpload(format!(
                "mesh '{}' has {} indices, not a triangle list",
                label,
                indices.len()
            )));
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Ok(Self {
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
        })
    }
}

/// Generate a UV sphere centered on the origin.
///
/// `segments` is the number of longitude slices, `rings` the number of
/// latitude bands. Both are clamped to a minimum of 3 and 2 respectively.
pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> (Vec<MeshVertex>, Vec<u32>) {
    let segments = segments.max(3);
    let rings = rings.max(2);

    let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
    for ring in 0..=rings {
        let theta = ring as f32 / rings as f32 * std::f32::consts::PI;
        let (sin_t, cos_t) = theta.sin_cos();
        for seg in 0..=segments {
            let phi = seg as f32 / segments as f32 * std::f32::consts::TAU;
            let (sin_p, cos_p) = phi.sin_cos();
            let normal = [sin_t * cos_p, cos_t, sin_t * sin_p];
            vertices.push(MeshVertex {
                position: [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                normal,
            });
        }
    }

    let stride = segments + 1;
    let mut indices = Vec::with_capacity((segments * rings * 6) as usize);
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let b = a + stride;
            indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_vertices_lie_on_radius() {
        let (vertices, _) = uv_sphere(0.5, 12, 8);
        for v in &vertices {
            let len = (v.position[0].powi(2) + v.position[1].powi(2) + v.position[2].powi(2)).sqrt();
            assert!((len - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_sphere_indices_in_range() {
        let (vertices, indices) = uv_sphere(1.0, 16, 8);
        assert_eq!(indices.len() % 3, 0);
        assert_eq!(indices.len(), 16 * 8 * 6);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn test_sphere_clamps_degenerate_resolution() {
        let (vertices, indices) = uv_sphere(1.0, 0, 0);
        assert_eq!(vertices.len(), 4 * 3);
        assert_eq!(indices.len(), 3 * 2 * 6);
    }
}
