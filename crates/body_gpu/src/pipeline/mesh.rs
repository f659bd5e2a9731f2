//! Lit, depth-tested mesh pipeline.

use wgpu::util::DeviceExt;

use super::{BindGroupLayoutBuilder, Pipeline, PipelineBuilder};
use crate::bindings::mesh::{
    FRAME_GROUP, FRAME_UNIFORM_BINDING, OBJECT_GROUP, OBJECT_UNIFORM_BINDING,
};
use crate::config::RenderConfig;
use crate::context::GpuContext;
use crate::mesh::{GpuMesh, MeshVertex};
use crate::uniform::{FrameUniform, ObjectUniform};

/// Uniform buffer and bind group for a single drawable object.
pub struct ObjectBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// One draw call: a mesh and the object binding it is drawn with.
#[derive(Clone, Copy)]
pub struct DrawCall<'a> {
    pub mesh: &'a GpuMesh,
    pub object: &'a ObjectBinding,
}

/// Pipeline for rendering indexed meshes with a single directional light.
pub struct MeshPipeline {
    render_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
}

impl MeshPipeline {
    pub fn new(ctx: &GpuContext) -> Self {
        let device = &ctx.device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("mesh.wgsl").into()),
        });

        let frame_layout = BindGroupLayoutBuilder::new(device)
            .with_label("Frame Bind Group Layout")
            .add_uniform_buffer(FRAME_UNIFORM_BINDING)
            .build();

        let object_layout = BindGroupLayoutBuilder::new(device)
            .with_label("Object Bind Group Layout")
            .add_uniform_buffer(OBJECT_UNIFORM_BINDING)
            .build();

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniform Buffer"),
            contents: bytemuck::cast_slice(&[FrameUniform::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: FRAME_UNIFORM_BINDING,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let render_pipeline = PipelineBuilder::new(device, ctx.format(), &shader)
            .with_label("Mesh Render Pipeline")
            .with_vertex_buffer(MeshVertex::desc())
            .with_bind_group_layouts(&[&frame_layout, &object_layout])
            .with_depth_test(true)
            .build();

        Self {
            render_pipeline,
            frame_buffer,
            frame_bind_group,
            object_layout,
        }
    }

    /// Allocate a uniform buffer for one drawable object.
    pub fn create_object_binding(&self, device: &wgpu::Device, label: &str) -> ObjectBinding {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&[ObjectUniform::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: OBJECT_UNIFORM_BINDING,
                resource: buffer.as_entire_binding(),
            }],
        });
        ObjectBinding { buffer, bind_group }
    }

    /// Upload per-frame camera and light data.
    pub fn update_frame(&self, queue: &wgpu::Queue, frame: FrameUniform) {
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[frame]));
    }

    /// Upload an object's transform and material colors.
    pub fn update_object(&self, queue: &wgpu::Queue, object: &ObjectBinding, uniform: ObjectUniform) {
        queue.write_buffer(&object.buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    /// Clear the targets and draw every call in order.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        config: &RenderConfig,
        draws: &[DrawCall<'_>],
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Mesh Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(config.clear_color.into()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(FRAME_GROUP, &self.frame_bind_group, &[]);
        for draw in draws {
            render_pass.set_bind_group(OBJECT_GROUP, &draw.object.bind_group, &[]);
            render_pass.set_vertex_buffer(0, draw.mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(draw.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..draw.mesh.num_indices, 0, 0..1);
        }
    }
}

impl Pipeline for MeshPipeline {
    fn render_pipeline(&self) -> &wgpu::RenderPipeline {
        &self.render_pipeline
    }
}
