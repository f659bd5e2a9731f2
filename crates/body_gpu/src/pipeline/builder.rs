//! Builders for depth-tested triangle pipelines and their bind group layouts.

use crate::context::DEPTH_FORMAT;

/// Builder for render pipelines drawing indexed triangle lists.
///
/// # Example
/// ```ignore
/// let pipeline = PipelineBuilder::new(&device, format, &shader)
///     .with_vertex_buffer(MeshVertex::desc())
///     .with_bind_group_layouts(&[&frame_layout, &object_layout])
///     .with_depth_test(true)
///     .build();
/// ```
pub struct PipelineBuilder<'a> {
    device: &'a wgpu::Device,
    format: wgpu::TextureFormat,
    shader: &'a wgpu::ShaderModule,
    label: Option<&'a str>,
    entry_points: (&'a str, &'a str),
    vertex_buffers: Vec<wgpu::VertexBufferLayout<'a>>,
    bind_group_layouts: Vec<&'a wgpu::BindGroupLayout>,
    depth_test: bool,
}

impl<'a> PipelineBuilder<'a> {
    /// Start a pipeline rendering into `format` with `vs_main`/`fs_main` of `shader`.
    pub fn new(
        device: &'a wgpu::Device,
        format: wgpu::TextureFormat,
        shader: &'a wgpu::ShaderModule,
    ) -> Self {
        Self {
            device,
            format,
            shader,
            label: None,
            entry_points: ("vs_main", "fs_main"),
            vertex_buffers: Vec::new(),
            bind_group_layouts: Vec::new(),
            depth_test: false,
        }
    }

    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    /// Override the vertex and fragment entry points.
    pub fn with_entry_points(mut self, vertex: &'a str, fragment: &'a str) -> Self {
        self.entry_points = (vertex, fragment);
        self
    }

    pub fn with_vertex_buffer(mut self, layout: wgpu::VertexBufferLayout<'a>) -> Self {
        self.vertex_buffers.push(layout);
        self
    }

    /// Bind group layouts, in group index order.
    pub fn with_bind_group_layouts(mut self, layouts: &[&'a wgpu::BindGroupLayout]) -> Self {
        self.bind_group_layouts = layouts.to_vec();
        self
    }

    /// Enable depth testing against [`DEPTH_FORMAT`].
    pub fn with_depth_test(mut self, enabled: bool) -> Self {
        self.depth_test = enabled;
        self
    }

    pub fn build(self) -> wgpu::RenderPipeline {
        let layout_label = self.label.map(|l| format!("{} Layout", l));
        let pipeline_layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: layout_label.as_deref(),
            bind_group_layouts: &self.bind_group_layouts,
            push_constant_ranges: &[],
        });

        let depth_stencil = self.depth_test.then(|| wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

        let (vs_entry, fs_entry) = self.entry_points;
        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: self.label,
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: self.shader,
                entry_point: Some(vs_entry),
                buffers: &self.vertex_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: self.shader,
                entry_point: Some(fs_entry),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Asset meshes are not always closed; keep back faces
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}

/// Builder for bind group layouts made of uniform buffers.
pub struct BindGroupLayoutBuilder<'a> {
    device: &'a wgpu::Device,
    label: Option<&'a str>,
    entries: Vec<wgpu::BindGroupLayoutEntry>,
}

impl<'a> BindGroupLayoutBuilder<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self {
            device,
            label: None,
            entries: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    /// Add a uniform buffer visible to both shader stages.
    pub fn add_uniform_buffer(mut self, binding: u32) -> Self {
        self.entries.push(wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
        self
    }

    pub fn build(self) -> wgpu::BindGroupLayout {
        self.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: self.label,
            entries: &self.entries,
        })
    }
}
