//! GPU rendering of the viewer scene.
//!
//! [`scene_objects`] turns the viewer state into a flat list of per-object
//! uniforms (model meshes first, then hotspot markers). [`SceneRenderer`]
//! owns the GPU resources and submits that list through the mesh pipeline.

use glam::{Mat4, Vec3};

use body_gpu::{
    DrawCall, FrameUniform, GpuContext, GpuError, GpuMesh, MeshPipeline, MeshVertex, ObjectBinding,
    ObjectUniform, RenderConfig, uv_sphere,
};

use crate::constants::{HOTSPOT_RINGS, HOTSPOT_SEGMENTS};
use crate::model::{MeshId, ModelScene};
use crate::region::RegionId;
use crate::viewer::Viewer;

/// What a scene object draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Mesh(MeshId),
    Hotspot(RegionId),
}

/// One object to draw this frame.
#[derive(Debug, Clone, Copy)]
pub struct SceneObject {
    pub kind: ObjectKind,
    pub uniform: ObjectUniform,
}

/// Per-object uniforms for the current viewer state.
///
/// Mesh colors come from the highlight controller, so they reflect the last
/// applied selection rather than anything changed since.
pub fn scene_objects(viewer: &Viewer) -> Vec<SceneObject> {
    let display = viewer.display();
    let model_matrix = display.matrix();
    let mut objects = Vec::new();

    if viewer.is_loaded() {
        objects.extend(viewer.highlight().mesh_states().iter().map(|state| {
            let material = state.material();
            SceneObject {
                kind: ObjectKind::Mesh(state.mesh()),
                uniform: ObjectUniform::new(
                    model_matrix.to_cols_array_2d(),
                    material.color.to_array(),
                    material.emissive.to_array(),
                ),
            }
        }));

        let overlay = viewer.overlay();
        let marker_scale = Mat4::from_scale(Vec3::splat(overlay.radius()));
        objects.extend(overlay.hotspots().iter().filter_map(|hotspot| {
            let style = overlay.style(hotspot.region)?;
            let transform = model_matrix * Mat4::from_translation(hotspot.anchor) * marker_scale;
            Some(SceneObject {
                kind: ObjectKind::Hotspot(hotspot.region),
                uniform: ObjectUniform::new(
                    transform.to_cols_array_2d(),
                    style.color.to_array(),
                    style.emissive.to_array(),
                ),
            })
        }));
    }

    objects
}

/// GPU resources for the scene.
pub struct SceneRenderer {
    pipeline: MeshPipeline,
    config: RenderConfig,
    /// Unit sphere shared by every marker
    marker: GpuMesh,
    /// One entry per model mesh, indexed by `MeshId`
    meshes: Vec<GpuMesh>,
    bindings: Vec<ObjectBinding>,
}

impl SceneRenderer {
    pub fn new(ctx: &GpuContext, config: RenderConfig) -> Result<Self, GpuError> {
        let pipeline = MeshPipeline::new(ctx);
        let (vertices, indices) = uv_sphere(1.0, HOTSPOT_SEGMENTS, HOTSPOT_RINGS);
        let marker = GpuMesh::upload(&ctx.device, "Hotspot Marker", &vertices, &indices)?;

        Ok(Self {
            pipeline,
            config,
            marker,
            meshes: Vec::new(),
            bindings: Vec::new(),
        })
    }

    /// Upload the model's meshes. Call once, after the model is installed.
    pub fn upload_model(&mut self, ctx: &GpuContext, scene: &ModelScene) -> Result<(), GpuError> {
        let mut meshes = Vec::with_capacity(scene.meshes().len());
        for mesh in scene.meshes() {
            let vertices: Vec<MeshVertex> = mesh
                .positions
                .iter()
                .zip(&mesh.normals)
                .map(|(position, normal)| MeshVertex {
                    position: position.to_array(),
                    normal: normal.to_array(),
                })
                .collect();
            meshes.push(GpuMesh::upload(&ctx.device, &mesh.name, &vertices, &mesh.indices)?);
        }
        log::info!(
            "Uploaded {} meshes ({} triangles)",
            meshes.len(),
            scene.triangle_count()
        );
        self.meshes = meshes;
        Ok(())
    }

    /// Draw one frame.
    pub fn render(&mut self, ctx: &GpuContext, viewer: &Viewer) {
        let frame = match ctx.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Failed to get frame: {:?}", e);
                return;
            }
        };
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let camera = viewer.camera();
        let frame_uniform = FrameUniform::new(
            camera.view_projection(viewer.viewport()).to_cols_array_2d(),
            camera.position().to_array(),
        )
        .with_light(self.config.light_direction, self.config.ambient);
        self.pipeline.update_frame(&ctx.queue, frame_uniform);

        let objects = scene_objects(viewer);
        while self.bindings.len() < objects.len() {
            let label = format!("Object {}", self.bindings.len());
            self.bindings
                .push(self.pipeline.create_object_binding(&ctx.device, &label));
        }

        let mut draws = Vec::with_capacity(objects.len());
        for (object, binding) in objects.iter().zip(&self.bindings) {
            let mesh = match object.kind {
                ObjectKind::Mesh(id) => match self.meshes.get(id.0) {
                    Some(mesh) => mesh,
                    None => continue,
                },
                ObjectKind::Hotspot(_) => &self.marker,
            };
            self.pipeline.update_object(&ctx.queue, binding, object.uniform);
            draws.push(DrawCall {
                mesh,
                object: binding,
            });
        }

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        self.pipeline
            .render(&mut encoder, &view, &ctx.depth_view, &self.config, &draws);
        ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::config::ViewerConfig;
    use crate::highlight::HighlightStyle;
    use crate::hotspot::HotspotStyles;
    use crate::model::{MaterialDesc, box_mesh};
    use web_time::Instant;

    fn loaded_viewer() -> Viewer {
        let mut viewer = Viewer::new(ViewerConfig::default());
        let scene = ModelScene::from_meshes(vec![box_mesh(
            "Head_Geo",
            Vec3::new(-0.5, 4.0, -0.5),
            Vec3::new(0.5, 5.5, 0.5),
            Some(MaterialDesc {
                index: 0,
                color: Color::new(1.0, 1.0, 1.0),
                emissive: Color::BLACK,
            }),
        )])
        .unwrap();
        viewer.install_model(scene);
        viewer.frame(Instant::now());
        viewer
    }

    #[test]
    fn test_nothing_drawn_before_load() {
        let viewer = Viewer::new(ViewerConfig::default());
        assert!(scene_objects(&viewer).is_empty());
    }

    #[test]
    fn test_meshes_then_markers() {
        let viewer = loaded_viewer();
        let objects = scene_objects(&viewer);
        assert_eq!(objects.len(), 1 + RegionId::ALL.len());
        assert_eq!(objects[0].kind, ObjectKind::Mesh(MeshId(0)));
        assert_eq!(objects[1].kind, ObjectKind::Hotspot(RegionId::Head));
    }

    #[test]
    fn test_selection_colors_flow_into_uniforms() {
        let mut viewer = loaded_viewer();
        viewer.selection().select(Some(RegionId::Head));
        viewer.frame(Instant::now());
        let objects = scene_objects(&viewer);

        let style = HighlightStyle::default();
        let color = style.selected_color.to_array();
        assert_eq!(&objects[0].uniform.color[..3], &color[..]);

        let marker = HotspotStyles::default().selected.color.to_array();
        assert_eq!(&objects[1].uniform.color[..3], &marker[..]);
    }

    #[test]
    fn test_marker_transform_places_sphere_at_anchor() {
        let viewer = loaded_viewer();
        let objects = scene_objects(&viewer);
        let transform = Mat4::from_cols_array_2d(&objects[1].uniform.model);
        let anchor = viewer.registry().lookup(RegionId::Head).unwrap().anchor;
        let center = transform.transform_point3(Vec3::ZERO);
        let expected = viewer.display().to_world(anchor);
        assert!((center - expected).length() < 1e-5);
    }
}
