//! Body model decoding.
//!
//! A GLB container is decoded into a flat list of named triangle meshes in
//! model-local coordinates. Node transforms are baked into the vertices so
//! picking never has to walk a scene graph. Each glTF primitive becomes one
//! pickable mesh.

use std::fmt;
use std::sync::Arc;

use glam::{Mat3, Mat4, Vec3};

use crate::color::Color;
use crate::constants::DEFAULT_MESH_COLOR;
use crate::geometry::{Aabb, Ray};

/// Errors from loading the body model.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read model: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode model: {0}")]
    Decode(#[from] gltf::Error),

    #[error("Model contains no triangle meshes")]
    EmptyModel,

    #[error("Model load was cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, LoadError>;

// ============================================================================
// Meshes
// ============================================================================

/// Stable index of a mesh within its [`ModelScene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

impl fmt::Display for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mesh#{}", self.0)
    }
}

/// Material authored in the asset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialDesc {
    /// Index of the glTF material; meshes sharing it share the asset material.
    pub index: usize,
    pub color: Color,
    pub emissive: Color,
}

/// One pickable triangle mesh in model-local coordinates.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub id: MeshId,
    pub name: Arc<str>,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
    /// `None` when the primitive uses the shared default material.
    pub material: Option<MaterialDesc>,
    pub bounds: Aabb,
}

impl MeshData {
    /// Build a mesh, computing normals when none are given.
    pub fn new(
        id: MeshId,
        name: impl Into<Arc<str>>,
        positions: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
        indices: Vec<u32>,
        material: Option<MaterialDesc>,
    ) -> Self {
        let normals = match normals {
            Some(n) if n.len() == positions.len() => n,
            _ => vertex_normals(&positions, &indices),
        };
        let bounds = Aabb::from_points(&positions);
        Self {
            id,
            name: name.into(),
            positions,
            normals,
            indices,
            material,
            bounds,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Base color and emissive as the asset defines them.
    pub fn authored_material(&self) -> (Color, Color) {
        match self.material {
            Some(m) => (m.color, m.emissive),
            None => (Color::from_hex(DEFAULT_MESH_COLOR), Color::BLACK),
        }
    }

    /// Nearest triangle hit along a model-local ray.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        ray.intersect_aabb(&self.bounds)?;
        self.indices
            .chunks_exact(3)
            .filter_map(|tri| {
                let v0 = *self.positions.get(tri[0] as usize)?;
                let v1 = *self.positions.get(tri[1] as usize)?;
                let v2 = *self.positions.get(tri[2] as usize)?;
                ray.intersect_triangle(v0, v1, v2)
            })
            .min_by(f32::total_cmp)
    }
}

/// A ray hit on one mesh, distance in model-local units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshIntersection {
    pub mesh: MeshId,
    pub distance: f32,
}

// ============================================================================
// Scene
// ============================================================================

/// The decoded body model.
#[derive(Debug, Clone)]
pub struct ModelScene {
    meshes: Vec<MeshData>,
    bounds: Aabb,
}

impl ModelScene {
    /// Decode a binary glTF container.
    pub fn from_glb(bytes: &[u8]) -> Result<Self> {
        let (document, buffers, _images) = gltf::import_slice(bytes)?;
        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next());

        let mut meshes = Vec::new();
        match scene {
            Some(scene) => {
                for node in scene.nodes() {
                    collect_node(&node, Mat4::IDENTITY, &buffers, &mut meshes);
                }
            }
            None => {
                // No scene: every node that is nobody's child is a root
                let children: std::collections::HashSet<usize> = document
                    .nodes()
                    .flat_map(|n| n.children().map(|c| c.index()).collect::<Vec<_>>())
                    .collect();
                for node in document.nodes().filter(|n| !children.contains(&n.index())) {
                    collect_node(&node, Mat4::IDENTITY, &buffers, &mut meshes);
                }
            }
        }

        let scene = Self::from_meshes(meshes)?;
        log::info!(
            "Decoded model: {} meshes, {} triangles",
            scene.meshes.len(),
            scene.triangle_count()
        );
        Ok(scene)
    }

    /// Build a scene from already-decoded meshes. Ids are reassigned in order.
    pub fn from_meshes(mut meshes: Vec<MeshData>) -> Result<Self> {
        meshes.retain(|m| m.triangle_count() > 0);
        if meshes.is_empty() {
            return Err(LoadError::EmptyModel);
        }
        for (i, mesh) in meshes.iter_mut().enumerate() {
            mesh.id = MeshId(i);
        }
        let bounds = meshes
            .iter()
            .fold(Aabb::empty(), |acc, m| acc.union(&m.bounds));
        Ok(Self { meshes, bounds })
    }

    pub fn meshes(&self) -> &[MeshData] {
        &self.meshes
    }

    pub fn mesh(&self, id: MeshId) -> Option<&MeshData> {
        self.meshes.get(id.0)
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MeshData::triangle_count).sum()
    }

    /// Nearest hit per mesh along a model-local ray, near first.
    pub fn intersect(&self, ray: &Ray) -> Vec<MeshIntersection> {
        let mut hits: Vec<MeshIntersection> = self
            .meshes
            .iter()
            .filter_map(|mesh| {
                mesh.intersect(ray).map(|distance| MeshIntersection {
                    mesh: mesh.id,
                    distance,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

fn collect_node(
    node: &gltf::Node<'_>,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<MeshData>,
) {
    let local = Mat4::from_cols_array_2d(&node.transform().matrix());
    let world = parent * local;

    if let Some(mesh) = node.mesh() {
        let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::debug!("Skipping non-triangle primitive in mesh {:?}", mesh.name());
                continue;
            }
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let positions: Vec<Vec3> = positions
                .map(|p| world.transform_point3(Vec3::from_array(p)))
                .collect();
            let normals = reader.read_normals().map(|normals| {
                normals
                    .map(|n| (normal_matrix * Vec3::from_array(n)).normalize_or_zero())
                    .collect()
            });
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };

            let material = primitive.material();
            let material = material.index().map(|index| {
                let [r, g, b, _] = material.pbr_metallic_roughness().base_color_factor();
                MaterialDesc {
                    index,
                    color: Color::new(r, g, b),
                    emissive: Color::from_array(material.emissive_factor()),
                }
            });

            let name = node
                .name()
                .or_else(|| mesh.name())
                .map(str::to_string)
                .unwrap_or_else(|| format!("mesh_{}", out.len()));

            out.push(MeshData::new(
                MeshId(out.len()),
                name,
                positions,
                normals,
                indices,
                material,
            ));
        }
    }

    for child in node.children() {
        collect_node(&child, world, buffers, out);
    }
}

/// Area-weighted smooth normals.
fn vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals.iter().map(|n| n.normalize_or(Vec3::Y)).collect()
}

/// An axis-aligned box as a closed triangle mesh.
pub fn box_mesh(name: &str, min: Vec3, max: Vec3, material: Option<MaterialDesc>) -> MeshData {
    let positions = vec![
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(max.x, max.y, max.z),
        Vec3::new(min.x, max.y, max.z),
    ];
    #[rustfmt::skip]
    let indices = vec![
        4, 5, 6, 4, 6, 7, // front (+z)
        1, 0, 3, 1, 3, 2, // back (-z)
        0, 4, 7, 0, 7, 3, // left
        5, 1, 2, 5, 2, 6, // right
        3, 7, 6, 3, 6, 2, // top
        0, 1, 5, 0, 5, 4, // bottom
    ];
    MeshData::new(MeshId(0), name, positions, None, indices, material)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(index: usize) -> Option<MaterialDesc> {
        Some(MaterialDesc {
            index,
            color: Color::new(0.8, 0.6, 0.5),
            emissive: Color::BLACK,
        })
    }

    fn scene() -> ModelScene {
        ModelScene::from_meshes(vec![
            box_mesh("Torso", Vec3::new(-1.0, -1.0, -0.5), Vec3::new(1.0, 3.0, 0.5), material(0)),
            box_mesh("Head", Vec3::new(-0.5, 3.5, -0.5), Vec3::new(0.5, 5.5, 0.5), material(0)),
            box_mesh("Plinth", Vec3::new(-2.0, -4.0, -2.0), Vec3::new(2.0, -3.5, 2.0), None),
        ])
        .unwrap()
    }

    #[test]
    fn test_from_meshes_assigns_ids_and_bounds() {
        let scene = scene();
        let ids: Vec<usize> = scene.meshes().iter().map(|m| m.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(scene.bounds().min, Vec3::new(-2.0, -4.0, -2.0));
        assert_eq!(scene.bounds().max, Vec3::new(2.0, 5.5, 2.0));
        assert_eq!(scene.triangle_count(), 36);
    }

    #[test]
    fn test_empty_scene_is_an_error() {
        assert!(matches!(
            ModelScene::from_meshes(Vec::new()),
            Err(LoadError::EmptyModel)
        ));
        let degenerate = MeshData::new(MeshId(0), "empty", Vec::new(), None, Vec::new(), None);
        assert!(matches!(
            ModelScene::from_meshes(vec![degenerate]),
            Err(LoadError::EmptyModel)
        ));
    }

    #[test]
    fn test_intersect_sorted_near_first() {
        let scene = scene();
        // Straight down through the head, torso and plinth
        let ray = Ray::new(Vec3::new(0.1, 10.0, -0.2), Vec3::NEG_Y);
        let hits = scene.intersect(&ray);
        let order: Vec<usize> = hits.iter().map(|h| h.mesh.0).collect();
        assert_eq!(order, vec![1, 0, 2]);
        assert!((hits[0].distance - 4.5).abs() < 1e-5);
        assert!((hits[1].distance - 7.0).abs() < 1e-5);
    }

    #[test]
    fn test_intersect_miss() {
        let ray = Ray::new(Vec3::new(10.0, 0.0, 10.0), Vec3::NEG_Z);
        assert!(scene().intersect(&ray).is_empty());
    }

    #[test]
    fn test_authored_material_default() {
        let scene = scene();
        let plinth = scene.mesh(MeshId(2)).unwrap();
        assert!(plinth.material.is_none());
        let (color, emissive) = plinth.authored_material();
        assert_eq!(color, Color::from_hex(DEFAULT_MESH_COLOR));
        assert_eq!(emissive, Color::BLACK);
    }

    #[test]
    fn test_computed_normals_are_unit() {
        let mesh = box_mesh("b", Vec3::splat(-1.0), Vec3::splat(1.0), None);
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        for n in &mesh.normals {
            assert!((n.length() - 1.0).abs() < 1e-5);
        }
        // Corner normals point away from the center
        assert!(mesh.normals[6].dot(Vec3::ONE) > 0.0);
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        assert!(matches!(
            ModelScene::from_glb(b"definitely not a glb"),
            Err(LoadError::Decode(_))
        ));
    }
}
