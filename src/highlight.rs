//! Mesh highlight state.
//!
//! The controller owns one [`MeshState`] per model mesh. When the model is
//! installed, every mesh with an authored material gets a private copy of
//! it and its original color and emissive are captured; meshes on the shared
//! default material are tracked but never written. [`HighlightController::apply`]
//! always restores every private material first and then paints the current
//! selection and hover, so applying the same state twice is the same as
//! applying it once. Meshes of hotspot-only regions keep their original look;
//! only their marker reacts.

use std::sync::Arc;

use crate::color::Color;
use crate::constants::{HOVER_EMISSIVE, SELECTED_COLOR, SELECTED_EMISSIVE};
use crate::model::{MeshId, ModelScene};
use crate::region::{RegionId, RegionRegistry};
use crate::selection::SelectionState;

/// The mutable part of a material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    pub emissive: Color,
}

impl Material {
    pub fn new(color: Color, emissive: Color) -> Self {
        Self { color, emissive }
    }
}

/// Colors painted on highlighted meshes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightStyle {
    pub selected_color: Color,
    pub selected_emissive: Color,
    pub hover_emissive: Color,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            selected_color: Color::from_hex(SELECTED_COLOR),
            selected_emissive: Color::from_hex(SELECTED_EMISSIVE),
            hover_emissive: Color::from_hex(HOVER_EMISSIVE),
        }
    }
}

/// Per-mesh bookkeeping created once on model install.
#[derive(Debug, Clone)]
pub struct MeshState {
    mesh: MeshId,
    name: Arc<str>,
    /// Region the mesh name classifies to, if any.
    region: Option<RegionId>,
    original_color: Color,
    original_emissive: Color,
    /// Private copy; `None` means the mesh renders with a shared material.
    owned: Option<Material>,
}

impl MeshState {
    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> Option<RegionId> {
        self.region
    }

    /// Region whose selection and hover recolour this mesh.
    fn painted_region(&self) -> Option<RegionId> {
        self.region.filter(|region| !region.is_hotspot_only())
    }

    pub fn original_color(&self) -> Color {
        self.original_color
    }

    pub fn original_emissive(&self) -> Color {
        self.original_emissive
    }

    /// Whether the material is a private copy this controller may write.
    pub fn cloned_material(&self) -> bool {
        self.owned.is_some()
    }

    /// The material the mesh currently renders with.
    pub fn material(&self) -> Material {
        self.owned
            .unwrap_or(Material::new(self.original_color, self.original_emissive))
    }

    fn restore(&mut self) {
        if let Some(material) = self.owned.as_mut() {
            material.color = self.original_color;
            material.emissive = self.original_emissive;
        }
    }
}

/// Applies selection and hover feedback to mesh materials.
#[derive(Debug)]
pub struct HighlightController {
    registry: Arc<RegionRegistry>,
    style: HighlightStyle,
    meshes: Vec<MeshState>,
    installed: bool,
    applied: Option<SelectionState>,
}

impl HighlightController {
    pub fn new(registry: Arc<RegionRegistry>) -> Self {
        Self::with_style(registry, HighlightStyle::default())
    }

    pub fn with_style(registry: Arc<RegionRegistry>, style: HighlightStyle) -> Self {
        Self {
            registry,
            style,
            meshes: Vec::new(),
            installed: false,
            applied: None,
        }
    }

    /// Capture original materials and clone the authored ones.
    ///
    /// # Panics
    ///
    /// Panics when called a second time: re-cloning would capture an
    /// already highlighted color as the original.
    pub fn install(&mut self, scene: &ModelScene) {
        assert!(
            !self.installed,
            "mesh materials are already cloned; install must run exactly once per model"
        );
        self.meshes = scene
            .meshes()
            .iter()
            .map(|mesh| {
                let (color, emissive) = mesh.authored_material();
                MeshState {
                    mesh: mesh.id,
                    name: mesh.name.clone(),
                    region: self.registry.match_name(&mesh.name),
                    original_color: color,
                    original_emissive: emissive,
                    owned: mesh.material.map(|_| Material::new(color, emissive)),
                }
            })
            .collect();
        self.installed = true;

        let cloned = self.meshes.iter().filter(|m| m.cloned_material()).count();
        log::info!(
            "Installed {} mesh states ({} private materials, {} shared)",
            self.meshes.len(),
            cloned,
            self.meshes.len() - cloned
        );
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn mesh_states(&self) -> &[MeshState] {
        &self.meshes
    }

    pub fn mesh_state(&self, id: MeshId) -> Option<&MeshState> {
        self.meshes.iter().find(|m| m.mesh == id)
    }

    /// The state most recently applied.
    pub fn applied(&self) -> Option<SelectionState> {
        self.applied
    }

    /// Restore every private material, then paint `state`.
    pub fn apply(&mut self, state: SelectionState) {
        for mesh in &mut self.meshes {
            mesh.restore();
        }

        let style = self.style;
        for mesh in &mut self.meshes {
            let Some(region) = mesh.painted_region() else {
                continue;
            };
            let Some(material) = mesh.owned.as_mut() else {
                continue;
            };
            if state.selected == Some(region) {
                material.color = style.selected_color;
                material.emissive = style.selected_emissive;
            } else if state.hovered == Some(region) {
                material.emissive = style.hover_emissive;
            }
        }

        if self.applied != Some(state) {
            log::debug!(
                "Applied highlight: selected={:?} hovered={:?}",
                state.selected,
                state.hovered
            );
        }
        self.applied = Some(state);
    }
}
