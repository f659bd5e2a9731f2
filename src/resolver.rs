//! Region resolution for pick events.
//!
//! A pick is resolved to a region in a fixed order: a hotspot pick carries
//! its region directly; a mesh pick is first classified by the mesh name
//! against the registry tokens and then, failing that, by the height of the
//! hit point against an ordered slab table; a background pick resolves to
//! nothing.

use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::model::MeshId;
use crate::region::{RegionId, RegionRegistry};

// ============================================================================
// Pick Hits
// ============================================================================

/// Result of the picking pipeline for one pointer event.
#[derive(Debug, Clone, PartialEq)]
pub enum PickHit {
    /// A hotspot anchor was hit.
    Hotspot { region: RegionId },
    /// A model mesh was hit at `local_hit` (display translation removed).
    Mesh {
        mesh: MeshId,
        name: Arc<str>,
        local_hit: Vec3,
    },
    /// Nothing was hit.
    Background,
}

impl PickHit {
    pub fn is_background(&self) -> bool {
        matches!(self, PickHit::Background)
    }
}

// ============================================================================
// Slab Table
// ============================================================================

/// One vertical band: heights strictly above `above` (and at or below the
/// previous band's bound) map to `region`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slab {
    pub above: f32,
    pub region: RegionId,
}

/// Errors from building a slab table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SlabError {
    #[error("slab threshold {0} is not finite")]
    NonFinite(f32),

    #[error("slab thresholds must be strictly descending ({previous} then {next})")]
    NotDescending { previous: f32, next: f32 },
}

/// Ordered height thresholds with a floor region; total over finite heights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlabTable {
    slabs: Vec<Slab>,
    floor: RegionId,
}

impl SlabTable {
    /// Build a table from bands ordered highest first.
    pub fn new(slabs: Vec<Slab>, floor: RegionId) -> Result<Self, SlabError> {
        let table = Self { slabs, floor };
        table.validate()?;
        Ok(table)
    }

    /// Check thresholds are finite and strictly descending.
    pub fn validate(&self) -> Result<(), SlabError> {
        for slab in &self.slabs {
            if !slab.above.is_finite() {
                return Err(SlabError::NonFinite(slab.above));
            }
        }
        for pair in self.slabs.windows(2) {
            if pair[1].above >= pair[0].above {
                return Err(SlabError::NotDescending {
                    previous: pair[0].above,
                    next: pair[1].above,
                });
            }
        }
        Ok(())
    }

    pub fn slabs(&self) -> &[Slab] {
        &self.slabs
    }

    pub fn floor(&self) -> RegionId {
        self.floor
    }

    /// Regions this table can produce, floor included.
    pub fn regions(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.slabs
            .iter()
            .map(|slab| slab.region)
            .chain(std::iter::once(self.floor))
    }

    /// Classify a unit-normalised height. `None` only for NaN.
    pub fn classify(&self, y: f32) -> Option<RegionId> {
        if y.is_nan() {
            return None;
        }
        let region = self
            .slabs
            .iter()
            .find(|slab| y > slab.above)
            .map_or(self.floor, |slab| slab.region);
        Some(region)
    }
}

impl Default for SlabTable {
    fn default() -> Self {
        let slab = |above, region| Slab { above, region };
        Self {
            slabs: vec![
                slab(3.0, RegionId::Head),
                slab(2.0, RegionId::Neck),
                slab(1.0, RegionId::Chest),
                slab(0.0, RegionId::Abdomen),
                slab(-2.0, RegionId::Legs),
            ],
            floor: RegionId::Feet,
        }
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Maps pick hits to region identifiers. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct Resolver {
    registry: Arc<RegionRegistry>,
    slabs: SlabTable,
    model_scale: f32,
}

impl Resolver {
    /// # Panics
    ///
    /// Panics if `model_scale` is not a positive finite number or if the slab
    /// table names a region missing from the registry.
    pub fn new(registry: Arc<RegionRegistry>, slabs: SlabTable, model_scale: f32) -> Self {
        assert!(
            model_scale.is_finite() && model_scale > 0.0,
            "display scale must be positive and finite, got {model_scale}"
        );
        for region in slabs.regions() {
            assert!(
                registry.contains(region),
                "slab table references region '{region}' missing from the registry"
            );
        }
        Self {
            registry,
            slabs,
            model_scale,
        }
    }

    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    pub fn slabs(&self) -> &SlabTable {
        &self.slabs
    }

    pub fn model_scale(&self) -> f32 {
        self.model_scale
    }

    /// Resolve a pick to a region.
    ///
    /// # Panics
    ///
    /// Panics if a hotspot pick names a region the registry does not hold.
    pub fn resolve(&self, hit: &PickHit) -> Option<RegionId> {
        match hit {
            PickHit::Hotspot { region } => {
                assert!(
                    self.registry.contains(*region),
                    "hotspot pick for region '{region}' missing from the registry"
                );
                Some(*region)
            }
            PickHit::Mesh {
                name, local_hit, ..
            } => self
                .name_region(name)
                .or_else(|| self.height_region(local_hit.y)),
            PickHit::Background => None,
        }
    }

    /// Name-based classification: first region in registry order with a
    /// token contained in the lowercased name.
    pub fn name_region(&self, mesh_name: &str) -> Option<RegionId> {
        self.registry.match_name(mesh_name)
    }

    /// Slab classification of a hit height still in display scale.
    pub fn height_region(&self, display_y: f32) -> Option<RegionId> {
        self.slabs.classify(display_y / self.model_scale)
    }
}
