//! Anatomical region registry.
//!
//! The registry is the single table of the ten named body regions: their
//! display label, descriptive text, list of functions, the hotspot anchor in
//! model-local coordinates and the lowercase name tokens used to classify
//! meshes by name. It is built once at startup and never mutated; the
//! resolver, the hotspot overlay and the info card all read the same table.

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

// ============================================================================
// Region Identifiers
// ============================================================================

/// Stable identifier of an anatomical region.
///
/// Declaration order is registry order, which is also the tie-break order of
/// name-based mesh resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionId {
    Head,
    Neck,
    Shoulders,
    Chest,
    Back,
    Abdomen,
    Arms,
    Hands,
    Legs,
    Feet,
}

impl RegionId {
    /// Every region, in registry order.
    pub const ALL: [RegionId; 10] = [
        RegionId::Head,
        RegionId::Neck,
        RegionId::Shoulders,
        RegionId::Chest,
        RegionId::Back,
        RegionId::Abdomen,
        RegionId::Arms,
        RegionId::Hands,
        RegionId::Legs,
        RegionId::Feet,
    ];

    /// The short symbol used in configuration files and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            RegionId::Head => "head",
            RegionId::Neck => "neck",
            RegionId::Shoulders => "shoulders",
            RegionId::Chest => "chest",
            RegionId::Back => "back",
            RegionId::Abdomen => "abdomen",
            RegionId::Arms => "arms",
            RegionId::Hands => "hands",
            RegionId::Legs => "legs",
            RegionId::Feet => "feet",
        }
    }

    /// Regions marked only by their hotspot sphere; the body mesh is never
    /// recoloured for them.
    pub fn is_hotspot_only(self) -> bool {
        matches!(
            self,
            RegionId::Shoulders | RegionId::Back | RegionId::Arms | RegionId::Hands
        )
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionId {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RegionId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| RegistryError::UnknownRegion(s.to_string()))
    }
}

// ============================================================================
// Region
// ============================================================================

/// One anatomical region and everything the viewer shows about it.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: RegionId,
    pub label: String,
    pub description: String,
    pub functions: Vec<String>,
    /// Hotspot position in model-local coordinates.
    pub anchor: Vec3,
    /// Lowercase substrings matched against mesh names.
    pub name_tokens: Vec<String>,
}

impl Region {
    pub fn new(id: RegionId, label: impl Into<String>, anchor: Vec3) -> Self {
        Self {
            id,
            label: label.into(),
            description: String::new(),
            functions: Vec::new(),
            anchor,
            name_tokens: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_functions(mut self, functions: &[&str]) -> Self {
        self.functions = functions.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Tokens are stored lowercased.
    pub fn with_name_tokens(mut self, tokens: &[&str]) -> Self {
        self.name_tokens = tokens.iter().map(|t| t.to_lowercase()).collect();
        self
    }

    /// Whether any of this region's tokens occurs in an already-lowercased name.
    pub fn matches_name(&self, lowercase_name: &str) -> bool {
        self.name_tokens
            .iter()
            .any(|token| !token.is_empty() && lowercase_name.contains(token.as_str()))
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Errors raised while building a registry from custom content.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("Region '{0}' is defined more than once")]
    Duplicate(RegionId),

    #[error("Region '{0}' has a non-finite anchor")]
    NonFiniteAnchor(RegionId),

    #[error("Unknown region identifier '{0}'")]
    UnknownRegion(String),
}

/// Immutable `id -> Region` table, iterated in registry order.
#[derive(Debug, Clone)]
pub struct RegionRegistry {
    regions: Vec<Region>,
}

impl RegionRegistry {
    /// Build a registry from custom regions.
    ///
    /// Regions are re-ordered into registry order regardless of input order.
    pub fn from_regions(mut regions: Vec<Region>) -> Result<Self, RegistryError> {
        regions.sort_by_key(|r| r.id);
        for pair in regions.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(RegistryError::Duplicate(pair[0].id));
            }
        }
        if let Some(bad) = regions.iter().find(|r| !r.anchor.is_finite()) {
            return Err(RegistryError::NonFiniteAnchor(bad.id));
        }
        Ok(Self { regions })
    }

    /// The built-in table of all ten regions.
    pub fn builtin() -> Self {
        Self {
            regions: builtin_regions(),
        }
    }

    pub fn lookup(&self, id: RegionId) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: RegionId) -> bool {
        self.lookup(id).is_some()
    }

    /// All regions in registry order.
    pub fn all(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// First region (in registry order) whose tokens occur in `mesh_name`.
    pub fn match_name(&self, mesh_name: &str) -> Option<RegionId> {
        let name = mesh_name.to_lowercase();
        self.regions
            .iter()
            .find(|region| region.matches_name(&name))
            .map(|region| region.id)
    }
}

impl Default for RegionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_regions() -> Vec<Region> {
    vec![
        Region::new(RegionId::Head, "Head", Vec3::new(0.0, 5.0, 0.3))
            .with_description("The head contains the brain and major sensory organs.")
            .with_functions(&[
                "Houses the brain",
                "Contains sensory organs",
                "Enables facial expressions",
            ])
            // No "ear": it is a substring of "forearm"
            .with_name_tokens(&["head", "skull", "brain", "jaw", "nose", "mouth", "eye"]),
        Region::new(RegionId::Neck, "Neck", Vec3::new(0.0, 2.6, 0.3))
            .with_description("The neck connects the head to the torso.")
            .with_functions(&[
                "Supports the head",
                "Contains the spinal cord",
                "Houses the trachea and esophagus",
            ])
            .with_name_tokens(&["neck", "throat", "cervical"]),
        Region::new(RegionId::Shoulders, "Shoulders", Vec3::new(1.5, 2.1, 0.0))
            .with_description("The shoulders connect the arms to the torso.")
            .with_functions(&[
                "Enables arm movement",
                "Supports weight",
                "Attaches to major muscles",
            ])
            .with_name_tokens(&["shoulder", "clavicle", "scapula", "deltoid"]),
        Region::new(RegionId::Chest, "Chest", Vec3::new(0.0, 1.5, 0.7))
            .with_description("The chest protects vital organs including the heart and lungs.")
            .with_functions(&[
                "Protects heart and lungs",
                "Enables breathing",
                "Houses major blood vessels",
            ])
            .with_name_tokens(&["chest", "thorax", "rib", "sternum", "pectoral", "breast"]),
        Region::new(RegionId::Back, "Back", Vec3::new(0.0, 1.2, -0.7))
            .with_description("The back runs from the neck to the pelvis along the spine.")
            .with_functions(&[
                "Protects the spinal cord",
                "Keeps the body upright",
                "Anchors the muscles of posture",
            ])
            .with_name_tokens(&["back", "spine", "lumbar", "dorsal", "vertebra"]),
        Region::new(RegionId::Abdomen, "Abdomen", Vec3::new(0.0, 0.5, 0.6))
            .with_description("The abdomen contains digestive organs protected by muscles.")
            .with_functions(&[
                "Houses digestive organs",
                "Provides core stability",
                "Protects internal organs",
            ])
            .with_name_tokens(&["abdomen", "belly", "stomach", "pelvis", "hip", "waist"]),
        Region::new(RegionId::Arms, "Arms", Vec3::new(2.1, 0.8, 0.0))
            .with_description("The arms reach, lift and carry, from shoulder to wrist.")
            .with_functions(&[
                "Reaching and lifting",
                "Positions the hands",
                "Helps balance while walking",
            ])
            .with_name_tokens(&["arm", "elbow", "bicep", "tricep", "humerus"]),
        Region::new(RegionId::Hands, "Hands", Vec3::new(2.5, -0.7, 0.2))
            .with_description("The hands grasp and manipulate objects with fine control.")
            .with_functions(&[
                "Grasping and holding",
                "Fine motor control",
                "Sense of touch",
            ])
            .with_name_tokens(&["hand", "wrist", "finger", "thumb", "palm"]),
        Region::new(RegionId::Legs, "Legs", Vec3::new(0.6, -1.0, 0.2))
            .with_description("The legs provide mobility and support the body's weight.")
            .with_functions(&["Body support", "Movement", "Power generation"])
            .with_name_tokens(&["leg", "thigh", "knee", "calf", "shin", "femur", "tibia"]),
        Region::new(RegionId::Feet, "Feet", Vec3::new(0.6, -2.7, 0.4))
            .with_description("The feet provide stability, balance, and mobility.")
            .with_functions(&["Support body weight", "Absorb impact", "Enable walking"])
            .with_name_tokens(&["foot", "feet", "toe", "ankle", "heel"]),
    ]
}
