//! Body Explorer - interactive 3D human body explorer.
//!
//! Anatomical regions are picked either through floating hotspot markers or
//! by clicking the body mesh itself; every pick is resolved to one region,
//! which drives the mesh highlight, the marker styling and the info card.

pub mod camera;
pub mod color;
pub mod config;
pub mod constants;
pub mod geometry;
pub mod highlight;
pub mod hotspot;
pub mod info;
pub mod keyboard;
pub mod loader;
pub mod model;
pub mod picking;
pub mod region;
pub mod resolver;
pub mod selection;
pub mod viewer;

#[cfg(not(target_arch = "wasm32"))]
pub mod native;
#[cfg(not(target_arch = "wasm32"))]
pub mod render;

pub use config::ViewerConfig;
pub use region::{Region, RegionId, RegionRegistry};
pub use resolver::{PickHit, Resolver};
pub use selection::{SelectionModel, SelectionState};
pub use viewer::{PointerButton, Viewer};
