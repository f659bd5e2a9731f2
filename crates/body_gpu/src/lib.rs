//! body_gpu - wgpu rendering backend for the body explorer.
//!
//! Owns the GPU context (surface plus depth buffer), a lit mesh pipeline and
//! the uniform layouts it consumes. Scene semantics live in the application
//! crate; this crate only knows meshes, transforms and colors.

pub mod bindings;
pub mod config;
pub mod context;
pub mod error;
pub mod mesh;
pub mod pipeline;
pub mod uniform;

pub use config::{ClearColor, GpuConfig, RenderConfig};
pub use context::GpuContext;
pub use error::{GpuError, Result};
pub use mesh::{GpuMesh, MeshVertex, uv_sphere};
pub use pipeline::{DrawCall, MeshPipeline, ObjectBinding};
pub use uniform::{FrameUniform, ObjectUniform};
