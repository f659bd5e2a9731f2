//! Render pipeline abstractions.
//!
//! This module provides common traits and implementations for GPU render pipelines.

pub mod builder;
pub mod mesh;

pub use builder::{BindGroupLayoutBuilder, PipelineBuilder};
pub use mesh::{DrawCall, MeshPipeline, ObjectBinding};

/// Common trait for render pipelines.
pub trait Pipeline {
    /// Get a reference to the underlying wgpu render pipeline.
    fn render_pipeline(&self) -> &wgpu::RenderPipeline;
}
