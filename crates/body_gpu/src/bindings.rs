//! Shader binding constants.
//!
//! This module defines constants for shader binding locations that are shared
//! between Rust code and WGSL shaders. This ensures that binding numbers stay
//! synchronized and prevents runtime failures due to mismatches.
//!
//! In WGSL shaders, these same numbers must be used:
//! ```wgsl
//! @group(0) @binding(0)  // FRAME_GROUP, FRAME_UNIFORM_BINDING
//! var<uniform> frame: FrameUniform;
//! ```

/// Binding constants for the lit mesh pipeline.
pub mod mesh {
    /// Group 0: Per-frame uniforms (camera and light)
    pub const FRAME_GROUP: u32 = 0;
    /// Binding 0 in group 0: Frame uniform
    pub const FRAME_UNIFORM_BINDING: u32 = 0;

    /// Group 1: Per-object uniforms (model matrix and material)
    pub const OBJECT_GROUP: u32 = 1;
    /// Binding 0 in group 1: Object uniform
    pub const OBJECT_UNIFORM_BINDING: u32 = 0;

    /// Vertex attribute location of the position.
    pub const POSITION_LOCATION: u32 = 0;
    /// Vertex attribute location of the normal.
    pub const NORMAL_LOCATION: u32 = 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_groups_are_sequential() {
        assert_eq!(mesh::FRAME_GROUP, 0);
        assert_eq!(mesh::OBJECT_GROUP, 1);
        assert_eq!(mesh::FRAME_UNIFORM_BINDING, 0);
        assert_eq!(mesh::OBJECT_UNIFORM_BINDING, 0);
    }

    #[test]
    fn test_vertex_locations_are_distinct() {
        assert_ne!(mesh::POSITION_LOCATION, mesh::NORMAL_LOCATION);
    }
}
