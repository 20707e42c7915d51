//! Software occlusion culling on the CPU.
//!
//! Simplified occluder meshes are rasterized into a depth buffer holding
//! `1/w` per pixel, then the bounding volumes of scene entities are tested
//! against it. Entities proven fully hidden are removed from the list the
//! real renderer draws.
//!
//! # Quick Start
//!
//! ```ignore
//! use softcull::prelude::*;
//!
//! let mut renderer = SoftwareRenderer::new(OcclusionConfig::new(256, 128))?;
//! let pass = renderer.render(&camera, &occluders);
//! pass.perform_occlusion_culling(&mut visible);
//! ```

// Public API - exposed to library consumers
pub mod bounds;
pub mod camera;
pub mod config;
pub mod entity;
pub mod error;
pub mod math;
pub mod mesh;
pub mod renderer;
pub mod transform;

// Pipeline stages, public for tests and benchmarks
pub mod clipper;
pub mod occlusion;
pub mod render;

// Re-export commonly needed types at crate root for convenience
pub use bounds::BoundingVolume;
pub use camera::Camera;
pub use config::{BoxTest, OcclusionConfig};
pub use entity::{CullMode, Entity, SceneEntity};
pub use error::{OcclusionError, Result};
pub use mesh::OccluderMesh;
pub use render::DepthBuffer;
pub use renderer::{CullStats, OcclusionPass, RasterStats, SoftwareRenderer};
pub use transform::Transform;

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use softcull::prelude::*;
/// ```
pub mod prelude {
    // Scene
    pub use crate::bounds::BoundingVolume;
    pub use crate::camera::Camera;
    pub use crate::entity::{CullMode, Entity, SceneEntity};
    pub use crate::mesh::OccluderMesh;
    pub use crate::transform::Transform;

    // Renderer
    pub use crate::config::{BoxTest, OcclusionConfig};
    pub use crate::error::{OcclusionError, Result};
    pub use crate::render::DepthBuffer;
    pub use crate::renderer::{CullStats, OcclusionPass, SoftwareRenderer};

    // Math
    pub use crate::math::mat4::Mat4;
    pub use crate::math::vec2::Vec2;
    pub use crate::math::vec3::Vec3;
    pub use crate::math::vec4::Vec4;
}
