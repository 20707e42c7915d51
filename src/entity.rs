//! What the occlusion renderer needs to know about a scene entity.

use crate::bounds::BoundingVolume;
use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;
use crate::mesh::OccluderMesh;
use crate::transform::Transform;

/// Whether an entity takes part in occludee testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullMode {
    /// Tested every frame.
    #[default]
    Dynamic,
    /// Always kept, never tested.
    Never,
}

/// Read-only view of an entity.
///
/// An entity with an occluder mesh is drawn into the depth buffer, an entity
/// with a bounding volume can be culled. An entity may be both.
pub trait SceneEntity {
    /// Model-to-world matrix.
    fn world_matrix(&self) -> Mat4;

    /// Per-axis world scale, used to grow sphere bounds.
    fn scale(&self) -> Vec3 {
        let s = self.world_matrix().max_axis_scale();
        Vec3::new(s, s, s)
    }

    fn bounding_volume(&self) -> Option<&BoundingVolume>;

    fn occluder_mesh(&self) -> Option<&OccluderMesh>;

    fn cull_mode(&self) -> CullMode {
        CullMode::Dynamic
    }
}

/// Plain entity built from a [`Transform`].
#[derive(Debug, Clone)]
pub struct Entity {
    name: String,
    transform: Transform,
    bound: Option<BoundingVolume>,
    occluder: Option<OccluderMesh>,
    cull_mode: CullMode,
}

impl Entity {
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            bound: None,
            occluder: None,
            cull_mode: CullMode::Dynamic,
        }
    }

    pub fn with_bound(mut self, bound: BoundingVolume) -> Self {
        self.bound = Some(bound);
        self
    }

    pub fn with_occluder(mut self, mesh: OccluderMesh) -> Self {
        self.occluder = Some(mesh);
        self
    }

    pub fn with_cull_mode(mut self, mode: CullMode) -> Self {
        self.cull_mode = mode;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}

impl SceneEntity for Entity {
    fn world_matrix(&self) -> Mat4 {
        self.transform.to_matrix()
    }

    fn scale(&self) -> Vec3 {
        self.transform.scale()
    }

    fn bounding_volume(&self) -> Option<&BoundingVolume> {
        self.bound.as_ref()
    }

    fn occluder_mesh(&self) -> Option<&OccluderMesh> {
        self.occluder.as_ref()
    }

    fn cull_mode(&self) -> CullMode {
        self.cull_mode
    }
}

impl<T: SceneEntity + ?Sized> SceneEntity for &T {
    fn world_matrix(&self) -> Mat4 {
        (**self).world_matrix()
    }

    fn scale(&self) -> Vec3 {
        (**self).scale()
    }

    fn bounding_volume(&self) -> Option<&BoundingVolume> {
        (**self).bounding_volume()
    }

    fn occluder_mesh(&self) -> Option<&OccluderMesh> {
        (**self).occluder_mesh()
    }

    fn cull_mode(&self) -> CullMode {
        (**self).cull_mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Mat4);

    impl SceneEntity for Fixed {
        fn world_matrix(&self) -> Mat4 {
            self.0
        }
        fn bounding_volume(&self) -> Option<&BoundingVolume> {
            None
        }
        fn occluder_mesh(&self) -> Option<&OccluderMesh> {
            None
        }
    }

    #[test]
    fn default_scale_comes_from_matrix() {
        let e = Fixed(Mat4::scaling(1.0, 4.0, 2.0));
        assert_eq!(e.scale(), Vec3::new(4.0, 4.0, 4.0));
        assert_eq!(e.cull_mode(), CullMode::Dynamic);
    }

    #[test]
    fn builder_sets_fields() {
        let mut t = Transform::new();
        t.set_scale(Vec3::new(2.0, 1.0, 1.0));
        let e = Entity::new("crate", t)
            .with_bound(BoundingVolume::sphere(1.0))
            .with_cull_mode(CullMode::Never);

        assert_eq!(e.name(), "crate");
        assert_eq!(e.scale(), Vec3::new(2.0, 1.0, 1.0));
        assert!(e.occluder_mesh().is_none());
        assert_eq!(e.bounding_volume(), Some(&BoundingVolume::sphere(1.0)));
        assert_eq!(e.cull_mode(), CullMode::Never);
    }
}
