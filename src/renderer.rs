//! Per-frame occlusion culling.
//!
//! The [`SoftwareRenderer`] owns the depth buffer and drives both phases of
//! a frame:
//!
//! 1. [`SoftwareRenderer::render`] clears the buffer and rasterizes every
//!    occluder mesh into it.
//! 2. The returned [`OcclusionPass`] borrows the finished buffer read-only
//!    and tests occludees against it.
//!
//! Because the pass holds a shared borrow, no occluder can be drawn while
//! occludees are being tested.
//!
//! ```ignore
//! let mut renderer = SoftwareRenderer::new(OcclusionConfig::new(256, 128))?;
//! let pass = renderer.render(&camera, &occluders);
//! let stats = pass.perform_occlusion_culling(&mut candidates);
//! ```

use crate::bounds::BoundingVolume;
use crate::camera::Camera;
use crate::clipper::{
    clip_triangle_near, is_back_facing_screen, is_back_facing_view, project_to_screen,
};
use crate::config::{BoxTest, OcclusionConfig};
use crate::entity::{CullMode, SceneEntity};
use crate::error::Result;
use crate::math::mat4::Mat4;
use crate::math::vec4::Vec4;
use crate::mesh::OccluderMesh;
use crate::occlusion::{is_box_occluded, is_sphere_occluded};
use crate::render::edge::EdgeRounding;
use crate::render::{DepthBuffer, DepthTarget, DepthView, Rasterizer, ScanlineRasterizer, Triangle};

/// Counters for one occluder pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterStats {
    /// Occluder triangles submitted.
    pub triangles: usize,
    /// Triangles dropped as back-facing.
    pub back_facing: usize,
    /// Triangles entirely behind the near plane.
    pub behind_near: usize,
    /// Triangles handed to the rasterizer, after near-plane splitting.
    pub rasterized: usize,
}

/// Counters for one culling run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CullStats {
    pub tested: usize,
    pub culled: usize,
    /// Entities with [`CullMode::Never`].
    pub skipped: usize,
}

pub struct SoftwareRenderer {
    config: OcclusionConfig,
    depth: DepthBuffer,
    rasterizer: ScanlineRasterizer,
    last_raster: RasterStats,
}

impl SoftwareRenderer {
    pub fn new(config: OcclusionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            depth: DepthBuffer::new(config.width, config.height)?,
            rasterizer: Self::rasterizer_for(&config),
            config,
            last_raster: RasterStats::default(),
        })
    }

    fn rasterizer_for(config: &OcclusionConfig) -> ScanlineRasterizer {
        if config.conservative_occluders {
            ScanlineRasterizer::with_occluder_rounding(EdgeRounding::Shrink)
        } else {
            ScanlineRasterizer::new()
        }
    }

    pub fn config(&self) -> &OcclusionConfig {
        &self.config
    }

    /// Applies new settings, reallocating the depth buffer if its size
    /// changed.
    pub fn set_config(&mut self, config: OcclusionConfig) -> Result<()> {
        config.validate()?;
        if (config.width, config.height) != (self.config.width, self.config.height) {
            self.depth.resize(config.width, config.height)?;
        }
        self.rasterizer = Self::rasterizer_for(&config);
        self.config = config;
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.set_config(OcclusionConfig {
            width,
            height,
            ..self.config
        })
    }

    /// Depth written by the last [`SoftwareRenderer::render`] call.
    pub fn depth_buffer(&self) -> &DepthBuffer {
        &self.depth
    }

    pub fn last_raster_stats(&self) -> RasterStats {
        self.last_raster
    }

    /// Clears the depth buffer and rasterizes every occluder mesh.
    ///
    /// Entities without an occluder mesh are ignored.
    pub fn render<E: SceneEntity>(&mut self, camera: &Camera, occluders: &[E]) -> OcclusionPass<'_> {
        self.depth.clear();

        let mut stats = RasterStats::default();
        {
            let mut target = self.depth.target();
            for entity in occluders {
                if let Some(mesh) = entity.occluder_mesh() {
                    let model_view = Mat4::combine(camera.view_matrix(), entity.world_matrix());
                    draw_occluder(
                        &self.rasterizer,
                        &mut target,
                        camera,
                        &model_view,
                        mesh,
                        self.config.backface_culling,
                        &mut stats,
                    );
                }
            }
        }

        log::debug!(
            "occluders: {} triangles, {} back-facing, {} behind near plane, {} rasterized",
            stats.triangles,
            stats.back_facing,
            stats.behind_near,
            stats.rasterized
        );
        self.last_raster = stats;

        OcclusionPass {
            view: self.depth.view(),
            camera: *camera,
            config: self.config,
            rasterizer: &self.rasterizer,
        }
    }
}

/// Transforms, clips, projects and rasterizes one occluder mesh.
fn draw_occluder(
    rasterizer: &ScanlineRasterizer,
    target: &mut DepthTarget,
    camera: &Camera,
    model_view: &Mat4,
    mesh: &OccluderMesh,
    backface_culling: bool,
    stats: &mut RasterStats,
) {
    let projection = camera.projection_matrix();
    let (clip_x, clip_y) = (target.clip_x(), target.clip_y());

    // Model Space --> View Space, once per vertex
    let view_vertices: Vec<Vec4> = (0..mesh.vertex_count())
        .map(|i| model_view.apply_post(Vec4::from(mesh.vertex(i))))
        .collect();

    for [a, b, c] in mesh.triangles() {
        stats.triangles += 1;
        let vertices = [view_vertices[a], view_vertices[b], view_vertices[c]];

        if backface_culling
            && is_back_facing_view(vertices[0].xyz(), vertices[1].xyz(), vertices[2].xyz())
        {
            stats.back_facing += 1;
            continue;
        }

        let clipped = clip_triangle_near(vertices, camera.near());
        if clipped.is_culled() {
            log::trace!("occluder triangle {a}/{b}/{c} behind near plane");
            stats.behind_near += 1;
            continue;
        }

        for triangle in clipped.triangles() {
            let points = triangle.map(|v| project_to_screen(&projection, v, clip_x, clip_y));
            if backface_culling && is_back_facing_screen(points[0], points[1], points[2]) {
                continue;
            }
            rasterizer.fill_triangle(&Triangle::new(points), target);
            stats.rasterized += 1;
        }
    }
}

/// Occludee phase of a frame, reading the finished depth buffer.
pub struct OcclusionPass<'a> {
    view: DepthView<'a>,
    camera: Camera,
    config: OcclusionConfig,
    rasterizer: &'a ScanlineRasterizer,
}

impl<'a> OcclusionPass<'a> {
    pub fn depth_view(&self) -> &DepthView<'a> {
        &self.view
    }

    /// Whether the entity's bounding volume is fully hidden.
    ///
    /// Entities without a bounding volume are never occluded.
    pub fn is_occluded<E: SceneEntity + ?Sized>(&self, entity: &E) -> bool {
        let Some(bound) = entity.bounding_volume() else {
            return false;
        };
        let world = entity.world_matrix();

        match *bound {
            BoundingVolume::Sphere { center, radius } => is_sphere_occluded(
                &self.view,
                &self.camera,
                &world,
                center,
                radius,
                entity.scale(),
                self.config.min_silhouette_rows,
            ),
            BoundingVolume::Box { center, extents } => {
                let model_view_projection =
                    Mat4::combine(self.camera.view_projection_matrix(), world);
                is_box_occluded(
                    &self.view,
                    self.rasterizer,
                    self.config.box_test,
                    &model_view_projection,
                    center,
                    extents,
                    self.camera.near(),
                )
            }
        }
    }

    /// Removes every fully occluded entity from `candidates`, keeping the
    /// order of the rest.
    pub fn perform_occlusion_culling<E: SceneEntity>(&self, candidates: &mut Vec<E>) -> CullStats {
        let mut stats = CullStats::default();
        let mut i = 0;
        while i < candidates.len() {
            if candidates[i].cull_mode() == CullMode::Never {
                stats.skipped += 1;
                i += 1;
                continue;
            }
            stats.tested += 1;
            if self.is_occluded(&candidates[i]) {
                // the next candidate has shifted into slot i
                candidates.remove(i);
                stats.culled += 1;
            } else {
                i += 1;
            }
        }

        log::debug!(
            "culled {} of {} tested entities ({} box test, {} never culled)",
            stats.culled,
            stats.tested,
            self.config.box_test,
            stats.skipped
        );
        stats
    }

    /// The box strategy in use.
    pub fn box_test(&self) -> BoxTest {
        self.config.box_test
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::math::vec3::Vec3;
    use crate::transform::Transform;
    use std::f32::consts::FRAC_PI_2;

    fn camera() -> Camera {
        Camera::perspective(FRAC_PI_2, 1.0, 0.1, 100.0)
    }

    fn wall(z: f32) -> Entity {
        Entity::new("wall", Transform::from_position(Vec3::new(0.0, 0.0, z)))
            .with_occluder(OccluderMesh::quad(10.0, 10.0))
    }

    fn ball(z: f32) -> Entity {
        Entity::new("ball", Transform::from_position(Vec3::new(0.0, 0.0, z)))
            .with_bound(BoundingVolume::sphere(0.2))
    }

    #[test]
    fn rejects_invalid_config() {
        assert!(SoftwareRenderer::new(OcclusionConfig::new(1, 64)).is_err());
    }

    #[test]
    fn render_clears_previous_frame() {
        let mut renderer = SoftwareRenderer::new(OcclusionConfig::new(32, 32)).unwrap();
        renderer.render(&camera(), &[wall(-1.0)]);
        assert!(renderer.depth_buffer().depth_data().iter().all(|&d| d > 0.9));

        renderer.render::<Entity>(&camera(), &[]);
        assert!(renderer.depth_buffer().depth_data().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn back_facing_wall_is_skipped() {
        let mut renderer = SoftwareRenderer::new(OcclusionConfig::new(32, 32)).unwrap();
        let mut turned = wall(-1.0);
        turned.transform_mut().rotate_y(std::f32::consts::PI);
        renderer.render(&camera(), &[turned.clone()]);
        assert_eq!(renderer.last_raster_stats().back_facing, 2);
        assert!(renderer.depth_buffer().depth_data().iter().all(|&d| d == 0.0));

        let config = OcclusionConfig::new(32, 32).with_backface_culling(false);
        renderer.set_config(config).unwrap();
        renderer.render(&camera(), &[turned]);
        assert_eq!(renderer.last_raster_stats().rasterized, 2);
    }

    #[test]
    fn wall_crossing_the_near_plane_is_clipped() {
        let mut renderer = SoftwareRenderer::new(OcclusionConfig::new(32, 32)).unwrap();
        // a floor reaching from behind the camera into the distance
        let mut floor = Entity::new("floor", Transform::from_position(Vec3::new(0.0, -1.0, 0.0)))
            .with_occluder(OccluderMesh::quad(10.0, 10.0));
        floor.transform_mut().set_rotation(Vec3::new(-FRAC_PI_2, 0.0, 0.0));

        renderer.render(&camera(), &[floor]);
        let stats = renderer.last_raster_stats();
        assert_eq!(stats.behind_near, 0);
        assert!(stats.rasterized > 2);
        // bottom row is floor, top row is sky
        let depth = renderer.depth_buffer();
        assert!(depth.get(16, 0).unwrap() > 0.0);
        assert_eq!(depth.get(16, 31), Some(0.0));
    }

    #[test]
    fn culling_removes_hidden_and_keeps_never() {
        let mut renderer = SoftwareRenderer::new(OcclusionConfig::new(32, 32)).unwrap();
        let pass = renderer.render(&camera(), &[wall(-1.0)]);

        let mut candidates = vec![
            ball(-3.0),
            ball(-4.0).with_cull_mode(CullMode::Never),
            ball(-0.5),
            ball(-5.0),
            Entity::new("unbounded", Transform::new()),
        ];
        let stats = pass.perform_occlusion_culling(&mut candidates);

        assert_eq!(
            stats,
            CullStats {
                tested: 4,
                culled: 2,
                skipped: 1
            }
        );
        let kept: Vec<f32> = candidates
            .iter()
            .map(|e| e.transform().position().z)
            .collect();
        assert_eq!(kept, vec![-4.0, -0.5, 0.0]);
    }
}
