//! Simplified occluder geometry.
//!
//! Occluders are rasterized into the depth buffer, so they should be cheap
//! stand-ins (walls, cubes, low-poly hulls) rather than the render meshes.

use std::path::Path;

use crate::bounds::{box_corners, BOX_TRIANGLES};
use crate::error::{OcclusionError, Result};
use crate::math::vec3::Vec3;

/// Triangle mesh in model space: flat positions (stride 3) and
/// triangle indices (stride 3).
#[derive(Clone, Debug, PartialEq)]
pub struct OccluderMesh {
    positions: Vec<f32>,
    indices: Vec<u32>,
}

impl OccluderMesh {
    /// Creates a mesh, validating strides and index ranges.
    pub fn new(positions: Vec<f32>, indices: Vec<u32>) -> Result<Self> {
        if positions.len() % 3 != 0 {
            return Err(invalid(format!(
                "position buffer length {} is not a multiple of 3",
                positions.len()
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(invalid(format!(
                "index buffer length {} is not a multiple of 3",
                indices.len()
            )));
        }

        let vertex_count = positions.len() / 3;
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(invalid(format!(
                "index {bad} out of range for {vertex_count} vertices"
            )));
        }

        Ok(Self { positions, indices })
    }

    /// Loads every object of an OBJ file into one occluder mesh.
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };
        let (models, _materials) =
            tobj::load_obj(path, &options).map_err(|source| OcclusionError::ObjLoad {
                path: path.to_path_buf(),
                source,
            })?;

        let mut positions = Vec::new();
        let mut indices = Vec::new();
        for model in &models {
            let base = (positions.len() / 3) as u32;
            positions.extend_from_slice(&model.mesh.positions);
            indices.extend(model.mesh.indices.iter().map(|i| base + i));
        }

        log::debug!(
            "loaded occluder {} ({} objects, {} triangles)",
            path.display(),
            models.len(),
            indices.len() / 3
        );
        Self::new(positions, indices)
    }

    /// Axis-aligned cuboid with the given half-extents, faces wound outwards.
    pub fn cuboid(extents: Vec3) -> Self {
        let positions = box_corners(Vec3::ZERO, extents)
            .iter()
            .flat_map(|c| [c.x, c.y, c.z])
            .collect();
        let indices = BOX_TRIANGLES
            .iter()
            .flatten()
            .map(|&i| i as u32)
            .collect();
        Self { positions, indices }
    }

    /// Rectangle in the XY plane facing +Z.
    pub fn quad(half_width: f32, half_height: f32) -> Self {
        let (w, h) = (half_width, half_height);
        Self {
            positions: vec![-w, -h, 0.0, w, -h, 0.0, w, h, 0.0, -w, h, 0.0],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Model-space position of vertex `index`.
    pub fn vertex(&self, index: usize) -> Vec3 {
        let p = &self.positions[index * 3..index * 3 + 3];
        Vec3::new(p[0], p[1], p[2])
    }

    /// Iterates triangles as vertex index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
    }
}

fn invalid(reason: String) -> OcclusionError {
    log::warn!("rejecting occluder mesh: {reason}");
    OcclusionError::InvalidMesh(reason)
}
