//! Triangle mesh geometry handed over by the editor.
//!
//! Positions are in the mesh's local space; the owning scene object carries
//! the transform that places it in the world.

use ivar_math::{Aabb, Mat4, Vec3};
use thiserror::Error;

/// Problems found while reading triangles out of a [`Mesh`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("index buffer length {len} is not a multiple of 3")]
    IncompleteTriangle { len: usize },

    #[error("vertex index {index} out of range (mesh has {vertex_count} vertices)")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("vertex {index} has a non-finite position")]
    NonFinitePosition { index: usize },
}

/// A mesh consisting of vertex positions and triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Local-space bounding box
    pub bounds: Aabb,
}

impl Mesh {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let bounds = Aabb::from_point_cloud(&positions);
        Self {
            positions,
            indices,
            bounds,
        }
    }

    /// Axis-aligned cube centered at the origin, 12 outward-facing triangles.
    pub fn cube(half_extent: f32) -> Self {
        let h = half_extent;
        let positions = vec![
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
        ];
        #[rustfmt::skip]
        let indices = vec![
            4, 5, 6, 4, 6, 7, // +Z
            1, 0, 3, 1, 3, 2, // -Z
            5, 1, 2, 5, 2, 6, // +X
            0, 4, 7, 0, 7, 3, // -X
            7, 6, 2, 7, 2, 3, // +Y
            0, 1, 5, 0, 5, 4, // -Y
        ];
        Self::new(positions, indices)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Check indices and positions without extracting anything.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::IncompleteTriangle {
                len: self.indices.len(),
            });
        }
        if let Some(index) = self.positions.iter().position(|p| !p.is_finite()) {
            return Err(MeshError::NonFinitePosition { index });
        }
        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.positions.len())
        {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count: self.positions.len(),
            });
        }
        Ok(())
    }

    /// Triangle vertices transformed into world space by `world`.
    pub fn world_triangles(&self, world: &Mat4) -> Result<Vec<[Vec3; 3]>, MeshError> {
        self.validate()?;

        Ok(self
            .indices
            .chunks_exact(3)
            .map(|face| {
                [
                    world.transform_point3(self.positions[face[0] as usize]),
                    world.transform_point3(self.positions[face[1] as usize]),
                    world.transform_point3(self.positions[face[2] as usize]),
                ]
            })
            .collect())
    }
}
