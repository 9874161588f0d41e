//! A triangle mesh used as input for rasterization.

use glam::{UVec3, Vec3A};

use crate::math::Aabb3d;

/// A triangle mesh in the triangle-list convention.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TriMesh {
    /// The vertices composing the mesh.
    pub vertices: Vec<Vec3A>,
    /// The indices composing the mesh, one entry per triangle.
    pub indices: Vec<UVec3>,
}

impl TriMesh {
    /// Builds a trimesh from vertices and a flat, triple-aligned index list.
    /// Trailing indices that do not form a whole triangle are dropped.
    pub fn from_raw(vertices: Vec<Vec3A>, indices: &[u32]) -> Self {
        Self {
            vertices,
            indices: indices
                .chunks_exact(3)
                .map(|triangle| UVec3::new(triangle[0], triangle[1], triangle[2]))
                .collect(),
        }
    }

    /// Extends the trimesh with the vertices and indices of another trimesh.
    /// The indices of `other` will be offset by the number of vertices in `self`.
    pub fn extend(&mut self, other: TriMesh) {
        if self.vertices.len() > u32::MAX as usize {
            panic!("Cannot extend a trimesh with more than 2^32 vertices");
        }
        let next_vertex_index = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.indices
            .extend(other.indices.iter().map(|i| i + next_vertex_index));
    }

    /// Computes the AABB of the trimesh.
    /// Returns `None` if the trimesh is empty.
    pub fn compute_aabb(&self) -> Option<Aabb3d> {
        Aabb3d::from_verts(&self.vertices)
    }

    /// The number of triangles in the mesh.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Whether the mesh contains no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterates over the triangles of the mesh as vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3A; 3]> + '_ {
        self.indices.iter().map(|indices| {
            [
                self.vertices[indices.x as usize],
                self.vertices[indices.y as usize],
                self.vertices[indices.z as usize],
            ]
        })
    }
}
