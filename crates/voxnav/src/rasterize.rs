//! Rasterizes world-space triangles into a [`VoxelGrid`].

use glam::Vec3A;

use crate::{
    math::TriangleVertices as _,
    trimesh::TriMesh,
    voxel_grid::VoxelGrid,
};

/// Tests a triangle against an axis-aligned box with the separating-axis
/// theorem, after Akenine-Möller.
///
/// The axis order is fixed: the three box face normals, then the triangle
/// plane, then the nine edge cross products grouped per box axis. The first
/// separating axis short-circuits the test.
pub(crate) fn triangle_box_overlap(
    triangle: &[Vec3A; 3],
    box_center: Vec3A,
    box_half_extents: Vec3A,
) -> bool {
    // All tests run in the box-centered frame.
    let verts = triangle.map(|vert| vert - box_center);

    // Box face normals: compare the triangle extent to the box extent per axis.
    for axis in 0..3 {
        let p0 = verts[0][axis];
        let p1 = verts[1][axis];
        let p2 = verts[2][axis];
        let min = p0.min(p1).min(p2);
        let max = p0.max(p1).max(p2);
        if min > box_half_extents[axis] || max < -box_half_extents[axis] {
            return false;
        }
    }

    let edges = [
        verts[1] - verts[0],
        verts[2] - verts[1],
        verts[0] - verts[2],
    ];

    // Triangle plane: project the two box corners most aligned with the
    // normal. A degenerate triangle has a zero normal and separates nothing.
    let normal = edges[0].cross(edges[1]);
    let mut near_corner = Vec3A::ZERO;
    let mut far_corner = Vec3A::ZERO;
    for axis in 0..3 {
        if normal[axis] > 0.0 {
            near_corner[axis] = -box_half_extents[axis];
            far_corner[axis] = box_half_extents[axis];
        } else {
            near_corner[axis] = box_half_extents[axis];
            far_corner[axis] = -box_half_extents[axis];
        }
    }
    let plane_distance = normal.dot(verts[0]);
    if normal.dot(near_corner) > plane_distance || normal.dot(far_corner) < plane_distance {
        return false;
    }

    // Nine edge cross products.
    for box_axis in 0..3 {
        for edge in &edges {
            let axis = unit_axis(box_axis).cross(*edge);
            let radius = box_half_extents.dot(axis.abs());
            let p0 = axis.dot(verts[0]);
            let p1 = axis.dot(verts[1]);
            let p2 = axis.dot(verts[2]);
            let min = p0.min(p1).min(p2);
            let max = p0.max(p1).max(p2);
            if min > radius || max < -radius {
                return false;
            }
        }
    }

    true
}

fn unit_axis(axis: usize) -> Vec3A {
    let mut unit = Vec3A::ZERO;
    unit[axis] = 1.0;
    unit
}

impl VoxelGrid {
    /// Marks every cell that overlaps a triangle of the mesh as solid.
    ///
    /// Triangles outside the grid AABB mark nothing; triangles straddling the
    /// boundary are clipped to it by the cell-range clamp.
    pub fn rasterize_triangles(&mut self, trimesh: &TriMesh) {
        for triangle in trimesh.triangles() {
            self.rasterize_triangle(&triangle);
        }
    }

    fn rasterize_triangle(&mut self, triangle: &[Vec3A; 3]) {
        let aabb = triangle.aabb();
        let grid_min = self.aabb().min;
        let cell_size = self.cell_size();
        let cell_height = self.cell_height();

        let to_cell =
            |world: f32, origin: f32, cell: f32| ((world - origin) / cell).floor() as i64;
        let min_x = to_cell(aabb.min.x, grid_min.x, cell_size).clamp(0, self.width() as i64 - 1);
        let max_x = to_cell(aabb.max.x, grid_min.x, cell_size).clamp(0, self.width() as i64 - 1);
        let min_y = to_cell(aabb.min.y, grid_min.y, cell_height).clamp(0, self.height() as i64 - 1);
        let max_y = to_cell(aabb.max.y, grid_min.y, cell_height).clamp(0, self.height() as i64 - 1);
        let min_z = to_cell(aabb.min.z, grid_min.z, cell_size).clamp(0, self.depth() as i64 - 1);
        let max_z = to_cell(aabb.max.z, grid_min.z, cell_size).clamp(0, self.depth() as i64 - 1);

        let half_extents = self.cell_half_extents();
        for z in min_z..=max_z {
            for y in min_y..=max_y {
                for x in min_x..=max_x {
                    let (x, y, z) = (x as u32, y as u32, z as u32);
                    if self.is_solid(x, y, z) {
                        continue;
                    }
                    let center = self.cell_center(x, y, z);
                    if triangle_box_overlap(triangle, center, half_extents) {
                        self.set(x, y, z);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{math::Aabb3d, voxel_grid::VoxelGridBuilder};

    use super::*;

    const HALF: Vec3A = Vec3A::splat(0.5);

    #[test]
    fn triangle_inside_box_overlaps() {
        let triangle = [
            Vec3A::new(-0.2, -0.1, 0.0),
            Vec3A::new(0.3, 0.2, 0.1),
            Vec3A::new(0.0, 0.3, -0.2),
        ];
        assert!(triangle_box_overlap(&triangle, Vec3A::ZERO, HALF));
    }

    #[test]
    fn triangle_separated_by_face_normal_does_not_overlap() {
        let triangle = [
            Vec3A::new(2.0, 0.0, 0.0),
            Vec3A::new(3.0, 0.0, 0.0),
            Vec3A::new(2.0, 1.0, 0.0),
        ];
        assert!(!triangle_box_overlap(&triangle, Vec3A::ZERO, HALF));
    }

    #[test]
    fn large_triangle_spanning_the_box_overlaps() {
        // The triangle AABB contains the box, so only the plane test can see it.
        let triangle = [
            Vec3A::new(-10.0, 0.0, -10.0),
            Vec3A::new(10.0, 0.0, -10.0),
            Vec3A::new(0.0, 0.0, 10.0),
        ];
        assert!(triangle_box_overlap(&triangle, Vec3A::ZERO, HALF));
    }

    #[test]
    fn coplanar_but_outside_plane_reach_does_not_overlap() {
        let triangle = [
            Vec3A::new(-10.0, 0.8, -10.0),
            Vec3A::new(10.0, 0.8, -10.0),
            Vec3A::new(0.0, 0.8, 10.0),
        ];
        assert!(!triangle_box_overlap(&triangle, Vec3A::ZERO, HALF));
    }

    #[test]
    fn corner_grazing_triangle_is_caught_by_edge_axes() {
        // Overlaps the box AABB near a corner but is separated by an
        // edge cross product.
        let triangle = [
            Vec3A::new(1.4, 0.0, 0.0),
            Vec3A::new(0.0, 1.4, 0.0),
            Vec3A::new(1.4, 1.4, 0.0),
        ];
        assert!(!triangle_box_overlap(&triangle, Vec3A::ZERO, HALF));
    }

    #[test]
    fn touching_the_box_face_counts_as_overlap() {
        let triangle = [
            Vec3A::new(0.5, -0.2, -0.2),
            Vec3A::new(0.5, 0.4, -0.2),
            Vec3A::new(0.5, -0.2, 0.4),
        ];
        assert!(triangle_box_overlap(&triangle, Vec3A::ZERO, HALF));
    }

    #[test]
    fn degenerate_triangle_overlaps_where_its_segment_lies() {
        let segment = [
            Vec3A::new(-0.2, 0.0, 0.0),
            Vec3A::new(0.2, 0.0, 0.0),
            Vec3A::new(0.2, 0.0, 0.0),
        ];
        assert!(triangle_box_overlap(&segment, Vec3A::ZERO, HALF));

        let far_segment = segment.map(|vert| vert + Vec3A::new(0.0, 2.0, 0.0));
        assert!(!triangle_box_overlap(&far_segment, Vec3A::ZERO, HALF));
    }

    fn grid() -> VoxelGrid {
        VoxelGridBuilder {
            aabb: Aabb3d::new([0.0, 0.0, 0.0], [4.0, 4.0, 4.0]),
            cell_size: 1.0,
            cell_height: 1.0,
        }
        .build()
        .unwrap()
    }

    #[test]
    fn rasterizes_a_flat_triangle_into_one_layer() {
        let mut grid = grid();
        let trimesh = TriMesh::from_raw(
            vec![
                Vec3A::new(0.1, 0.5, 0.1),
                Vec3A::new(3.9, 0.5, 0.1),
                Vec3A::new(0.1, 0.5, 3.9),
            ],
            &[0, 1, 2],
        );
        grid.rasterize_triangles(&trimesh);

        // Every marked cell is in the bottom layer.
        assert!(grid.solid_count() > 0);
        for (_, y, _, solid) in grid.iter_cells() {
            if solid {
                assert_eq!(y, 0);
            }
        }
        // The corner cells on the hypotenuse side stay empty.
        assert!(grid.is_solid(0, 0, 0));
        assert!(!grid.is_solid(3, 0, 3));
    }

    #[test]
    fn every_marked_cell_overlaps_an_input_triangle() {
        let mut grid = grid();
        let trimesh = TriMesh::from_raw(
            vec![
                Vec3A::new(0.3, 0.2, 0.3),
                Vec3A::new(3.5, 2.8, 0.4),
                Vec3A::new(1.0, 3.6, 3.5),
            ],
            &[0, 1, 2],
        );
        grid.rasterize_triangles(&trimesh);

        let half_extents = grid.cell_half_extents();
        assert!(grid.solid_count() > 0);
        for (x, y, z, solid) in grid.iter_cells() {
            let overlaps = trimesh.triangles().any(|triangle| {
                triangle_box_overlap(&triangle, grid.cell_center(x, y, z), half_extents)
            });
            assert_eq!(solid, overlaps, "mismatch at ({x}, {y}, {z})");
        }
    }

    #[test]
    fn triangles_outside_the_grid_mark_nothing() {
        let mut grid = grid();
        let trimesh = TriMesh::from_raw(
            vec![
                Vec3A::new(10.0, 1.0, 10.0),
                Vec3A::new(12.0, 1.0, 10.0),
                Vec3A::new(10.0, 1.0, 12.0),
            ],
            &[0, 1, 2],
        );
        grid.rasterize_triangles(&trimesh);
        assert_eq!(grid.solid_count(), 0);
    }
}
