//! Segments walkable spans into connected regions.

use std::collections::VecDeque;

use thiserror::Error;

use crate::{
    heightfield::Heightfield,
    math::{dir_offset_x, dir_offset_z},
    span::{AreaId, SpanKey},
};

impl Heightfield {
    /// Flood-fills contiguous walkable span tops into regions.
    ///
    /// Columns are scanned in row-major order; every span still marked
    /// [`AreaId::WALKABLE`] seeds a new region and a breadth-first flood over
    /// the four axis-aligned neighbor columns. A neighbor span joins the
    /// region when it is still a candidate and the difference between the two
    /// span tops is at most `walkable_climb` cells. Spans sharing a column
    /// are never merged by this pass.
    ///
    /// Region ids start at [`AreaId::FIRST_REGION`]. Returns the number of
    /// regions created.
    pub fn build_regions(&mut self, walkable_climb: u16) -> Result<u16, RegionError> {
        let mut queue: VecDeque<(u32, u32, SpanKey)> = VecDeque::new();
        let mut next_region = AreaId::FIRST_REGION.0;

        for z in 0..self.depth() {
            for x in 0..self.width() {
                let mut key_iter = self.span_key_at(x, z);
                while let Some(key) = key_iter {
                    let span = self.span(key);
                    key_iter = span.next();
                    if span.area() != AreaId::WALKABLE {
                        continue;
                    }
                    // Id u16::MAX stays reserved so the count below cannot wrap.
                    if next_region == u16::MAX {
                        return Err(RegionError::TooManyRegions {
                            max: u16::MAX - AreaId::FIRST_REGION.0,
                        });
                    }
                    let region = AreaId(next_region);
                    next_region += 1;

                    self.span_mut(key).set_area(region);
                    queue.push_back((x, z, key));
                    self.flood_region(region, walkable_climb, &mut queue);
                }
            }
        }
        Ok(next_region - AreaId::FIRST_REGION.0)
    }

    fn flood_region(
        &mut self,
        region: AreaId,
        walkable_climb: u16,
        queue: &mut VecDeque<(u32, u32, SpanKey)>,
    ) {
        while let Some((x, z, key)) = queue.pop_front() {
            let top = self.span(key).max();
            for direction in 0..4 {
                let neighbor_x = x as i32 + dir_offset_x(direction) as i32;
                let neighbor_z = z as i32 + dir_offset_z(direction) as i32;
                if !self.contains(neighbor_x, neighbor_z) {
                    continue;
                }
                let (neighbor_x, neighbor_z) = (neighbor_x as u32, neighbor_z as u32);

                let mut neighbor_iter = self.span_key_at(neighbor_x, neighbor_z);
                while let Some(neighbor_key) = neighbor_iter {
                    let neighbor = self.span(neighbor_key);
                    neighbor_iter = neighbor.next();
                    if neighbor.area() != AreaId::WALKABLE {
                        continue;
                    }
                    let climb = (neighbor.max() as i32 - top as i32).unsigned_abs();
                    if climb > walkable_climb as u32 {
                        continue;
                    }
                    self.span_mut(neighbor_key).set_area(region);
                    queue.push_back((neighbor_x, neighbor_z, neighbor_key));
                }
            }
        }
    }
}

/// Errors that can occur during region segmentation.
#[derive(Error, Debug)]
pub enum RegionError {
    /// The region id space is exhausted.
    #[error("ran out of region ids after {max} regions")]
    TooManyRegions {
        /// The largest supported number of regions.
        max: u16,
    },
}

#[cfg(test)]
mod tests {
    use crate::{math::Aabb3d, voxel_grid::VoxelGridBuilder};

    use super::*;

    /// A 6x8x1 grid whose floor steps up by `step` cells halfway across.
    fn stepped_heightfield(step: u32) -> Heightfield {
        let mut grid = VoxelGridBuilder {
            aabb: Aabb3d::new([0.0, 0.0, 0.0], [6.0, 8.0, 1.0]),
            cell_size: 1.0,
            cell_height: 1.0,
        }
        .build()
        .unwrap();
        for x in 0..3 {
            grid.set(x, 0, 0);
        }
        for x in 3..6 {
            for y in 0..=step {
                grid.set(x, y, 0);
            }
        }
        let mut heightfield = Heightfield::from_voxel_grid(&grid);
        heightfield.filter_walkable_spans(2);
        heightfield
    }

    fn region_of(heightfield: &Heightfield, x: u32, z: u32) -> AreaId {
        heightfield.span_at(x, z).unwrap().area()
    }

    #[test]
    fn a_flat_floor_is_one_region() {
        let mut heightfield = stepped_heightfield(0);
        let regions = heightfield.build_regions(0).unwrap();
        assert_eq!(regions, 1);
        for view in heightfield.iter_spans() {
            assert_eq!(view.area, AreaId::FIRST_REGION);
        }
    }

    #[test]
    fn a_step_above_the_climb_limit_splits_the_floor() {
        let mut heightfield = stepped_heightfield(1);
        let regions = heightfield.build_regions(0).unwrap();
        assert_eq!(regions, 2);
        assert_eq!(region_of(&heightfield, 0, 0), AreaId(2));
        assert_eq!(region_of(&heightfield, 2, 0), AreaId(2));
        assert_eq!(region_of(&heightfield, 3, 0), AreaId(3));
        assert_eq!(region_of(&heightfield, 5, 0), AreaId(3));
    }

    #[test]
    fn a_step_within_the_climb_limit_stays_connected() {
        let mut heightfield = stepped_heightfield(1);
        let regions = heightfield.build_regions(1).unwrap();
        assert_eq!(regions, 1);
    }

    #[test]
    fn non_walkable_spans_are_not_labeled() {
        let mut heightfield = stepped_heightfield(0);
        // An agent taller than the grid leaves no walkable span.
        heightfield.filter_walkable_spans(9);
        let regions = heightfield.build_regions(0).unwrap();
        assert_eq!(regions, 0);
        for view in heightfield.iter_spans() {
            assert_eq!(view.area, AreaId::NOT_WALKABLE);
        }
    }

    #[test]
    fn spans_sharing_a_column_are_not_merged() {
        let mut grid = VoxelGridBuilder {
            aabb: Aabb3d::new([0.0, 0.0, 0.0], [1.0, 8.0, 1.0]),
            cell_size: 1.0,
            cell_height: 1.0,
        }
        .build()
        .unwrap();
        grid.set(0, 0, 0);
        grid.set(0, 4, 0);

        let mut heightfield = Heightfield::from_voxel_grid(&grid);
        heightfield.filter_walkable_spans(2);
        // Both spans are walkable and within climb distance of nothing but
        // each other, yet they form separate regions.
        let regions = heightfield.build_regions(8).unwrap();
        assert_eq!(regions, 2);
    }

    #[test]
    fn region_ids_are_assigned_in_scan_order() {
        let mut grid = VoxelGridBuilder {
            aabb: Aabb3d::new([0.0, 0.0, 0.0], [5.0, 4.0, 3.0]),
            cell_size: 1.0,
            cell_height: 1.0,
        }
        .build()
        .unwrap();
        // Three isolated pillars.
        grid.set(4, 0, 0);
        grid.set(0, 0, 1);
        grid.set(2, 0, 2);

        let mut heightfield = Heightfield::from_voxel_grid(&grid);
        heightfield.filter_walkable_spans(2);
        let regions = heightfield.build_regions(0).unwrap();
        assert_eq!(regions, 3);
        assert_eq!(region_of(&heightfield, 4, 0), AreaId(2));
        assert_eq!(region_of(&heightfield, 0, 1), AreaId(3));
        assert_eq!(region_of(&heightfield, 2, 2), AreaId(4));
    }
}
