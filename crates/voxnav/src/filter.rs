//! Classifies spans as walkable based on the clearance above them.

use crate::{heightfield::Heightfield, span::AreaId};

impl Heightfield {
    /// Marks every span as a walkable candidate, then clears spans whose
    /// headroom is too low for the agent to stand on.
    ///
    /// The headroom of a span is the gap between its top and the floor of the
    /// next obstruction above: `next.min() - span.max()`, with the grid
    /// ceiling standing in when the span is the highest in its column. A span
    /// stays walkable when its headroom reaches `walkable_height` cells.
    pub fn filter_walkable_spans(&mut self, walkable_height: u16) {
        let ceiling = self.height() as u16;
        for z in 0..self.depth() {
            for x in 0..self.width() {
                let mut key_iter = self.span_key_at(x, z);
                while let Some(key) = key_iter {
                    let span = self.span(key);
                    let next = span.next();
                    let top = span.max();
                    key_iter = next;

                    let obstruction = match next {
                        Some(next) => self.span(next).min(),
                        None => ceiling,
                    };
                    let headroom = obstruction - top;
                    let area = if headroom < walkable_height {
                        AreaId::NOT_WALKABLE
                    } else {
                        AreaId::WALKABLE
                    };
                    self.span_mut(key).set_area(area);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{math::Aabb3d, voxel_grid::VoxelGridBuilder};

    use super::*;

    /// A 1x8x1 column grid with solid runs at 0..=1 and 4..=6.
    fn heightfield() -> Heightfield {
        let mut grid = VoxelGridBuilder {
            aabb: Aabb3d::new([0.0, 0.0, 0.0], [1.0, 8.0, 1.0]),
            cell_size: 1.0,
            cell_height: 1.0,
        }
        .build()
        .unwrap();
        for y in [0, 1, 4, 5, 6] {
            grid.set(0, y, 0);
        }
        Heightfield::from_voxel_grid(&grid)
    }

    fn areas(heightfield: &Heightfield) -> Vec<AreaId> {
        heightfield.iter_spans().map(|view| view.area).collect()
    }

    #[test]
    fn spans_with_enough_headroom_become_walkable() {
        let mut heightfield = heightfield();
        // Low span sees the next floor at 4: headroom 3.
        // High span sees the grid ceiling at 8: headroom 2.
        heightfield.filter_walkable_spans(2);
        assert_eq!(areas(&heightfield), vec![AreaId::WALKABLE, AreaId::WALKABLE]);
    }

    #[test]
    fn headroom_is_measured_to_the_next_spans_floor() {
        let mut heightfield = heightfield();
        // The gap of empty cells is 2..=3, but the headroom counts up to the
        // obstruction floor at 4, so a height of exactly 3 still fits.
        heightfield.filter_walkable_spans(3);
        assert_eq!(
            areas(&heightfield),
            vec![AreaId::WALKABLE, AreaId::NOT_WALKABLE]
        );

        heightfield.filter_walkable_spans(4);
        assert_eq!(
            areas(&heightfield),
            vec![AreaId::NOT_WALKABLE, AreaId::NOT_WALKABLE]
        );
    }

    #[test]
    fn raising_the_agent_never_makes_spans_walkable() {
        let mut low = heightfield();
        low.filter_walkable_spans(2);
        let mut high = heightfield();
        high.filter_walkable_spans(3);

        for (low_area, high_area) in areas(&low).into_iter().zip(areas(&high)) {
            if high_area.is_walkable() {
                assert!(low_area.is_walkable());
            }
        }
    }

    #[test]
    fn refiltering_reclassifies_from_scratch() {
        let mut heightfield = heightfield();
        heightfield.filter_walkable_spans(9);
        assert_eq!(
            areas(&heightfield),
            vec![AreaId::NOT_WALKABLE, AreaId::NOT_WALKABLE]
        );

        heightfield.filter_walkable_spans(1);
        assert_eq!(areas(&heightfield), vec![AreaId::WALKABLE, AreaId::WALKABLE]);
    }
}
