//! Erosion of the walkable area by the agent radius.

use tracing::debug;

use crate::heightfield::Heightfield;

impl Heightfield {
    /// Shrinks the walkable area away from obstructions by the agent radius.
    ///
    /// Not implemented yet: the radius is accepted and validated by the
    /// configuration so callers are already wired up, but this pass currently
    /// leaves every area untouched. Region segmentation therefore reaches one
    /// cell closer to walls than the agent can actually stand.
    pub fn erode_walkable_area(&mut self, walkable_radius: u16) {
        if walkable_radius > 0 {
            debug!(walkable_radius, "erosion is not implemented yet, skipping");
        }
    }
}
