//! The build configuration.

use crate::math::Aabb3d;

/// Specifies a configuration to use when building a navmesh.
///
/// The world-space agent measurements are converted to voxel units with
/// [`NavmeshConfig::walkable_height`], [`NavmeshConfig::walkable_climb`], and
/// [`NavmeshConfig::walkable_radius`]. Cell sizes have significant side
/// effects on everything defined in voxel units: halving `cell_size`
/// quadruples the grid and roughly quadruples the build time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct NavmeshConfig {
    /// The world-space AABB clipping the volume of interest. Geometry outside
    /// it is ignored.
    pub aabb: Aabb3d,
    /// The xz-plane cell size. `[Limit: > 0] [Units: wu]`
    ///
    /// Usually derived from the agent radius `r`; `r / 2` is a reasonable
    /// starting point.
    pub cell_size: f32,
    /// The y-axis cell size. `[Limit: > 0] [Units: wu]`
    ///
    /// Defined separately to allow greater precision in height tests. A good
    /// starting point is half the cell size.
    pub cell_height: f32,
    /// The height of the agent. `[Limit: > 0] [Units: wu]`
    ///
    /// It's often a good idea to add a little bit of padding. An agent that
    /// is 1.8 world units tall might want to set this value to 2.0 units.
    pub agent_height: f32,
    /// The radius of the agent. `[Limit: >= 0] [Units: wu]`
    ///
    /// Reserved for walkable-area erosion; accepted but not consumed yet.
    pub agent_radius: f32,
    /// The maximum ledge height the agent can step up or down.
    /// `[Limit: >= 0] [Units: wu]`
    pub max_climb: f32,
}

impl Default for NavmeshConfig {
    fn default() -> Self {
        Self {
            aabb: Aabb3d::default(),
            cell_size: 0.3,
            cell_height: 0.2,
            agent_height: 2.0,
            agent_radius: 0.6,
            max_climb: 0.9,
        }
    }
}

impl NavmeshConfig {
    /// The vertical clearance required above a surface, in cells.
    #[inline]
    pub fn walkable_height(&self) -> u16 {
        (self.agent_height / self.cell_height).ceil() as u16
    }

    /// The maximum traversable height difference between neighboring
    /// surfaces, in cells.
    #[inline]
    pub fn walkable_climb(&self) -> u16 {
        (self.max_climb / self.cell_height).floor() as u16
    }

    /// The agent radius, in cells.
    #[inline]
    pub fn walkable_radius(&self) -> u16 {
        (self.agent_radius / self.cell_size).ceil() as u16
    }
}
