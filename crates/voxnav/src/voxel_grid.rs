//! A dense 3D occupancy grid over the volume of interest.
//!
//! The grid is the output of rasterization and the input of heightfield
//! construction. Build with [`VoxelGridBuilder`].

use glam::Vec3A;
use thiserror::Error;

use crate::{math::Aabb3d, span::Span};

/// A dense, axis-aligned 3D occupancy grid.
///
/// Cells are addressed as `(x, y, z)` with `x` along the width, `y` along the
/// height, and `z` along the depth. Storage is row-major over the xz-plane,
/// stacked in y.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelGrid {
    aabb: Aabb3d,
    cell_size: f32,
    cell_height: f32,
    width: u32,
    height: u32,
    depth: u32,
    cells: Vec<bool>,
}

impl VoxelGrid {
    /// The AABB covered by the grid.
    #[inline]
    pub fn aabb(&self) -> Aabb3d {
        self.aabb
    }

    /// The cell size on the xz-plane.
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// The cell size along the y-axis.
    #[inline]
    pub fn cell_height(&self) -> f32 {
        self.cell_height
    }

    /// The number of cells along the x-axis.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The number of cells along the y-axis.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The number of cells along the z-axis.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Resets all cells to empty.
    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    #[inline]
    pub(crate) fn index(&self, x: u32, y: u32, z: u32) -> usize {
        debug_assert!(x < self.width && y < self.height && z < self.depth);
        x as usize + z as usize * self.width as usize + y as usize * self.column_count()
    }

    #[inline]
    pub(crate) fn column_count(&self) -> usize {
        self.width as usize * self.depth as usize
    }

    /// Marks the cell at the given coordinates as solid.
    ///
    /// Out-of-range coordinates are a programmer error; callers clamp first.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, z: u32) {
        let index = self.index(x, y, z);
        self.cells[index] = true;
    }

    /// Whether the cell at the given coordinates is solid.
    #[inline]
    pub fn is_solid(&self, x: u32, y: u32, z: u32) -> bool {
        self.cells[self.index(x, y, z)]
    }

    /// The world-space center of the cell at the given coordinates.
    #[inline]
    pub fn cell_center(&self, x: u32, y: u32, z: u32) -> Vec3A {
        self.aabb.min
            + Vec3A::new(
                (x as f32 + 0.5) * self.cell_size,
                (y as f32 + 0.5) * self.cell_height,
                (z as f32 + 0.5) * self.cell_size,
            )
    }

    /// The world-space half extents of a single cell.
    #[inline]
    pub fn cell_half_extents(&self) -> Vec3A {
        Vec3A::new(
            self.cell_size * 0.5,
            self.cell_height * 0.5,
            self.cell_size * 0.5,
        )
    }

    /// The number of solid cells.
    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|solid| **solid).count()
    }

    /// Iterates over all cells as `(x, y, z, solid)`, in storage order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u32, u32, bool)> + '_ {
        let columns = self.column_count();
        self.cells.iter().enumerate().map(move |(index, &solid)| {
            let x = (index % self.width as usize) as u32;
            let z = (index % columns / self.width as usize) as u32;
            let y = (index / columns) as u32;
            (x, y, z, solid)
        })
    }
}

/// A builder for [`VoxelGrid`]s.
pub struct VoxelGridBuilder {
    /// The AABB the grid should cover.
    pub aabb: Aabb3d,
    /// The cell size on the xz-plane.
    pub cell_size: f32,
    /// The cell size along the y-axis.
    pub cell_height: f32,
}

impl VoxelGridBuilder {
    /// Validates the configuration and allocates an all-empty grid.
    ///
    /// The number of cells per axis is `floor(extent / cell size)`; the AABB
    /// must be at least one cell wide on every axis.
    pub fn build(self) -> Result<VoxelGrid, VoxelGridBuilderError> {
        let size = self.aabb.size();
        if !(size.cmpgt(Vec3A::ZERO).all()) {
            return Err(VoxelGridBuilderError::DegenerateBounds {
                min: self.aabb.min,
                max: self.aabb.max,
            });
        }
        if !(self.cell_size > 0.0) || !(self.cell_height > 0.0) {
            return Err(VoxelGridBuilderError::NonPositiveCellSize {
                cell_size: self.cell_size,
                cell_height: self.cell_height,
            });
        }

        let width = (size.x / self.cell_size).floor() as u64;
        let height = (size.y / self.cell_height).floor() as u64;
        let depth = (size.z / self.cell_size).floor() as u64;
        if width == 0 || height == 0 || depth == 0 {
            return Err(VoxelGridBuilderError::ZeroExtent {
                width,
                height,
                depth,
            });
        }
        if height > Span::MAX_HEIGHT as u64 {
            return Err(VoxelGridBuilderError::TooTall {
                height,
                max: Span::MAX_HEIGHT,
            });
        }
        let cell_count = width as u128 * height as u128 * depth as u128;
        if cell_count > usize::MAX as u128 || width > u32::MAX as u64 || depth > u32::MAX as u64 {
            return Err(VoxelGridBuilderError::CellCountTooLarge {
                width,
                height,
                depth,
            });
        }

        Ok(VoxelGrid {
            aabb: self.aabb,
            cell_size: self.cell_size,
            cell_height: self.cell_height,
            width: width as u32,
            height: height as u32,
            depth: depth as u32,
            cells: vec![false; cell_count as usize],
        })
    }
}

/// Errors that can occur when building a [`VoxelGrid`] with
/// [`VoxelGridBuilder::build`].
#[derive(Error, Debug)]
pub enum VoxelGridBuilderError {
    /// The AABB is not positive-size on every axis.
    #[error("grid bounds are degenerate: min {min} must be less than max {max} on every axis")]
    DegenerateBounds {
        /// The minimum corner of the rejected AABB.
        min: Vec3A,
        /// The maximum corner of the rejected AABB.
        max: Vec3A,
    },
    /// A cell size is zero, negative, or NaN.
    #[error("cell sizes must be positive, got cell_size={cell_size} and cell_height={cell_height}")]
    NonPositiveCellSize {
        /// The rejected xz-plane cell size.
        cell_size: f32,
        /// The rejected y-axis cell size.
        cell_height: f32,
    },
    /// The AABB is thinner than one cell on some axis.
    #[error("grid must be at least one cell on every axis, got {width}x{height}x{depth}")]
    ZeroExtent {
        /// The computed cell count along the x-axis.
        width: u64,
        /// The computed cell count along the y-axis.
        height: u64,
        /// The computed cell count along the z-axis.
        depth: u64,
    },
    /// The vertical extent does not fit the span height type.
    #[error("grid height {height} exceeds the maximum span height {max}")]
    TooTall {
        /// The computed cell count along the y-axis.
        height: u64,
        /// The largest supported cell count along the y-axis.
        max: u16,
    },
    /// The total cell count overflows the grid index space.
    #[error("cell count {width}*{height}*{depth} does not fit the grid index space")]
    CellCountTooLarge {
        /// The computed cell count along the x-axis.
        width: u64,
        /// The computed cell count along the y-axis.
        height: u64,
        /// The computed cell count along the z-axis.
        depth: u64,
    },
}
