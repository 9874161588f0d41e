//! The heightfield module contains the types and functions for working with
//! [`Heightfield`]s.
//!
//! A heightfield collapses the solid cells of a [`VoxelGrid`] into per-column
//! linked lists of [`Span`]s, where each column contains 0, 1, or more spans.

use thiserror::Error;

use crate::{
    math::Aabb3d,
    span::{AreaId, Span, SpanBuilder, SpanKey, Spans},
    voxel_grid::VoxelGrid,
};

/// A grid of span columns over the xz-plane.
/// Build with [`Heightfield::from_voxel_grid`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Heightfield {
    width: u32,
    depth: u32,
    height: u32,
    aabb: Aabb3d,
    cell_size: f32,
    cell_height: f32,
    /// The lowest span of each column, in width*depth order.
    columns: Vec<Option<SpanKey>>,
    /// All spans of the heightfield.
    spans: Spans,
}

impl Heightfield {
    /// Scans every column of the grid bottom-up and emits one span per
    /// maximal run of solid cells. All spans start out as
    /// [`AreaId::NOT_WALKABLE`].
    pub fn from_voxel_grid(grid: &VoxelGrid) -> Self {
        let column_count = grid.column_count();
        let mut heightfield = Self {
            width: grid.width(),
            depth: grid.depth(),
            height: grid.height(),
            aabb: grid.aabb(),
            cell_size: grid.cell_size(),
            cell_height: grid.cell_height(),
            columns: vec![None; column_count],
            spans: Spans::with_min_capacity(column_count),
        };

        for z in 0..heightfield.depth {
            for x in 0..heightfield.width {
                let column_index = heightfield.column_index(x, z);
                let mut previous: Option<SpanKey> = None;
                let mut current: Option<SpanKey> = None;
                for y in 0..heightfield.height {
                    if !grid.is_solid(x, y, z) {
                        current = None;
                        continue;
                    }
                    if let Some(current) = current {
                        // Still solid, the current span grows upward.
                        heightfield.span_mut(current).set_max(y as u16);
                        continue;
                    }
                    let key = heightfield.spans.insert(
                        SpanBuilder {
                            min: y as u16,
                            max: y as u16,
                            area: AreaId::NOT_WALKABLE,
                            next: None,
                        }
                        .build(),
                    );
                    match previous {
                        Some(previous) => heightfield.span_mut(previous).set_next(key),
                        None => heightfield.columns[column_index] = Some(key),
                    }
                    previous = Some(key);
                    current = Some(key);
                }
            }
        }
        heightfield
    }

    /// The number of columns along the x-axis.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The number of columns along the z-axis.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The number of cells along the y-axis; spans never reach past it.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The AABB of the heightfield.
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

    /// The total number of spans.
    #[inline]
    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    #[inline]
    pub(crate) fn column_index(&self, x: u32, z: u32) -> usize {
        x as usize + z as usize * self.width as usize
    }

    #[inline]
    pub(crate) fn contains(&self, x: i32, z: i32) -> bool {
        x >= 0 && x < self.width as i32 && z >= 0 && z < self.depth as i32
    }

    /// Returns the key of the lowest span in the column at the given
    /// coordinates. `None` if either the index is out of bounds or there is
    /// no span in the column.
    #[inline]
    pub fn span_key_at(&self, x: u32, z: u32) -> Option<SpanKey> {
        let column_index = self.column_index(x, z);
        *self.columns.get(column_index)?
    }

    /// Returns the lowest span in the column at the given coordinates.
    /// `None` if either the index is out of bounds or there is no span in the
    /// column.
    #[inline]
    pub fn span_at(&self, x: u32, z: u32) -> Option<&Span> {
        let span_key = self.span_key_at(x, z)?;
        Some(self.span(span_key))
    }

    /// Returns a reference to the span with the given key.
    /// # Panics
    /// Panics if the key is not found.
    #[inline]
    pub fn span(&self, key: SpanKey) -> &Span {
        &self.spans[key]
    }

    /// Returns a mutable reference to the span with the given key.
    /// # Panics
    /// Panics if the key is not found.
    #[inline]
    pub(crate) fn span_mut(&mut self, key: SpanKey) -> &mut Span {
        &mut self.spans[key]
    }

    /// Iterates over all spans of the heightfield, column by column and
    /// bottom-up within each column.
    pub fn iter_spans(&self) -> impl Iterator<Item = SpanView> + '_ {
        self.columns
            .iter()
            .enumerate()
            .flat_map(move |(column_index, head)| {
                let x = (column_index % self.width as usize) as u32;
                let z = (column_index / self.width as usize) as u32;
                std::iter::successors(*head, move |&key| self.span(key).next()).map(move |key| {
                    let span = self.span(key);
                    SpanView {
                        x,
                        z,
                        min: span.min(),
                        max: span.max(),
                        area: span.area(),
                    }
                })
            })
    }

    /// Verifies the structural invariants of the heightfield: span bounds lie
    /// inside the grid, column lists are strictly ascending, and no column
    /// list loops back on itself.
    ///
    /// A violation is a bug in the build pipeline, not bad input.
    pub fn check_invariants(&self) -> Result<(), HeightfieldInvariantError> {
        for z in 0..self.depth {
            for x in 0..self.width {
                let mut previous_max: Option<u16> = None;
                let mut visited = 0_usize;
                let mut key_iter = self.span_key_at(x, z);
                while let Some(key) = key_iter {
                    visited += 1;
                    if visited > self.spans.len() {
                        return Err(HeightfieldInvariantError::CyclicColumn { x, z });
                    }
                    let span = self.span(key);
                    if span.min() > span.max() || span.max() as u32 >= self.height {
                        return Err(HeightfieldInvariantError::SpanOutOfBounds {
                            x,
                            z,
                            min: span.min(),
                            max: span.max(),
                        });
                    }
                    if let Some(previous_max) = previous_max {
                        if previous_max >= span.min() {
                            return Err(HeightfieldInvariantError::UnorderedSpans {
                                x,
                                z,
                                previous_max,
                                next_min: span.min(),
                            });
                        }
                    }
                    previous_max = Some(span.max());
                    key_iter = span.next();
                }
            }
        }
        Ok(())
    }
}

/// One span of a [`Heightfield`], flattened for read-only consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SpanView {
    /// The column coordinate along the x-axis.
    pub x: u32,
    /// The column coordinate along the z-axis.
    pub z: u32,
    /// Height of the lowest solid voxel.
    pub min: u16,
    /// Height of the highest solid voxel.
    pub max: u16,
    /// Area classification.
    pub area: AreaId,
}

/// Violations of the heightfield's structural invariants.
/// These indicate a bug in the pipeline and abort the build.
#[derive(Error, Debug)]
pub enum HeightfieldInvariantError {
    /// A span reaches outside the grid or has inverted bounds.
    #[error("span at column ({x}, {z}) has out-of-bounds extent {min}..={max}")]
    SpanOutOfBounds {
        /// The column coordinate along the x-axis.
        x: u32,
        /// The column coordinate along the z-axis.
        z: u32,
        /// The reported lower bound of the span.
        min: u16,
        /// The reported upper bound of the span.
        max: u16,
    },
    /// Two successive spans of a column touch or overlap.
    #[error(
        "column ({x}, {z}) is not strictly ascending: span ending at {previous_max} is followed by span starting at {next_min}"
    )]
    UnorderedSpans {
        /// The column coordinate along the x-axis.
        x: u32,
        /// The column coordinate along the z-axis.
        z: u32,
        /// The upper bound of the lower span.
        previous_max: u16,
        /// The lower bound of the upper span.
        next_min: u16,
    },
    /// A column's span list loops back on itself.
    #[error("column ({x}, {z}) contains a span cycle")]
    CyclicColumn {
        /// The column coordinate along the x-axis.
        x: u32,
        /// The column coordinate along the z-axis.
        z: u32,
    },
}
