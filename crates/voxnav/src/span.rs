//! The span module contains the types and functions for working with spans.
//!
//! A span is a maximal run of solid voxels in a single `(x, z)` column of a
//! [`Heightfield`](crate::Heightfield). The spans of all columns are stored in
//! a single [`Spans`] arena; columns refer to their lowest span by key.

use slotmap::SlotMap;

slotmap::new_key_type! {
    /// A key for a span in [`Spans`].
    pub struct SpanKey;
}

/// A collection of spans.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Spans(SlotMap<SpanKey, Span>);

impl Spans {
    const DEFAULT_CAPACITY: usize = 1024;

    pub(crate) fn with_min_capacity(min_capacity: usize) -> Self {
        let capacity = min_capacity.max(Self::DEFAULT_CAPACITY);
        Self(SlotMap::with_capacity_and_key(capacity))
    }
}

impl std::ops::Deref for Spans {
    type Target = SlotMap<SpanKey, Span>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for Spans {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

pub(crate) struct SpanBuilder {
    pub(crate) min: u16,
    pub(crate) max: u16,
    pub(crate) area: AreaId,
    pub(crate) next: Option<SpanKey>,
}

impl SpanBuilder {
    pub(crate) fn build(self) -> Span {
        Span {
            min: self.min,
            max: self.max,
            area: self.area,
            next: self.next,
        }
    }
}

impl From<SpanBuilder> for Span {
    fn from(builder: SpanBuilder) -> Self {
        builder.build()
    }
}

/// A run of solid voxels in a column, with inclusive vertical bounds.
/// Build with [`SpanBuilder`].
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Height of the lowest solid voxel.
    min: u16,
    /// Height of the highest solid voxel.
    max: u16,
    /// Area classification.
    area: AreaId,
    /// The key of the next-higher span in the column.
    next: Option<SpanKey>,
}

impl Span {
    pub(crate) const MAX_HEIGHT: u16 = u16::MAX;

    /// Height of the lowest solid voxel.
    #[inline]
    pub fn min(&self) -> u16 {
        self.min
    }

    /// Height of the highest solid voxel.
    #[inline]
    pub fn max(&self) -> u16 {
        self.max
    }

    #[inline]
    pub(crate) fn set_max(&mut self, max: u16) {
        self.max = max;
    }

    /// Area classification.
    #[inline]
    pub fn area(&self) -> AreaId {
        self.area
    }

    #[inline]
    pub(crate) fn set_area(&mut self, area: impl Into<AreaId>) {
        self.area = area.into();
    }

    /// The key of the next-higher span in the same column.
    #[inline]
    pub fn next(&self) -> Option<SpanKey> {
        self.next
    }

    #[inline]
    pub(crate) fn set_next(&mut self, next: impl Into<Option<SpanKey>>) {
        self.next = next.into();
    }
}

/// The classification tag of a span.
///
/// The values 0 ([`AreaId::NOT_WALKABLE`]) and 1 ([`AreaId::WALKABLE`]) are
/// reserved. Region segmentation rewrites walkable candidates to region ids,
/// which start at [`AreaId::FIRST_REGION`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct AreaId(pub u16);

impl Default for AreaId {
    fn default() -> Self {
        Self::NOT_WALKABLE
    }
}

impl From<u16> for AreaId {
    fn from(value: u16) -> Self {
        AreaId(value)
    }
}

impl AreaId {
    /// Spans with this area cannot be stood on.
    pub const NOT_WALKABLE: Self = Self(0);
    /// Candidate walkable spans that have not been assigned a region yet.
    pub const WALKABLE: Self = Self(1);
    /// The first id handed out by region segmentation.
    pub const FIRST_REGION: Self = Self(2);

    /// Whether the span can be stood on.
    #[inline]
    pub fn is_walkable(&self) -> bool {
        self != &Self::NOT_WALKABLE
    }

    /// Whether the span has been assigned to a region.
    #[inline]
    pub fn is_region(&self) -> bool {
        self >= &Self::FIRST_REGION
    }
}
