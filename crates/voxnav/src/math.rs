use glam::Vec3A;

/// An axis-aligned bounding box in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb3d {
    /// The minimum corner of the box.
    pub min: Vec3A,
    /// The maximum corner of the box.
    pub max: Vec3A,
}

impl Aabb3d {
    /// Creates a new AABB from its corners.
    #[inline]
    pub fn new(min: impl Into<Vec3A>, max: impl Into<Vec3A>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    /// Computes the AABB of a set of vertices.
    /// Returns `None` if the set is empty.
    pub fn from_verts(verts: &[Vec3A]) -> Option<Self> {
        let (first, rest) = verts.split_first()?;
        let mut aabb = Self {
            min: *first,
            max: *first,
        };
        for vert in rest {
            aabb.min = aabb.min.min(*vert);
            aabb.max = aabb.max.max(*vert);
        }
        Some(aabb)
    }

    /// The center of the box.
    #[inline]
    pub fn center(&self) -> Vec3A {
        (self.min + self.max) * 0.5
    }

    /// The extent of the box along each axis.
    #[inline]
    pub fn size(&self) -> Vec3A {
        self.max - self.min
    }
}

pub(crate) trait TriangleVertices {
    fn aabb(&self) -> Aabb3d;
}

impl TriangleVertices for [Vec3A; 3] {
    #[inline]
    fn aabb(&self) -> Aabb3d {
        let min = self[0].min(self[1]).min(self[2]);
        let max = self[0].max(self[1]).max(self[2]);
        Aabb3d { min, max }
    }
}

/// Gets the standard width (x-axis) offset for the specified direction.
/// # Arguments
/// - `direction`: The direction. [Limits: 0 <= value < 4]
pub(crate) fn dir_offset_x(direction: u8) -> i8 {
    const OFFSET: [i8; 4] = [-1, 0, 1, 0];
    OFFSET[direction as usize & 0x03]
}

/// Gets the standard depth (z-axis) offset for the specified direction.
/// # Arguments
/// - `direction`: The direction. [Limits: 0 <= value < 4]
pub(crate) fn dir_offset_z(direction: u8) -> i8 {
    const OFFSET: [i8; 4] = [0, 1, 0, -1];
    OFFSET[direction as usize & 0x03]
}
