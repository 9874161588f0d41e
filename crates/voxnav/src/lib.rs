#![doc = include_str!("../../../readme.md")]

mod config;
mod erosion;
mod filter;
mod heightfield;
mod main_api;
pub(crate) mod math;
mod rasterize;
mod region;
mod scene;
mod span;
mod trimesh;
mod voxel_grid;

pub use config::NavmeshConfig;
pub use heightfield::{Heightfield, HeightfieldInvariantError, SpanView};
pub use main_api::{Artifacts, BuildError, NavigationPipeline};
pub use math::Aabb3d;
pub use region::RegionError;
pub use scene::{Scene, SceneObject};
pub use span::{AreaId, Span, SpanKey, Spans};
pub use trimesh::TriMesh;
pub use voxel_grid::{VoxelGrid, VoxelGridBuilder, VoxelGridBuilderError};
