//! The build orchestrator: flattens the scene and runs the pipeline stages in
//! order.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    config::NavmeshConfig,
    heightfield::{Heightfield, HeightfieldInvariantError},
    region::RegionError,
    scene::Scene,
    trimesh::TriMesh,
    voxel_grid::{VoxelGrid, VoxelGridBuilder, VoxelGridBuilderError},
};

/// The outputs of one successful build, kept for downstream passes and debug
/// visualization.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Artifacts {
    /// The flattened world-space input triangles.
    pub triangles: TriMesh,
    /// The solid occupancy grid.
    pub voxel_grid: VoxelGrid,
    /// The heightfield with filtered, region-labeled spans.
    pub heightfield: Heightfield,
    /// The number of regions found by segmentation.
    pub region_count: u16,
}

/// Errors that can occur during [`NavigationPipeline::build`].
#[derive(Error, Debug)]
pub enum BuildError {
    /// The configured grid is unusable.
    #[error(transparent)]
    InvalidGrid(#[from] VoxelGridBuilderError),
    /// The pipeline produced a structurally invalid heightfield.
    #[error(transparent)]
    Internal(#[from] HeightfieldInvariantError),
    /// Region segmentation failed.
    #[error(transparent)]
    Regions(#[from] RegionError),
}

/// Builds navigation data from a [`Scene`] and keeps the artifacts of the
/// last successful build.
///
/// The build is synchronous and single-threaded; it runs to completion or
/// fails, and the first failing stage aborts the rest. Each pipeline instance
/// owns its artifacts; there is no shared state between instances.
#[derive(Debug, Default)]
pub struct NavigationPipeline {
    artifacts: Option<Artifacts>,
}

impl NavigationPipeline {
    /// Creates a pipeline with no artifacts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the full pipeline: flatten the scene to world-space triangles,
    /// rasterize them into a voxel grid, build the heightfield, filter
    /// walkable spans, and segment regions.
    ///
    /// The previous build's artifacts are released before the new build
    /// starts, so a failed build leaves the pipeline without artifacts. An
    /// empty scene is not an error; it produces empty artifacts with a region
    /// count of 0.
    pub fn build(
        &mut self,
        scene: &Scene,
        config: &NavmeshConfig,
    ) -> Result<&Artifacts, BuildError> {
        self.artifacts = None;

        let triangles = scene.flatten_to_world();
        if triangles.is_empty() {
            warn!("scene contains no triangles, the navmesh will be empty");
        }
        info!(
            objects = scene.objects().len(),
            triangles = triangles.triangle_count(),
            "collected input triangles"
        );

        let mut voxel_grid = VoxelGridBuilder {
            aabb: config.aabb,
            cell_size: config.cell_size,
            cell_height: config.cell_height,
        }
        .build()?;
        voxel_grid.rasterize_triangles(&triangles);
        debug!(
            solid_cells = voxel_grid.solid_count(),
            "rasterized triangles"
        );

        let mut heightfield = Heightfield::from_voxel_grid(&voxel_grid);
        heightfield.check_invariants()?;
        debug!(spans = heightfield.span_count(), "built heightfield");

        heightfield.filter_walkable_spans(config.walkable_height());
        heightfield.erode_walkable_area(config.walkable_radius());
        let region_count = heightfield.build_regions(config.walkable_climb())?;
        info!(region_count, "navmesh build finished");

        Ok(self.artifacts.insert(Artifacts {
            triangles,
            voxel_grid,
            heightfield,
            region_count,
        }))
    }

    /// A read-only view of the last successful build's artifacts, if any.
    ///
    /// Meant for debug visualizers; the artifacts cannot be mutated through
    /// this view.
    pub fn debug_view(&self) -> Option<&Artifacts> {
        self.artifacts.as_ref()
    }
}
