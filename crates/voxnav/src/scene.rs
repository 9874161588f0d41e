//! The input scene: placed meshes that get flattened into world-space
//! triangles at the start of a build.

use glam::Mat4;

use crate::trimesh::TriMesh;

/// A mesh placed in the world by a model transform.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SceneObject {
    /// A human-readable label, used for logging only.
    pub name: String,
    /// The local-to-world transform of the mesh.
    pub transform: Mat4,
    /// The mesh in local space.
    pub mesh: TriMesh,
}

impl SceneObject {
    /// Creates a new scene object.
    pub fn new(name: impl Into<String>, transform: Mat4, mesh: TriMesh) -> Self {
        Self {
            name: name.into(),
            transform,
            mesh,
        }
    }
}

/// An ordered collection of [`SceneObject`]s.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Scene {
    objects: Vec<SceneObject>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object to the scene.
    pub fn add_object(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    /// The objects of the scene, in insertion order.
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Expands every object into world-space triangles and concatenates them
    /// into a single mesh. Transforms are applied as affine point transforms.
    pub fn flatten_to_world(&self) -> TriMesh {
        let mut flattened = TriMesh::default();
        for object in &self.objects {
            let mut world = object.mesh.clone();
            for vertex in &mut world.vertices {
                *vertex = object.transform.transform_point3a(*vertex);
            }
            flattened.extend(world);
        }
        flattened
    }
}
