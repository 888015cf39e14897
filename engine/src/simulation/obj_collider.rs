use std::path::Path;

use anyhow::{Context, Result};
use common::geometry::Geometry;
use glam::Vec3;
use log::debug;

pub trait FromObject {
    fn from_object_models(models: Vec<tobj::Model>) -> Self;
}

impl FromObject for Geometry {
    /// Combine the vertices of all the meshes into one point cloud. Faces are dropped: the mesh
    /// is only ever used through its convex hull.
    fn from_object_models(models: Vec<tobj::Model>) -> Geometry {
        let mut vertices = Vec::new();
        debug!("Loading {} models", models.len());
        for model in models {
            debug!("Model: {:?}", model.name);
            vertices.extend(
                model
                    .mesh
                    .positions
                    .chunks_exact(3)
                    .map(|p| Vec3::new(p[0], p[1], p[2])),
            );
        }
        Geometry::Mesh { vertices }
    }
}

pub fn load_mesh<P: AsRef<Path>>(path: P) -> Result<Geometry> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS)
        .with_context(|| format!("Error loading model {}", path.display()))?;
    Ok(Geometry::from_object_models(models))
}
