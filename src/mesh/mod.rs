//! Triangle/polygon meshes and the loaders that produce them.

mod obj;

pub use obj::ObjLoader;

use crate::error::Result;
use nalgebra::{Point3, Vector3};
use std::path::{Path, PathBuf};

/// A loaded CAD model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Point3<f64>>,
    pub normals: Vec<Vector3<f64>>,
    pub texcoords: Vec<[f64; 2]>,
    /// Vertex indices per face, as written in the source file.
    pub faces: Vec<Vec<u32>>,
    pub materials: Vec<String>,
    /// Diffuse texture image referenced by the first textured material.
    pub texture: Option<PathBuf>,
}

impl Mesh {
    /// Axis-aligned bounds as `(min, max)`, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), v| {
            (lo.inf(v), hi.sup(v))
        }))
    }

    pub fn extents(&self) -> Option<Vector3<f64>> {
        self.bounds().map(|(lo, hi)| hi - lo)
    }

    /// Length of the bounding-box diagonal.
    pub fn bbox_diagonal(&self) -> Option<f64> {
        self.extents().map(|e| e.norm())
    }

    pub fn is_triangulated(&self) -> bool {
        self.faces.iter().all(|f| f.len() == 3)
    }
}

/// Loader behaviour knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshLoadOptions {
    /// Let the loader rewrite geometry (triangulation and similar repair).
    /// Must stay `false` for catalog meshes: cached bounding boxes are taken
    /// from the topology exactly as stored on disk.
    pub process: bool,
}

pub trait MeshLoader: Send + Sync {
    fn load(&self, path: &Path, options: &MeshLoadOptions) -> Result<Mesh>;
}
