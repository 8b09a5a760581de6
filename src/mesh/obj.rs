use super::{Mesh, MeshLoadOptions, MeshLoader};
use crate::error::{Error, Result};
use nalgebra::{Point3, Vector3};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Wavefront OBJ loader backed by `tobj`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjLoader;

impl MeshLoader for ObjLoader {
    fn load(&self, path: &Path, options: &MeshLoadOptions) -> Result<Mesh> {
        tracing::debug!("Loading OBJ {:?} (process: {})", path, options.process);

        let load_options = tobj::LoadOptions {
            single_index: true,
            triangulate: options.process,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        };

        let mut reader = BufReader::new(File::open(path)?);
        let base_dir = path.parent().unwrap_or(Path::new(""));
        let (models, materials) = tobj::load_obj_buf(&mut reader, &load_options, |mtl| {
            tobj::load_mtl(base_dir.join(mtl))
        })?;
        let materials = materials.unwrap_or_else(|e| {
            tracing::warn!("Could not load materials for {:?}: {}", path, e);
            Vec::new()
        });

        let mut mesh = Mesh {
            name: path
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            ..Default::default()
        };

        for model in &models {
            append(&mut mesh, &model.mesh)
                .map_err(|e| Error::MeshLoad(format!("{:?} object '{}': {}", path, model.name, e)))?;
        }

        mesh.materials = materials.iter().map(|m| m.name.clone()).collect();
        mesh.texture = materials
            .iter()
            .find_map(|m| m.diffuse_texture.as_deref())
            .map(|tex| base_dir.join(tex));

        if mesh.vertices.is_empty() {
            return Err(Error::MeshLoad(format!("{:?} contains no vertices", path)));
        }

        tracing::debug!(
            "Loaded {} vertices, {} faces from {:?}",
            mesh.vertices.len(),
            mesh.faces.len(),
            path
        );

        Ok(mesh)
    }
}

fn append(mesh: &mut Mesh, part: &tobj::Mesh) -> std::result::Result<(), String> {
    let offset = mesh.vertices.len() as u32;

    mesh.vertices.extend(
        part.positions
            .chunks_exact(3)
            .map(|p| Point3::new(p[0] as f64, p[1] as f64, p[2] as f64)),
    );
    mesh.normals.extend(
        part.normals
            .chunks_exact(3)
            .map(|n| Vector3::new(n[0] as f64, n[1] as f64, n[2] as f64)),
    );
    mesh.texcoords
        .extend(part.texcoords.chunks_exact(2).map(|t| [t[0] as f64, t[1] as f64]));

    let n_vertices = mesh.vertices.len() as u32;
    let mut push_face = |indices: &[u32]| -> std::result::Result<(), String> {
        let face: Vec<u32> = indices.iter().map(|i| i + offset).collect();
        if let Some(bad) = face.iter().find(|&&i| i >= n_vertices) {
            return Err(format!("face references vertex {} of {}", bad, n_vertices));
        }
        mesh.faces.push(face);
        Ok(())
    };

    // empty arities means every face is a triangle
    if part.face_arities.is_empty() {
        for tri in part.indices.chunks_exact(3) {
            push_face(tri)?;
        }
    } else {
        let mut start = 0usize;
        for &arity in &part.face_arities {
            let end = start + arity as usize;
            let indices = part
                .indices
                .get(start..end)
                .ok_or_else(|| "face arity exceeds index buffer".to_string())?;
            push_face(indices)?;
            start = end;
        }
    }

    Ok(())
}
