use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Produces a binvox file for a mesh file.
pub trait Voxelizer: Send + Sync {
    fn binvox_file(&self, mesh_file: &Path) -> Result<PathBuf>;
}

/// Runs the external `binvox` program and keeps its output next to the mesh
/// as `<mesh stem>.<dimension>.binvox`. An existing file for the same
/// dimension is reused as-is.
#[derive(Debug, Clone)]
pub struct BinvoxCommand {
    pub executable: PathBuf,
    pub dimension: u32,
}

impl Default for BinvoxCommand {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("binvox"),
            dimension: 32,
        }
    }
}

impl BinvoxCommand {
    /// Where the grid for `mesh_file` at this dimension is kept.
    pub fn output_path(&self, mesh_file: &Path) -> PathBuf {
        let stem = mesh_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        mesh_file.with_file_name(format!("{}.{}.binvox", stem, self.dimension))
    }
}

impl Voxelizer for BinvoxCommand {
    fn binvox_file(&self, mesh_file: &Path) -> Result<PathBuf> {
        let out = self.output_path(mesh_file);
        if out.exists() {
            tracing::info!("Reusing {}^3 voxels from {:?}", self.dimension, out);
            return Ok(out);
        }

        // binvox always writes here and refuses to overwrite an existing file
        let produced = mesh_file.with_extension("binvox");
        if produced.exists() {
            tracing::debug!("Removing stale {:?}", produced);
            fs::remove_file(&produced)?;
        }

        tracing::info!("Voxelizing {:?} at {}^3", mesh_file, self.dimension);

        let output = Command::new(&self.executable)
            .arg("-d")
            .arg(self.dimension.to_string())
            .arg(mesh_file)
            .output()
            .map_err(|e| {
                Error::Voxelization(format!("failed to run {:?}: {}", self.executable, e))
            })?;

        if !output.status.success() {
            return Err(Error::Voxelization(format!(
                "{:?} exited with {}: {}",
                self.executable,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        if !produced.exists() {
            return Err(Error::Voxelization(format!(
                "{:?} did not produce {:?}",
                self.executable, produced
            )));
        }
        fs::rename(&produced, &out)?;

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_tool() -> BinvoxCommand {
        BinvoxCommand {
            executable: PathBuf::from("/nonexistent/binvox"),
            ..Default::default()
        }
    }

    #[test]
    fn test_existing_output_is_reused() {
        let tmp = tempfile::tempdir().unwrap();
        let mesh = tmp.path().join("textured_simple.obj");
        let vox = tmp.path().join("textured_simple.32.binvox");
        std::fs::write(&vox, b"cached").unwrap();

        assert_eq!(missing_tool().binvox_file(&mesh).unwrap(), vox);
    }

    #[test]
    fn test_output_for_other_dimension_is_not_reused() {
        let tmp = tempfile::tempdir().unwrap();
        let mesh = tmp.path().join("textured_simple.obj");
        std::fs::write(tmp.path().join("textured_simple.64.binvox"), b"64 cubed").unwrap();
        std::fs::write(tmp.path().join("textured_simple.binvox"), b"unlabelled").unwrap();

        let err = missing_tool().binvox_file(&mesh).unwrap_err();

        assert!(matches!(err, Error::Voxelization(_)));
        assert!(tmp.path().join("textured_simple.64.binvox").exists());
        assert!(!tmp.path().join("textured_simple.binvox").exists());
    }

    #[test]
    fn test_output_path_names_the_dimension() {
        let tool = BinvoxCommand {
            dimension: 64,
            ..Default::default()
        };
        assert_eq!(
            tool.output_path(Path::new("/data/025_mug/textured_simple.obj")),
            PathBuf::from("/data/025_mug/textured_simple.64.binvox")
        );
    }

    #[test]
    fn test_missing_executable() {
        let tmp = tempfile::tempdir().unwrap();
        let err = missing_tool()
            .binvox_file(&tmp.path().join("textured_simple.obj"))
            .unwrap_err();
        assert!(matches!(err, Error::Voxelization(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_executable() {
        let tmp = tempfile::tempdir().unwrap();
        let tool = BinvoxCommand {
            executable: PathBuf::from("false"),
            ..Default::default()
        };

        let err = tool
            .binvox_file(&tmp.path().join("textured_simple.obj"))
            .unwrap_err();
        assert!(matches!(err, Error::Voxelization(msg) if msg.contains("exited")));
    }
}
