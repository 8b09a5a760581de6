use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	#[error("Class id {class_id} out of range (catalog has {n_class} classes)")]
	ClassNotFound { class_id: usize, n_class: usize },

	#[error("Checksum mismatch for {path:?}: expected md5 {expected}, got {actual}")]
	ChecksumMismatch {
		path: PathBuf,
		expected: String,
		actual: String,
	},

	#[error("Voxel grid must be cubic, got dims {dims:?}")]
	NonCubicVoxelGrid { dims: [usize; 3] },

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Download failed: {0}")]
	Download(String),

	#[error("Archive error: {0}")]
	Archive(String),

	#[error("Failed to load mesh: {0}")]
	MeshLoad(String),

	#[error("Parse error: {0}")]
	Parse(String),

	#[error("Voxelization failed: {0}")]
	Voxelization(String),

	#[error("Configuration error: {0}")]
	Config(String),
}

impl From<reqwest::Error> for Error {
	fn from(err: reqwest::Error) -> Self {
		Error::Download(err.to_string())
	}
}

impl From<zip::result::ZipError> for Error {
	fn from(err: zip::result::ZipError) -> Self {
		Error::Archive(err.to_string())
	}
}

impl From<tobj::LoadError> for Error {
	fn from(err: tobj::LoadError) -> Self {
		Error::MeshLoad(err.to_string())
	}
}

pub type Result<T> = std::result::Result<T, Error>;
