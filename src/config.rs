use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the dataset root.
pub const DATASET_ROOT_ENV: &str = "YCB_DATASET_ROOT";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
	pub data_dir: PathBuf,
	pub models_dir: PathBuf,
	pub archive_path: PathBuf,
}

impl Config {
	pub fn new() -> crate::error::Result<Self> {
		let project_dirs = ProjectDirs::from("", "", "ycb-models")
			.ok_or_else(|| crate::error::Error::Config("Could not determine data directory".to_string()))?;

		let config = Self::with_data_dir(project_dirs.data_dir());
		std::fs::create_dir_all(&config.data_dir)?;
		Ok(config)
	}

	pub fn from_env() -> crate::error::Result<Self> {
		if let Ok(data_dir) = std::env::var(DATASET_ROOT_ENV) {
			let config = Self::with_data_dir(data_dir);
			std::fs::create_dir_all(&config.data_dir)?;
			Ok(config)
		} else {
			Self::new()
		}
	}

	/// Lays out the dataset paths under `data_dir` without touching the filesystem.
	///
	/// `models_dir` is never created here; its absence triggers the download
	/// on catalog construction.
	pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
		let data_dir = data_dir.as_ref().to_path_buf();
		let models_dir = data_dir.join("ycb_video").join("YCB_Video_Models");

		let mut archive = models_dir.clone().into_os_string();
		archive.push(".zip");

		Self {
			data_dir,
			models_dir,
			archive_path: PathBuf::from(archive),
		}
	}

	/// Whether the models have been installed under `models_dir`.
	pub fn models_present(&self) -> bool {
		self.models_dir.is_dir()
	}
}
