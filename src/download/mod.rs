mod fetcher;

pub use fetcher::{ArchiveFetcher, HttpFetcher};

use crate::config::Config;
use crate::error::{Error, Result};
use md5::{Digest, Md5};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const MODELS_URL: &str = "https://drive.google.com/uc?id=1gmcDD-5bkJfcMKLZb3zGgH_HUFbulQWu";
pub const MODELS_MD5: &str = "d3efe74e77fe7d7ca216dde4b7d217fa";

/// Where the model archive comes from and what it must hash to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSpec {
    pub url: String,
    pub md5: String,
}

impl DownloadSpec {
    pub fn new(url: impl Into<String>, md5: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            md5: md5.into(),
        }
    }
}

impl Default for DownloadSpec {
    fn default() -> Self {
        Self::new(MODELS_URL, MODELS_MD5)
    }
}

/// Makes sure `config.models_dir` exists, downloading and installing the
/// archive when it does not. Returns `true` if a download sequence ran.
pub fn ensure_dataset_present(
    config: &Config,
    fetcher: &dyn ArchiveFetcher,
    spec: &DownloadSpec,
) -> Result<bool> {
    if config.models_present() {
        tracing::debug!("Models already present at {:?}", config.models_dir);
        return Ok(false);
    }

    tracing::info!("Models not found at {:?}, downloading", config.models_dir);

    cached_download(fetcher, spec, &config.archive_path, |archive| {
        install_models(archive, &config.models_dir)
    })?;

    Ok(true)
}

/// Downloads `spec.url` to `path` unless a file with the expected MD5 is
/// already there, verifies it, then hands the path to `postprocess`.
///
/// A file failing verification is removed so the next attempt starts clean.
pub fn cached_download<F>(
    fetcher: &dyn ArchiveFetcher,
    spec: &DownloadSpec,
    path: &Path,
    postprocess: F,
) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    if path.exists() && md5_file(path)?.eq_ignore_ascii_case(&spec.md5) {
        tracing::info!("Using cached archive {:?}", path);
        return postprocess(path);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    tracing::info!("Downloading {} to {:?}", spec.url, path);

    let part = part_path(path);
    let written = {
        let mut file = File::create(&part)?;
        let result = fetcher.fetch(&spec.url, &mut file).and_then(|n| {
            file.sync_all()?;
            Ok(n)
        });
        if result.is_err() {
            drop(file);
            let _ = fs::remove_file(&part);
        }
        result?
    };
    fs::rename(&part, path)?;

    tracing::debug!("Downloaded {} bytes", written);

    let actual = md5_file(path)?;
    if !actual.eq_ignore_ascii_case(&spec.md5) {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("Could not remove corrupt archive {:?}: {}", path, e);
        }
        return Err(Error::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: spec.md5.clone(),
            actual,
        });
    }

    postprocess(path)
}

/// Unpacks a zip archive into `dest`.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file))?;

    tracing::debug!("Extracting {} entries from {:?}", zip.len(), archive);
    zip.extract(dest)?;

    Ok(())
}

/// Extracts next to the archive, then moves the `models/` subtree into place.
fn install_models(archive: &Path, models_dir: &Path) -> Result<()> {
    let parent = archive
        .parent()
        .ok_or_else(|| Error::Config(format!("Archive path {:?} has no parent", archive)))?;

    let staging = tempfile::Builder::new()
        .prefix(".ycb-extract-")
        .tempdir_in(parent)?;

    tracing::info!("Extracting {:?}", archive);
    extract_archive(archive, staging.path())?;

    let extracted = staging.path().join("models");
    if !extracted.is_dir() {
        return Err(Error::Archive(format!(
            "{:?} does not contain a models/ directory",
            archive
        )));
    }

    fs::rename(&extracted, models_dir)?;
    tracing::info!("Installed models into {:?}", models_dir);

    Ok(())
}

pub fn md5_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Md5::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

fn part_path(path: &Path) -> PathBuf {
    let mut part = path.to_path_buf().into_os_string();
    part.push(".part");
    PathBuf::from(part)
}
