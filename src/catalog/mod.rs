//! The YCB-Video model catalog.

mod cache;
mod class_names;
mod class_ref;

pub use cache::{ArtifactCache, CacheStats};
pub use class_names::CLASS_NAMES;
pub use class_ref::ClassRef;

use crate::config::Config;
use crate::download::{self, ArchiveFetcher, DownloadSpec, HttpFetcher};
use crate::error::{Error, Result};
use crate::mesh::{Mesh, MeshLoadOptions, MeshLoader, ObjLoader};
use crate::pcd::{self, PointCloud};
use crate::voxel::{read_binvox, BinvoxCommand, VoxelGrid, Voxelizer};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const CAD_FILE_NAME: &str = "textured_simple.obj";
pub const PCD_FILE_NAME: &str = "points.xyz";

/// Resolves classes to model files and memoizes the expensive artifacts
/// derived from them.
///
/// Caches belong to the instance. Consumers that need to share them hold
/// one `Arc<ModelCatalog>`; all accessors take `&self`.
pub struct ModelCatalog {
    root_dir: PathBuf,
    mesh_loader: Arc<dyn MeshLoader>,
    voxelizer: Arc<dyn Voxelizer>,
    cad_cache: ArtifactCache<Arc<Mesh>>,
    pcd_cache: ArtifactCache<Arc<PointCloud>>,
    bbox_diagonal_cache: ArtifactCache<f64>,
}

impl ModelCatalog {
    /// Opens the catalog with the default collaborators, downloading the
    /// models first if they are not on disk yet.
    pub fn open(config: &Config) -> Result<Self> {
        Self::builder(config.clone()).build()
    }

    pub fn builder(config: Config) -> CatalogBuilder {
        CatalogBuilder::new(config)
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn class_names(&self) -> &'static [&'static str] {
        &CLASS_NAMES
    }

    pub fn n_class(&self) -> usize {
        CLASS_NAMES.len()
    }

    /// Names pass through unchecked; ids must index the catalog.
    pub fn resolve_class_name(&self, class: &ClassRef) -> Result<String> {
        match class {
            ClassRef::Name(name) => Ok(name.clone()),
            ClassRef::Id(id) => CLASS_NAMES
                .get(*id)
                .map(|name| name.to_string())
                .ok_or(Error::ClassNotFound {
                    class_id: *id,
                    n_class: CLASS_NAMES.len(),
                }),
        }
    }

    pub fn cad_file_path(&self, class: impl Into<ClassRef>) -> Result<PathBuf> {
        let name = self.resolve_class_name(&class.into())?;
        Ok(self.cad_file_for(&name))
    }

    pub fn pcd_file_path(&self, class: impl Into<ClassRef>) -> Result<PathBuf> {
        let name = self.resolve_class_name(&class.into())?;
        Ok(self.pcd_file_for(&name))
    }

    /// Voxelizes the class's CAD file and loads the result. Not cached here;
    /// the voxelizer decides whether to reuse its output.
    pub fn solid_voxel_grid(&self, class: impl Into<ClassRef>) -> Result<VoxelGrid> {
        let cad_file = self.cad_file_path(class)?;
        let vox_file = self.voxelizer.binvox_file(&cad_file)?;

        tracing::debug!("Reading voxels from {:?}", vox_file);
        let vox = read_binvox(BufReader::new(File::open(&vox_file)?))?;
        tracing::debug!("Read {:?} grid with {} filled cells", vox.dims, vox.filled_count());

        VoxelGrid::from_binvox(vox)
    }

    /// The class's CAD mesh, loaded without post-processing on first use.
    pub fn cad(&self, class: impl Into<ClassRef>) -> Result<Arc<Mesh>> {
        let name = self.resolve_class_name(&class.into())?;
        self.cad_by_name(&name)
    }

    pub fn pcd(&self, class: impl Into<ClassRef>) -> Result<Arc<PointCloud>> {
        let name = self.resolve_class_name(&class.into())?;
        self.pcd_cache.get_or_try_insert_with(&name, || {
            let path = self.pcd_file_for(&name);
            tracing::info!("Loading point cloud {:?}", path);
            Ok(Arc::new(pcd::read_xyz(&path)?))
        })
    }

    pub fn bbox_diagonal(&self, class: impl Into<ClassRef>) -> Result<f64> {
        let name = self.resolve_class_name(&class.into())?;
        self.bbox_diagonal_cache.get_or_try_insert_with(&name, || {
            let cad = self.cad_by_name(&name)?;
            cad.bbox_diagonal()
                .ok_or_else(|| Error::MeshLoad(format!("mesh for '{}' has no vertices", name)))
        })
    }

    /// Voxel edge length that fits the class's bounding-box diagonal into `dimension` cells.
    pub fn voxel_pitch(&self, dimension: usize, class: impl Into<ClassRef>) -> Result<f64> {
        if dimension == 0 {
            return Err(Error::InvalidArgument(
                "voxel dimension must be positive".to_string(),
            ));
        }

        Ok(self.bbox_diagonal(class)? / dimension as f64)
    }

    pub fn cache_stats(&self) -> CatalogCacheStats {
        CatalogCacheStats {
            cad: self.cad_cache.stats(),
            pcd: self.pcd_cache.stats(),
            bbox_diagonal: self.bbox_diagonal_cache.stats(),
        }
    }

    fn cad_by_name(&self, name: &str) -> Result<Arc<Mesh>> {
        self.cad_cache.get_or_try_insert_with(name, || {
            let path = self.cad_file_for(name);
            tracing::info!("Loading CAD model {:?}", path);
            Ok(Arc::new(self.mesh_loader.load(&path, &MeshLoadOptions::default())?))
        })
    }

    fn cad_file_for(&self, name: &str) -> PathBuf {
        self.root_dir.join(name).join(CAD_FILE_NAME)
    }

    fn pcd_file_for(&self, name: &str) -> PathBuf {
        self.root_dir.join(name).join(PCD_FILE_NAME)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CatalogCacheStats {
    pub cad: CacheStats,
    pub pcd: CacheStats,
    pub bbox_diagonal: CacheStats,
}

/// Configures the collaborators of a [`ModelCatalog`].
pub struct CatalogBuilder {
    config: Config,
    fetcher: Option<Arc<dyn ArchiveFetcher>>,
    download_spec: DownloadSpec,
    mesh_loader: Arc<dyn MeshLoader>,
    voxelizer: Arc<dyn Voxelizer>,
}

impl CatalogBuilder {
    fn new(config: Config) -> Self {
        Self {
            config,
            fetcher: None,
            download_spec: DownloadSpec::default(),
            mesh_loader: Arc::new(ObjLoader),
            voxelizer: Arc::new(BinvoxCommand::default()),
        }
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn ArchiveFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn download_spec(mut self, spec: DownloadSpec) -> Self {
        self.download_spec = spec;
        self
    }

    pub fn mesh_loader(mut self, loader: Arc<dyn MeshLoader>) -> Self {
        self.mesh_loader = loader;
        self
    }

    pub fn voxelizer(mut self, voxelizer: Arc<dyn Voxelizer>) -> Self {
        self.voxelizer = voxelizer;
        self
    }

    /// Ensures the models are on disk, then returns the catalog.
    pub fn build(self) -> Result<ModelCatalog> {
        if !self.config.models_present() {
            let fetcher = match self.fetcher {
                Some(fetcher) => fetcher,
                None => Arc::new(HttpFetcher::new()?),
            };
            download::ensure_dataset_present(&self.config, fetcher.as_ref(), &self.download_spec)?;
        }

        Ok(ModelCatalog {
            root_dir: self.config.models_dir,
            mesh_loader: self.mesh_loader,
            voxelizer: self.voxelizer,
            cad_cache: ArtifactCache::new(),
            pcd_cache: ArtifactCache::new(),
            bbox_diagonal_cache: ArtifactCache::new(),
        })
    }
}
