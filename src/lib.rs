//! Access to the YCB-Video object models: lazy download, class lookup, and
//! memoized meshes, point clouds and bounding-box diagonals.

pub mod catalog;
pub mod config;
pub mod download;
pub mod error;
pub mod mesh;
pub mod pcd;
pub mod voxel;

#[cfg(test)]
mod testing;

pub use catalog::{ClassRef, ModelCatalog, CLASS_NAMES};
pub use config::Config;
pub use error::{Error, Result};
