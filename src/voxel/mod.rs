//! Solid voxel grids derived from CAD meshes.

mod binvox;
mod convert;

pub use binvox::{read_binvox, Binvox};
pub use convert::{BinvoxCommand, Voxelizer};

use crate::error::{Error, Result};
use nalgebra::{Point3, Vector3};
use serde::Serialize;

/// Dense 3D occupancy, x-y-z order with z varying fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct Occupancy {
    dims: [usize; 3],
    data: Vec<bool>,
}

impl Occupancy {
    pub fn new(dims: [usize; 3], data: Vec<bool>) -> Result<Self> {
        let expected = dims.iter().product::<usize>();
        if data.len() != expected {
            return Err(Error::InvalidArgument(format!(
                "occupancy of dims {:?} needs {} cells, got {}",
                dims,
                expected,
                data.len()
            )));
        }
        Ok(Self { dims, data })
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<bool> {
        let [dx, dy, dz] = self.dims;
        if x >= dx || y >= dy || z >= dz {
            return None;
        }
        Some(self.data[(x * dy + y) * dz + z])
    }

    pub fn filled_count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Indices of filled cells.
    pub fn filled(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let [_, dy, dz] = self.dims;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(move |(i, _)| [i / (dy * dz), (i / dz) % dy, i % dz])
    }
}

/// A cubic occupancy grid positioned in model space.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    pub occupancy: Occupancy,
    /// Edge length of one cell.
    pub pitch: f64,
    /// Centre of cell `(0, 0, 0)`.
    pub origin: Vector3<f64>,
}

impl VoxelGrid {
    /// Builds a grid from a parsed binvox file. The grid must be cubic; the
    /// pitch is `scale / dim` and the origin sits half a cell past `translate`.
    pub fn from_binvox(vox: Binvox) -> Result<Self> {
        let [dx, dy, dz] = vox.dims;
        if dx != dy || dy != dz {
            return Err(Error::NonCubicVoxelGrid { dims: vox.dims });
        }

        let pitch = vox.scale / dx as f64;
        let origin = Vector3::repeat(0.5 * pitch) + Vector3::from(vox.translate);

        Ok(Self {
            occupancy: Occupancy::new(vox.dims, vox.data)?,
            pitch,
            origin,
        })
    }

    pub fn dims(&self) -> [usize; 3] {
        self.occupancy.dims()
    }

    pub fn is_filled(&self, x: usize, y: usize, z: usize) -> bool {
        self.occupancy.get(x, y, z).unwrap_or(false)
    }

    pub fn filled_count(&self) -> usize {
        self.occupancy.filled_count()
    }

    /// Centres of all filled cells.
    pub fn points(&self) -> Vec<Point3<f64>> {
        self.occupancy
            .filled()
            .map(|[x, y, z]| {
                Point3::from(self.origin + Vector3::new(x as f64, y as f64, z as f64) * self.pitch)
            })
            .collect()
    }

    pub fn summary(&self) -> VoxelSummary {
        VoxelSummary {
            dims: self.dims(),
            pitch: self.pitch,
            origin: [self.origin.x, self.origin.y, self.origin.z],
            filled: self.filled_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VoxelSummary {
    pub dims: [usize; 3],
    pub pitch: f64,
    pub origin: [f64; 3],
    pub filled: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binvox(dims: [usize; 3], scale: f64, translate: [f64; 3]) -> Binvox {
        let n = dims.iter().product::<usize>();
        Binvox {
            dims,
            translate,
            scale,
            data: (0..n).map(|i| i == 0 || i == n - 1).collect(),
        }
    }

    #[test]
    fn test_pitch_and_origin() {
        let grid = VoxelGrid::from_binvox(binvox([10, 10, 10], 5.0, [1.0, -2.0, 0.0])).unwrap();

        assert_eq!(grid.pitch, 0.5);
        assert_eq!(grid.origin, Vector3::new(1.25, -1.75, 0.25));
        assert_eq!(grid.dims(), [10, 10, 10]);
    }

    #[test]
    fn test_non_cubic_is_rejected() {
        let err = VoxelGrid::from_binvox(binvox([10, 10, 12], 5.0, [0.0; 3])).unwrap_err();
        assert!(matches!(err, Error::NonCubicVoxelGrid { dims: [10, 10, 12] }));
    }

    #[test]
    fn test_points_are_cell_centres() {
        let grid = VoxelGrid::from_binvox(binvox([2, 2, 2], 2.0, [0.0; 3])).unwrap();

        assert!(grid.is_filled(0, 0, 0));
        assert!(grid.is_filled(1, 1, 1));
        assert!(!grid.is_filled(1, 0, 0));
        assert!(!grid.is_filled(5, 0, 0));
        assert_eq!(
            grid.points(),
            vec![Point3::new(0.5, 0.5, 0.5), Point3::new(1.5, 1.5, 1.5)]
        );
    }

    #[test]
    fn test_filled_indices() {
        let mut data = vec![false; 2 * 3 * 4];
        data[(1 * 3 + 2) * 4 + 3] = true;
        let occupancy = Occupancy::new([2, 3, 4], data).unwrap();

        assert_eq!(occupancy.filled().collect::<Vec<_>>(), vec![[1, 2, 3]]);
        assert_eq!(occupancy.get(1, 2, 3), Some(true));
    }

    #[test]
    fn test_occupancy_length_checked() {
        assert!(Occupancy::new([2, 2, 2], vec![false; 7]).is_err());
    }
}
