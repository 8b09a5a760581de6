//! Plain-text point clouds (`points.xyz`).

use crate::error::{Error, Result};
use nalgebra::Point3;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub type PointCloud = Vec<Point3<f64>>;

pub fn read_xyz(path: &Path) -> Result<PointCloud> {
    let file = File::open(path)?;
    parse_xyz(BufReader::new(file))
        .map_err(|e| match e {
            Error::Parse(msg) => Error::Parse(format!("{:?}: {}", path, msg)),
            other => other,
        })
}

/// Parses whitespace-delimited `x y z` rows. Blank lines and `#` comments are skipped.
pub fn parse_xyz<R: BufRead>(reader: R) -> Result<PointCloud> {
    let mut points = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let row = line.split('#').next().unwrap_or("").trim();
        if row.is_empty() {
            continue;
        }

        let values = row
            .split_whitespace()
            .map(|v| v.parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Parse(format!("line {}: {}", lineno + 1, e)))?;

        match values.as_slice() {
            [x, y, z] => points.push(Point3::new(*x, *y, *z)),
            _ => {
                return Err(Error::Parse(format!(
                    "line {}: expected 3 columns, found {}",
                    lineno + 1,
                    values.len()
                )))
            }
        }
    }

    Ok(points)
}
