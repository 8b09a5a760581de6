//! Fixtures and test doubles shared by the unit tests.

use crate::download::ArchiveFetcher;
use crate::error::{Error, Result};
use md5::{Digest, Md5};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use zip::write::SimpleFileOptions;

pub const CUBE_OBJ: &str = "\
# box spanning [0,1] x [0,2] x [0,2]
mtllib cube.mtl
o cube
v 0 0 0
v 1 0 0
v 1 2 0
v 0 2 0
v 0 0 2
v 1 0 2
v 1 2 2
v 0 2 2
usemtl skin
f 1 2 3 4
f 5 6 7 8
f 1 2 6 5
f 2 3 7 6
f 3 4 8 7
f 4 1 5 8
";

pub const CUBE_MTL: &str = "\
newmtl skin
Kd 1.0 1.0 1.0
map_Kd texture_map.png
";

pub const POINTS_XYZ: &str = "\
0.1 0.2 0.3
-1.0 2.5e-1 4
";

pub fn md5_hex(bytes: &[u8]) -> String {
    format!("{:x}", Md5::digest(bytes))
}

/// Zip archive bytes holding `files` as `(path, contents)` entries.
pub fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    for (name, contents) in files {
        zip.start_file(*name, options).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

/// The dataset archive layout: one `models/<class>/` directory per class.
pub fn models_zip(classes: &[&str]) -> Vec<u8> {
    let mut files = Vec::new();
    for class in classes {
        files.push((format!("models/{}/textured_simple.obj", class), CUBE_OBJ));
        files.push((format!("models/{}/cube.mtl", class), CUBE_MTL));
        files.push((format!("models/{}/points.xyz", class), POINTS_XYZ));
    }

    let borrowed: Vec<(&str, &str)> = files.iter().map(|(n, c)| (n.as_str(), *c)).collect();
    zip_bytes(&borrowed)
}

/// Writes one class directory of fixture files under `root`.
pub fn write_class_dir(root: &Path, class: &str) {
    let dir = root.join(class);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("textured_simple.obj"), CUBE_OBJ).unwrap();
    std::fs::write(dir.join("cube.mtl"), CUBE_MTL).unwrap();
    std::fs::write(dir.join("points.xyz"), POINTS_XYZ).unwrap();
}

/// Serves a fixed payload and counts how often it was asked to.
pub struct CountingFetcher {
    payload: Vec<u8>,
    calls: AtomicUsize,
}

impl CountingFetcher {
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            payload,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ArchiveFetcher for CountingFetcher {
    fn fetch(&self, _url: &str, dest: &mut dyn Write) -> Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        dest.write_all(&self.payload)?;
        Ok(self.payload.len() as u64)
    }
}

/// Writes half a payload, then fails like a dropped connection.
pub struct FailingFetcher;

impl ArchiveFetcher for FailingFetcher {
    fn fetch(&self, _url: &str, dest: &mut dyn Write) -> Result<u64> {
        dest.write_all(b"PK\x03\x04partial")?;
        Err(Error::Download("connection reset".to_string()))
    }
}

/// Encodes a binvox file. `dims` are in file order (d h w) and `filled`
/// is queried with raw on-disk cell indices.
pub fn binvox_bytes(
    dims: [usize; 3],
    translate: [f64; 3],
    scale: f64,
    filled: impl Fn(usize) -> bool,
) -> Vec<u8> {
    let mut out = format!(
        "#binvox 1\ndim {} {} {}\ntranslate {} {} {}\nscale {}\ndata\n",
        dims[0], dims[1], dims[2], translate[0], translate[1], translate[2], scale
    )
    .into_bytes();

    let total = dims[0] * dims[1] * dims[2];
    let mut i = 0;
    while i < total {
        let value = filled(i);
        let mut count = 0u8;
        while i < total && filled(i) == value && count < u8::MAX {
            count += 1;
            i += 1;
        }
        out.push(value as u8);
        out.push(count);
    }

    out
}
