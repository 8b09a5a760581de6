//! Reader for the run-length encoded `.binvox` format.

use crate::error::{Error, Result};
use std::io::BufRead;

/// Parsed contents of a binvox file.
#[derive(Debug, Clone, PartialEq)]
pub struct Binvox {
    /// Grid size along x, y, z.
    pub dims: [usize; 3],
    pub translate: [f64; 3],
    pub scale: f64,
    /// Occupancy in x-y-z order, z varying fastest.
    pub data: Vec<bool>,
}

impl Binvox {
    pub fn filled_count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }
}

pub fn read_binvox<R: BufRead>(mut reader: R) -> Result<Binvox> {
    let mut line = String::new();

    read_header_line(&mut reader, &mut line)?;
    if !line.starts_with("#binvox") {
        return Err(Error::Parse("missing #binvox magic".to_string()));
    }

    let mut file_dims = None;
    let mut translate = [0.0; 3];
    let mut scale = 1.0;

    loop {
        read_header_line(&mut reader, &mut line)?;
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("dim") => file_dims = Some(parse_n::<usize, 3>(fields, "dim")?),
            Some("translate") => translate = parse_n::<f64, 3>(fields, "translate")?,
            Some("scale") => scale = parse_n::<f64, 1>(fields, "scale")?[0],
            Some("data") => break,
            Some(other) => tracing::debug!("Ignoring binvox header field '{}'", other),
            None => {}
        }
    }

    let [d, h, w] = file_dims.ok_or_else(|| Error::Parse("binvox header has no dim".to_string()))?;
    if d == 0 || h == 0 || w == 0 {
        return Err(Error::Parse(format!("binvox dims must be positive, got {} {} {}", d, h, w)));
    }

    let mut body = Vec::new();
    reader.read_to_end(&mut body)?;
    let cells = d
        .checked_mul(h)
        .and_then(|n| n.checked_mul(w))
        .ok_or_else(|| Error::Parse(format!("binvox dims {} {} {} overflow the cell count", d, h, w)))?;
    let raw = decode_runs(&body, cells)?;

    // on disk the order is x-z-y with y fastest
    let mut data = vec![false; raw.len()];
    for x in 0..d {
        for z in 0..h {
            for y in 0..w {
                data[(x * w + y) * h + z] = raw[(x * h + z) * w + y];
            }
        }
    }

    Ok(Binvox {
        dims: [d, w, h],
        translate,
        scale,
        data,
    })
}

fn read_header_line<R: BufRead>(reader: &mut R, line: &mut String) -> Result<()> {
    line.clear();
    if reader.read_line(line)? == 0 {
        return Err(Error::Parse("unexpected end of binvox header".to_string()));
    }
    Ok(())
}

fn parse_n<'a, T, const N: usize>(
    fields: impl Iterator<Item = &'a str>,
    key: &str,
) -> Result<[T; N]>
where
    T: std::str::FromStr + Copy + Default,
{
    let mut out = [T::default(); N];
    let mut count = 0;

    for field in fields {
        if count == N {
            return Err(Error::Parse(format!("too many values for '{}'", key)));
        }
        out[count] = field
            .parse()
            .map_err(|_| Error::Parse(format!("invalid value '{}' for '{}'", field, key)))?;
        count += 1;
    }

    if count != N {
        return Err(Error::Parse(format!("expected {} values for '{}', found {}", N, key, count)));
    }
    Ok(out)
}

fn decode_runs(body: &[u8], expected: usize) -> Result<Vec<bool>> {
    if body.len() % 2 != 0 {
        return Err(Error::Parse("binvox data has a dangling run byte".to_string()));
    }

    // each run covers at most 255 cells, so the body bounds the allocation
    let mut cells = Vec::with_capacity(expected.min(body.len() / 2 * 255));
    for run in body.chunks_exact(2) {
        let (value, count) = (run[0], run[1] as usize);
        if cells.len() + count > expected {
            return Err(Error::Parse(format!("binvox runs exceed {} cells", expected)));
        }
        cells.extend(std::iter::repeat(value != 0).take(count));
    }

    if cells.len() != expected {
        return Err(Error::Parse(format!(
            "binvox runs cover {} of {} cells",
            cells.len(),
            expected
        )));
    }
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::binvox_bytes;

    #[test]
    fn test_read_header_and_counts() {
        let bytes = binvox_bytes([4, 4, 4], [-0.5, 0.25, 1.0], 2.0, |i| i % 2 == 0);
        let vox = read_binvox(bytes.as_slice()).unwrap();

        assert_eq!(vox.dims, [4, 4, 4]);
        assert_eq!(vox.translate, [-0.5, 0.25, 1.0]);
        assert_eq!(vox.scale, 2.0);
        assert_eq!(vox.data.len(), 64);
        assert_eq!(vox.filled_count(), 32);
    }

    #[test]
    fn test_reorders_to_xyz() {
        // raw index (x=1, z=0, y=2) in a 2 x 3 x 4 (d h w) file
        let raw_index = (1 * 3 + 0) * 4 + 2;
        let bytes = binvox_bytes([2, 3, 4], [0.0; 3], 1.0, |i| i == raw_index);
        let vox = read_binvox(bytes.as_slice()).unwrap();

        // dims come back as x, y, z = d, w, h
        assert_eq!(vox.dims, [2, 4, 3]);
        let (x, y, z) = (1, 2, 0);
        assert!(vox.data[(x * 4 + y) * 3 + z]);
        assert_eq!(vox.filled_count(), 1);
    }

    #[test]
    fn test_rejects_missing_magic() {
        let err = read_binvox("dim 1 1 1\ndata\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_rejects_short_body() {
        let mut bytes = b"#binvox 1\ndim 2 2 2\ntranslate 0 0 0\nscale 1\ndata\n".to_vec();
        bytes.extend_from_slice(&[1, 5]);
        let err = read_binvox(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, Error::Parse(msg) if msg.contains("5 of 8")));
    }

    #[test]
    fn test_rejects_overlong_body() {
        let mut bytes = b"#binvox 1\ndim 1 1 1\ndata\n".to_vec();
        bytes.extend_from_slice(&[0, 2]);
        assert!(read_binvox(bytes.as_slice()).is_err());
    }

    #[test]
    fn test_rejects_overflowing_dims() {
        let mut bytes = b"#binvox 1\ndim 4294967296 4294967296 4294967296\ndata\n".to_vec();
        bytes.extend_from_slice(&[0, 1]);

        let err = read_binvox(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, Error::Parse(msg) if msg.contains("overflow")));
    }

    #[test]
    fn test_huge_dims_with_short_body_fail_cleanly() {
        let mut bytes = b"#binvox 1\ndim 100000 100000 100000\ndata\n".to_vec();
        bytes.extend_from_slice(&[1, 255, 0, 255]);

        let err = read_binvox(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, Error::Parse(msg) if msg.contains("510 of")));
    }

    #[test]
    fn test_rejects_bad_dim_line() {
        let err = read_binvox("#binvox 1\ndim 2 2\ndata\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
