use crate::error::{SmResult, StrokeMatchError};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Hex SHA-256 of everything `reader` yields.
pub fn digest_reader<R: Read>(mut reader: R) -> SmResult<String> {
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Checksum recorded in a model's `.meta` sidecar.
pub fn file_digest<P: AsRef<Path>>(path: P) -> SmResult<String> {
    digest_reader(BufReader::new(File::open(path)?))
}

/// Writes `bytes` to a temporary file next to `path`, then renames it over
/// `path`. On error the previous content of `path`, if any, is untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> SmResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StrokeMatchError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_digest_of_known_bytes() {
        assert_eq!(
            digest_reader(&b"abc"[..]).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_file_digest_matches_reader() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("blob");
        let data: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &data).unwrap();

        assert_eq!(file_digest(&path).unwrap(), digest_reader(&data[..]).unwrap());
    }

    #[test]
    fn test_write_atomic_keeps_old_content_on_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("taken");
        fs::create_dir(&target).unwrap();

        assert!(write_atomic(&target, b"x").is_err());
        assert!(target.is_dir());
        // the temporary file is cleaned up too
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
