//! Content fingerprints for delivered payload files

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// A file path paired with the SHA256 of its contents
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileInfo {
    pub path: PathBuf,
    /// Lowercase hex SHA256 digest
    pub sha256: String,
}

impl FileInfo {
    /// Read the whole file and fingerprint it
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            sha256: compute_sha256(&contents),
        })
    }

    /// Whether two records describe identical contents, regardless of path
    pub fn same_contents(&self, other: &FileInfo) -> bool {
        self.sha256 == other.sha256
    }
}

/// Compute SHA256 hash of bytes
pub fn compute_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_sha256() {
        assert_eq!(
            compute_sha256(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_same_bytes_different_paths() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("kubelet.exe");
        let b = dir.path().join("nested-copy.exe");
        std::fs::write(&a, b"MZ\x90\x00binary").unwrap();
        std::fs::write(&b, b"MZ\x90\x00binary").unwrap();

        let info_a = FileInfo::new(&a).unwrap();
        let info_b = FileInfo::new(&b).unwrap();

        assert_eq!(info_a.path, a);
        assert_ne!(info_a.path, info_b.path);
        assert_eq!(info_a.sha256, info_b.sha256);
        assert!(info_a.same_contents(&info_b));
    }

    #[test]
    fn test_single_byte_change_changes_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("containerd.exe");

        std::fs::write(&path, b"version-1").unwrap();
        let before = FileInfo::new(&path).unwrap();
        std::fs::write(&path, b"version-2").unwrap();
        let after = FileInfo::new(&path).unwrap();

        assert_ne!(before.sha256, after.sha256);
        assert_eq!(after.sha256.len(), 64);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileInfo::new(dir.path().join("absent.exe")).unwrap_err();
        assert!(matches!(err, Error::IoError { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_empty_file_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        std::fs::write(&path, b"").unwrap();

        assert_eq!(
            FileInfo::new(&path).unwrap().sha256,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
