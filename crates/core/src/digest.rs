//! Content digests for change detection.
//!
//! Staleness decisions compare fingerprints of byte content, never
//! transmitted checksums. Equality is byte-exact: two functionally
//! equivalent config files with different formatting are different.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A content fingerprint: lowercase hex SHA-256.
///
/// The algorithm is an implementation detail of this module; call sites
/// only compare fingerprints for equality, so the hash can be swapped
/// without touching them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub String);

impl std::fmt::Display for Fingerprint {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Fingerprint arbitrary bytes.
pub fn digest_bytes(data: &[u8]) -> Fingerprint {
  let mut hasher = Sha256::new();
  hasher.update(data);
  Fingerprint(hex::encode(hasher.finalize()))
}

/// Fingerprint a file's contents.
///
/// A missing file is a normal, expected state (nothing has been applied
/// yet), so it returns `Ok(None)` rather than an error.
pub fn digest_file(path: &Path) -> Result<Option<Fingerprint>, io::Error> {
  let mut file = match File::open(path) {
    Ok(file) => file,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
    Err(e) => return Err(e),
  };

  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];
  loop {
    let bytes_read = file.read(&mut buffer)?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(Some(Fingerprint(hex::encode(hasher.finalize()))))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::tempdir;

  #[test]
  fn known_digest() {
    let fp = digest_bytes(b"hello world");
    assert_eq!(
      fp.0,
      "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
    );
  }

  #[test]
  fn equal_bytes_equal_fingerprints() {
    assert_eq!(digest_bytes(b"NodeName=node1"), digest_bytes(b"NodeName=node1"));
  }

  #[test]
  fn unequal_bytes_unequal_fingerprints() {
    // Formatting-only differences still count as different content.
    assert_ne!(digest_bytes(b"NodeName=node1"), digest_bytes(b"NodeName=node1\n"));
    assert_ne!(digest_bytes(b""), digest_bytes(b" "));
  }

  #[test]
  fn file_digest_matches_byte_digest() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("auth.key");
    fs::write(&path, b"secret key material").unwrap();

    let from_file = digest_file(&path).unwrap().unwrap();
    assert_eq!(from_file, digest_bytes(b"secret key material"));
  }

  #[test]
  fn missing_file_is_absent_not_error() {
    let temp = tempdir().unwrap();
    let result = digest_file(&temp.path().join("nope")).unwrap();
    assert!(result.is_none());
  }
}
