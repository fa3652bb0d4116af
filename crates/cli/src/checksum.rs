//! SHA-1 of local artifact files

use anyhow::{Context, Result};
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Calculate the hex SHA-1 of a file, as repository indexes store it
pub fn sha1_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).context(format!("Failed to open file: {}", path.display()))?;
    let mut hasher = Sha1::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .context(format!("Failed to read file: {}", path.display()))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sha1_of_known_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();
        file.flush().unwrap();

        assert_eq!(
            sha1_file(file.path()).unwrap(),
            "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
        );
    }

    #[test]
    fn test_sha1_of_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(
            sha1_file(file.path()).unwrap(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = sha1_file(&dir.path().join("missing.jar")).unwrap_err();
        assert!(err.to_string().contains("missing.jar"));
    }
}
