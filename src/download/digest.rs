//! MD5 digests of local files.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use super::DownloadError;

/// Chunk size used when hashing files from disk.
pub const HASH_CHUNK_SIZE: usize = 4096;

const DIGEST_LEN: usize = 16;

/// A 128-bit MD5 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Md5Digest([u8; DIGEST_LEN]);

/// The string is not 32 hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid MD5 hex digest '{0}'")]
pub struct InvalidDigest(pub String);

impl Md5Digest {
    /// Digest of an in-memory byte slice.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(md5::compute(bytes).0)
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }
}

impl FromStr for Md5Digest {
    type Err = InvalidDigest;

    /// Parses a hex digest; case-insensitive, surrounding whitespace ignored.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let digits = raw.trim();
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| InvalidDigest(raw.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Md5Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Computes the MD5 digest of the file at `path`, reading it in
/// [`HASH_CHUNK_SIZE`] chunks.
///
/// Returns `Ok(None)` when nothing exists at `path`.
///
/// # Errors
///
/// Returns [`DownloadError::Io`] if the path exists but cannot be read.
pub async fn file_digest(path: &Path) -> Result<Option<Md5Digest>, DownloadError> {
    let mut file = match File::open(path).await {
        Ok(file) => file,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(DownloadError::io(path, error)),
    };

    let mut context = md5::Context::new();
    let mut buffer = [0u8; HASH_CHUNK_SIZE];
    loop {
        let read = file
            .read(&mut buffer)
            .await
            .map_err(|e| DownloadError::io(path, e))?;
        if read == 0 {
            break;
        }
        context.consume(&buffer[..read]);
    }

    Ok(Some(Md5Digest(context.compute().0)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const EMPTY_MD5: &str = "d41d8cd98f00b204e9800998ecf8427e";

    #[test]
    fn test_parse_and_display_are_lowercase_hex() {
        let digest: Md5Digest = "D41D8CD98F00B204E9800998ECF8427E".parse().unwrap();
        assert_eq!(digest.to_string(), EMPTY_MD5);
        assert_eq!(digest, Md5Digest::of_bytes(b""));
    }

    #[test]
    fn test_parse_rejects_malformed_digests() {
        assert!("".parse::<Md5Digest>().is_err());
        assert!("d41d8cd98f00b204".parse::<Md5Digest>().is_err());
        assert!("z41d8cd98f00b204e9800998ecf8427e".parse::<Md5Digest>().is_err());
        assert!("d41d8cd98f00b204e9800998ecf8427e00".parse::<Md5Digest>().is_err());
        assert!("d41d8cd98f00b204e9800998ecf8427".parse::<Md5Digest>().is_err());
        assert!("+41d8cd98f00b204e9800998ecf8427e".parse::<Md5Digest>().is_err());
    }

    #[test]
    fn test_parse_ignores_surrounding_whitespace() {
        let digest: Md5Digest = format!("  {EMPTY_MD5}\n").parse().unwrap();
        assert_eq!(digest.to_string(), EMPTY_MD5);
    }

    #[test]
    fn test_display_matches_md5_crate_formatting() {
        let digest = Md5Digest::of_bytes(b"hello");
        assert_eq!(digest.to_string(), format!("{:x}", md5::compute(b"hello")));
        assert_eq!(digest.as_bytes(), &md5::compute(b"hello").0);
    }

    #[tokio::test]
    async fn test_file_digest_missing_path_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let digest = file_digest(&temp_dir.path().join("absent.bin")).await.unwrap();
        assert!(digest.is_none());
    }

    #[tokio::test]
    async fn test_file_digest_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.txt");
        std::fs::write(&path, b"").unwrap();

        let digest = file_digest(&path).await.unwrap().unwrap();
        assert_eq!(digest.to_string(), EMPTY_MD5);
    }

    #[tokio::test]
    async fn test_file_digest_spans_multiple_chunks() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("big.bin");
        let content: Vec<u8> = (0..(HASH_CHUNK_SIZE * 3 + 17))
            .map(|i| u8::try_from(i % 251).unwrap())
            .collect();
        std::fs::write(&path, &content).unwrap();

        let digest = file_digest(&path).await.unwrap().unwrap();
        assert_eq!(digest, Md5Digest::of_bytes(&content));
    }

    #[tokio::test]
    async fn test_file_digest_directory_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = file_digest(temp_dir.path()).await;
        assert!(matches!(result, Err(DownloadError::Io { .. })));
    }
}
