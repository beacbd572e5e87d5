//! Digest-verified, idempotent file downloads.
//!
//! [`Downloader::ensure_downloaded`] decides per file whether the local copy
//! can be kept, must be replaced, or cannot be obtained:
//!
//! 1. a local file whose MD5 matches is kept and no request is made;
//! 2. a local file whose MD5 differs is deleted;
//! 3. the link is fetched from byte 0 up to `max_attempts` times, deleting
//!    whatever was written whenever the transfer fails or the digest differs.
//!
//! On return the destination either holds the expected bytes or does not
//! exist.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::client::stream_link_to_file;
use super::digest::{Md5Digest, file_digest};
use super::error::DownloadError;
use super::progress::{NoProgress, ProgressFactory};
use super::retry::{AttemptPolicy, RetryDecision};
use crate::content::FileDescriptor;
use crate::session::Session;

/// Why a file could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    /// The listing's expected hash is not a 32-character hex digest.
    #[error("listing hash '{0}' is not a valid MD5 digest")]
    InvalidExpectedHash(String),

    /// The listed name cannot be used as a local file name.
    #[error("unsafe file name '{0}'")]
    UnsafeFileName(String),

    /// The last attempt's transfer failed (network, timeout, HTTP status).
    #[error("transfer failed: {0}")]
    Transfer(String),

    /// The last attempt completed but the bytes did not hash as expected.
    #[error("hash mismatch (expected {expected}, got {})", describe_digest(.actual))]
    DigestMismatch {
        /// Digest published by the listing.
        expected: Md5Digest,
        /// Digest of what was written, `None` if nothing was.
        actual: Option<Md5Digest>,
    },
}

/// Result of [`Downloader::ensure_downloaded`] for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// A valid local copy already existed; nothing was fetched.
    Skipped,

    /// The file was fetched and verified.
    Downloaded {
        /// Attempts used, including the successful one.
        attempts: u32,
    },

    /// The file could not be obtained; nothing is left at the destination.
    Failed {
        /// Attempts used (0 when the file was refused before fetching).
        attempts: u32,
        /// Failure of the last attempt.
        reason: FailureReason,
    },
}

impl FileOutcome {
    /// Whether the destination now holds verified bytes.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// Fetches files and accepts them only when their MD5 matches the listing.
#[derive(Clone)]
pub struct Downloader {
    policy: AttemptPolicy,
    progress: Arc<dyn ProgressFactory>,
}

impl std::fmt::Debug for Downloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downloader")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new(AttemptPolicy::default())
    }
}

impl Downloader {
    /// Creates a downloader that reports no progress.
    #[must_use]
    pub fn new(policy: AttemptPolicy) -> Self {
        Self {
            policy,
            progress: Arc::new(NoProgress),
        }
    }

    /// Reports transfer progress through `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressFactory>) -> Self {
        self.progress = progress;
        self
    }

    /// The attempt policy in use.
    #[must_use]
    pub fn policy(&self) -> AttemptPolicy {
        self.policy
    }

    /// Makes `destination` hold the bytes described by `descriptor`.
    ///
    /// Calling this again after a success issues no network request.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] when the destination cannot be read,
    /// written or deleted. Transfer failures and digest mismatches are not
    /// errors; they end up in [`FileOutcome::Failed`].
    #[instrument(skip(self, session, descriptor, destination), fields(file = %descriptor.name))]
    pub async fn ensure_downloaded(
        &self,
        session: &Session,
        descriptor: &FileDescriptor,
        destination: &Path,
    ) -> Result<FileOutcome, DownloadError> {
        let Ok(expected) = descriptor.md5.parse::<Md5Digest>() else {
            warn!(md5 = %descriptor.md5, "listing hash is not a valid MD5 digest");
            // Nothing can be verified against this hash, so no local copy is kept.
            remove_if_exists(destination).await?;
            return Ok(FileOutcome::Failed {
                attempts: 0,
                reason: FailureReason::InvalidExpectedHash(descriptor.md5.clone()),
            });
        };

        if let Some(existing) = file_digest(destination).await? {
            if existing == expected {
                info!("file {} already exists - skip", descriptor.name);
                return Ok(FileOutcome::Skipped);
            }
            warn!(
                expected = %expected,
                actual = %existing,
                "file {} hash mismatch - replacing",
                descriptor.name
            );
            remove_if_exists(destination).await?;
        }

        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;
        loop {
            info!(
                attempt,
                max_attempts,
                "download attempt {attempt}/{max_attempts} - {}",
                descriptor.name
            );

            let Some(reason) = self
                .attempt(session, descriptor, destination, expected)
                .await?
            else {
                debug!(attempt, "digest verified");
                return Ok(FileOutcome::Downloaded { attempts: attempt });
            };

            warn!(attempt, reason = %reason, "download attempt failed");
            match self.policy.should_retry(attempt) {
                RetryDecision::Retry { next_attempt } => attempt = next_attempt,
                RetryDecision::GiveUp { reason: give_up } => {
                    warn!(reason = %give_up, "giving up on {}", descriptor.name);
                    return Ok(FileOutcome::Failed {
                        attempts: attempt,
                        reason,
                    });
                }
            }
        }
    }

    /// One fetch-and-verify cycle. `Ok(None)` means the file verified.
    async fn attempt(
        &self,
        session: &Session,
        descriptor: &FileDescriptor,
        destination: &Path,
        expected: Md5Digest,
    ) -> Result<Option<FailureReason>, DownloadError> {
        let mut progress = self.progress.for_file(&descriptor.name);
        if let Err(error) =
            stream_link_to_file(session, &descriptor.link, destination, progress.as_mut()).await
        {
            remove_if_exists(destination).await?;
            if error.is_local() {
                return Err(error);
            }
            return Ok(Some(FailureReason::Transfer(error.to_string())));
        }

        let actual = file_digest(destination).await?;
        if actual == Some(expected) {
            return Ok(None);
        }

        remove_if_exists(destination).await?;
        Ok(Some(FailureReason::DigestMismatch { expected, actual }))
    }
}

fn describe_digest(digest: &Option<Md5Digest>) -> String {
    digest.map_or_else(|| "nothing".to_string(), |d| d.to_string())
}

async fn remove_if_exists(path: &Path) -> Result<(), DownloadError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "removed file");
            Ok(())
        }
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(DownloadError::io(path, error)),
    }
}
