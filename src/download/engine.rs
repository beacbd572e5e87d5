//! Sequential processing of a folder listing.
//!
//! Files are handled one at a time; each is fully verified (or given up on)
//! before the next starts. A failed file never stops the others, but a local
//! filesystem error does.
//!
//! # Example
//!
//! ```no_run
//! use gofile_dl::content::{ContentId, resolve_content};
//! use gofile_dl::download::{DownloadEngine, Downloader};
//! use gofile_dl::session::{Session, SessionConfig};
//! use std::path::Path;
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = "https://gofile.io/d/AbCdEf";
//! let session = Session::bootstrap(&SessionConfig::default(), &Url::parse(source)?).await?;
//! let content_id = ContentId::from_source_url(source)?;
//! let listing = resolve_content(&session, &content_id, "12345").await?;
//!
//! let engine = DownloadEngine::new(Downloader::default());
//! let (reports, stats) = engine
//!     .process_listing(&session, &listing, Path::new("./output/AbCdEf"))
//!     .await?;
//! println!("{} downloaded, {} failed", stats.downloaded(), stats.failed());
//! # let _ = reports;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use super::DownloadError;
use super::filename::destination_for;
use super::verified::{Downloader, FailureReason, FileOutcome};
use crate::content::ContentListing;
use crate::session::Session;

/// Counters from one listing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadStats {
    downloaded: usize,
    skipped: usize,
    failed: usize,
    attempts: u64,
}

impl DownloadStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Files fetched and verified in this run.
    #[must_use]
    pub fn downloaded(&self) -> usize {
        self.downloaded
    }

    /// Files already present with the right digest.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Files that could not be obtained.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Files that ended up valid on disk (downloaded + skipped).
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.downloaded + self.skipped
    }

    /// Total files processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded() + self.failed
    }

    /// Download attempts made across all files.
    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Records one file outcome.
    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Skipped => self.skipped += 1,
            FileOutcome::Downloaded { attempts } => {
                self.downloaded += 1;
                self.attempts += u64::from(*attempts);
            }
            FileOutcome::Failed { attempts, .. } => {
                self.failed += 1;
                self.attempts += u64::from(*attempts);
            }
        }
    }
}

/// Outcome of one listed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Listed file name.
    pub name: String,
    /// Destination path; `None` when the name was refused.
    pub path: Option<PathBuf>,
    /// What happened.
    pub outcome: FileOutcome,
}

/// Runs the verified downloader over every file of a listing.
#[derive(Debug, Clone, Default)]
pub struct DownloadEngine {
    downloader: Downloader,
}

impl DownloadEngine {
    /// Creates an engine around `downloader`.
    #[must_use]
    pub fn new(downloader: Downloader) -> Self {
        Self { downloader }
    }

    /// Downloads every file of `listing` into `output_dir`, sequentially.
    ///
    /// `output_dir` must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] on the first local filesystem failure.
    /// Per-file failures are reported in the returned [`FileReport`]s.
    #[instrument(skip(self, session, listing), fields(files = listing.len(), output_dir = %output_dir.display()))]
    pub async fn process_listing(
        &self,
        session: &Session,
        listing: &ContentListing,
        output_dir: &Path,
    ) -> Result<(Vec<FileReport>, DownloadStats), DownloadError> {
        let mut stats = DownloadStats::new();
        let mut reports = Vec::with_capacity(listing.len());

        for descriptor in listing.descriptors() {
            let Some(destination) = destination_for(output_dir, &descriptor.name) else {
                warn!(name = %descriptor.name, "refusing unsafe file name");
                let outcome = FileOutcome::Failed {
                    attempts: 0,
                    reason: FailureReason::UnsafeFileName(descriptor.name.clone()),
                };
                stats.record(&outcome);
                reports.push(FileReport {
                    name: descriptor.name.clone(),
                    path: None,
                    outcome,
                });
                continue;
            };

            let outcome = self
                .downloader
                .ensure_downloaded(session, descriptor, &destination)
                .await?;
            if let FileOutcome::Failed { attempts, reason } = &outcome {
                warn!(name = %descriptor.name, attempts, reason = %reason, "file failed");
            }
            stats.record(&outcome);
            reports.push(FileReport {
                name: descriptor.name.clone(),
                path: Some(destination),
                outcome,
            });
        }

        info!(
            downloaded = stats.downloaded(),
            skipped = stats.skipped(),
            failed = stats.failed(),
            "listing processed"
        );
        Ok((reports, stats))
    }
}
