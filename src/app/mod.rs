//! Run orchestration: session, listing, downloads.
//!
//! Single responsibility: drive one shared-folder download from a resolved
//! [`RunConfig`] and report what happened to every file. Nothing here exits
//! the process; the binary maps [`RunError`] and [`RunSummary`] to an exit
//! code.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::RunConfig;
use crate::content::{ContentId, ContentIdError, ListingError, resolve_content};
use crate::download::{
    DownloadEngine, DownloadError, DownloadStats, Downloader, FileReport, ProgressFactory,
};
use crate::session::{AuthError, Session};

/// Fatal errors that stop a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// The source URL does not name a shared folder.
    #[error(transparent)]
    ContentId(#[from] ContentIdError),

    /// The anonymous account could not be created.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The folder listing could not be fetched.
    #[error(transparent)]
    Listing(#[from] ListingError),

    /// The per-folder output directory could not be created.
    #[error("failed to create output directory '{path}': {source}")]
    OutputDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A local filesystem failure during downloads.
    #[error(transparent)]
    Download(#[from] DownloadError),
}

/// What a completed run did.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Shared folder that was processed.
    pub content_id: ContentId,
    /// Directory the files were written to.
    pub output_dir: PathBuf,
    /// One report per listed file, in listing order.
    pub reports: Vec<FileReport>,
    /// Aggregate counters.
    pub stats: DownloadStats,
}

impl RunSummary {
    /// Whether every listed file ended up valid on disk.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.stats.failed() == 0
    }
}

/// Downloads every file of the shared folder named by `config.source_url`.
///
/// The output directory is only created once the account exists and the
/// listing was fetched, so a failed bootstrap leaves the filesystem alone.
///
/// # Errors
///
/// Returns a [`RunError`] for any fatal failure. Files that fail after all
/// attempts are not errors; see [`RunSummary::reports`].
#[instrument(skip(config, progress), fields(source_url = %config.source_url))]
pub async fn run(
    config: &RunConfig,
    progress: Arc<dyn ProgressFactory>,
) -> Result<RunSummary, RunError> {
    let content_id = ContentId::from_source_url(&config.source_url)?;
    let entry_url = Url::parse(config.source_url.trim()).map_err(|_| {
        ContentIdError::InvalidUrl {
            input: config.source_url.clone(),
        }
    })?;
    debug!(content_id = %content_id, "content id extracted");

    let session = Session::bootstrap(&config.session, &entry_url).await?;

    let listing = resolve_content(&session, &content_id, &config.website_token).await?;
    info!(
        content_id = %content_id,
        skipped_folders = listing.skipped_folders(),
        "found {} files",
        listing.len()
    );

    let output_dir = config.output_dir_for(&content_id);
    tokio::fs::create_dir_all(&output_dir)
        .await
        .map_err(|source| RunError::OutputDir {
            path: output_dir.clone(),
            source,
        })?;

    let engine = DownloadEngine::new(Downloader::new(config.policy).with_progress(progress));
    let (reports, stats) = engine
        .process_listing(&session, &listing, &output_dir)
        .await?;

    Ok(RunSummary {
        content_id,
        output_dir,
        reports,
        stats,
    })
}
