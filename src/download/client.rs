//! Streaming transfer of one file link to disk.
//!
//! The response body is consumed chunk by chunk and written through a
//! fixed-size buffer, so memory use does not grow with file size.

use std::path::Path;

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};
use url::Url;

use super::error::DownloadError;
use super::progress::TransferProgress;
use crate::session::Session;

/// Write buffer size for streamed transfers.
pub const WRITE_BUFFER_SIZE: usize = 8 * 1024;

/// Byte counts of a completed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferStats {
    /// Bytes written to disk.
    pub bytes_written: u64,
    /// Declared `content-length`, 0 when the server sent none.
    pub content_length: u64,
}

/// Streams `link` into `destination`, creating or truncating it.
///
/// The account token cookie is installed for the link's host first. No file
/// is created when the server answers with a non-success status. A transfer
/// that fails mid-stream leaves a partial file behind; the caller decides
/// what to do with it.
///
/// # Errors
///
/// Returns [`DownloadError::InvalidUrl`], [`DownloadError::Network`],
/// [`DownloadError::Timeout`] or [`DownloadError::HttpStatus`] for transfer
/// failures and [`DownloadError::Io`] for local write failures.
#[instrument(skip(session, destination, progress), fields(url = %link))]
pub(crate) async fn stream_link_to_file(
    session: &Session,
    link: &str,
    destination: &Path,
    progress: &mut dyn TransferProgress,
) -> Result<TransferStats, DownloadError> {
    let url = Url::parse(link).map_err(|_| DownloadError::invalid_url(link))?;
    session.authorize(&url);

    let response = session
        .client()
        .get(url)
        .send()
        .await
        .map_err(|e| DownloadError::network(link, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::http_status(link, status.as_u16()));
    }

    let content_length = response.content_length().unwrap_or(0);
    let file = File::create(destination)
        .await
        .map_err(|e| DownloadError::io(destination, e))?;

    progress.start(content_length);
    let streamed = stream_to_file(file, response, link, destination, progress).await;
    progress.finish();

    let bytes_written = streamed?;
    debug!(
        path = %destination.display(),
        bytes = bytes_written,
        content_length,
        "transfer complete"
    );

    Ok(TransferStats {
        bytes_written,
        content_length,
    })
}

/// Streams the response body to `file`, returning bytes written.
///
/// `file` is owned so the handle is closed on every return path.
async fn stream_to_file(
    file: File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
    progress: &mut dyn TransferProgress,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;

        let chunk_len = chunk.len() as u64;
        bytes_written += chunk_len;
        progress.advance(chunk_len);
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;
    writer
        .into_inner()
        .sync_all()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}
