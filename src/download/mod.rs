//! Digest-verified downloads.
//!
//! This module fetches listed files and keeps only bytes whose MD5 matches
//! the listing.
//!
//! # Features
//!
//! - Streaming transfers (memory use independent of file size)
//! - Skip-if-valid: an existing file with the right digest costs no request
//! - Bounded attempts (3 by default), each restarting from byte 0
//! - Typed per-file outcome instead of silent exhaustion
//! - Pluggable progress reporting
//!
//! # Example
//!
//! ```no_run
//! use gofile_dl::content::FileDescriptor;
//! use gofile_dl::download::{Downloader, FileOutcome};
//! use gofile_dl::session::{Session, SessionConfig};
//! use std::path::Path;
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let entry = Url::parse("https://gofile.io/d/AbCdEf")?;
//! let session = Session::bootstrap(&SessionConfig::default(), &entry).await?;
//! let descriptor = FileDescriptor::new(
//!     "a.txt",
//!     "https://store1.gofile.io/download/a.txt",
//!     "d41d8cd98f00b204e9800998ecf8427e",
//! );
//! match Downloader::default()
//!     .ensure_downloaded(&session, &descriptor, Path::new("./output/AbCdEf/a.txt"))
//!     .await?
//! {
//!     FileOutcome::Failed { reason, .. } => eprintln!("failed: {reason}"),
//!     outcome => println!("ok: {outcome:?}"),
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod digest;
mod engine;
mod error;
pub mod filename;
mod progress;
mod retry;
mod verified;

pub use client::{TransferStats, WRITE_BUFFER_SIZE};
pub use digest::{HASH_CHUNK_SIZE, InvalidDigest, Md5Digest, file_digest};
pub use engine::{DownloadEngine, DownloadStats, FileReport};
pub use error::DownloadError;
pub use progress::{NoProgress, ProgressFactory, TransferProgress};
pub use retry::{AttemptPolicy, DEFAULT_MAX_ATTEMPTS, MAX_ATTEMPTS_LIMIT, RetryDecision};
pub use verified::{Downloader, FailureReason, FileOutcome};
