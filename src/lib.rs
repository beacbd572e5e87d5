//! gofile-dl core library
//!
//! Downloads the files of a shared gofile folder into a local directory,
//! verifying every file against the MD5 digest published by the service and
//! skipping files that are already present and valid.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`session`] - Anonymous account bootstrap and the shared HTTP session
//! - [`content`] - Content id extraction and folder listing resolution
//! - [`download`] - Digest-verified downloads with bounded retries
//! - [`app`] - Run orchestration (session → listing → downloads)
//! - [`config`] - Run configuration from CLI overrides, config file and defaults

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod config;
pub mod content;
pub mod download;
pub mod session;
#[cfg(test)]
pub mod test_support;
pub mod user_agent;

// Re-export commonly used types
pub use app::{RunError, RunSummary, run};
pub use config::{ConfigError, ConfigOverrides, FileConfig, RunConfig, load_default_file_config};
pub use content::{
    ContentId, ContentIdError, ContentListing, FileDescriptor, ListingError, resolve_content,
};
pub use download::{
    DEFAULT_MAX_ATTEMPTS, DownloadEngine, DownloadError, DownloadStats, Downloader,
    FailureReason, FileOutcome, FileReport, Md5Digest, NoProgress, ProgressFactory,
    RetryDecision, AttemptPolicy, TransferProgress, file_digest,
};
pub use session::{AccountToken, AuthError, Session, SessionConfig};
