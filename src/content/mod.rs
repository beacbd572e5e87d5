//! Shared folder resolution.
//!
//! Turns a source URL into a [`ContentId`] and asks the listing endpoint for
//! the files stored under it. Responses are decoded into typed schemas once,
//! here; the rest of the crate only sees [`FileDescriptor`]s.

mod error;

pub use error::{ContentIdError, ListingError};

use std::collections::BTreeMap;
use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::session::Session;

/// Default `websiteToken` query value expected by the listing endpoint.
pub const DEFAULT_WEBSITE_TOKEN: &str = "12345";

const STATUS_OK: &str = "ok";
const FOLDER_ENTRY_TYPE: &str = "folder";

/// Identifier of a shared folder: the last path segment of its URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentId(String);

impl ContentId {
    /// Extracts the content id from a folder URL such as
    /// `https://gofile.io/d/AbCdEf`.
    ///
    /// Trailing slashes are ignored; query and fragment are not part of the id.
    ///
    /// # Errors
    ///
    /// Returns [`ContentIdError`] if `source` is not a URL or has no
    /// non-empty path segment.
    pub fn from_source_url(source: &str) -> Result<Self, ContentIdError> {
        let url = Url::parse(source.trim()).map_err(|_| ContentIdError::InvalidUrl {
            input: source.to_string(),
        })?;

        url.path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
            .map(|segment| Self(segment.to_string()))
            .ok_or_else(|| ContentIdError::MissingId {
                input: source.to_string(),
            })
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One remote file: where to fetch it, what to call it, what it must hash to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Local file name.
    pub name: String,
    /// URL the bytes are streamed from.
    pub link: String,
    /// Expected MD5 digest, hex encoded.
    pub md5: String,
}

impl FileDescriptor {
    /// Creates a descriptor.
    pub fn new(name: impl Into<String>, link: impl Into<String>, md5: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: link.into(),
            md5: md5.into(),
        }
    }
}

/// Files of a shared folder keyed by their opaque remote key.
///
/// Keys carry no meaning; the map only makes iteration order deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentListing {
    entries: BTreeMap<String, FileDescriptor>,
    skipped_folders: usize,
}

impl ContentListing {
    /// Creates a listing from already-validated descriptors.
    #[must_use]
    pub fn new(entries: BTreeMap<String, FileDescriptor>) -> Self {
        Self {
            entries,
            skipped_folders: 0,
        }
    }

    /// Number of file descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the listing has no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the file descriptors.
    pub fn descriptors(&self) -> impl Iterator<Item = &FileDescriptor> {
        self.entries.values()
    }

    /// Sub-folder entries that were left out of the listing.
    #[must_use]
    pub fn skipped_folders(&self) -> usize {
        self.skipped_folders
    }
}

/// `{"status": "...", "data": {...}}`
#[derive(Debug, Deserialize)]
struct ContentResponse {
    status: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ContentData {
    #[serde(default)]
    contents: Option<BTreeMap<String, ContentEntry>>,
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    md5: Option<String>,
}

/// Fetches the file listing of `content_id`.
///
/// Success requires HTTP 200 and a body-level `status` of `"ok"`.
///
/// # Errors
///
/// Returns [`ListingError`] on network failure, any other status, a rejected
/// body status, or a body that does not match the listing schema.
#[instrument(skip(session, content_id, website_token), fields(content_id = %content_id))]
pub async fn resolve_content(
    session: &Session,
    content_id: &ContentId,
    website_token: &str,
) -> Result<ContentListing, ListingError> {
    let mut url = session.config().get_content_url();
    url.query_pairs_mut()
        .append_pair("contentId", content_id.as_str())
        .append_pair("token", session.token().as_str())
        .append_pair("websiteToken", website_token);

    let response = session
        .client()
        .get(url)
        .send()
        .await
        .map_err(|e| ListingError::network(content_id.as_str(), e))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(ListingError::http_status(content_id.as_str(), status.as_u16()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| ListingError::network(content_id.as_str(), e))?;

    parse_listing(content_id, &body)
}

fn parse_listing(content_id: &ContentId, body: &str) -> Result<ContentListing, ListingError> {
    let id = content_id.as_str();
    let envelope: ContentResponse =
        serde_json::from_str(body).map_err(|e| ListingError::malformed(id, e.to_string()))?;

    if envelope.status != STATUS_OK {
        return Err(ListingError::rejected(id, envelope.status, body));
    }

    let data = envelope
        .data
        .ok_or_else(|| ListingError::malformed(id, "missing 'data'"))?;
    let data: ContentData =
        serde_json::from_value(data).map_err(|e| ListingError::malformed(id, e.to_string()))?;
    let contents = data
        .contents
        .ok_or_else(|| ListingError::malformed(id, "missing 'data.contents'"))?;

    let mut listing = ContentListing::default();
    for (key, entry) in contents {
        if entry.kind.as_deref() == Some(FOLDER_ENTRY_TYPE) {
            warn!(key = %key, name = ?entry.name, "skipping nested folder");
            listing.skipped_folders += 1;
            continue;
        }

        let name = entry
            .name
            .ok_or_else(|| ListingError::missing_field(id, key.as_str(), "name"))?;
        let link = entry
            .link
            .ok_or_else(|| ListingError::missing_field(id, key.as_str(), "link"))?;
        let md5 = entry
            .md5
            .ok_or_else(|| ListingError::missing_field(id, key.as_str(), "md5"))?;

        debug!(key = %key, name = %name, "listed file");
        listing
            .entries
            .insert(key, FileDescriptor::new(name, link, md5));
    }

    Ok(listing)
}
