//! Error types for content id extraction and listing resolution.

use thiserror::Error;

/// The source URL does not identify a shared folder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentIdError {
    /// The source string is not a URL.
    #[error("invalid source URL '{input}'\n  Suggestion: pass a folder link such as https://gofile.io/d/XXXXXX")]
    InvalidUrl {
        /// The rejected input.
        input: String,
    },

    /// The URL has no path segment to take the content id from.
    #[error("no content id in '{input}'\n  Suggestion: the content id is the last path segment, e.g. https://gofile.io/d/XXXXXX")]
    MissingId {
        /// The rejected input.
        input: String,
    },
}

/// Errors that can occur while fetching a folder listing.
///
/// All of these are fatal for a run: no downloads are attempted.
#[derive(Debug, Error)]
pub enum ListingError {
    /// Network-level error calling the listing endpoint.
    #[error("failed to get files for {content_id} - network error: {source}")]
    Network {
        /// The content id being resolved.
        content_id: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The listing endpoint answered with a status other than 200.
    #[error("failed to get files for {content_id} - HTTP {status}")]
    HttpStatus {
        /// The content id being resolved.
        content_id: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The body-level status was not `"ok"`.
    #[error("failed to get files for {content_id} - status '{status}': {payload}")]
    Rejected {
        /// The content id being resolved.
        content_id: String,
        /// Body-level status reported by the service.
        status: String,
        /// Raw response payload, for diagnostics.
        payload: String,
    },

    /// The body could not be decoded or lacks `data.contents`.
    #[error("failed to get files for {content_id} - malformed response: {reason}")]
    MalformedResponse {
        /// The content id being resolved.
        content_id: String,
        /// What was wrong with the body.
        reason: String,
    },

    /// A file entry lacks one of `name`, `link`, `md5`.
    #[error("failed to get files for {content_id} - entry '{key}' has no '{field}'")]
    MissingField {
        /// The content id being resolved.
        content_id: String,
        /// Remote key of the offending entry.
        key: String,
        /// Name of the absent field.
        field: &'static str,
    },
}

impl ListingError {
    /// Creates a network error.
    pub fn network(content_id: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            content_id: content_id.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(content_id: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            content_id: content_id.into(),
            status,
        }
    }

    /// Creates a rejected-status error.
    pub fn rejected(
        content_id: impl Into<String>,
        status: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self::Rejected {
            content_id: content_id.into(),
            status: status.into(),
            payload: payload.into(),
        }
    }

    /// Creates a malformed response error.
    pub fn malformed(content_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            content_id: content_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates a missing field error.
    pub fn missing_field(
        content_id: impl Into<String>,
        key: impl Into<String>,
        field: &'static str,
    ) -> Self {
        Self::MissingField {
            content_id: content_id.into(),
            key: key.into(),
            field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_error_rejected_display_includes_payload() {
        let error = ListingError::rejected("ABC123", "error-notFound", r#"{"status":"error-notFound"}"#);
        let msg = error.to_string();
        assert!(msg.contains("ABC123"), "Expected content id in: {msg}");
        assert!(msg.contains("error-notFound"), "Expected status in: {msg}");
    }

    #[test]
    fn test_listing_error_http_status_display() {
        let msg = ListingError::http_status("ABC123", 401).to_string();
        assert_eq!(msg, "failed to get files for ABC123 - HTTP 401");
    }

    #[test]
    fn test_content_id_error_has_suggestion() {
        let msg = ContentIdError::MissingId {
            input: "https://gofile.io/".to_string(),
        }
        .to_string();
        assert!(msg.contains("Suggestion:"), "Expected suggestion in: {msg}");
    }
}
