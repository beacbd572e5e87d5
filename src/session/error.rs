//! Error types for session bootstrap.

use thiserror::Error;

/// Errors that can occur while establishing the anonymous session.
///
/// All of these are fatal for a run: without a token no listing can be fetched.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },

    /// Network-level error talking to the account endpoint.
    #[error("failed to create account - network error calling {url}: {source}")]
    Network {
        /// The endpoint that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The account endpoint answered with a non-success status.
    #[error("failed to create account - HTTP {status} from {url}")]
    HttpStatus {
        /// The endpoint that returned the status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The account response body could not be decoded.
    #[error("failed to create account - malformed response from {url}: {reason}")]
    MalformedResponse {
        /// The endpoint that returned the body.
        url: String,
        /// Decoder error description.
        reason: String,
    },

    /// The response decoded but carried no `data.token`.
    #[error("failed to create account - missing token in {payload}")]
    MissingToken {
        /// Raw response payload, for diagnostics.
        payload: String,
    },
}

impl AuthError {
    /// Creates a client build error.
    pub fn client_build(source: reqwest::Error) -> Self {
        Self::ClientBuild { source }
    }

    /// Creates a network error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a malformed response error.
    pub fn malformed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a missing token error.
    pub fn missing_token(payload: impl Into<String>) -> Self {
        Self::MissingToken {
            payload: payload.into(),
        }
    }
}
