//! HTTP client construction for the session.
//!
//! One client per run: cookies from the bootstrap request and the account
//! token live in a shared jar, and every request carries the configured
//! User-Agent.

use std::sync::Arc;

use reqwest::Client;
use reqwest::cookie::Jar;

use super::{AuthError, SessionConfig};

/// Builds the session client around `cookie_jar`.
///
/// The read timeout applies per read, so large files are not cut off by a
/// whole-request deadline.
///
/// # Errors
///
/// Returns [`AuthError::ClientBuild`] when reqwest rejects the configuration.
pub(crate) fn build_session_client(
    config: &SessionConfig,
    cookie_jar: Arc<Jar>,
) -> Result<Client, AuthError> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .read_timeout(config.read_timeout)
        .gzip(true)
        .user_agent(config.user_agent.clone())
        .cookie_provider(cookie_jar)
        .build()
        .map_err(AuthError::client_build)
}
