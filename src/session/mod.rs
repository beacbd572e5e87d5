//! Anonymous session bootstrap.
//!
//! A [`Session`] is built once per run and passed by reference to the
//! resolver and the downloader. Bootstrapping:
//!
//! 1. GETs the entry URL so the service can set its cookies,
//! 2. creates an anonymous account and extracts `data.token`,
//! 3. installs the token as the `accountToken` cookie.
//!
//! # Example
//!
//! ```no_run
//! use gofile_dl::session::{Session, SessionConfig};
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let entry = Url::parse("https://gofile.io/d/AbCdEf")?;
//! let session = Session::bootstrap(&SessionConfig::default(), &entry).await?;
//! println!("token acquired: {:?}", session.token());
//! # Ok(())
//! # }
//! ```

mod error;
mod http_client;

pub use error::AuthError;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::cookie::Jar;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::user_agent::DEFAULT_USER_AGENT;

/// Default API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.gofile.io";

/// Default HTTP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default per-read timeout (generous for slow file hosts).
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(300);

/// Cookie name the service expects the account token under.
pub const ACCOUNT_TOKEN_COOKIE: &str = "accountToken";

const CREATE_ACCOUNT_ENDPOINT: &str = "createAccount";
const GET_CONTENT_ENDPOINT: &str = "getContent";

/// Network settings for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Base URL of the API (account creation and listing endpoints hang off it).
    pub api_base: Url,
    /// User-Agent sent with every request.
    pub user_agent: String,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Timeout for each read from a response body.
    pub read_timeout: Duration,
}

impl Default for SessionConfig {
    /// # Panics
    ///
    /// Panics if [`DEFAULT_API_BASE`] fails to parse, which it never does.
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl SessionConfig {
    /// URL of the anonymous account creation endpoint.
    #[must_use]
    pub fn create_account_url(&self) -> Url {
        self.endpoint(CREATE_ACCOUNT_ENDPOINT)
    }

    /// URL of the content listing endpoint, without query parameters.
    #[must_use]
    pub fn get_content_url(&self) -> Url {
        self.endpoint(GET_CONTENT_ENDPOINT)
    }

    fn endpoint(&self, name: &str) -> Url {
        let mut url = self.api_base.clone();
        url.set_query(None);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name);
        }
        url
    }
}

/// Anonymous account token issued by the service.
///
/// `Debug` redacts the value so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountToken(String);

impl AccountToken {
    /// Wraps a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccountToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccountToken(<redacted>)")
    }
}

/// `{"data": {"token": "..."}}`
#[derive(Debug, Deserialize)]
struct AccountResponse {
    #[serde(default)]
    data: Option<AccountData>,
}

#[derive(Debug, Deserialize)]
struct AccountData {
    #[serde(default)]
    token: Option<String>,
}

impl AccountResponse {
    fn into_token(self) -> Option<AccountToken> {
        self.data
            .and_then(|data| data.token)
            .filter(|token| !token.is_empty())
            .map(AccountToken::new)
    }
}

/// Authenticated, cookie-bearing HTTP state shared by one run.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    cookie_jar: Arc<Jar>,
    config: SessionConfig,
    token: AccountToken,
}

impl Session {
    /// Establishes a session: cookie bootstrap, account creation, token cookie.
    ///
    /// The entry URL request only exists to collect cookies; its failure is
    /// logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the client cannot be built, the account
    /// endpoint is unreachable or answers with a non-success status, or the
    /// response carries no token. None of these are retried.
    #[instrument(skip(config, entry_url), fields(entry_url = %entry_url))]
    pub async fn bootstrap(config: &SessionConfig, entry_url: &Url) -> Result<Self, AuthError> {
        let cookie_jar = Arc::new(Jar::default());
        let client = http_client::build_session_client(config, Arc::clone(&cookie_jar))?;

        match client.get(entry_url.clone()).send().await {
            Ok(response) => {
                debug!(status = response.status().as_u16(), "cookie bootstrap complete");
            }
            Err(error) => warn!(error = %error, "cookie bootstrap request failed; continuing"),
        }

        let token = create_account(&client, &config.create_account_url()).await?;

        let session = Self {
            client,
            cookie_jar,
            config: config.clone(),
            token,
        };
        session.authorize(&session.config.api_base);
        info!("anonymous account created");
        Ok(session)
    }

    /// Installs the `accountToken` cookie for the host of `url`.
    ///
    /// File links are served from hosts other than the API, so the downloader
    /// calls this for every link before fetching it.
    pub fn authorize(&self, url: &Url) {
        let cookie = format!("{ACCOUNT_TOKEN_COOKIE}={}; Path=/", self.token.as_str());
        self.cookie_jar.add_cookie_str(&cookie, url);
    }

    /// The account token issued at bootstrap.
    #[must_use]
    pub fn token(&self) -> &AccountToken {
        &self.token
    }

    /// The underlying HTTP client.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The configuration this session was built with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

async fn create_account(client: &Client, url: &Url) -> Result<AccountToken, AuthError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| AuthError::network(url.as_str(), e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AuthError::http_status(url.as_str(), status.as_u16()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| AuthError::network(url.as_str(), e))?;

    parse_account_token(url, &body)
}

fn parse_account_token(url: &Url, body: &str) -> Result<AccountToken, AuthError> {
    let parsed: AccountResponse =
        serde_json::from_str(body).map_err(|e| AuthError::malformed(url.as_str(), e.to_string()))?;
    parsed
        .into_token()
        .ok_or_else(|| AuthError::missing_token(body))
}
