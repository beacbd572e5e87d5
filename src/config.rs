//! Run configuration.
//!
//! Values come from three layers, highest priority first: command-line
//! overrides, the user config file, built-in defaults. The config file lives
//! at `$XDG_CONFIG_HOME/gofile-dl/config.toml` (or
//! `$HOME/.config/gofile-dl/config.toml`) and holds flat `key = value` lines:
//!
//! ```toml
//! output_dir = "/data/gofile"   # download root
//! max_attempts = 5
//! read_timeout_secs = 600
//! ```

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::content::{ContentId, DEFAULT_WEBSITE_TOKEN};
use crate::download::{AttemptPolicy, DEFAULT_MAX_ATTEMPTS, MAX_ATTEMPTS_LIMIT};
use crate::session::{DEFAULT_API_BASE, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT, SessionConfig};
use crate::user_agent::resolve_user_agent;

/// Output root used when neither the CLI nor the config file sets one.
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Directory name under the user config directory.
const CONFIG_DIR_NAME: &str = "gofile-dl";

const TIMEOUT_SECS_RANGE: (u64, u64) = (1, 3600);

/// Errors raised while loading or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A line is not of the form `key = value`.
    #[error("invalid config syntax on line {line}: expected key = value")]
    Syntax {
        /// 1-based line number.
        line: usize,
    },

    /// A key this tool does not know.
    #[error("unknown configuration key '{key}' on line {line}")]
    UnknownKey {
        /// The key as written.
        key: String,
        /// 1-based line number.
        line: usize,
    },

    /// A value that does not parse for its key.
    #[error("invalid `{key}` value on line {line}: {reason}")]
    InvalidValue {
        /// Config key.
        key: &'static str,
        /// 1-based line number.
        line: usize,
        /// What was expected.
        reason: String,
    },

    /// A numeric value outside its allowed range.
    #[error("invalid `{key}` value on line {line}: {value}. Expected range: {min}..={max}")]
    OutOfRange {
        /// Config key.
        key: &'static str,
        /// 1-based line number.
        line: usize,
        /// Value as parsed.
        value: u64,
        /// Inclusive lower bound.
        min: u64,
        /// Inclusive upper bound.
        max: u64,
    },

    /// The API base is not an absolute URL.
    #[error("invalid API base URL '{value}'")]
    InvalidApiBase {
        /// The rejected value.
        value: String,
    },
}

impl ConfigError {
    fn invalid_value(key: &'static str, line: usize, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            line,
            reason: reason.into(),
        }
    }
}

/// Values read from the user config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Default output root.
    pub output_dir: Option<PathBuf>,
    /// Default User-Agent.
    pub user_agent: Option<String>,
    /// Default `websiteToken` listing parameter.
    pub website_token: Option<String>,
    /// Default API base URL.
    pub api_base: Option<String>,
    /// Default download attempts per file (1..=10).
    pub max_attempts: Option<u32>,
    /// HTTP connect timeout in seconds (1..=3600).
    pub connect_timeout_secs: Option<u64>,
    /// HTTP read timeout in seconds (1..=3600).
    pub read_timeout_secs: Option<u64>,
}

/// Values given on the command line. `None` defers to the lower layers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// `--output-dir`
    pub output_dir: Option<PathBuf>,
    /// `--user-agent`
    pub user_agent: Option<String>,
    /// `--website-token`
    pub website_token: Option<String>,
    /// `--api-base`
    pub api_base: Option<String>,
    /// `--max-attempts`
    pub max_attempts: Option<u32>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Shared-folder URL given by the user.
    pub source_url: String,
    /// Root under which `<contentId>/` is created.
    pub output_root: PathBuf,
    /// `websiteToken` sent with the listing request.
    pub website_token: String,
    /// HTTP session settings.
    pub session: SessionConfig,
    /// Download attempts per file.
    pub policy: AttemptPolicy,
}

impl RunConfig {
    /// Merges CLI overrides, the config file and defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiBase`] when the chosen API base is
    /// not an absolute URL.
    pub fn resolve(
        source_url: impl Into<String>,
        overrides: &ConfigOverrides,
        file: Option<&FileConfig>,
    ) -> Result<Self, ConfigError> {
        let output_root = overrides
            .output_dir
            .clone()
            .or_else(|| file.and_then(|f| f.output_dir.clone()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        let user_agent = overrides
            .user_agent
            .clone()
            .or_else(|| file.and_then(|f| f.user_agent.clone()));

        let website_token = overrides
            .website_token
            .clone()
            .or_else(|| file.and_then(|f| f.website_token.clone()))
            .unwrap_or_else(|| DEFAULT_WEBSITE_TOKEN.to_string());

        let api_base_raw = overrides
            .api_base
            .clone()
            .or_else(|| file.and_then(|f| f.api_base.clone()))
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let api_base = parse_api_base(&api_base_raw)?;

        let max_attempts = overrides
            .max_attempts
            .or_else(|| file.and_then(|f| f.max_attempts))
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);

        let connect_timeout = file
            .and_then(|f| f.connect_timeout_secs)
            .map_or(DEFAULT_CONNECT_TIMEOUT, Duration::from_secs);
        let read_timeout = file
            .and_then(|f| f.read_timeout_secs)
            .map_or(DEFAULT_READ_TIMEOUT, Duration::from_secs);

        Ok(Self {
            source_url: source_url.into(),
            output_root,
            website_token,
            session: SessionConfig {
                api_base,
                user_agent: resolve_user_agent(user_agent.as_deref()),
                connect_timeout,
                read_timeout,
            },
            policy: AttemptPolicy::with_max_attempts(max_attempts),
        })
    }

    /// Directory the files of `content_id` are written to.
    #[must_use]
    pub fn output_dir_for(&self, content_id: &ContentId) -> PathBuf {
        self.output_root.join(content_id.as_str())
    }
}

fn parse_api_base(raw: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidApiBase {
        value: raw.to_string(),
    };
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    Ok(url)
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/gofile-dl/config.toml`
/// 2. `$HOME/.config/gofile-dl/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    config_path_from(env_var_non_empty_os("XDG_CONFIG_HOME"), env_var_non_empty_os("HOME"))
}

fn config_path_from(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    if let Some(xdg_config_home) = xdg_config_home {
        return Some(
            PathBuf::from(xdg_config_home)
                .join(CONFIG_DIR_NAME)
                .join("config.toml"),
        );
    }

    let home = home?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIR_NAME)
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config file from the default path if it exists.
///
/// # Errors
///
/// Returns a [`ConfigError`] when the file exists but cannot be read or
/// parsed.
pub fn load_default_file_config() -> Result<Option<FileConfig>, ConfigError> {
    let Some(path) = resolve_default_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        debug!(path = %path.display(), "no config file");
        return Ok(None);
    }
    load_file_config(&path).map(Some)
}

/// Loads and parses the config file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] when the file cannot be read, or the parse
/// error of the first bad line.
pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config_str(&raw)?;
    debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Parses config file contents.
///
/// # Errors
///
/// Returns the [`ConfigError`] of the first bad line.
pub fn parse_config_str(raw: &str) -> Result<FileConfig, ConfigError> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            return Err(ConfigError::Syntax { line: line_no });
        };
        let value = raw_value.trim();

        match raw_key.trim() {
            "output_dir" => {
                let parsed = string_value("output_dir", line_no, value)?;
                cfg.output_dir = Some(PathBuf::from(parsed));
            }
            "user_agent" => {
                cfg.user_agent = Some(string_value("user_agent", line_no, value)?);
            }
            "website_token" => {
                cfg.website_token = Some(string_value("website_token", line_no, value)?);
            }
            "api_base" => {
                cfg.api_base = Some(string_value("api_base", line_no, value)?);
            }
            "max_attempts" => {
                let parsed = ranged_value(
                    "max_attempts",
                    line_no,
                    value,
                    (1, u64::from(MAX_ATTEMPTS_LIMIT)),
                )?;
                let attempts = u32::try_from(parsed).map_err(|_| {
                    ConfigError::invalid_value("max_attempts", line_no, "out of range for u32")
                })?;
                cfg.max_attempts = Some(attempts);
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(ranged_value(
                    "connect_timeout_secs",
                    line_no,
                    value,
                    TIMEOUT_SECS_RANGE,
                )?);
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = Some(ranged_value(
                    "read_timeout_secs",
                    line_no,
                    value,
                    TIMEOUT_SECS_RANGE,
                )?);
            }
            unknown => {
                return Err(ConfigError::UnknownKey {
                    key: unknown.to_string(),
                    line: line_no,
                });
            }
        }
    }
    Ok(cfg)
}

fn string_value(key: &'static str, line: usize, raw: &str) -> Result<String, ConfigError> {
    parse_string_literal(raw).map_err(|reason| ConfigError::invalid_value(key, line, reason))
}

fn ranged_value(
    key: &'static str,
    line: usize,
    raw: &str,
    (min, max): (u64, u64),
) -> Result<u64, ConfigError> {
    let value =
        parse_integer_u64(raw).map_err(|reason| ConfigError::invalid_value(key, line, reason))?;
    if !(min..=max).contains(&value) {
        return Err(ConfigError::OutOfRange {
            key,
            line,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String, &'static str> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        return Err("expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64, &'static str> {
    let token = raw_value.trim();
    if token.is_empty() {
        return Err("expected integer value");
    }
    let value = token.parse::<i128>().map_err(|_| "expected integer value")?;
    if value < 0 {
        return Err("expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| "integer value out of range for u64")
}
