//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use gofile_dl::ConfigOverrides;
use gofile_dl::download::MAX_ATTEMPTS_LIMIT;

/// Download every file of a shared gofile folder, verified by MD5.
///
/// Files are written to `<output-dir>/<content-id>/`. Files that are already
/// present with the right digest are skipped, so re-running after an
/// interruption only fetches what is missing or corrupt.
#[derive(Parser, Debug)]
#[command(name = "gofile-dl")]
#[command(author, version, about)]
pub struct Args {
    /// Shared folder URL, e.g. https://gofile.io/d/XXXXXX
    #[arg(value_name = "URL")]
    pub url: String,

    /// Override the User-Agent sent with every request
    #[arg(short = 'u', long, value_name = "UA")]
    pub user_agent: Option<String>,

    /// Output root directory [default: ./output]
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Download attempts per file (1-10) [default: 3]
    #[arg(short = 'r', long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_ATTEMPTS_LIMIT)))]
    pub max_attempts: Option<u32>,

    /// `websiteToken` sent with the listing request [default: 12345]
    #[arg(long, value_name = "TOKEN")]
    pub website_token: Option<String>,

    /// API base URL [default: https://api.gofile.io]
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,
}

impl Args {
    /// The values given on the command line, as config overrides.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            output_dir: self.output_dir.clone(),
            user_agent: self.user_agent.clone(),
            website_token: self.website_token.clone(),
            api_base: self.api_base.clone(),
            max_attempts: self.max_attempts,
        }
    }

    /// Log level used when `RUST_LOG` is not set.
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}
