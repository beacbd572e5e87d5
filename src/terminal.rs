//! Terminal concerns of the binary: log subscriber and progress bars.

use std::time::Duration;

use gofile_dl::{ProgressFactory, TransferProgress};
use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{msg:30!} [{bar:30}] {bytes}/{total_bytes} {bytes_per_sec} eta {eta}";
const SPINNER_TEMPLATE: &str = "{spinner} {msg:30!} {bytes} {bytes_per_sec}";

pub(crate) fn is_dumb_terminal() -> bool {
    std::env::var("TERM")
        .map(|value| value.eq_ignore_ascii_case("dumb"))
        .unwrap_or(false)
}

pub(crate) fn should_use_progress(
    stderr_is_terminal: bool,
    quiet: bool,
    no_progress: bool,
    dumb_terminal: bool,
) -> bool {
    stderr_is_terminal && !quiet && !no_progress && !dumb_terminal
}

pub(crate) fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

/// Draws one indicatif bar per transfer on stderr.
#[derive(Debug, Default)]
pub(crate) struct BarProgressFactory;

impl ProgressFactory for BarProgressFactory {
    fn for_file(&self, name: &str) -> Box<dyn TransferProgress> {
        Box::new(BarProgress {
            name: name.to_string(),
            bar: None,
        })
    }
}

struct BarProgress {
    name: String,
    bar: Option<ProgressBar>,
}

impl TransferProgress for BarProgress {
    fn start(&mut self, total_bytes: u64) {
        // Servers may omit content-length; fall back to a byte-counting spinner.
        let bar = if total_bytes == 0 {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template(SPINNER_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            let bar = ProgressBar::new(total_bytes);
            bar.set_style(
                ProgressStyle::with_template(BAR_TEMPLATE)
                    .map(|style| style.progress_chars("=> "))
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        };
        bar.set_message(self.name.clone());
        self.bar = Some(bar);
    }

    fn advance(&mut self, bytes: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(bytes);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_requires_interactive_stderr() {
        assert!(should_use_progress(true, false, false, false));
        assert!(!should_use_progress(false, false, false, false));
    }

    #[test]
    fn test_progress_disabled_by_flags_or_dumb_terminal() {
        assert!(!should_use_progress(true, true, false, false));
        assert!(!should_use_progress(true, false, true, false));
        assert!(!should_use_progress(true, false, false, true));
    }

    #[test]
    fn test_bar_progress_tolerates_calls_before_start() {
        let mut progress = BarProgressFactory.for_file("a.txt");
        progress.advance(10);
        progress.finish();
    }

    #[test]
    fn test_bar_progress_lifecycle() {
        let mut progress = BarProgressFactory.for_file("a.txt");
        progress.start(3);
        progress.advance(3);
        progress.finish();

        let mut progress = BarProgressFactory.for_file("b.txt");
        progress.start(0);
        progress.advance(5);
        progress.finish();
    }
}
