//! Transfer progress reporting seam.
//!
//! The library only reports byte counts; the binary decides how to render
//! them (an indicatif bar, or nothing).

/// Receives progress for one transfer.
pub trait TransferProgress: Send {
    /// Called once the response headers are in. `total_bytes` is the declared
    /// content length, 0 when unknown.
    fn start(&mut self, total_bytes: u64);

    /// Called after each chunk is written.
    fn advance(&mut self, bytes: u64);

    /// Called when the transfer ends, successfully or not.
    fn finish(&mut self);
}

/// Creates a [`TransferProgress`] per file transfer.
pub trait ProgressFactory: Send + Sync {
    /// Creates a sink for a transfer of `file_name`.
    fn for_file(&self, file_name: &str) -> Box<dyn TransferProgress>;
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl TransferProgress for NoProgress {
    fn start(&mut self, _total_bytes: u64) {}

    fn advance(&mut self, _bytes: u64) {}

    fn finish(&mut self) {}
}

impl ProgressFactory for NoProgress {
    fn for_file(&self, _file_name: &str) -> Box<dyn TransferProgress> {
        Box::new(NoProgress)
    }
}
