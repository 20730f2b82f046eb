pub mod record;
pub mod reporter;
pub mod store;

pub use record::{ProgressExtra, TaskRecord, TaskStatus};
pub use reporter::{ProgressReporter, TaskTracker, MAX_RUNNING_PERCENT};
pub use store::{MemoryStore, ProgressStore};

/// Receives progress updates from extraction code.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, percent: i32, message: &str, extra: ProgressExtra);
}

/// No-op sink for unit tests and callers that do not track progress.
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_progress(&self, _percent: i32, _message: &str, _extra: ProgressExtra) {}
}
