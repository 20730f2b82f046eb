use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use super::record::{ProgressExtra, TaskRecord, TaskStatus};
use super::store::{MemoryStore, ProgressStore};
use super::ProgressSink;
use crate::config::ProgressConfig;
use crate::error::ProgressError;

/// Highest percentage a task may show before it reaches a terminal state.
pub const MAX_RUNNING_PERCENT: i32 = 95;

/// Publishes task progress into a [`ProgressStore`] and reads it back.
#[derive(Clone)]
pub struct ProgressReporter {
    store: Arc<dyn ProgressStore>,
    task_ttl: Duration,
    result_ttl: Duration,
}

impl ProgressReporter {
    pub fn new(store: Arc<dyn ProgressStore>, task_ttl: Duration, result_ttl: Duration) -> Self {
        Self {
            store,
            task_ttl,
            result_ttl,
        }
    }

    /// Reporter over a fresh in-memory store sized and timed by `config`.
    pub fn in_memory(config: &ProgressConfig) -> Self {
        Self::new(
            Arc::new(MemoryStore::new(config.max_tasks)),
            Duration::from_secs(config.task_ttl_secs),
            Duration::from_secs(config.result_ttl_secs),
        )
    }

    pub fn new_task_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Seeds a `pending` record at 0%.
    pub fn start(&self, task_id: &str, document_id: Option<i64>) -> TaskRecord {
        let record = TaskRecord::pending(task_id, document_id);
        self.store.put(record.clone(), self.task_ttl);
        tracing::debug!(task_id, ?document_id, "progress.start");
        record
    }

    /// Merges an update into the task record. Returns `false` when the task
    /// already reached a terminal state and the update was dropped.
    pub fn report(&self, task_id: &str, percent: i32, message: &str, extra: ProgressExtra) -> bool {
        let existing = self.store.get(task_id);
        if let Some(record) = &existing {
            if record.is_terminal() {
                tracing::debug!(
                    task_id,
                    status = %record.status,
                    "progress.report ignored for finished task"
                );
                return false;
            }
        }

        let mut record = existing.unwrap_or_else(|| TaskRecord::pending(task_id, None));

        let status = match extra.status {
            Some(TaskStatus::Pending) if record.status != TaskStatus::Pending => record.status,
            Some(status) => status,
            None => TaskStatus::Processing,
        };
        let ceiling = if status.is_terminal() {
            100
        } else {
            MAX_RUNNING_PERCENT
        };
        let percent = percent.clamp(0, ceiling) as u8;

        record.status = status;
        record.progress = record.progress.max(percent);
        record.message = message.to_string();
        record.updated_at = Utc::now();

        if let Some(current) = extra.current_page {
            record.current_page = current;
        }
        if let Some(total) = extra.total_pages {
            record.total_pages = total;
        }
        if let Some(total) = extra.total_hadiths {
            record.total_hadiths = total;
        }
        if let Some(hadiths) = extra.hadiths {
            record.hadiths = Some(hadiths);
        }
        if let Some(error) = extra.error {
            record.error = Some(error);
        }
        if let Some(duration) = extra.duration {
            record.duration = Some(duration);
        }
        if status.is_terminal() {
            record.success = Some(status == TaskStatus::Completed);
        }

        let ttl = if status.is_terminal() {
            self.result_ttl
        } else {
            self.task_ttl
        };

        tracing::debug!(
            task_id,
            status = %record.status,
            progress = record.progress,
            message = %record.message,
            "progress.report"
        );

        self.store.put(record, ttl);
        true
    }

    pub fn poll(&self, task_id: &str) -> Result<TaskRecord, ProgressError> {
        self.store
            .get(task_id)
            .ok_or_else(|| ProgressError::TaskExpiredOrUnknown(task_id.to_string()))
    }

    /// Sink bound to one task, handed to extraction code.
    pub fn tracker(&self, task_id: &str) -> TaskTracker {
        TaskTracker {
            reporter: self.clone(),
            task_id: task_id.to_string(),
        }
    }
}

pub struct TaskTracker {
    reporter: ProgressReporter,
    task_id: String,
}

impl TaskTracker {
    pub fn task_id(&self) -> &str {
        &self.task_id
    }
}

impl ProgressSink for TaskTracker {
    fn on_progress(&self, percent: i32, message: &str, extra: ProgressExtra) {
        self.reporter.report(&self.task_id, percent, message, extra);
    }
}
