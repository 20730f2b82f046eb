use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::segmenter::HadithCandidate;

/// Lifecycle of an extraction task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Processing => write!(f, "processing"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Snapshot of one extraction task as stored and polled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskRecord {
    pub task_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<i64>,
    pub status: TaskStatus,
    pub progress: u8,
    pub message: String,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_hadiths: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hadiths: Option<Vec<HadithCandidate>>,
    /// Wall time of the run in seconds, set once terminal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    pub fn pending(task_id: &str, document_id: Option<i64>) -> Self {
        Self {
            task_id: task_id.to_string(),
            document_id,
            status: TaskStatus::Pending,
            progress: 0,
            message: "Waiting to start...".to_string(),
            current_page: 0,
            total_pages: 0,
            total_hadiths: 0,
            success: None,
            error: None,
            hadiths: None,
            duration: None,
            updated_at: Utc::now(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Optional fields merged into a task record alongside percent and message.
#[derive(Debug, Clone, Default)]
pub struct ProgressExtra {
    pub status: Option<TaskStatus>,
    pub current_page: Option<usize>,
    pub total_pages: Option<usize>,
    pub total_hadiths: Option<usize>,
    pub hadiths: Option<Vec<HadithCandidate>>,
    pub error: Option<String>,
    pub duration: Option<f64>,
}

impl ProgressExtra {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn pages(current: usize, total: usize) -> Self {
        Self {
            current_page: Some(current),
            total_pages: Some(total),
            ..Self::default()
        }
    }

    pub fn total_pages(total: usize) -> Self {
        Self {
            total_pages: Some(total),
            ..Self::default()
        }
    }

    pub fn total_hadiths(total: usize) -> Self {
        Self {
            total_hadiths: Some(total),
            ..Self::default()
        }
    }

    pub fn completed(preview: Vec<HadithCandidate>, total: usize, duration: f64) -> Self {
        Self {
            status: Some(TaskStatus::Completed),
            total_hadiths: Some(total),
            hadiths: Some(preview),
            duration: Some(duration),
            ..Self::default()
        }
    }

    pub fn failed(error: impl Into<String>, duration: f64) -> Self {
        Self {
            status: Some(TaskStatus::Failed),
            error: Some(error.into()),
            duration: Some(duration),
            ..Self::default()
        }
    }
}
