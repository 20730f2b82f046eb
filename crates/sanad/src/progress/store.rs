//! Keyed storage for task records with per-entry time-to-live.

use std::time::{Duration, Instant};

use moka::sync::Cache;
use moka::Expiry;

use super::record::TaskRecord;

/// Backing store for task progress. Entries vanish once their TTL lapses.
pub trait ProgressStore: Send + Sync {
    fn get(&self, task_id: &str) -> Option<TaskRecord>;
    fn put(&self, record: TaskRecord, ttl: Duration);
    fn remove(&self, task_id: &str);
}

#[derive(Clone)]
struct StoredTask {
    record: TaskRecord,
    ttl: Duration,
}

struct TaskExpiry;

impl Expiry<String, StoredTask> for TaskExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredTask,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredTask,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process store backed by a `moka` cache. Every write resets the TTL.
#[derive(Clone)]
pub struct MemoryStore {
    cache: Cache<String, StoredTask>,
}

impl MemoryStore {
    pub fn new(max_tasks: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_tasks)
            .expire_after(TaskExpiry)
            .build();
        Self { cache }
    }
}

impl ProgressStore for MemoryStore {
    fn get(&self, task_id: &str) -> Option<TaskRecord> {
        self.cache.get(task_id).map(|stored| stored.record)
    }

    fn put(&self, record: TaskRecord, ttl: Duration) {
        let key = record.task_id.clone();
        self.cache.insert(key, StoredTask { record, ttl });
    }

    fn remove(&self, task_id: &str) {
        self.cache.invalidate(task_id);
    }
}
