//! Storage accessor seam.
//!
//! Handlers and the weekly aggregation only ever see [`FeedbackStore`]; the
//! Postgres implementation lives in [`crate::db`], the in-process one here.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::FeedbackRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database query failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn count_total(&self) -> Result<i64, StoreError>;

    /// Exact, case-sensitive match on the stored type. Unknown labels count 0.
    async fn count_by_type(&self, feedback_type: &str) -> Result<i64, StoreError>;

    /// Both bounds inclusive. An inverted range returns nothing.
    async fn find_by_created_at_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<FeedbackRecord>, StoreError>;
}

#[derive(Default)]
pub struct MemoryFeedbackStore {
    records: RwLock<Vec<FeedbackRecord>>,
    unavailable: AtomicBool,
}

impl MemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<FeedbackRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            unavailable: AtomicBool::new(false),
        }
    }

    pub async fn insert(&self, feedback_type: &str, created_at: NaiveDateTime) -> FeedbackRecord {
        let record = FeedbackRecord::new(feedback_type, created_at);
        self.records.write().await.push(record.clone());
        record
    }

    /// Makes every subsequent query fail, mimicking a lost database.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable(
                "in-memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl FeedbackStore for MemoryFeedbackStore {
    async fn count_total(&self) -> Result<i64, StoreError> {
        self.check_available()?;
        Ok(self.records.read().await.len() as i64)
    }

    async fn count_by_type(&self, feedback_type: &str) -> Result<i64, StoreError> {
        self.check_available()?;
        let count = self
            .records
            .read()
            .await
            .iter()
            .filter(|record| record.feedback_type == feedback_type)
            .count();
        Ok(count as i64)
    }

    async fn find_by_created_at_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<FeedbackRecord>, StoreError> {
        self.check_available()?;
        if start > end {
            return Ok(Vec::new());
        }

        let mut matches: Vec<FeedbackRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|record| record.created_at >= start && record.created_at <= end)
            .cloned()
            .collect();
        matches.sort_by_key(|record| record.created_at);
        Ok(matches)
    }
}
