use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Local, NaiveDateTime, NaiveTime};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::models::FeedbackRecord;
use crate::store::{FeedbackStore, StoreError};

pub async fn create_pool(config: &Config) -> anyhow::Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set to a Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")?;

    info!("Connected to Postgres");
    Ok(pool)
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Migrations complete");
    Ok(())
}

/// Inserts a handful of records spread over the last four weeks, relative to
/// today so the chart endpoint has something to show.
pub async fn seed(pool: &PgPool) -> anyhow::Result<u64> {
    let today = Local::now().date_naive();
    let morning = NaiveTime::from_hms_opt(9, 15, 0).context("invalid time")?;

    let rows = vec![
        ("seed-001", "complaint", 0),
        ("seed-002", "complaint", 1),
        ("seed-003", "suggestion", 2),
        ("seed-004", "compliment", 6),
        ("seed-005", "complaint", 9),
        ("seed-006", "compliment", 11),
        ("seed-007", "suggestion", 15),
        ("seed-008", "compliment", 17),
        ("seed-009", "complaint", 22),
        ("seed-010", "suggestion", 24),
    ];

    let mut inserted = 0u64;
    for (source_key, feedback_type, days_ago) in rows {
        let created_at = (today - ChronoDuration::days(days_ago)).and_time(morning);
        inserted += insert_feedback(pool, feedback_type, created_at, source_key).await?;
    }

    Ok(inserted)
}

pub async fn import_csv(pool: &PgPool, csv_path: &Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        #[serde(rename = "type")]
        feedback_type: String,
        created_at: NaiveDateTime,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid CSV row {}", line + 1))?;
        let source_key = row
            .source_key
            .filter(|key| !key.trim().is_empty())
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        if insert_feedback(pool, &row.feedback_type, row.created_at, &source_key).await? > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

async fn insert_feedback(
    pool: &PgPool,
    feedback_type: &str,
    created_at: NaiveDateTime,
    source_key: &str,
) -> anyhow::Result<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO feedback_reporting.feedbacks (id, "type", created_at, source_key)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(feedback_type)
    .bind(created_at)
    .bind(source_key)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

#[derive(Clone)]
pub struct PgFeedbackStore {
    pool: PgPool,
}

impl PgFeedbackStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackStore for PgFeedbackStore {
    async fn count_total(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM feedback_reporting.feedbacks")
            .fetch_one(&self.pool)
            .await?;
        debug!(count, "counted all feedback");
        Ok(count)
    }

    async fn count_by_type(&self, feedback_type: &str) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM feedback_reporting.feedbacks WHERE "type" = $1"#,
        )
        .bind(feedback_type)
        .fetch_one(&self.pool)
        .await?;
        debug!(feedback_type, count, "counted feedback by type");
        Ok(count)
    }

    async fn find_by_created_at_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<FeedbackRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, "type", created_at
            FROM feedback_reporting.feedbacks
            WHERE created_at BETWEEN $1 AND $2
            ORDER BY created_at
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(FeedbackRecord {
                id: row.try_get("id")?,
                feedback_type: row.try_get("type")?,
                created_at: row.try_get("created_at")?,
            });
        }

        debug!(%start, %end, found = records.len(), "fetched feedback in range");
        Ok(records)
    }
}
