use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::{PgPool, postgres::PgPoolOptions, types::Json};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::{FeedbackRecord, Sentiment, SentimentCount, TrendPoint};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Document store for analysed feedback.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn insert(&self, record: &FeedbackRecord) -> StoreResult<()>;

    /// Returns `false` when no record had that id.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    /// Totals per sentiment, always in the order Positive, Negative, Neutral.
    async fn sentiment_counts(&self) -> StoreResult<Vec<SentimentCount>>;

    /// Per-day totals over UTC dates, oldest first.
    async fn daily_trends(&self) -> StoreResult<Vec<TrendPoint>>;
}

fn counts_in_order(lookup: impl Fn(Sentiment) -> u64) -> Vec<SentimentCount> {
    Sentiment::ALL
        .into_iter()
        .map(|name| SentimentCount {
            name,
            count: lookup(name),
        })
        .collect()
}

/// In-memory implementation of FeedbackStore
#[derive(Default)]
pub struct InMemoryFeedbackStore {
    records: Arc<DashMap<Uuid, FeedbackRecord>>,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<FeedbackRecord> {
        self.records.get(&id).map(|entry| entry.clone())
    }
}

#[async_trait]
impl FeedbackStore for InMemoryFeedbackStore {
    async fn insert(&self, record: &FeedbackRecord) -> StoreResult<()> {
        self.records.insert(record.id, record.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.records.remove(&id).is_some())
    }

    async fn sentiment_counts(&self) -> StoreResult<Vec<SentimentCount>> {
        let mut totals: HashMap<Sentiment, u64> = HashMap::new();
        for entry in self.records.iter() {
            *totals.entry(entry.analysis.sentiment).or_default() += 1;
        }
        Ok(counts_in_order(|s| totals.get(&s).copied().unwrap_or_default()))
    }

    async fn daily_trends(&self) -> StoreResult<Vec<TrendPoint>> {
        let mut days: BTreeMap<String, TrendPoint> = BTreeMap::new();
        for entry in self.records.iter() {
            let date = entry.created_at.format("%Y-%m-%d").to_string();
            days.entry(date.clone())
                .or_insert_with(|| TrendPoint::empty(date))
                .bump(entry.analysis.sentiment);
        }
        Ok(days.into_values().collect())
    }
}

/// PostgreSQL implementation of FeedbackStore; each record is one JSONB document.
pub struct PostgresFeedbackStore {
    pool: PgPool,
}

impl PostgresFeedbackStore {
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS feedback_records (
                id UUID PRIMARY KEY,
                created_at TIMESTAMPTZ NOT NULL,
                document JSONB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS feedback_records_created_at_idx ON feedback_records (created_at)",
        )
        .execute(&self.pool)
        .await?;
        info!("feedback_records table ready");
        Ok(())
    }
}

#[async_trait]
impl FeedbackStore for PostgresFeedbackStore {
    async fn insert(&self, record: &FeedbackRecord) -> StoreResult<()> {
        sqlx::query("INSERT INTO feedback_records (id, created_at, document) VALUES ($1, $2, $3)")
            .bind(record.id)
            .bind(record.created_at)
            .bind(Json(record))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM feedback_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn sentiment_counts(&self) -> StoreResult<Vec<SentimentCount>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT document->>'sentiment', COUNT(*) FROM feedback_records GROUP BY 1",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts_in_order(|s| {
            rows.iter()
                .find(|(name, _)| name == s.as_str())
                .map(|(_, count)| *count as u64)
                .unwrap_or_default()
        }))
    }

    async fn daily_trends(&self) -> StoreResult<Vec<TrendPoint>> {
        let rows = sqlx::query_as::<_, (String, i64, i64, i64)>(
            r#"
            SELECT
                to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD') AS day,
                COUNT(*) FILTER (WHERE document->>'sentiment' = 'Positive'),
                COUNT(*) FILTER (WHERE document->>'sentiment' = 'Negative'),
                COUNT(*) FILTER (WHERE document->>'sentiment' = 'Neutral')
            FROM feedback_records
            GROUP BY day
            ORDER BY day
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(date, positive, negative, neutral)| TrendPoint {
                date,
                positive: positive as u64,
                negative: negative as u64,
                neutral: neutral as u64,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalysisResult;
    use chrono::{TimeZone, Utc};

    fn record(sentiment: Sentiment, day: u32) -> FeedbackRecord {
        let mut record = FeedbackRecord::new(
            "some feedback".to_string(),
            None,
            AnalysisResult::new(sentiment, 75.0),
        );
        record.created_at = Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap();
        record
    }

    #[tokio::test]
    async fn counts_cover_every_sentiment() {
        let store = InMemoryFeedbackStore::new();
        store.insert(&record(Sentiment::Negative, 1)).await.unwrap();
        store.insert(&record(Sentiment::Negative, 2)).await.unwrap();
        store.insert(&record(Sentiment::Positive, 2)).await.unwrap();

        let counts = store.sentiment_counts().await.unwrap();
        assert_eq!(
            counts,
            vec![
                SentimentCount { name: Sentiment::Positive, count: 1 },
                SentimentCount { name: Sentiment::Negative, count: 2 },
                SentimentCount { name: Sentiment::Neutral, count: 0 },
            ]
        );
    }

    #[tokio::test]
    async fn trends_group_by_day_in_order() {
        let store = InMemoryFeedbackStore::new();
        store.insert(&record(Sentiment::Neutral, 3)).await.unwrap();
        store.insert(&record(Sentiment::Positive, 1)).await.unwrap();
        store.insert(&record(Sentiment::Positive, 1)).await.unwrap();
        store.insert(&record(Sentiment::Negative, 3)).await.unwrap();

        let trends = store.daily_trends().await.unwrap();
        assert_eq!(
            trends,
            vec![
                TrendPoint {
                    date: "2024-03-01".to_string(),
                    positive: 2,
                    negative: 0,
                    neutral: 0,
                },
                TrendPoint {
                    date: "2024-03-03".to_string(),
                    positive: 0,
                    negative: 1,
                    neutral: 1,
                },
            ]
        );
    }

    #[tokio::test]
    async fn delete_reports_whether_a_record_existed() {
        let store = InMemoryFeedbackStore::new();
        let record = record(Sentiment::Positive, 1);
        store.insert(&record).await.unwrap();

        assert!(store.delete(record.id).await.unwrap());
        assert!(!store.delete(record.id).await.unwrap());
        assert!(store.is_empty());
    }
}
