//! Test doubles for the generator, classifier and store seams.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

use crate::llm::ReplyGenerator;
use crate::models::{FeedbackRecord, Sentiment, SentimentCount, TrendPoint};
use crate::sentiment::{SentimentClassifier, SentimentScore};
use crate::store::{FeedbackStore, StoreError, StoreResult};

/// Returns the same text for every prompt and counts calls.
pub struct StubGenerator {
    output: String,
    calls: AtomicUsize,
}

impl StubGenerator {
    pub fn new(output: &str) -> Self {
        Self {
            output: output.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReplyGenerator for StubGenerator {
    async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}

/// Sleeps before answering, to trip the generation deadline.
pub struct SlowGenerator {
    delay: Duration,
}

impl SlowGenerator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ReplyGenerator for SlowGenerator {
    async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        tokio::time::sleep(self.delay).await;
        Ok(r#"{"customerResponse":"too late"}"#.to_string())
    }
}

pub struct FailingGenerator;

#[async_trait]
impl ReplyGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        anyhow::bail!("upstream returned 503")
    }
}

/// Always answers with one sentiment.
pub struct FixedClassifier(pub Sentiment);

impl SentimentClassifier for FixedClassifier {
    fn classify(&self, _text: &str) -> SentimentScore {
        let compound = match self.0 {
            Sentiment::Positive => 0.8,
            Sentiment::Negative => -0.8,
            Sentiment::Neutral => 0.0,
        };
        SentimentScore::from_compound(compound)
    }
}

/// Every operation fails.
pub struct FailingStore;

#[async_trait]
impl FeedbackStore for FailingStore {
    async fn insert(&self, _record: &FeedbackRecord) -> StoreResult<()> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn delete(&self, _id: Uuid) -> StoreResult<bool> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn sentiment_counts(&self) -> StoreResult<Vec<SentimentCount>> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn daily_trends(&self) -> StoreResult<Vec<TrendPoint>> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}
