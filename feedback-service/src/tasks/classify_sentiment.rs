use async_trait::async_trait;
use feedback_flow::{Context, NextAction, Result, Task, TaskResult};
use std::sync::Arc;
use tracing::info;

use super::types::session_keys;
use crate::models::AnalysisResult;
use crate::sentiment::SentimentClassifier;

/// Scores the feedback locally and seeds the analysis.
pub struct ClassifySentimentTask {
    classifier: Arc<dyn SentimentClassifier>,
}

impl ClassifySentimentTask {
    pub fn new(classifier: Arc<dyn SentimentClassifier>) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl Task for ClassifySentimentTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        let feedback: String = context.require(session_keys::FEEDBACK)?;

        let score = self.classifier.classify(&feedback);
        info!(
            sentiment = %score.sentiment,
            confidence = score.confidence,
            compound = score.compound,
            "feedback classified"
        );

        context.set(
            session_keys::ANALYSIS,
            AnalysisResult::new(score.sentiment, score.confidence),
        )?;

        Ok(TaskResult::next(NextAction::Continue))
    }
}
