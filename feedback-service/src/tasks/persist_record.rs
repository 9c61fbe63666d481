use async_trait::async_trait;
use feedback_flow::{Context, NextAction, Result, Task, TaskResult};
use std::sync::Arc;
use tracing::{error, info};

use super::types::session_keys;
use crate::models::{AnalysisResult, FeedbackRecord};
use crate::store::FeedbackStore;

/// Best-effort write of the finished analysis. A store failure is logged and
/// the pipeline still ends normally.
pub struct PersistRecordTask {
    store: Arc<dyn FeedbackStore>,
}

impl PersistRecordTask {
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Task for PersistRecordTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        let feedback: String = context.require(session_keys::FEEDBACK)?;
        let price = context.get::<Option<f64>>(session_keys::PRICE).flatten();
        let analysis: AnalysisResult = context.require(session_keys::ANALYSIS)?;

        let record = FeedbackRecord::new(feedback, price, analysis);
        match self.store.insert(&record).await {
            Ok(()) => {
                info!(record_id = %record.id, "feedback record stored");
                context.set(session_keys::RECORD_ID, record.id)?;
            }
            Err(e) => {
                error!(record_id = %record.id, error = %e, "failed to store feedback record");
            }
        }

        Ok(TaskResult::next(NextAction::End))
    }
}
