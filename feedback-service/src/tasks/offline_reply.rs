use async_trait::async_trait;
use feedback_flow::{Context, NextAction, Result, Task, TaskResult};
use tracing::info;

use super::types::session_keys;
use crate::models::AnalysisResult;
use crate::reply::fallback_message;

/// Answers with the canned reply for the sentiment and marks the analysis offline.
pub struct OfflineReplyTask;

#[async_trait]
impl Task for OfflineReplyTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        let mut analysis: AnalysisResult = context.require(session_keys::ANALYSIS)?;
        let reason: Option<String> = context.get(session_keys::FALLBACK_REASON);
        info!(
            sentiment = %analysis.sentiment,
            reason = reason.as_deref().unwrap_or("no generator configured"),
            "using offline reply"
        );

        analysis.customer_response = Some(fallback_message(analysis.sentiment).to_string());
        analysis.offline = Some(true);
        context.set(session_keys::ANALYSIS, analysis)?;

        Ok(TaskResult::next(NextAction::Continue))
    }
}
