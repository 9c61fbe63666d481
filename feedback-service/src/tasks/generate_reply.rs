use async_trait::async_trait;
use feedback_flow::{Context, NextAction, Result, Task, TaskResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::offline_reply::OfflineReplyTask;
use super::types::session_keys;
use crate::llm::ReplyGenerator;
use crate::models::AnalysisResult;
use crate::reply::{build_reply_prompt, parse_generated_reply};

/// Asks the external generator for a reply, topics and recommendations.
///
/// The call is bounded by `timeout`; when it expires the pending request is
/// dropped. Any failure, including running without a configured generator,
/// hands over to [`OfflineReplyTask`] instead of failing the pipeline.
pub struct GenerateReplyTask {
    generator: Option<Arc<dyn ReplyGenerator>>,
    timeout: Duration,
}

impl GenerateReplyTask {
    pub fn new(generator: Option<Arc<dyn ReplyGenerator>>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    fn fall_back(context: &Context, reason: String) -> Result<TaskResult> {
        warn!(reason = %reason, "reply generation failed, falling back");
        context.set(session_keys::FALLBACK_REASON, reason)?;
        Ok(TaskResult::next(NextAction::GoTo(
            std::any::type_name::<OfflineReplyTask>().to_string(),
        )))
    }
}

#[async_trait]
impl Task for GenerateReplyTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        let Some(generator) = self.generator.as_ref() else {
            return Self::fall_back(&context, "no reply generator configured".to_string());
        };

        let feedback: String = context.require(session_keys::FEEDBACK)?;
        let mut analysis: AnalysisResult = context.require(session_keys::ANALYSIS)?;

        let prompt = build_reply_prompt(&feedback, analysis.sentiment);
        let raw = match tokio::time::timeout(self.timeout, generator.generate(&prompt)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => return Self::fall_back(&context, format!("generator error: {e}")),
            Err(_) => {
                return Self::fall_back(
                    &context,
                    format!("no reply within {}ms", self.timeout.as_millis()),
                );
            }
        };

        let reply = match parse_generated_reply(&raw) {
            Ok(reply) => reply,
            Err(e) => return Self::fall_back(&context, e.to_string()),
        };

        info!(
            topics = reply.topics.as_ref().map_or(0, Vec::len),
            recommendations = reply.recommendations.as_ref().map_or(0, Vec::len),
            "generated reply received"
        );

        analysis.customer_response = Some(reply.customer_response);
        analysis.topics = reply.topics;
        analysis.recommendations = reply.recommendations;
        context.set(session_keys::ANALYSIS, analysis)?;

        Ok(TaskResult::next(NextAction::Continue))
    }
}
