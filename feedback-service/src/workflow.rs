use feedback_flow::{Context, Graph, GraphBuilder, Result, Task};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::llm::ReplyGenerator;
use crate::models::AnalysisResult;
use crate::sentiment::SentimentClassifier;
use crate::store::FeedbackStore;
use crate::tasks::*;

pub const WORKFLOW_ID: &str = "feedback_analysis";

/// Validated input for one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackSubmission {
    pub feedback: String,
    pub price: Option<f64>,
}

/// classify → (generate | offline) → persist
///
/// Whether `classify` hands over to `generate` is decided per run by the
/// `GENERATOR_AVAILABLE` context flag.
pub fn build_feedback_workflow(
    classifier: Arc<dyn SentimentClassifier>,
    generator: Option<Arc<dyn ReplyGenerator>>,
    store: Arc<dyn FeedbackStore>,
    timeout: Duration,
) -> Graph {
    let classify_task: Arc<dyn Task> = Arc::new(ClassifySentimentTask::new(classifier));
    let generate_task: Arc<dyn Task> = Arc::new(GenerateReplyTask::new(generator, timeout));
    let offline_task: Arc<dyn Task> = Arc::new(OfflineReplyTask);
    let persist_task: Arc<dyn Task> = Arc::new(PersistRecordTask::new(store));

    let classify_id = classify_task.id().to_string();
    let generate_id = generate_task.id().to_string();
    let offline_id = offline_task.id().to_string();
    let persist_id = persist_task.id().to_string();

    GraphBuilder::new(WORKFLOW_ID)
        .add_task(classify_task)
        .add_task(generate_task)
        .add_task(offline_task)
        .add_task(persist_task)
        .add_conditional_edge(classify_id.clone(), generate_id.clone(), |ctx| {
            ctx.get::<bool>(session_keys::GENERATOR_AVAILABLE)
                .unwrap_or(false)
        })
        .add_edge(classify_id, offline_id.clone())
        .add_edge(generate_id, persist_id.clone())
        .add_edge(offline_id, persist_id)
        .build()
}

/// The analysis pipeline shared by all requests.
pub struct FeedbackWorkflow {
    graph: Graph,
    generator_available: bool,
}

impl FeedbackWorkflow {
    pub fn new(
        classifier: Arc<dyn SentimentClassifier>,
        generator: Option<Arc<dyn ReplyGenerator>>,
        store: Arc<dyn FeedbackStore>,
        timeout: Duration,
    ) -> Self {
        let generator_available = generator.is_some();
        Self {
            graph: build_feedback_workflow(classifier, generator, store, timeout),
            generator_available,
        }
    }

    pub fn generator_available(&self) -> bool {
        self.generator_available
    }

    pub async fn analyze(&self, submission: FeedbackSubmission) -> Result<AnalysisResult> {
        let context = Context::new();
        context.set(session_keys::FEEDBACK, submission.feedback)?;
        context.set(session_keys::PRICE, submission.price)?;
        context.set(session_keys::GENERATOR_AVAILABLE, self.generator_available)?;

        let execution = self.graph.execute(context.clone()).await?;
        info!(steps = ?execution.visited, "feedback analysis finished");

        context.require(session_keys::ANALYSIS)
    }
}
