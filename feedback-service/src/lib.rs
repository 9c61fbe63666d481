pub mod config;
pub mod intake;
pub mod llm;
pub mod models;
pub mod reply;
pub mod sentiment;
pub mod service;
pub mod store;
pub mod tasks;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use config::ServiceConfig;
pub use models::*;
pub use service::{AppState, build_router, create_app};
pub use workflow::{FeedbackSubmission, FeedbackWorkflow, build_feedback_workflow};
