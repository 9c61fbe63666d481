use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("graph has no start task")]
    NoStartTask,

    #[error("context error: {0}")]
    ContextError(String),

    #[error("execution exceeded {0} steps")]
    StepLimitExceeded(usize),
}

pub type Result<T> = std::result::Result<T, FlowError>;
