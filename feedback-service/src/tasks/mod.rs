// Feedback analysis pipeline tasks
pub mod classify_sentiment;
pub mod generate_reply;
pub mod offline_reply;
pub mod persist_record;

// Shared modules
pub mod types;

// Re-export task implementations
pub use classify_sentiment::ClassifySentimentTask;
pub use generate_reply::GenerateReplyTask;
pub use offline_reply::OfflineReplyTask;
pub use persist_record::PersistRecordTask;

// Re-export session keys
pub use types::session_keys;
