/// Context keys shared by the feedback pipeline tasks
pub mod session_keys {
    /// Validated feedback text (`String`)
    pub const FEEDBACK: &str = "feedback";
    /// Cleaned price (`Option<f64>`)
    pub const PRICE: &str = "price";
    /// Analysis built up by the tasks (`AnalysisResult`)
    pub const ANALYSIS: &str = "analysis";
    /// Whether a reply generator is configured (`bool`)
    pub const GENERATOR_AVAILABLE: &str = "generator_available";
    /// Why the offline reply was used, when generation was attempted (`String`)
    pub const FALLBACK_REASON: &str = "fallback_reason";
    /// Id of the stored record, absent when persistence failed (`Uuid`)
    pub const RECORD_ID: &str = "record_id";
}
