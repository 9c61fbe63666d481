use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller of `POST /api/analyze-feedback` gets back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub sentiment: Sentiment,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offline: Option<bool>,
}

impl AnalysisResult {
    pub fn new(sentiment: Sentiment, confidence: f64) -> Self {
        Self {
            sentiment,
            confidence,
            topics: None,
            recommendations: None,
            customer_response: None,
            offline: None,
        }
    }
}

/// A stored feedback document. Created once per request and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub id: Uuid,
    pub feedback: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    pub created_at: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn new(feedback: String, price: Option<f64>, analysis: AnalysisResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            feedback,
            price,
            analysis,
            created_at: Utc::now(),
        }
    }
}

/// Price as submitted: either a JSON number or free text such as `"₹1,299"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeFeedbackRequest {
    pub feedback: Option<String>,
    pub price: Option<PriceInput>,
}

/// One point of the dashboard trend chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
}

impl TrendPoint {
    pub fn empty(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            positive: 0,
            negative: 0,
            neutral: 0,
        }
    }

    pub fn bump(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }
}

/// One bar of the dashboard sentiment overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCount {
    pub name: Sentiment,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn analysis_omits_absent_fields() {
        let analysis = AnalysisResult::new(Sentiment::Neutral, 50.0);
        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value, json!({ "sentiment": "Neutral", "confidence": 50.0 }));
    }

    #[test]
    fn analysis_uses_camel_case() {
        let mut analysis = AnalysisResult::new(Sentiment::Negative, 80.5);
        analysis.customer_response = Some("Sorry".to_string());
        analysis.offline = Some(true);

        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["customerResponse"], "Sorry");
        assert_eq!(value["offline"], true);
    }

    #[test]
    fn record_flattens_analysis() {
        let record = FeedbackRecord::new(
            "Great phone".to_string(),
            Some(1299.0),
            AnalysisResult::new(Sentiment::Positive, 90.0),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["sentiment"], "Positive");
        assert_eq!(value["price"], 1299.0);
        assert!(value["createdAt"].is_string());

        let back: FeedbackRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn price_accepts_number_or_text() {
        let request: AnalyzeFeedbackRequest =
            serde_json::from_value(json!({ "feedback": "ok", "price": 12.5 })).unwrap();
        assert_eq!(request.price, Some(PriceInput::Number(12.5)));

        let request: AnalyzeFeedbackRequest =
            serde_json::from_value(json!({ "feedback": "ok", "price": "₹1,299" })).unwrap();
        assert_eq!(request.price, Some(PriceInput::Text("₹1,299".to_string())));
    }
}
