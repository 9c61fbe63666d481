use serde::Deserialize;
use thiserror::Error;

use crate::models::Sentiment;

pub const POSITIVE_FALLBACK: &str = "Thank you for your wonderful feedback! We're delighted to hear you had a great experience.";
pub const NEGATIVE_FALLBACK: &str = "We're sorry to hear about your experience. Your feedback has been shared with our team and we'll work to make things right.";
pub const NEUTRAL_FALLBACK: &str = "Thank you for your feedback. We appreciate you taking the time to share your thoughts with us.";

/// Canned reply used whenever the generated one is unavailable.
pub fn fallback_message(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => POSITIVE_FALLBACK,
        Sentiment::Negative => NEGATIVE_FALLBACK,
        Sentiment::Neutral => NEUTRAL_FALLBACK,
    }
}

/// Fields the model is asked to produce.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedReply {
    pub customer_response: String,
    #[serde(default)]
    pub topics: Option<Vec<String>>,
    #[serde(default)]
    pub recommendations: Option<Vec<String>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplyError {
    #[error("generated text contains no JSON object")]
    NoJson,
    #[error("generated JSON is malformed: {0}")]
    Malformed(String),
    #[error("generated reply has an empty customerResponse")]
    EmptyResponse,
}

pub const REPLY_PREAMBLE: &str = "You are a customer experience assistant for an online store. \
You read customer feedback and write short, warm, professional replies. \
You always answer with a single JSON object and nothing else.";

pub fn build_reply_prompt(feedback: &str, sentiment: Sentiment) -> String {
    format!(
        r#"A customer left the following feedback. Our sentiment analysis rated it as {sentiment}.

Feedback:
"""
{feedback}
"""

Respond **only** with JSON of the form
{{ "customerResponse": "...", "topics": ["..."], "recommendations": ["..."] }}

- customerResponse: a reply of at most three sentences addressed to the customer.
- topics: up to five short topics the feedback is about.
- recommendations: up to three concrete actions for our team."#
    )
}

/// Pulls the reply object out of model output, which may be bare JSON, a
/// fenced code block, or prose wrapped around a single object.
pub fn parse_generated_reply(text: &str) -> Result<GeneratedReply, ReplyError> {
    let json = extract_json(text).ok_or(ReplyError::NoJson)?;
    let reply: GeneratedReply =
        serde_json::from_str(json).map_err(|e| ReplyError::Malformed(e.to_string()))?;
    if reply.customer_response.trim().is_empty() {
        return Err(ReplyError::EmptyResponse);
    }
    Ok(reply)
}

fn extract_json(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed);

    let start = unfenced.find('{')?;
    let end = unfenced.rfind('}')?;
    (start < end).then(|| &unfenced[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json() {
        let reply = parse_generated_reply(
            r#"{"customerResponse":"Thanks!","topics":["delivery"],"recommendations":["Keep it up"]}"#,
        )
        .unwrap();
        assert_eq!(reply.customer_response, "Thanks!");
        assert_eq!(reply.topics, Some(vec!["delivery".to_string()]));
        assert_eq!(reply.recommendations, Some(vec!["Keep it up".to_string()]));
    }

    #[test]
    fn parses_fenced_and_embedded_json() {
        let fenced = "```json\n{\"customerResponse\": \"Sorry about that\"}\n```";
        assert_eq!(
            parse_generated_reply(fenced).unwrap().customer_response,
            "Sorry about that"
        );

        let embedded = "Sure! Here is the reply: {\"customerResponse\": \"Hi\", \"topics\": []} Hope it helps.";
        let reply = parse_generated_reply(embedded).unwrap();
        assert_eq!(reply.customer_response, "Hi");
        assert_eq!(reply.topics, Some(vec![]));
        assert_eq!(reply.recommendations, None);
    }

    #[test]
    fn rejects_unusable_output() {
        assert_eq!(
            parse_generated_reply("I cannot help with that."),
            Err(ReplyError::NoJson)
        );
        assert!(matches!(
            parse_generated_reply(r#"{"topics": ["price"]}"#),
            Err(ReplyError::Malformed(_))
        ));
        assert_eq!(
            parse_generated_reply(r#"{"customerResponse": "  "}"#),
            Err(ReplyError::EmptyResponse)
        );
    }

    #[test]
    fn prompt_mentions_feedback_and_sentiment() {
        let prompt = build_reply_prompt("The box was crushed", Sentiment::Negative);
        assert!(prompt.contains("The box was crushed"));
        assert!(prompt.contains("Negative"));
        assert!(prompt.contains("\"customerResponse\""));
    }

    #[test]
    fn every_sentiment_has_a_fallback() {
        for sentiment in Sentiment::ALL {
            assert!(!fallback_message(sentiment).is_empty());
        }
        assert_ne!(
            fallback_message(Sentiment::Positive),
            fallback_message(Sentiment::Negative)
        );
    }
}
