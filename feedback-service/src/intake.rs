use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::models::PriceInput;

/// Minimum feedback length, in characters, after trimming.
pub const MIN_FEEDBACK_CHARS: usize = 3;

static NON_PRICE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9.]").expect("valid price regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("Feedback is too short.")]
    TooShort,
}

/// Accepts the submitted text when it has at least [`MIN_FEEDBACK_CHARS`]
/// characters once surrounding whitespace is removed.
pub fn validate_feedback(feedback: Option<&str>) -> Result<&str, IntakeError> {
    let text = feedback.map(str::trim).unwrap_or_default();
    if text.chars().count() < MIN_FEEDBACK_CHARS {
        return Err(IntakeError::TooShort);
    }
    Ok(text)
}

/// Normalises a submitted price. Numbers and text go through the same
/// cleaning: currency symbols, thousands separators and any other stray
/// characters (signs included) are dropped. A zero number counts as no price;
/// anything unparsable becomes `None`.
pub fn clean_price(price: &PriceInput) -> Option<f64> {
    match price {
        PriceInput::Number(n) if *n == 0.0 => None,
        PriceInput::Number(n) => clean_price_text(&n.to_string()),
        PriceInput::Text(text) => clean_price_text(text),
    }
}

fn clean_price_text(text: &str) -> Option<f64> {
    let stripped = text.replace(['₹', ','], "");
    let cleaned = NON_PRICE_CHARS.replace_all(&stripped, "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}
