//! Local sentiment scoring.
//!
//! [`LexiconClassifier`] is a compact valence-lexicon scorer: each known word
//! carries a valence in roughly `[-4, 4]`, adjusted by nearby negators,
//! intensifiers and a "but" contrast rule, and the sum is squashed into a
//! compound score in `[-1, 1]`.

use crate::models::Sentiment;

/// Compound score at or beyond which a text counts as polar.
pub const POLARITY_THRESHOLD: f64 = 0.05;

const NORMALIZATION_ALPHA: f64 = 15.0;
const NEGATION_SCALAR: f64 = -0.74;
const BOOSTER_INCREMENT: f64 = 0.293;
const NEGATION_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentScore {
    pub sentiment: Sentiment,
    /// Percentage in `[50, 100]`, one decimal.
    pub confidence: f64,
    pub compound: f64,
}

impl SentimentScore {
    pub fn from_compound(compound: f64) -> Self {
        let sentiment = if compound >= POLARITY_THRESHOLD {
            Sentiment::Positive
        } else if compound <= -POLARITY_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        };
        let confidence = ((50.0 + compound.abs() * 50.0) * 10.0).round() / 10.0;
        Self {
            sentiment,
            confidence,
            compound,
        }
    }
}

pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> SentimentScore;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn compound(&self, text: &str) -> f64 {
        let cleaned = clean_text(text);
        let tokens: Vec<&str> = cleaned.split_whitespace().collect();
        let but_at = tokens.iter().position(|t| *t == "but");

        let mut sum = 0.0;
        for (i, token) in tokens.iter().enumerate() {
            let Some(mut weight) = valence(token) else {
                continue;
            };

            for distance in 1..=NEGATION_WINDOW.min(i) {
                let previous = tokens[i - distance];
                if let Some(boost) = booster(previous) {
                    let decay = match distance {
                        1 => 1.0,
                        2 => 0.95,
                        _ => 0.9,
                    };
                    weight += boost * decay * weight.signum();
                }
            }

            if tokens[i.saturating_sub(NEGATION_WINDOW)..i]
                .iter()
                .any(|t| is_negator(t))
            {
                weight *= NEGATION_SCALAR;
            }

            if let Some(but_at) = but_at {
                if i < but_at {
                    weight *= 0.5;
                } else if i > but_at {
                    weight *= 1.5;
                }
            }

            sum += weight;
        }

        normalize(sum)
    }
}

impl SentimentClassifier for LexiconClassifier {
    fn classify(&self, text: &str) -> SentimentScore {
        SentimentScore::from_compound(self.compound(text))
    }
}

/// Lowercases and keeps only ASCII letters and whitespace.
fn clean_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
        .collect()
}

fn normalize(sum: f64) -> f64 {
    (sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
}

// Apostrophes are stripped before lookup, so contractions appear without them.
fn is_negator(token: &str) -> bool {
    matches!(
        token,
        "not"
            | "no"
            | "never"
            | "nothing"
            | "nobody"
            | "none"
            | "neither"
            | "nor"
            | "without"
            | "hardly"
            | "cannot"
            | "dont"
            | "doesnt"
            | "didnt"
            | "isnt"
            | "wasnt"
            | "arent"
            | "werent"
            | "wont"
            | "wouldnt"
            | "couldnt"
            | "shouldnt"
            | "cant"
            | "aint"
            | "havent"
            | "hasnt"
    )
}

fn booster(token: &str) -> Option<f64> {
    match token {
        "very" | "really" | "extremely" | "so" | "absolutely" | "incredibly" | "totally"
        | "super" | "highly" | "truly" | "completely" | "utterly" | "most" | "too" => {
            Some(BOOSTER_INCREMENT)
        }
        "slightly" | "somewhat" | "barely" | "kinda" | "marginally" | "occasionally"
        | "partly" | "little" => Some(-BOOSTER_INCREMENT),
        _ => None,
    }
}

fn valence(token: &str) -> Option<f64> {
    let v = match token {
        // positive
        "amazing" => 2.8,
        "awesome" => 3.1,
        "beautiful" => 2.9,
        "best" => 3.2,
        "better" => 1.9,
        "brilliant" => 2.8,
        "comfortable" => 1.5,
        "cool" => 1.3,
        "delight" | "delighted" | "delightful" => 2.9,
        "easy" => 1.9,
        "enjoy" | "enjoyed" => 2.2,
        "excellent" => 2.7,
        "fantastic" => 2.6,
        "fast" => 1.0,
        "fine" => 0.8,
        "friendly" => 2.2,
        "glad" => 2.0,
        "good" => 1.9,
        "great" => 3.1,
        "happy" => 2.7,
        "helpful" => 1.8,
        "impressed" | "impressive" => 2.4,
        "like" | "liked" => 1.5,
        "love" | "loved" | "lovely" => 3.2,
        "nice" => 1.8,
        "perfect" | "perfectly" => 2.7,
        "pleasant" | "pleased" => 2.1,
        "quick" | "quickly" => 1.0,
        "recommend" | "recommended" => 1.5,
        "reliable" => 1.6,
        "satisfied" => 1.8,
        "smooth" => 1.3,
        "superb" => 3.1,
        "thank" | "thanks" => 1.5,
        "useful" => 1.9,
        "value" | "worth" => 1.2,
        "wonderful" => 2.7,
        "wow" => 2.8,
        // negative
        "angry" => -2.3,
        "annoyed" | "annoying" => -1.9,
        "awful" => -2.0,
        "bad" => -2.5,
        "broke" | "broken" => -1.8,
        "cheap" => -0.5,
        "complaint" => -1.5,
        "damaged" => -1.8,
        "defective" => -1.9,
        "delay" | "delayed" => -1.2,
        "difficult" => -1.5,
        "disappointed" | "disappointing" => -2.2,
        "dislike" => -1.6,
        "expensive" => -1.0,
        "fail" | "failed" | "fails" => -2.3,
        "fake" => -2.1,
        "faulty" => -2.0,
        "frustrated" | "frustrating" => -2.1,
        "hate" | "hated" => -2.7,
        "horrible" => -2.5,
        "issue" | "issues" | "problem" | "problems" => -1.7,
        "late" => -1.0,
        "mediocre" => -1.0,
        "poor" | "poorly" => -2.1,
        "refund" => -0.8,
        "rude" => -2.0,
        "sad" => -2.1,
        "slow" => -1.0,
        "sorry" => -0.3,
        "terrible" => -2.1,
        "unhappy" => -1.8,
        "useless" => -1.8,
        "waste" | "wasted" => -1.8,
        "worse" => -2.1,
        "worst" => -3.1,
        "wrong" => -2.1,
        _ => return None,
    };
    Some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> SentimentScore {
        LexiconClassifier::new().classify(text)
    }

    #[test]
    fn clear_praise_is_positive() {
        let score = classify("This product is great, I love it!");
        assert_eq!(score.sentiment, Sentiment::Positive);
        assert!(score.confidence > 80.0);
    }

    #[test]
    fn complaints_are_negative() {
        let score = classify("Bad service and terrible support");
        assert_eq!(score.sentiment, Sentiment::Negative);
    }

    #[test]
    fn text_without_known_words_is_neutral() {
        let score = classify("The package arrived on Tuesday");
        assert_eq!(score.sentiment, Sentiment::Neutral);
        assert_eq!(score.compound, 0.0);
        assert_eq!(score.confidence, 50.0);
    }

    #[test]
    fn negation_flips_polarity() {
        assert_eq!(classify("not good").sentiment, Sentiment::Negative);
        assert_eq!(classify("It wasn't bad at all").sentiment, Sentiment::Positive);
    }

    #[test]
    fn intensifiers_raise_magnitude() {
        let lexicon = LexiconClassifier::new();
        assert!(lexicon.compound("very good") > lexicon.compound("good"));
        assert!(lexicon.compound("slightly good") < lexicon.compound("good"));
        assert!(lexicon.compound("very bad") < lexicon.compound("bad"));
    }

    #[test]
    fn clause_after_but_dominates() {
        let score = classify("The design is nice but the battery is terrible");
        assert_eq!(score.sentiment, Sentiment::Negative);
    }

    #[test]
    fn confidence_maps_compound_to_percentage() {
        assert_eq!(SentimentScore::from_compound(1.0).confidence, 100.0);
        assert_eq!(SentimentScore::from_compound(-0.5).confidence, 75.0);
        assert_eq!(SentimentScore::from_compound(0.125).confidence, 56.3);
        assert_eq!(
            SentimentScore::from_compound(0.05).sentiment,
            Sentiment::Positive
        );
        assert_eq!(
            SentimentScore::from_compound(-0.049).sentiment,
            Sentiment::Neutral
        );
    }
}
