//! Keyword-based sentiment tagging and priority derivation.
//!
//! The classifier counts case-insensitive substring occurrences of two fixed
//! word lists over the transcript and summary of a finished call.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::CallLifecycle;
use crate::domain::foundation::ValidationError;

const POSITIVE_WORDS: &[&str] = &[
    "thank",
    "great",
    "excellent",
    "perfect",
    "appreciate",
    "helpful",
    "happy",
    "wonderful",
    "awesome",
    "love",
];

const NEGATIVE_WORDS: &[&str] = &[
    "frustrat",
    "angry",
    "terrible",
    "awful",
    "upset",
    "disappoint",
    "complaint",
    "unacceptable",
    "worst",
    "cancel",
];

/// Overall tone of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl FromStr for Sentiment {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            other => Err(ValidationError::invalid_format(
                "sentiment",
                format!("unknown sentiment '{}'", other),
            )),
        }
    }
}

/// Follow-up priority of a call for the support team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Derives priority from the final lifecycle state and the sentiment.
    pub fn derive(lifecycle: CallLifecycle, sentiment: Sentiment) -> Priority {
        match (lifecycle, sentiment) {
            (CallLifecycle::Escalated, Sentiment::Negative) => Priority::Critical,
            (CallLifecycle::Escalated, _) | (_, Sentiment::Negative) => Priority::High,
            (CallLifecycle::Failed, _) => Priority::Medium,
            _ => Priority::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            other => Err(ValidationError::invalid_format(
                "priority",
                format!("unknown priority '{}'", other),
            )),
        }
    }
}

/// Classifies the tone of a call from its transcript and summary.
///
/// Ties, including no matches at all, are `Neutral`.
pub fn classify_sentiment(transcript: Option<&str>, summary: Option<&str>) -> Sentiment {
    let text = format!(
        "{} {}",
        transcript.unwrap_or_default(),
        summary.unwrap_or_default()
    )
    .to_lowercase();

    let positive = count_matches(&text, POSITIVE_WORDS);
    let negative = count_matches(&text, NEGATIVE_WORDS);

    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

fn count_matches(text: &str, words: &[&str]) -> usize {
    words.iter().map(|word| text.matches(word).count()).sum()
}
