//! Counterpart response model.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::analysis::ImpactLevel;

/// Emotional tone of a counterpart reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResponseEmotion {
    Positive,
    Neutral,
    Skeptical,
    Concerned,
    Encouraging,
}

impl Default for ResponseEmotion {
    fn default() -> Self {
        ResponseEmotion::Neutral
    }
}

/// One counterpart reply, produced per turn and consumed by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterpartResponse {
    /// The reply content
    pub content: String,
    /// Emotional tone of the reply
    pub emotion: ResponseEmotion,
    /// Confidence in the reply, 1-10
    pub confidence_level: u8,
    /// Key points surfaced to the caller for UI/logging
    #[serde(default)]
    pub key_points: Vec<String>,
    /// Business impact of the topic under discussion
    pub business_impact: ImpactLevel,
    /// Suggested follow-up question or topic
    #[serde(default)]
    pub suggested_follow_up: Option<String>,
}

impl CounterpartResponse {
    /// Clamps the confidence level to its declared 1-10 range.
    pub fn with_clamped_confidence(mut self) -> Self {
        self.confidence_level = self.confidence_level.clamp(1, 10);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_clamped_into_range() {
        let response = CounterpartResponse {
            content: "ok".to_string(),
            emotion: ResponseEmotion::Neutral,
            confidence_level: 14,
            key_points: vec![],
            business_impact: ImpactLevel::Medium,
            suggested_follow_up: None,
        }
        .with_clamped_confidence();

        assert_eq!(response.confidence_level, 10);
    }
}
