//! Analysis data types shared by both analyzer strategies.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Maximum number of user objectives tracked per analysis.
///
/// Objective lists are truncated to this cap before analysis (first N as
/// given by the caller) to bound response sizes; callers may depend on it.
pub const MAX_TRACKED_OBJECTIVES: usize = 3;

/// Maximum number of end conditions evaluated per analysis.
pub const MAX_TRACKED_END_CONDITIONS: usize = 2;

/// Completion percentage at which an objective counts as fully achieved.
pub const OBJECTIVE_COMPLETION_THRESHOLD: u8 = 90;

/// Emotion detected in the user's utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UserEmotion {
    Positive,
    Negative,
    Neutral,
    Frustrated,
    Confident,
    Hesitant,
    Aggressive,
    Collaborative,
}

impl Default for UserEmotion {
    fn default() -> Self {
        UserEmotion::Neutral
    }
}

/// Overall impact / strategic-importance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for ImpactLevel {
    fn default() -> Self {
        ImpactLevel::Medium
    }
}

impl ImpactLevel {
    /// Position in the fixed severity order (higher is more severe).
    pub fn severity_rank(self) -> u8 {
        match self {
            ImpactLevel::Low => 1,
            ImpactLevel::Medium => 2,
            ImpactLevel::High => 3,
            ImpactLevel::Critical => 4,
        }
    }

    /// The more severe of two levels.
    pub fn max_by_severity(self, other: Self) -> Self {
        if other.severity_rank() > self.severity_rank() {
            other
        } else {
            self
        }
    }
}

/// Financial impact, which unlike [`ImpactLevel`] admits "none".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinancialImpact {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Default for FinancialImpact {
    fn default() -> Self {
        FinancialImpact::None
    }
}

impl FinancialImpact {
    /// Position in the fixed severity order (higher is more severe).
    pub fn severity_rank(self) -> u8 {
        match self {
            FinancialImpact::None => 0,
            FinancialImpact::Low => 1,
            FinancialImpact::Medium => 2,
            FinancialImpact::High => 3,
            FinancialImpact::Critical => 4,
        }
    }
}

/// Urgency communicated by the user's utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Immediate,
}

impl Default for UrgencyLevel {
    fn default() -> Self {
        UrgencyLevel::Medium
    }
}

impl UrgencyLevel {
    /// Position in the fixed severity order (higher is more severe).
    pub fn severity_rank(self) -> u8 {
        match self {
            UrgencyLevel::Low => 1,
            UrgencyLevel::Medium => 2,
            UrgencyLevel::High => 3,
            UrgencyLevel::Immediate => 4,
        }
    }

    /// The more severe of two levels.
    pub fn max_by_severity(self, other: Self) -> Self {
        if other.severity_rank() > self.severity_rank() {
            other
        } else {
            self
        }
    }
}

/// Emotion detection result for one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EmotionAssessment {
    /// The dominant emotion detected
    pub primary: UserEmotion,
    /// Confidence in the detection, 0.0 to 1.0
    pub confidence: f64,
    /// Words or phrases that indicate the emotion
    #[serde(default)]
    pub indicators: Vec<String>,
}

/// Key business points extracted from one utterance.
///
/// Each list is deduplicated during normalization; order is not significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct KeyPointExtraction {
    #[serde(default)]
    pub main_topics: Vec<String>,
    /// Financial figures, budgets, funding rounds, monetary values
    #[serde(default)]
    pub financial_mentions: Vec<String>,
    #[serde(default)]
    pub strategic_concepts: Vec<String>,
    /// People, roles, or organizations mentioned
    #[serde(default)]
    pub stakeholders: Vec<String>,
    /// Actions or commitments proposed by the user
    #[serde(default)]
    pub action_items: Vec<String>,
    /// Concerns, objections, or risks raised
    #[serde(default)]
    pub concerns_raised: Vec<String>,
}

/// Business impact assessment for one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BusinessImpact {
    pub impact_level: ImpactLevel,
    pub financial_impact: FinancialImpact,
    pub strategic_importance: ImpactLevel,
    pub urgency_level: UrgencyLevel,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub opportunities: Vec<String>,
}

/// Estimated progress toward one tracked user objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveProgress {
    /// The objective being tracked, verbatim
    pub objective_text: String,
    /// Estimated completion, 0-100
    pub completion_percentage: u8,
    /// True iff `completion_percentage` reached the completion threshold
    pub is_fully_completed: bool,
    /// Evidence from the conversation supporting the estimate
    #[serde(default)]
    pub evidence: Vec<String>,
    /// What still needs to happen for completion
    #[serde(default)]
    pub remaining_requirements: Vec<String>,
}

/// Evaluation of one session end condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndConditionStatus {
    /// The condition being evaluated, verbatim
    pub condition_text: String,
    /// Whether the condition has been met
    pub is_met: bool,
    /// Likelihood that the condition will be met soon, 0.0 to 1.0
    pub likelihood: f64,
}

/// Complete structured analysis of one user utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MessageAnalysis {
    pub emotion: EmotionAssessment,
    #[serde(default)]
    pub key_points: KeyPointExtraction,
    #[serde(default)]
    pub business_impact: BusinessImpact,
    #[serde(default)]
    pub objective_progress: Vec<ObjectiveProgress>,
    #[serde(default)]
    pub end_conditions: Vec<EndConditionStatus>,
    /// Where the conversation stands after this message
    #[serde(default)]
    pub summary: String,
    /// Guidance for the counterpart's next response
    #[serde(default)]
    pub recommended_approach: String,
}

impl MessageAnalysis {
    /// A low-confidence neutral analysis for messages with no content.
    pub fn neutral(summary: impl Into<String>) -> Self {
        Self {
            emotion: EmotionAssessment {
                primary: UserEmotion::Neutral,
                confidence: 0.3,
                indicators: Vec::new(),
            },
            summary: summary.into(),
            recommended_approach:
                "Mantener conversación productiva y explorar detalles".to_string(),
            ..Self::default()
        }
    }

    /// Enforces the model invariants on a freshly produced analysis.
    ///
    /// Clamps every bounded value to its declared range, recomputes the
    /// completion flag from the threshold, truncates the objective and
    /// end-condition lists to their caps, and deduplicates the key point
    /// lists. Applied to the output of both analyzer strategies.
    pub fn normalized(mut self) -> Self {
        self.emotion.confidence = self.emotion.confidence.clamp(0.0, 1.0);

        self.objective_progress.truncate(MAX_TRACKED_OBJECTIVES);
        for progress in &mut self.objective_progress {
            progress.completion_percentage = progress.completion_percentage.min(100);
            progress.is_fully_completed =
                progress.completion_percentage >= OBJECTIVE_COMPLETION_THRESHOLD;
        }

        self.end_conditions.truncate(MAX_TRACKED_END_CONDITIONS);
        for condition in &mut self.end_conditions {
            condition.likelihood = condition.likelihood.clamp(0.0, 1.0);
        }

        dedup_in_place(&mut self.key_points.main_topics);
        dedup_in_place(&mut self.key_points.financial_mentions);
        dedup_in_place(&mut self.key_points.strategic_concepts);
        dedup_in_place(&mut self.key_points.stakeholders);
        dedup_in_place(&mut self.key_points.action_items);
        dedup_in_place(&mut self.key_points.concerns_raised);
        dedup_in_place(&mut self.business_impact.risk_factors);
        dedup_in_place(&mut self.business_impact.opportunities);

        self
    }
}

/// Removes duplicates while preserving first-seen order.
pub fn dedup_in_place(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_clamps_bounded_fields() {
        let analysis = MessageAnalysis {
            emotion: EmotionAssessment {
                primary: UserEmotion::Positive,
                confidence: 1.7,
                indicators: vec![],
            },
            objective_progress: vec![ObjectiveProgress {
                objective_text: "Cerrar acuerdo".to_string(),
                completion_percentage: 120,
                is_fully_completed: false,
                evidence: vec![],
                remaining_requirements: vec![],
            }],
            end_conditions: vec![EndConditionStatus {
                condition_text: "Acuerdo firmado".to_string(),
                is_met: false,
                likelihood: -0.5,
            }],
            ..MessageAnalysis::default()
        }
        .normalized();

        assert_eq!(analysis.emotion.confidence, 1.0);
        assert_eq!(analysis.objective_progress[0].completion_percentage, 100);
        assert!(analysis.objective_progress[0].is_fully_completed);
        assert_eq!(analysis.end_conditions[0].likelihood, 0.0);
    }

    #[test]
    fn normalized_truncates_to_contract_caps() {
        let progress = |text: &str| ObjectiveProgress {
            objective_text: text.to_string(),
            completion_percentage: 0,
            is_fully_completed: false,
            evidence: vec![],
            remaining_requirements: vec![],
        };
        let condition = |text: &str| EndConditionStatus {
            condition_text: text.to_string(),
            is_met: false,
            likelihood: 0.5,
        };

        let analysis = MessageAnalysis {
            objective_progress: vec![progress("a"), progress("b"), progress("c"), progress("d")],
            end_conditions: vec![condition("x"), condition("y"), condition("z")],
            ..MessageAnalysis::default()
        }
        .normalized();

        assert_eq!(analysis.objective_progress.len(), MAX_TRACKED_OBJECTIVES);
        assert_eq!(analysis.end_conditions.len(), MAX_TRACKED_END_CONDITIONS);
    }

    #[test]
    fn normalized_dedups_key_points() {
        let analysis = MessageAnalysis {
            key_points: KeyPointExtraction {
                financial_mentions: vec![
                    "$5M".to_string(),
                    "Serie A".to_string(),
                    "$5M".to_string(),
                ],
                ..KeyPointExtraction::default()
            },
            ..MessageAnalysis::default()
        }
        .normalized();

        assert_eq!(analysis.key_points.financial_mentions, vec!["$5M", "Serie A"]);
    }

    #[test]
    fn severity_ranks_follow_the_fixed_order() {
        assert!(ImpactLevel::Critical.severity_rank() > ImpactLevel::High.severity_rank());
        assert!(UrgencyLevel::Immediate.severity_rank() > UrgencyLevel::High.severity_rank());
        assert_eq!(
            ImpactLevel::Medium.max_by_severity(ImpactLevel::Critical),
            ImpactLevel::Critical
        );
        assert_eq!(
            UrgencyLevel::Immediate.max_by_severity(UrgencyLevel::Low),
            UrgencyLevel::Immediate
        );
    }

    #[test]
    fn enum_serde_uses_snake_case() {
        let json = serde_json::to_string(&UserEmotion::Collaborative).unwrap();
        assert_eq!(json, "\"collaborative\"");
        let parsed: UrgencyLevel = serde_json::from_str("\"immediate\"").unwrap();
        assert_eq!(parsed, UrgencyLevel::Immediate);
    }
}
