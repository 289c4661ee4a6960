//! Conversation memory.
//!
//! `ConversationInsights` accumulates what the analyzer has extracted across
//! a session's user turns: deduplicated unions of every key point category,
//! running severity maxima, dominant emotions, and the phase walk. The value
//! is caller-held and threaded through [`ConversationInsights::updated`]
//! after every user turn, which keeps this module free of hidden state and
//! trivially testable.

pub mod recall;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::analysis::{dedup_in_place, ImpactLevel, MessageAnalysis, UrgencyLevel, UserEmotion};

/// Coarse conversation phase, a pure function of the user-turn count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Opening,
    Development,
    Negotiation,
    Closing,
}

impl Phase {
    /// The phase implied by the number of user turns seen so far.
    pub fn for_turn_count(user_turn_count: usize) -> Self {
        match user_turn_count {
            0..=2 => Phase::Opening,
            3..=5 => Phase::Development,
            6..=8 => Phase::Negotiation,
            _ => Phase::Closing,
        }
    }
}

/// Observation count for one emotion, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionCount {
    pub emotion: UserEmotion,
    pub count: u32,
}

/// Accumulated per-session insights, updated after every user turn.
///
/// List fields only ever grow; the severity maxima are monotone
/// non-decreasing under the fixed severity ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationInsights {
    /// Deduplicated union of all main topics seen
    pub all_key_points: Vec<String>,
    /// Deduplicated union of all financial mentions seen
    pub all_financial_mentions: Vec<String>,
    /// Deduplicated union of all strategic concepts seen
    pub all_strategic_concepts: Vec<String>,
    /// Deduplicated union of all stakeholders seen
    pub all_stakeholders: Vec<String>,
    /// Deduplicated union of all action items seen
    pub all_action_items: Vec<String>,
    /// Deduplicated union of all concerns seen
    pub all_concerns: Vec<String>,
    /// Highest impact level observed across all turns (never decreases)
    pub highest_impact_level: ImpactLevel,
    /// Peak urgency level observed across all turns (never decreases)
    pub peak_urgency_level: UrgencyLevel,
    /// Top-3 most frequent emotions, ties broken by first-seen order
    pub dominant_emotions: Vec<UserEmotion>,
    /// Per-emotion observation counts backing `dominant_emotions`
    #[serde(default)]
    pub emotion_counts: Vec<EmotionCount>,
    /// Phase labels in order of entry, no consecutive duplicates
    pub phase_history: Vec<Phase>,
    /// Number of user turns folded into this value
    pub user_turn_count: usize,
    /// Regenerated free-text summary of the conversation state
    pub summary: String,
    /// Timestamp of the last update (ISO 8601 format)
    pub last_updated: String,
}

impl ConversationInsights {
    /// Folds a fresh analysis into the accumulated insights.
    ///
    /// Pure function of the prior value and the new analysis: returns a new
    /// `ConversationInsights`, creating one when `prior` is `None`.
    /// `user_turn_count` is the 1-based count of user turns including the
    /// one just analyzed; phase computation is defined over it.
    pub fn updated(
        prior: Option<&ConversationInsights>,
        analysis: &MessageAnalysis,
        user_turn_count: usize,
    ) -> ConversationInsights {
        let mut next = match prior {
            Some(existing) => existing.clone(),
            None => ConversationInsights::empty(),
        };
        next.user_turn_count = user_turn_count;

        let points = &analysis.key_points;
        extend_deduped(&mut next.all_key_points, &points.main_topics);
        extend_deduped(&mut next.all_financial_mentions, &points.financial_mentions);
        extend_deduped(&mut next.all_strategic_concepts, &points.strategic_concepts);
        extend_deduped(&mut next.all_stakeholders, &points.stakeholders);
        extend_deduped(&mut next.all_action_items, &points.action_items);
        extend_deduped(&mut next.all_concerns, &points.concerns_raised);

        // Incremental max is the canonical definition: once a level is
        // observed the accumulated value never regresses below it.
        next.highest_impact_level = next
            .highest_impact_level
            .max_by_severity(analysis.business_impact.impact_level);
        next.peak_urgency_level = next
            .peak_urgency_level
            .max_by_severity(analysis.business_impact.urgency_level);

        next.observe_emotion(analysis.emotion.primary);
        next.dominant_emotions = next.top_emotions(3);

        let phase = Phase::for_turn_count(user_turn_count);
        if next.phase_history.last() != Some(&phase) {
            next.phase_history.push(phase);
        }

        next.summary = next.regenerate_summary(phase);
        next.last_updated = chrono::Utc::now().to_rfc3339();
        next
    }

    /// The phase the conversation is currently in.
    pub fn current_phase(&self) -> Phase {
        self.phase_history.last().copied().unwrap_or(Phase::Opening)
    }

    fn empty() -> Self {
        Self {
            all_key_points: Vec::new(),
            all_financial_mentions: Vec::new(),
            all_strategic_concepts: Vec::new(),
            all_stakeholders: Vec::new(),
            all_action_items: Vec::new(),
            all_concerns: Vec::new(),
            highest_impact_level: ImpactLevel::Low,
            peak_urgency_level: UrgencyLevel::Low,
            dominant_emotions: Vec::new(),
            emotion_counts: Vec::new(),
            phase_history: Vec::new(),
            user_turn_count: 0,
            summary: "Conversación iniciada".to_string(),
            last_updated: chrono::Utc::now().to_rfc3339(),
        }
    }

    fn observe_emotion(&mut self, emotion: UserEmotion) {
        match self
            .emotion_counts
            .iter_mut()
            .find(|entry| entry.emotion == emotion)
        {
            Some(entry) => entry.count += 1,
            None => self.emotion_counts.push(EmotionCount { emotion, count: 1 }),
        }
    }

    fn top_emotions(&self, n: usize) -> Vec<UserEmotion> {
        let mut counts = self.emotion_counts.clone();
        // Stable sort keeps first-seen order for equal counts.
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts.into_iter().take(n).map(|entry| entry.emotion).collect()
    }

    fn regenerate_summary(&self, phase: Phase) -> String {
        let top_points = self
            .all_key_points
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Conversación en fase {} con {} intercambios. Temas principales: {}. Impacto: {}.",
            phase, self.user_turn_count, top_points, self.highest_impact_level
        )
    }
}

fn extend_deduped(accumulated: &mut Vec<String>, new_items: &[String]) {
    accumulated.extend(new_items.iter().cloned());
    dedup_in_place(accumulated);
}
