//! Core session state passed into every turn.

use serde::{Deserialize, Serialize};

use super::personality::PersonalityProfile;
use super::scenario::ScenarioKind;

/// Identifies who produced a turn in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The human trainee.
    User,
    /// The simulated counterpart (negotiation partner, board member, investor).
    Counterpart,
}

/// A single utterance in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who spoke.
    pub speaker: Speaker,
    /// The utterance content.
    pub content: String,
}

impl Turn {
    /// Creates a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            content: content.into(),
        }
    }

    /// Creates a counterpart turn.
    pub fn counterpart(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Counterpart,
            content: content.into(),
        }
    }
}

/// Caller-owned state for one active conversation.
///
/// The turn pipeline treats this as pass-by-reference input; appending the
/// exchanged turns back into `turns` is the caller's responsibility, which
/// keeps the pipeline free of hidden mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Free-text description of the business situation
    pub scenario_context: String,
    /// Role description for the trainee
    pub user_role: String,
    /// Role description for the simulated counterpart
    pub counterpart_role: String,
    /// Personality sliders driving the counterpart's register
    #[serde(default)]
    pub personality: PersonalityProfile,
    /// Goals the counterpart pursues during the session
    #[serde(default)]
    pub counterpart_objectives: Vec<String>,
    /// Goals whose progress is tracked for the trainee
    #[serde(default)]
    pub user_objectives: Vec<String>,
    /// Optional background material the counterpart may draw on
    #[serde(default)]
    pub knowledge_base: Option<String>,
    /// Criteria whose satisfaction should end the session (may be empty)
    #[serde(default)]
    pub end_conditions: Vec<String>,
    /// Ordered prior utterances, append-only within a session
    #[serde(default)]
    pub turns: Vec<Turn>,
}

impl SessionState {
    /// Creates a new session with a generated id and empty history.
    pub fn new(
        scenario_context: impl Into<String>,
        user_role: impl Into<String>,
        counterpart_role: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            scenario_context: scenario_context.into(),
            user_role: user_role.into(),
            counterpart_role: counterpart_role.into(),
            personality: PersonalityProfile::default(),
            counterpart_objectives: Vec::new(),
            user_objectives: Vec::new(),
            knowledge_base: None,
            end_conditions: Vec::new(),
            turns: Vec::new(),
        }
    }

    /// Number of user turns recorded so far.
    pub fn user_turn_count(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| t.speaker == Speaker::User)
            .count()
    }

    /// The most recent `n` turns, oldest first.
    pub fn recent_turns(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// The scenario family detected from the context description.
    pub fn scenario_kind(&self) -> ScenarioKind {
        ScenarioKind::detect(&self.scenario_context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_turn_count_ignores_counterpart_turns() {
        let mut session = SessionState::new("ronda de inversión", "Founder", "Investor");
        session.turns.push(Turn::user("Hola"));
        session.turns.push(Turn::counterpart("Bienvenido"));
        session.turns.push(Turn::user("Propongo $5M"));

        assert_eq!(session.user_turn_count(), 2);
    }

    #[test]
    fn recent_turns_clamps_to_history_length() {
        let mut session = SessionState::new("ctx", "a", "b");
        session.turns.push(Turn::user("uno"));

        assert_eq!(session.recent_turns(5).len(), 1);
        assert_eq!(session.recent_turns(0).len(), 0);
    }
}
