//! Parley interaction pipeline.
//!
//! Wires the analyzer, conversation memory, and synthesizer into the single
//! entry point a request handler calls per user message. The orchestrator
//! defines the ordering and failure semantics of one turn: validate input,
//! analyze (internally resilient), fold the analysis into memory, then
//! synthesize the counterpart's reply against the updated memory.

pub mod analyzer;
pub mod capability;
pub mod claude_api;
pub mod config;
pub mod synthesizer;

use parley_core::{
    ConversationInsights, CounterpartResponse, MessageAnalysis, ParleyError, Result, SessionState,
};

pub use analyzer::{AnalysisStrategy, MessageAnalyzer};
pub use capability::{CapabilityError, GenerativeCapability};
pub use claude_api::ClaudeApiCapability;
pub use synthesizer::ResponseSynthesizer;

/// Everything one processed turn produces.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The counterpart's reply
    pub response: CounterpartResponse,
    /// The structured analysis of the user's message
    pub analysis: MessageAnalysis,
    /// The insights value with this turn folded in
    pub insights: ConversationInsights,
}

/// Orchestrates one conversation turn.
///
/// The session state and insights are treated as pass-by-value input; the
/// orchestrator returns updated copies and never mutates shared state, so
/// turns for different sessions can run fully in parallel. Turns within one
/// session must be serialized by the caller: insight accumulation and phase
/// computation are defined over the turn index.
///
/// There is no transactional rollback: a turn cancelled after the memory
/// fold has produced its updated insights simply discards the returned
/// value, and a caller that stored it keeps it.
pub struct TurnOrchestrator {
    analyzer: MessageAnalyzer,
    synthesizer: ResponseSynthesizer,
}

impl Default for TurnOrchestrator {
    fn default() -> Self {
        Self::new(MessageAnalyzer::new())
    }
}

impl TurnOrchestrator {
    /// Creates an orchestrator around a configured analyzer.
    pub fn new(analyzer: MessageAnalyzer) -> Self {
        Self {
            analyzer,
            synthesizer: ResponseSynthesizer::new(),
        }
    }

    /// Processes one user message against the session.
    ///
    /// The only caller-visible failure is [`ParleyError::EmptyMessage`] for
    /// a message that is empty after trimming; every analyzer-internal
    /// failure has already been absorbed by the fallback strategy. No
    /// retries happen at this layer.
    pub async fn process_turn(
        &self,
        user_message: &str,
        session: &SessionState,
        insights: Option<ConversationInsights>,
    ) -> Result<TurnOutcome> {
        let trimmed = user_message.trim();
        if trimmed.is_empty() {
            return Err(ParleyError::EmptyMessage);
        }

        let (analysis, strategy) = self.analyzer.analyze_traced(trimmed, session).await;
        log::debug!(
            "Turn analyzed via {strategy:?}: emotion={}, impact={}",
            analysis.emotion.primary,
            analysis.business_impact.impact_level
        );

        let user_turn_count = insights.as_ref().map(|i| i.user_turn_count).unwrap_or(0) + 1;
        let updated = ConversationInsights::updated(insights.as_ref(), &analysis, user_turn_count);

        let response = self
            .synthesizer
            .synthesize(trimmed, &analysis, session, Some(&updated));

        Ok(TurnOutcome {
            response,
            analysis,
            insights: updated,
        })
    }

    /// Bootstraps a session with the counterpart's opening line.
    ///
    /// Driven by the same synthesizer with an empty turn history; no
    /// analysis or memory update happens here.
    pub fn open_session(&self, session: &SessionState) -> CounterpartResponse {
        self.synthesizer.opening_line(session)
    }

    /// Access to the underlying analyzer for standalone analysis calls.
    pub fn analyzer(&self) -> &MessageAnalyzer {
        &self.analyzer
    }

    /// Access to the underlying synthesizer for standalone synthesis calls.
    pub fn synthesizer(&self) -> &ResponseSynthesizer {
        &self.synthesizer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionState {
        SessionState::new("Pitch de inversión", "Founder", "Investor Partner")
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let orchestrator = TurnOrchestrator::default();
        let err = orchestrator
            .process_turn("   ", &session(), None)
            .await
            .unwrap_err();
        assert!(err.is_empty_message());
    }

    #[tokio::test]
    async fn first_turn_creates_insights() {
        let orchestrator = TurnOrchestrator::default();
        let outcome = orchestrator
            .process_turn("Propongo un plan de expansión", &session(), None)
            .await
            .unwrap();

        assert_eq!(outcome.insights.user_turn_count, 1);
        assert!(!outcome.response.content.is_empty());
    }

    #[tokio::test]
    async fn insights_thread_across_turns() {
        let orchestrator = TurnOrchestrator::default();
        let session = session();

        let first = orchestrator
            .process_turn("Tenemos 50K usuarios", &session, None)
            .await
            .unwrap();
        let second = orchestrator
            .process_turn("Buscamos $5M", &session, Some(first.insights))
            .await
            .unwrap();

        assert_eq!(second.insights.user_turn_count, 2);
        assert!(second
            .insights
            .all_financial_mentions
            .iter()
            .any(|m| m.contains("$5M")));
    }

    #[test]
    fn opening_line_requires_no_history() {
        let orchestrator = TurnOrchestrator::default();
        let opening = orchestrator.open_session(&session());
        assert!(!opening.content.is_empty());
    }
}
