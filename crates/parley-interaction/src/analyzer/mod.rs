//! Message analyzer.
//!
//! Turns one user utterance plus session state into a `MessageAnalysis`.
//! Two interchangeable strategies sit behind this facade: a generative one
//! backed by a [`GenerativeCapability`], and the deterministic lexical one.
//! The generative strategy is attempted first when a capability is
//! configured; any failure (transport, timeout, shape violation) is absorbed
//! here and the lexical strategy runs instead, so callers never see an error
//! from `analyze`.

pub mod lexical;
pub mod prompt;

use std::sync::Arc;
use std::time::Duration;

use parley_core::analysis::{MAX_TRACKED_END_CONDITIONS, MAX_TRACKED_OBJECTIVES};
use parley_core::{MessageAnalysis, ParleyError, SessionState, UserEmotion};

use crate::capability::GenerativeCapability;

const DEFAULT_CAPABILITY_TIMEOUT: Duration = Duration::from_secs(30);

/// Which strategy produced an analysis; exposed for telemetry only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStrategy {
    Generative,
    Lexical,
}

/// Analyzer facade selecting between the generative and lexical strategies.
pub struct MessageAnalyzer {
    capability: Option<Arc<dyn GenerativeCapability>>,
    timeout: Duration,
}

impl Default for MessageAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageAnalyzer {
    /// Creates an analyzer with no generative capability (lexical only).
    pub fn new() -> Self {
        Self {
            capability: None,
            timeout: DEFAULT_CAPABILITY_TIMEOUT,
        }
    }

    /// Attaches a generative capability to attempt before falling back.
    pub fn with_capability(mut self, capability: Arc<dyn GenerativeCapability>) -> Self {
        self.capability = Some(capability);
        self
    }

    /// Overrides the capability timeout.
    ///
    /// A timeout is treated identically to a capability failure: the
    /// lexical strategy runs and nothing is propagated.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Analyzes one user message. Never fails; an empty message yields a
    /// low-confidence neutral analysis.
    pub async fn analyze(&self, message: &str, session: &SessionState) -> MessageAnalysis {
        self.analyze_traced(message, session).await.0
    }

    /// Like [`analyze`](Self::analyze), also reporting which strategy ran.
    pub async fn analyze_traced(
        &self,
        message: &str,
        session: &SessionState,
    ) -> (MessageAnalysis, AnalysisStrategy) {
        // Bound analysis cost before either strategy runs.
        let objectives = truncated(&session.user_objectives, MAX_TRACKED_OBJECTIVES);
        let end_conditions = truncated(&session.end_conditions, MAX_TRACKED_END_CONDITIONS);

        if let Some(capability) = &self.capability {
            match self
                .analyze_generative(capability.as_ref(), message, session, objectives, end_conditions)
                .await
            {
                Ok(analysis) => return (analysis, AnalysisStrategy::Generative),
                Err(err) => {
                    log::warn!(
                        "Generative analysis failed ({err}); falling back to lexical strategy"
                    );
                }
            }
        }

        let analysis = lexical::analyze(message, session, objectives, end_conditions);
        (analysis, AnalysisStrategy::Lexical)
    }

    /// Lexical-only emotion classification for lightweight callers.
    pub fn quick_emotion(&self, message: &str) -> UserEmotion {
        lexical::detect_emotion(&message.to_lowercase()).0
    }

    async fn analyze_generative(
        &self,
        capability: &dyn GenerativeCapability,
        message: &str,
        session: &SessionState,
        objectives: &[String],
        end_conditions: &[String],
    ) -> Result<MessageAnalysis, ParleyError> {
        let rendered = prompt::render_extraction_prompt(message, session, objectives, end_conditions)?;

        let reply = tokio::time::timeout(self.timeout, capability.complete(rendered))
            .await
            .map_err(|_| {
                ParleyError::analysis_unavailable(format!(
                    "capability '{}' timed out after {:?}",
                    capability.name(),
                    self.timeout
                ))
            })?
            .map_err(|err| ParleyError::analysis_unavailable(err.to_string()))?;

        parse_analysis_reply(&reply)
    }
}

/// Validates a capability reply against the analysis shape.
///
/// Strips Markdown code fences, locates the outermost JSON object, and
/// deserializes it. Shape violations become `MalformedAnalysis`, which the
/// caller treats identically to `AnalysisUnavailable`.
fn parse_analysis_reply(reply: &str) -> Result<MessageAnalysis, ParleyError> {
    let json = extract_json_object(reply)
        .ok_or_else(|| ParleyError::malformed_analysis("no JSON object in capability reply"))?;

    let analysis: MessageAnalysis = serde_json::from_str(json)
        .map_err(|err| ParleyError::malformed_analysis(err.to_string()))?;

    Ok(analysis.normalized())
}

/// Locates the outermost JSON object in a reply that may carry code fences
/// or surrounding prose.
fn extract_json_object(reply: &str) -> Option<&str> {
    let cleaned = reply
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&cleaned[start..=end])
}

fn truncated(items: &[String], cap: usize) -> &[String] {
    &items[..items.len().min(cap)]
}
