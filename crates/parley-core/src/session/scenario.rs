//! Scenario family detection.
//!
//! The scenario context is free text supplied by the caller; a handful of
//! keyword cues map it onto the scenario families the synthesizer carries
//! opening material for.

use serde::{Deserialize, Serialize};

/// The scenario families recognized from a session's context description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// M&A / acquisition negotiations
    MergerNegotiation,
    /// Reputation or operational crisis management
    CrisisLeadership,
    /// Fundraising pitches in front of investors
    StartupPitch,
    /// Anything without a recognizable cue
    General,
}

const MERGER_CUES: &[&str] = &["fusión", "adquisición", "merger", "m&a", "acquisition"];
const CRISIS_CUES: &[&str] = &["crisis", "reputación", "emergencia", "emergency"];
const PITCH_CUES: &[&str] = &["pitch", "inversión", "startup", "financiamiento", "funding"];

impl ScenarioKind {
    /// Classifies a scenario context description by keyword cues.
    pub fn detect(context: &str) -> Self {
        let context_lower = context.to_lowercase();
        let matches = |cues: &[&str]| cues.iter().any(|cue| context_lower.contains(cue));

        if matches(MERGER_CUES) {
            Self::MergerNegotiation
        } else if matches(CRISIS_CUES) {
            Self::CrisisLeadership
        } else if matches(PITCH_CUES) {
            Self::StartupPitch
        } else {
            Self::General
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_scenario_families() {
        assert_eq!(
            ScenarioKind::detect("Negociación de adquisición con un grupo fintech"),
            ScenarioKind::MergerNegotiation
        );
        assert_eq!(
            ScenarioKind::detect("Crisis de reputación tras una filtración de datos"),
            ScenarioKind::CrisisLeadership
        );
        assert_eq!(
            ScenarioKind::detect("Pitch de Serie A frente a un fondo de inversión"),
            ScenarioKind::StartupPitch
        );
        assert_eq!(
            ScenarioKind::detect("Revisión trimestral de resultados"),
            ScenarioKind::General
        );
    }
}
