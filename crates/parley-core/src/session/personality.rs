//! Counterpart personality sliders.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const DEFAULT_TRAIT: u8 = 50;
const DEFAULT_AGGRESSION: u8 = 30;

/// The four trait sliders that shape the counterpart's register, 0-100.
///
/// Missing traits default to 50, except aggression which defaults to 30;
/// out-of-range input values are clamped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalityProfile {
    /// Appetite for data and metrics before committing
    pub analytical: u8,
    /// Tolerance for slow, exploratory exchanges
    pub patience: u8,
    /// Willingness to push back with firm language
    pub aggression: u8,
    /// Openness to moving away from a stated position
    pub flexibility: u8,
}

impl Default for PersonalityProfile {
    fn default() -> Self {
        Self {
            analytical: DEFAULT_TRAIT,
            patience: DEFAULT_TRAIT,
            aggression: DEFAULT_AGGRESSION,
            flexibility: DEFAULT_TRAIT,
        }
    }
}

impl PersonalityProfile {
    /// Builds a profile from a named-slider map as supplied by callers.
    ///
    /// Unknown keys are ignored, missing keys take their defaults, and
    /// values outside 0-100 are clamped.
    pub fn from_sliders(sliders: &HashMap<String, i64>) -> Self {
        let get = |key: &str, default: u8| -> u8 {
            sliders
                .get(key)
                .map(|v| (*v).clamp(0, 100) as u8)
                .unwrap_or(default)
        };

        Self {
            analytical: get("analytical", DEFAULT_TRAIT),
            patience: get("patience", DEFAULT_TRAIT),
            aggression: get("aggression", DEFAULT_AGGRESSION),
            flexibility: get("flexibility", DEFAULT_TRAIT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sliders_take_defaults() {
        let profile = PersonalityProfile::from_sliders(&HashMap::new());

        assert_eq!(profile.analytical, 50);
        assert_eq!(profile.patience, 50);
        assert_eq!(profile.aggression, 30);
        assert_eq!(profile.flexibility, 50);
    }

    #[test]
    fn out_of_range_sliders_are_clamped() {
        let mut sliders = HashMap::new();
        sliders.insert("analytical".to_string(), 250);
        sliders.insert("patience".to_string(), -10);

        let profile = PersonalityProfile::from_sliders(&sliders);

        assert_eq!(profile.analytical, 100);
        assert_eq!(profile.patience, 0);
    }
}
