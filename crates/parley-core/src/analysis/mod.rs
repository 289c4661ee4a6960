//! Structured message analysis model.
//!
//! One `MessageAnalysis` is produced per user turn by either analyzer
//! strategy. Both strategies emit the same shape, and every bounded field is
//! clamped through [`MessageAnalysis::normalized`] regardless of which
//! strategy ran, so callers never observe strategy identity in the data.

pub mod model;

pub use model::{
    dedup_in_place, BusinessImpact, EmotionAssessment, EndConditionStatus, FinancialImpact,
    ImpactLevel, KeyPointExtraction, MessageAnalysis, ObjectiveProgress, UrgencyLevel,
    UserEmotion, MAX_TRACKED_END_CONDITIONS, MAX_TRACKED_OBJECTIVES,
};
