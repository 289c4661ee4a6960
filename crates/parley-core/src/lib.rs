//! Parley core domain model.
//!
//! Types and pure logic for the executive conversation simulation:
//! session state, structured message analysis, accumulated conversation
//! insights, and the counterpart response model. No I/O lives here; the
//! analyzer strategies, synthesizer, and orchestrator are in
//! `parley-interaction`.

pub mod analysis;
pub mod error;
pub mod insights;
pub mod response;
pub mod session;

// Re-export common error type
pub use error::{ParleyError, Result};

pub use analysis::{MessageAnalysis, UserEmotion};
pub use insights::{ConversationInsights, Phase};
pub use response::{CounterpartResponse, ResponseEmotion};
pub use session::{PersonalityProfile, ScenarioKind, SessionState, Speaker, Turn};
