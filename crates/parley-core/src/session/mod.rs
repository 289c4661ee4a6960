//! Session domain model.
//!
//! A session is one continuous conversation between the user and a simulated
//! counterpart, carrying the scenario description, both roles, the
//! counterpart's personality sliders and objectives, and the full ordered
//! turn history. The session is caller-owned: the turn pipeline reads it and
//! returns fresh values, it never mutates shared state.

pub mod model;
pub mod personality;
pub mod scenario;

pub use model::{SessionState, Speaker, Turn};
pub use personality::PersonalityProfile;
pub use scenario::ScenarioKind;
