//! Domain models for the symptom-triage system.

mod disease;
mod medicine;
mod patient;
mod prediction;
mod triage;
mod urgency;

pub use disease::*;
pub use medicine::*;
pub use patient::*;
pub use prediction::*;
pub use triage::*;
pub use urgency::*;
