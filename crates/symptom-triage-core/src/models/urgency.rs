//! Care-urgency scale shared by disease records and triage results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Totally ordered care-escalation level.
///
/// `SelfCare < Gp < Urgent < Emergency`. Every triage adjustment moves along
/// this order upward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Urgency {
    #[serde(rename = "self-care")]
    SelfCare,
    #[serde(rename = "GP")]
    Gp,
    #[serde(rename = "urgent")]
    Urgent,
    #[serde(rename = "emergency")]
    Emergency,
}

impl Urgency {
    /// All levels in ascending order.
    pub const ALL: [Urgency; 4] = [
        Urgency::SelfCare,
        Urgency::Gp,
        Urgency::Urgent,
        Urgency::Emergency,
    ];

    /// Canonical label ("self-care", "GP", "urgent", "emergency").
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::SelfCare => "self-care",
            Urgency::Gp => "GP",
            Urgency::Urgent => "urgent",
            Urgency::Emergency => "emergency",
        }
    }

    fn rank(&self) -> usize {
        *self as usize
    }

    /// Move `steps` levels up, saturating at `Emergency`.
    pub fn escalate(self, steps: usize) -> Urgency {
        let index = (self.rank() + steps).min(Urgency::ALL.len() - 1);
        Urgency::ALL[index]
    }

    /// Lenient label parsing used by knowledge-base loaders.
    ///
    /// Accepts the canonical labels case-insensitively plus the severity words
    /// used by older relational exports (mild/moderate/severe/critical).
    pub fn parse_label(label: &str) -> Option<Urgency> {
        match label.trim().to_lowercase().as_str() {
            "self-care" | "self care" | "selfcare" | "mild" => Some(Urgency::SelfCare),
            "gp" | "moderate" => Some(Urgency::Gp),
            "urgent" | "severe" => Some(Urgency::Urgent),
            "emergency" | "critical" => Some(Urgency::Emergency),
            _ => None,
        }
    }
}

impl Default for Urgency {
    fn default() -> Self {
        Urgency::Gp
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a label is not a known urgency level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown urgency level: {0}")]
pub struct UnknownUrgency(pub String);

impl FromStr for Urgency {
    type Err = UnknownUrgency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Urgency::parse_label(s).ok_or_else(|| UnknownUrgency(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_order() {
        assert!(Urgency::SelfCare < Urgency::Gp);
        assert!(Urgency::Gp < Urgency::Urgent);
        assert!(Urgency::Urgent < Urgency::Emergency);
        assert_eq!(
            Urgency::ALL.iter().max().copied(),
            Some(Urgency::Emergency)
        );
    }

    #[test]
    fn test_escalate_saturates() {
        assert_eq!(Urgency::SelfCare.escalate(0), Urgency::SelfCare);
        assert_eq!(Urgency::SelfCare.escalate(1), Urgency::Gp);
        assert_eq!(Urgency::Gp.escalate(2), Urgency::Emergency);
        assert_eq!(Urgency::Urgent.escalate(2), Urgency::Emergency);
        assert_eq!(Urgency::Emergency.escalate(5), Urgency::Emergency);
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("GP".parse::<Urgency>(), Ok(Urgency::Gp));
        assert_eq!("Self-Care".parse::<Urgency>(), Ok(Urgency::SelfCare));
        assert_eq!("EMERGENCY".parse::<Urgency>(), Ok(Urgency::Emergency));
        assert_eq!("severe".parse::<Urgency>(), Ok(Urgency::Urgent));
        assert!("whenever".parse::<Urgency>().is_err());
    }

    #[test]
    fn test_serde_labels() {
        let json = serde_json::to_string(&Urgency::SelfCare).unwrap();
        assert_eq!(json, "\"self-care\"");
        let parsed: Urgency = serde_json::from_str("\"GP\"").unwrap();
        assert_eq!(parsed, Urgency::Gp);
    }
}
