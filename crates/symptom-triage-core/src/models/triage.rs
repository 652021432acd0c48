//! Triage output models.

use serde::{Deserialize, Serialize};

use super::Urgency;

/// Age risk band applied during risk-factor adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeRisk {
    HighRisk,
    MediumRisk,
}

impl AgeRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeRisk::HighRisk => "high_risk",
            AgeRisk::MediumRisk => "medium_risk",
        }
    }
}

/// Severity wording detected across the whole symptom text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Mild,
    Moderate,
    Severe,
}

impl SeverityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Mild => "mild",
            SeverityLevel::Moderate => "moderate",
            SeverityLevel::Severe => "severe",
        }
    }
}

/// Risk factors applied to the keyword urgency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    /// Age band, absent when the patient is below both thresholds
    pub age: Option<AgeRisk>,
    pub chronic_conditions: bool,
    pub severity: SeverityLevel,
    /// Additive risk multiplied by the severity multiplier
    pub risk_score: f64,
    /// Levels added to the keyword urgency (0, 1 or 2)
    pub escalation: usize,
}

/// A dangerous symptom combination that triggered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CombinationAlert {
    /// Combination name, e.g. "cardiac_emergency"
    pub name: String,
    /// Fraction of the combination's symptoms that were reported
    pub match_ratio: f64,
    pub risk_score: f64,
    pub urgency: Urgency,
    /// Combination symptoms found among the reported symptoms
    pub matched_symptoms: Vec<String>,
}

impl CombinationAlert {
    /// Name with underscores replaced for narrative use.
    pub fn display_name(&self) -> String {
        self.name.replace('_', " ")
    }
}

/// Result of [`crate::triage::TriageClassifier::classify`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriageResult {
    /// Final urgency: max of keyword, risk-adjusted and combination levels
    pub urgency: Urgency,
    /// Urgency from keyword rules alone
    pub base_urgency: Urgency,
    /// Keyword urgency after risk-factor escalation
    pub risk_adjusted_urgency: Urgency,
    /// Confidence (0.0 - 1.0)
    pub confidence: f64,
    /// Deterministic narrative
    pub assessment: String,
    /// Condition-aware clinical notes
    pub notes: String,
    /// Up to three keyword-matched conditions, best first
    pub potential_conditions: Vec<String>,
    pub department: String,
    pub recommendations: Vec<String>,
    pub follow_up_questions: Vec<String>,
    pub risk_assessment: RiskAssessment,
    pub symptom_combinations: Vec<CombinationAlert>,
}

impl TriageResult {
    /// Whether any dangerous combination triggered.
    pub fn has_alerts(&self) -> bool {
        !self.symptom_combinations.is_empty()
    }
}
