//! Disease prediction output models.

use serde::{Deserialize, Serialize};

use super::{SymptomClass, Urgency};

/// How one reported symptom contributed to one disease.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchDetail {
    /// Symptom text as reported
    pub input: String,
    /// Canonical symptom it matched
    pub matched: String,
    /// Match confidence (0.0 - 1.0)
    pub confidence: f64,
    /// Primary or secondary for this disease
    pub class: SymptomClass,
    /// Severity multiplier read from the reported text
    pub severity_multiplier: f64,
}

/// A ranked candidate condition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub disease: String,
    /// Probability in percent (0 - 95), one decimal
    pub probability: f64,
    /// Match-quality confidence in percent (0 - 100), one decimal
    pub confidence: f64,
    pub department: String,
    pub severity: Urgency,
    pub description: String,
    /// Number of match details recorded for this disease
    pub matched_symptoms: usize,
    /// Number of symptoms the disease is associated with
    pub total_symptoms: usize,
    pub primary_symptoms_matched: usize,
    pub secondary_symptoms_matched: usize,
    pub has_critical_symptoms: bool,
    /// Disease is on the risk list for the patient's age band
    pub age_related: bool,
    pub symptom_details: Vec<MatchDetail>,
    pub treatment_info: Vec<String>,
    pub when_to_see_doctor: Option<String>,
    pub duration: Option<String>,
}

/// Narrative summary of a prediction run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicalAnalysis {
    pub summary: String,
    /// Urgency wording keyed off the top disease's severity
    pub urgency: String,
    pub urgency_level: Urgency,
    pub department: String,
    pub symptom_analysis: String,
    pub age_note: String,
    pub recommendation: String,
    /// "High", "Moderate" or "Low"
    pub confidence_level: String,
    pub next_steps: String,
}

/// Result of [`crate::scoring::SymptomScorer::predict`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionReport {
    /// Ranked predictions, probability descending
    pub predictions: Vec<Prediction>,
    /// Narrative, present whenever `predictions` is non-empty
    pub analysis: Option<ClinicalAnalysis>,
    /// Explanation, present whenever `predictions` is empty
    pub message: Option<String>,
    pub total_conditions_analyzed: usize,
    pub symptoms_provided: usize,
    pub input_symptoms: Vec<String>,
    /// Fingerprint of the knowledge base used
    pub knowledge_base_version: String,
}

impl PredictionReport {
    /// Top-ranked prediction, if any.
    pub fn top(&self) -> Option<&Prediction> {
        self.predictions.first()
    }

    /// Department of the top prediction, for hospital lookup.
    pub fn recommended_department(&self) -> Option<&str> {
        self.top().map(|p| p.department.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}
