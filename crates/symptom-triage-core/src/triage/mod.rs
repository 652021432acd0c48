//! Triage classifier.
//!
//! Rule-priority pipeline, independent of disease scoring:
//! Keyword rules → Risk factors → Dangerous combinations → max → Narrative

mod narrative;
mod risk;
mod rules;

pub use narrative::*;
pub use risk::*;
pub use rules::*;

use crate::config::TriageConfig;
use crate::models::{normalize_text, PatientContext, TriageResult};

/// Confidence reported when no symptom was supplied.
pub const EMPTY_INPUT_CONFIDENCE: f64 = 0.5;

/// Classifies a symptom set into a care-urgency level.
#[derive(Debug, Clone, Default)]
pub struct TriageClassifier {
    config: TriageConfig,
}

impl TriageClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TriageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    /// Classify symptoms. Never fails; empty input yields self-care.
    pub fn classify<S: AsRef<str>>(&self, symptoms: &[S], patient: &PatientContext) -> TriageResult {
        let reported: Vec<String> = symptoms
            .iter()
            .map(|s| normalize_text(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();
        let text = reported.join(" ");

        let mut distinct = reported.clone();
        distinct.sort();
        distinct.dedup();

        let verdict = keyword_verdict(&text, distinct.len(), self.config.multi_symptom_threshold);
        let base_urgency = verdict.urgency;

        let risk = assess_risk(&text, patient, &self.config);
        let risk_adjusted_urgency = base_urgency.escalate(risk.escalation);

        let alerts = check_combinations(&reported, self.config.combination_match_ratio);
        let urgency = alerts
            .iter()
            .map(|a| a.urgency)
            .fold(base_urgency.max(risk_adjusted_urgency), Ord::max);

        let confidence = if reported.is_empty() {
            EMPTY_INPUT_CONFIDENCE
        } else {
            self.config.base_confidence
        };

        let potential_conditions = potential_conditions(&text, self.config.max_potential_conditions);
        let department = department_for(&potential_conditions).to_string();

        tracing::debug!(
            symptoms = reported.len(),
            base = %base_urgency,
            risk_adjusted = %risk_adjusted_urgency,
            combinations = alerts.len(),
            urgency = %urgency,
            "Triage complete"
        );

        TriageResult {
            urgency,
            base_urgency,
            risk_adjusted_urgency,
            confidence,
            assessment: assessment(verdict.statement, urgency, confidence, &risk, &alerts),
            notes: clinical_notes(&reported, &potential_conditions, urgency),
            department,
            recommendations: recommendations(urgency),
            follow_up_questions: follow_up_questions(&reported, self.config.max_follow_up_questions),
            potential_conditions,
            risk_assessment: risk,
            symptom_combinations: alerts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SeverityLevel, Urgency};

    #[test]
    fn test_cardiac_scenario() {
        let classifier = TriageClassifier::new();
        let result = classifier.classify(
            &["severe chest pain", "shortness of breath"],
            &PatientContext::with_age(55),
        );

        assert_eq!(result.urgency, Urgency::Emergency);
        assert_eq!(result.base_urgency, Urgency::Emergency);
        assert!(result.has_alerts());
        assert_eq!(result.symptom_combinations[0].name, "cardiac_emergency");
        assert_eq!(result.risk_assessment.severity, SeverityLevel::Severe);
        assert_eq!(result.recommendations[0], "SEEK IMMEDIATE EMERGENCY CARE");
    }

    #[test]
    fn test_flu_like_is_gp() {
        let classifier = TriageClassifier::new();
        let result = classifier.classify(&["fever", "cough"], &PatientContext::with_age(30));

        assert_eq!(result.urgency, Urgency::Gp);
        assert!(result.assessment.starts_with("Flu-like symptoms with fever detected."));
        assert_eq!(result.potential_conditions[0], "Influenza");
        assert_eq!(result.department, "General Medicine");
        assert_eq!(result.confidence, 0.7);
    }

    #[test]
    fn test_empty_input() {
        let classifier = TriageClassifier::new();
        let empty: [&str; 0] = [];
        let result = classifier.classify(&empty, &PatientContext::default());

        assert_eq!(result.urgency, Urgency::SelfCare);
        assert_eq!(result.confidence, EMPTY_INPUT_CONFIDENCE);
        assert!(result.potential_conditions.is_empty());
        assert!(!result.has_alerts());
        assert_eq!(result.follow_up_questions.len(), 3);
    }

    #[test]
    fn test_combination_escalates_above_keywords() {
        let classifier = TriageClassifier::new();
        // No emergency keyword; stroke combination triggers at 2 of 3
        let result = classifier.classify(&["slurred speech", "confusion"], &PatientContext::default());

        assert_eq!(result.base_urgency, Urgency::SelfCare);
        assert_eq!(result.urgency, Urgency::Emergency);
        assert!(result.assessment.contains("Specific concerns: stroke indicators"));
    }

    #[test]
    fn test_risk_escalation_with_custom_weights() {
        let config = TriageConfig {
            high_age_risk: 0.6,
            ..TriageConfig::default()
        };
        let classifier = TriageClassifier::with_config(config);
        let mut patient = PatientContext::with_age(80);
        patient.chronic_conditions = vec!["heart disease".into()];

        let result = classifier.classify(&["severe cough"], &patient);
        assert_eq!(result.base_urgency, Urgency::Gp);
        assert_eq!(result.risk_assessment.escalation, 2);
        assert_eq!(result.risk_adjusted_urgency, Urgency::Emergency);
        assert_eq!(result.urgency, Urgency::Emergency);
    }

    #[test]
    fn test_department_follows_top_condition() {
        let classifier = TriageClassifier::new();
        let result = classifier.classify(&["nausea", "diarrhea", "vomiting"], &PatientContext::default());

        assert_eq!(result.potential_conditions[0], "Gastroenteritis");
        assert_eq!(result.department, "Gastroenterology");
        assert!(result.notes.contains("gastroenteritis"));
    }
}
