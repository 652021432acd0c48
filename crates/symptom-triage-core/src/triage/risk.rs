//! Patient risk factors and dangerous symptom combinations.

use crate::config::TriageConfig;
use crate::models::{AgeRisk, CombinationAlert, PatientContext, RiskAssessment, SeverityLevel, Urgency};

/// A set of symptoms that together signal a serious condition.
#[derive(Debug, Clone, Copy)]
pub struct DangerousCombination {
    pub name: &'static str,
    pub symptoms: &'static [&'static str],
    pub risk_score: f64,
    pub urgency: Urgency,
}

pub const DANGEROUS_COMBINATIONS: &[DangerousCombination] = &[
    DangerousCombination {
        name: "cardiac_emergency",
        symptoms: &["chest pain", "shortness of breath", "sweating", "nausea"],
        risk_score: 3.0,
        urgency: Urgency::Emergency,
    },
    DangerousCombination {
        name: "stroke_indicators",
        symptoms: &["sudden weakness on one side", "slurred speech", "confusion"],
        risk_score: 3.0,
        urgency: Urgency::Emergency,
    },
    DangerousCombination {
        name: "respiratory_distress",
        symptoms: &["severe shortness of breath", "chest tightness", "wheezing"],
        risk_score: 2.5,
        urgency: Urgency::Urgent,
    },
    DangerousCombination {
        name: "severe_infection",
        symptoms: &["high fever", "severe fatigue", "confusion", "rapid heartbeat"],
        risk_score: 2.0,
        urgency: Urgency::Urgent,
    },
    DangerousCombination {
        name: "neurological_concern",
        symptoms: &["severe headache", "vision problems", "confusion", "seizure"],
        risk_score: 2.5,
        urgency: Urgency::Urgent,
    },
];

/// Severity words, strongest class first.
const SEVERITY_INDICATORS: &[(SeverityLevel, &[&str])] = &[
    (SeverityLevel::Severe, &["severe", "intense", "unbearable", "extreme"]),
    (SeverityLevel::Moderate, &["moderate", "considerable"]),
    (SeverityLevel::Mild, &["mild", "slight", "minor"]),
];

/// Strongest severity class mentioned in `text`; mild when none is.
pub fn detect_severity(text: &str) -> SeverityLevel {
    SEVERITY_INDICATORS
        .iter()
        .find(|(_, words)| words.iter().any(|w| text.contains(w)))
        .map(|&(level, _)| level)
        .unwrap_or(SeverityLevel::Mild)
}

/// Additive age and chronic-condition risk, scaled by detected severity.
pub fn assess_risk(text: &str, patient: &PatientContext, config: &TriageConfig) -> RiskAssessment {
    let age = patient.age_or(config.default_age);
    let mut risk_score = 0.0;

    let age_risk = if age > config.high_risk_age {
        risk_score += config.high_age_risk;
        Some(AgeRisk::HighRisk)
    } else if age > config.medium_risk_age {
        risk_score += config.medium_age_risk;
        Some(AgeRisk::MediumRisk)
    } else {
        None
    };

    let chronic_conditions = patient.has_chronic_conditions();
    if chronic_conditions {
        risk_score += config.chronic_condition_risk;
    }

    let severity = detect_severity(text);
    risk_score *= match severity {
        SeverityLevel::Severe => config.severe_multiplier,
        SeverityLevel::Moderate => config.moderate_multiplier,
        SeverityLevel::Mild => config.mild_multiplier,
    };

    let escalation = if risk_score > config.escalate_two_threshold {
        2
    } else if risk_score > config.escalate_one_threshold {
        1
    } else {
        0
    };

    RiskAssessment {
        age: age_risk,
        chronic_conditions,
        severity,
        risk_score,
        escalation,
    }
}

/// Combinations with at least `min_ratio` of their symptoms reported.
///
/// A combination symptom counts as reported when it appears within any
/// reported symptom.
pub fn check_combinations(reported: &[String], min_ratio: f64) -> Vec<CombinationAlert> {
    DANGEROUS_COMBINATIONS
        .iter()
        .filter_map(|combo| {
            let matched: Vec<String> = combo
                .symptoms
                .iter()
                .filter(|s| reported.iter().any(|r| r.contains(*s)))
                .map(|s| s.to_string())
                .collect();
            let match_ratio = matched.len() as f64 / combo.symptoms.len() as f64;

            (match_ratio >= min_ratio).then(|| CombinationAlert {
                name: combo.name.to_string(),
                match_ratio,
                risk_score: combo.risk_score,
                urgency: combo.urgency,
                matched_symptoms: matched,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reported(symptoms: &[&str]) -> Vec<String> {
        symptoms.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_detect_severity() {
        assert_eq!(detect_severity("headache"), SeverityLevel::Mild);
        assert_eq!(detect_severity("slight cough"), SeverityLevel::Mild);
        assert_eq!(detect_severity("considerable pain"), SeverityLevel::Moderate);
        assert_eq!(detect_severity("mild cough unbearable headache"), SeverityLevel::Severe);
    }

    #[test]
    fn test_risk_with_defaults() {
        let config = TriageConfig::default();

        let young = assess_risk("fever", &PatientContext::with_age(30), &config);
        assert_eq!(young.age, None);
        assert_eq!(young.risk_score, 0.0);
        assert_eq!(young.escalation, 0);

        let mut elderly = PatientContext::with_age(70);
        elderly.chronic_conditions = vec!["diabetes".into()];
        let risk = assess_risk("severe headache", &elderly, &config);
        assert_eq!(risk.age, Some(AgeRisk::HighRisk));
        assert!(risk.chronic_conditions);
        assert_eq!(risk.severity, SeverityLevel::Severe);
        // (0.3 + 0.2) × 2.0 does not exceed the one-level threshold
        assert!((risk.risk_score - 1.0).abs() < 1e-9);
        assert_eq!(risk.escalation, 0);

        let middle = assess_risk("cough", &PatientContext::with_age(50), &config);
        assert_eq!(middle.age, Some(AgeRisk::MediumRisk));
    }

    #[test]
    fn test_escalation_thresholds() {
        let config = TriageConfig {
            high_age_risk: 0.6,
            ..TriageConfig::default()
        };
        let mut patient = PatientContext::with_age(80);

        // 0.6 × 2.0 = 1.2 → one level
        let risk = assess_risk("severe pain", &patient, &config);
        assert_eq!(risk.escalation, 1);

        // (0.6 + 0.2) × 2.0 = 1.6 → two levels
        patient.chronic_conditions = vec!["asthma".into()];
        let risk = assess_risk("severe pain", &patient, &config);
        assert_eq!(risk.escalation, 2);
    }

    #[test]
    fn test_cardiac_combination() {
        let alerts = check_combinations(&reported(&["severe chest pain", "shortness of breath"]), 0.5);
        assert_eq!(alerts.len(), 1);
        let cardiac = &alerts[0];
        assert_eq!(cardiac.name, "cardiac_emergency");
        assert_eq!(cardiac.urgency, Urgency::Emergency);
        assert_eq!(cardiac.match_ratio, 0.5);
        assert_eq!(cardiac.matched_symptoms, vec!["chest pain", "shortness of breath"]);
        assert_eq!(cardiac.display_name(), "cardiac emergency");
    }

    #[test]
    fn test_combination_below_ratio() {
        assert!(check_combinations(&reported(&["confusion"]), 0.5).is_empty());
        assert!(check_combinations(&[], 0.5).is_empty());

        let alerts = check_combinations(&reported(&["confusion", "slurred speech"]), 0.5);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].name, "stroke_indicators");
    }
}
