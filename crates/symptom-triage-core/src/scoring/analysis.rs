//! Clinical-style narrative for a ranked prediction list.

use crate::models::{ClinicalAnalysis, Prediction, Urgency};

/// Next step offered when the top disease has no guidance of its own.
pub const DEFAULT_NEXT_STEPS: &str =
    "Consult with healthcare professional for proper diagnosis and treatment plan.";

/// Care wording for a disease severity class.
pub fn urgency_wording(severity: Urgency) -> &'static str {
    match severity {
        Urgency::Emergency => "IMMEDIATE MEDICAL ATTENTION REQUIRED",
        Urgency::Urgent => "Seek medical care within 24 hours",
        Urgency::Gp => "Schedule appointment with primary care physician",
        Urgency::SelfCare => "Monitor symptoms, self-care measures may be sufficient",
    }
}

/// "High" at 70 and above, "Moderate" at 50 and above, otherwise "Low".
pub fn confidence_label(confidence: f64) -> &'static str {
    if confidence >= 70.0 {
        "High"
    } else if confidence >= 50.0 {
        "Moderate"
    } else {
        "Low"
    }
}

/// Build the narrative for `predictions` (ranked, best first).
pub fn clinical_analysis(
    predictions: &[Prediction],
    reported_symptoms: usize,
    age: Option<u32>,
) -> Option<ClinicalAnalysis> {
    let top = predictions.first()?;
    let urgency = urgency_wording(top.severity);

    let summary = match predictions {
        [only] => format!(
            "Based on symptom analysis, {} is the most likely condition ({:.1}% probability).",
            only.disease, only.probability
        ),
        [first, second, rest @ ..] => {
            let mut summary = format!(
                "Differential diagnosis suggests {} ({:.1}% probability) as the primary concern. \
                 Other possibilities include {} ({:.1}% probability)",
                first.disease, first.probability, second.disease, second.probability
            );
            match rest.first() {
                Some(third) => summary.push_str(&format!(
                    " and {} ({:.1}% probability).",
                    third.disease, third.probability
                )),
                None => summary.push('.'),
            }
            summary
        }
        [] => return None,
    };

    let mut symptom_analysis = format!(
        "Matched {} out of {} reported symptoms.",
        top.matched_symptoms, reported_symptoms
    );
    if top.has_critical_symptoms {
        symptom_analysis.push_str(" Critical symptoms detected that require prompt medical attention.");
    }

    let age_note = match (top.age_related, age) {
        (true, Some(age)) => format!("This condition is commonly seen in your age group ({age} years)."),
        (true, None) => "This condition is commonly seen in your age group.".to_string(),
        (false, _) => String::new(),
    };

    Some(ClinicalAnalysis {
        summary,
        urgency: urgency.to_string(),
        urgency_level: top.severity,
        department: top.department.clone(),
        symptom_analysis,
        age_note,
        recommendation: format!("Recommended department: {}. {}", top.department, urgency),
        confidence_level: confidence_label(top.confidence).to_string(),
        next_steps: top
            .when_to_see_doctor
            .clone()
            .unwrap_or_else(|| DEFAULT_NEXT_STEPS.to_string()),
    })
}
