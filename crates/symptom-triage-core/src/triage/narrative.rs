//! Assessment text, recommendations, follow-up questions and clinical notes.

use crate::models::{CombinationAlert, RiskAssessment, Urgency};

/// Recommendations for an urgency level.
pub fn recommendations(urgency: Urgency) -> Vec<String> {
    let items: &[&str] = match urgency {
        Urgency::SelfCare => &[
            "Monitor symptoms and rest",
            "Stay hydrated",
            "Consider over-the-counter remedies if appropriate",
            "Seek medical advice if symptoms worsen or persist >48-72 hours",
        ],
        Urgency::Gp => &[
            "Schedule an appointment with your general practitioner",
            "Monitor symptoms closely",
            "Seek urgent care if symptoms worsen significantly",
            "Keep a symptom diary",
        ],
        Urgency::Urgent => &[
            "Seek medical attention within 2-4 hours",
            "Go to urgent care or contact your doctor immediately",
            "Do not delay seeking medical care",
            "Have someone accompany you if possible",
        ],
        Urgency::Emergency => &[
            "SEEK IMMEDIATE EMERGENCY CARE",
            "Call emergency services or go to ER immediately",
            "Do not drive yourself",
            "Inform medical staff of all symptoms immediately",
        ],
    };
    items.iter().map(|s| s.to_string()).collect()
}

/// General questions followed by symptom-specific ones, at most `limit`.
pub fn follow_up_questions(reported: &[String], limit: usize) -> Vec<String> {
    let mentions = |word: &str| reported.iter().any(|s| s.contains(word));

    let mut questions = vec![
        "How long have you been experiencing these symptoms?",
        "Have the symptoms gotten better, worse, or stayed the same?",
        "Are you currently taking any medications?",
    ];
    if mentions("pain") {
        questions.push("On a scale of 1-10, how would you rate the pain intensity?");
    }
    if mentions("fever") {
        questions.push("What is your current temperature if measured?");
    }
    if mentions("headache") {
        questions.push("Is this different from your usual headaches?");
    }

    questions.into_iter().take(limit).map(str::to_string).collect()
}

/// "high", "moderate" or "lower" confidence sentence.
pub fn confidence_sentence(confidence: f64) -> &'static str {
    if confidence > 0.8 {
        "This assessment has high confidence."
    } else if confidence > 0.6 {
        "This assessment has moderate confidence."
    } else {
        "This assessment has lower confidence - please provide more details."
    }
}

/// Full assessment: keyword statement, care level, confidence, risk factors
/// and combination warnings.
pub fn assessment(
    statement: &str,
    urgency: Urgency,
    confidence: f64,
    risk: &RiskAssessment,
    alerts: &[CombinationAlert],
) -> String {
    let mut parts = vec![
        statement.to_string(),
        format!(
            "Based on the symptoms provided, the recommended care level is: {}.",
            urgency.as_str().to_uppercase()
        ),
        confidence_sentence(confidence).to_string(),
    ];

    let mut factors = Vec::new();
    if let Some(age) = risk.age {
        factors.push(format!("age category ({})", age.as_str()));
    }
    if risk.chronic_conditions {
        factors.push("existing chronic conditions".to_string());
    }
    factors.push(format!("symptom severity ({})", risk.severity.as_str()));
    parts.push(format!("Risk factors considered: {}.", factors.join(", ")));

    if !alerts.is_empty() {
        let mut warning =
            "Important: The combination of symptoms suggests possible serious conditions.".to_string();
        let serious: Vec<String> = alerts
            .iter()
            .filter(|a| a.urgency >= Urgency::Urgent)
            .map(CombinationAlert::display_name)
            .collect();
        if !serious.is_empty() {
            warning.push_str(&format!(" Specific concerns: {}.", serious.join(", ")));
        }
        parts.push(warning);
    }

    parts.join(" ")
}

/// Condition-aware clinical notes for the final urgency.
pub fn clinical_notes(reported: &[String], conditions: &[String], urgency: Urgency) -> String {
    let mentions = |word: &str| reported.iter().any(|s| s.contains(word));
    let has_condition = |name: &str| conditions.iter().any(|c| c == name);

    let mut notes = String::new();
    match urgency {
        Urgency::Emergency => {
            notes.push_str(
                "The combination of symptoms suggests a potentially serious condition requiring immediate medical evaluation. ",
            );
            if reported.iter().any(|s| s.contains("chest") && s.contains("pain")) {
                notes.push_str(
                    "Chest pain combined with other symptoms can indicate cardiac issues or pulmonary conditions. ",
                );
            }
            if mentions("breath") {
                notes.push_str(
                    "Breathing difficulties require urgent assessment to rule out respiratory or cardiac complications. ",
                );
            }
            notes.push_str("Emergency department evaluation is strongly recommended.");
        }
        Urgency::Urgent => {
            notes.push_str("The presented symptoms indicate a condition that requires prompt medical attention. ");
            if mentions("fever") && mentions("severe") {
                notes.push_str("High fever combined with other symptoms may indicate a serious infection. ");
            }
            notes.push_str("Medical evaluation within the next few hours is recommended to prevent complications.");
        }
        Urgency::Gp => {
            notes.push_str(
                "Based on the symptoms presented, consultation with a general practitioner is recommended. ",
            );
            if conditions.is_empty() {
                notes.push_str("Medical evaluation is recommended for proper assessment and treatment guidance.");
            } else if has_condition("Influenza") || has_condition("Common Cold") {
                notes.push_str("These symptoms are typical of viral upper respiratory infections. ");
                if mentions("fever") {
                    notes.push_str("The presence of fever suggests an active infection that should be monitored. ");
                }
                notes.push_str(
                    "While often self-limiting, medical evaluation can provide appropriate treatment and symptom management.",
                );
            } else if has_condition("Gastroenteritis") {
                notes.push_str("Gastrointestinal symptoms may indicate viral or bacterial gastroenteritis. ");
                notes.push_str(
                    "Medical evaluation is important to assess hydration status and determine appropriate treatment.",
                );
            } else if has_condition("Migraine") {
                notes.push_str("Headache pattern may suggest migraine or tension-type headache. ");
                notes.push_str(
                    "Medical evaluation can help establish diagnosis and provide appropriate pain management strategies.",
                );
            } else {
                notes.push_str("A medical professional can provide proper diagnosis and treatment recommendations.");
            }
        }
        Urgency::SelfCare => {
            notes.push_str("The reported symptoms appear to be mild and may be manageable with self-care measures. ");
            notes.push_str(
                "However, if symptoms worsen, persist, or new concerning symptoms develop, medical evaluation should be sought. ",
            );
            notes.push_str("Monitor symptoms closely and maintain good hydration and rest.");
        }
    }
    notes
}
