//! Keyword rules, condition patterns and department routing.

use crate::models::{Urgency, DEFAULT_DEPARTMENT};

/// Keywords that demand immediate care, checked first.
pub const EMERGENCY_KEYWORDS: &[&str] = &[
    "chest pain",
    "shortness of breath",
    "severe headache",
    "loss of consciousness",
    "severe bleeding",
    "heart attack",
    "stroke",
    "difficulty breathing",
];

/// Keywords that need care within hours.
pub const URGENT_KEYWORDS: &[&str] = &[
    "high fever",
    "severe pain",
    "difficulty breathing",
    "persistent vomiting",
    "severe abdominal pain",
    "rapid heartbeat",
    "dizziness with chest pain",
];

/// Common-illness keywords routed to a general practitioner.
pub const GP_KEYWORDS: &[&str] = &[
    "fever",
    "cough",
    "cold",
    "flu",
    "sore throat",
    "headache",
    "body ache",
    "nausea",
    "diarrhea",
    "stomach pain",
    "runny nose",
    "congestion",
    "fatigue",
];

/// Companions of fever that indicate a flu-like illness.
pub const FLU_COMPANIONS: &[&str] = &["cough", "cold", "sore throat", "body ache"];

/// Condition → keywords whose hit count ranks potential conditions.
pub const CONDITION_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Common Cold",
        &["cold", "runny nose", "sneezing", "congestion", "stuffy nose", "nasal"],
    ),
    (
        "Influenza",
        &[
            "fever",
            "cough",
            "body ache",
            "fatigue",
            "headache",
            "chills",
            "body pain",
            "muscle ache",
        ],
    ),
    (
        "Upper Respiratory Infection",
        &["cough", "sore throat", "fever", "congestion", "throat", "respiratory"],
    ),
    (
        "Gastroenteritis",
        &[
            "nausea",
            "diarrhea",
            "stomach pain",
            "vomiting",
            "stomach",
            "abdominal pain",
            "upset stomach",
        ],
    ),
    (
        "Migraine",
        &["severe headache", "headache", "nausea", "light sensitivity", "head pain"],
    ),
    (
        "Food Poisoning",
        &["nausea", "vomiting", "diarrhea", "stomach pain", "stomach cramps"],
    ),
    ("Tension Headache", &["headache", "head pain", "stress", "tension"]),
    (
        "Anxiety",
        &[
            "rapid heartbeat",
            "dizziness",
            "shortness of breath",
            "chest tightness",
            "anxious",
            "panic",
        ],
    ),
    (
        "Allergic Rhinitis",
        &["sneezing", "runny nose", "itchy", "watery eyes", "nasal congestion"],
    ),
    ("Sinusitis", &["sinus", "facial pain", "headache", "congestion", "pressure"]),
    ("Bronchitis", &["cough", "chest congestion", "mucus", "wheezing"]),
    ("Viral Infection", &["fever", "fatigue", "body ache", "weakness"]),
    ("Dehydration", &["dizziness", "fatigue", "dry", "thirst", "weakness"]),
    ("Indigestion", &["stomach", "bloating", "gas", "discomfort", "heartburn"]),
    ("Fever", &["fever", "high temperature", "hot", "chills"]),
];

/// Department for a top-ranked potential condition.
///
/// Routing follows the condition with the most keyword hits, not the final
/// urgency: an emergency whose only hit is "shortness of breath" routes to
/// Psychiatry through Anxiety.
pub const CONDITION_DEPARTMENTS: &[(&str, &str)] = &[
    ("Common Cold", "General Medicine"),
    ("Influenza", "General Medicine"),
    ("Upper Respiratory Infection", "ENT"),
    ("Gastroenteritis", "Gastroenterology"),
    ("Migraine", "Neurology"),
    ("Food Poisoning", "General Medicine"),
    ("Anxiety", "Psychiatry"),
];

/// Outcome of the keyword rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordVerdict {
    pub urgency: Urgency,
    pub statement: &'static str,
}

/// Apply the priority-ordered keyword rules to the joined symptom text.
///
/// `distinct_symptoms` feeds the multi-symptom fallback, which routes to a
/// GP when more than `multi_symptom_threshold` symptoms match no keyword.
pub fn keyword_verdict(
    text: &str,
    distinct_symptoms: usize,
    multi_symptom_threshold: usize,
) -> KeywordVerdict {
    let contains_any = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));

    if contains_any(EMERGENCY_KEYWORDS) {
        KeywordVerdict {
            urgency: Urgency::Emergency,
            statement: "Emergency symptoms detected. Seek immediate medical attention.",
        }
    } else if contains_any(URGENT_KEYWORDS) {
        KeywordVerdict {
            urgency: Urgency::Urgent,
            statement: "Urgent symptoms detected. Medical attention needed within few hours.",
        }
    } else if contains_any(GP_KEYWORDS) {
        let statement = if text.contains("fever") && contains_any(FLU_COMPANIONS) {
            "Flu-like symptoms with fever detected. GP consultation recommended."
        } else {
            "Common illness symptoms detected. Consult with a general practitioner."
        };
        KeywordVerdict {
            urgency: Urgency::Gp,
            statement,
        }
    } else if distinct_symptoms > multi_symptom_threshold {
        KeywordVerdict {
            urgency: Urgency::Gp,
            statement: "Multiple symptoms detected. GP consultation recommended for proper diagnosis.",
        }
    } else {
        KeywordVerdict {
            urgency: Urgency::SelfCare,
            statement: "Minor symptoms detected. Self-care measures may be sufficient, but monitor closely.",
        }
    }
}

/// Conditions ranked by keyword hits (at least one), best first, ties in
/// table order.
pub fn potential_conditions(text: &str, limit: usize) -> Vec<String> {
    let mut scored: Vec<(&str, usize)> = CONDITION_KEYWORDS
        .iter()
        .map(|(condition, keywords)| {
            let hits = keywords.iter().filter(|k| text.contains(*k)).count();
            (*condition, hits)
        })
        .filter(|&(_, hits)| hits > 0)
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
        .into_iter()
        .take(limit)
        .map(|(condition, _)| condition.to_string())
        .collect()
}

/// Department of the top condition, "General Medicine" when unmapped.
pub fn department_for(conditions: &[String]) -> &'static str {
    conditions
        .first()
        .and_then(|top| {
            CONDITION_DEPARTMENTS
                .iter()
                .find(|(condition, _)| condition == top)
                .map(|&(_, department)| department)
        })
        .unwrap_or(DEFAULT_DEPARTMENT)
}
