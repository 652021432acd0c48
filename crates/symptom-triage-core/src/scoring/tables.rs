//! Fixed rule tables used by the scoring pipeline.

/// Severity words and the multiplier each applies to a symptom's contribution.
pub const SEVERITY_WORDS: &[(&str, f64)] = &[
    ("mild", 0.7),
    ("moderate", 1.0),
    ("severe", 1.4),
    ("intense", 1.5),
    ("extreme", 1.6),
    ("unbearable", 1.7),
];

/// Symptoms that strongly suggest specific high-severity diseases.
pub const CRITICAL_SYMPTOMS: &[(&str, &[&str])] = &[
    ("chest pain", &["Heart Attack", "Angina", "Pneumonia"]),
    ("severe chest pain", &["Heart Attack"]),
    (
        "shortness of breath",
        &["Pneumonia", "Asthma", "COPD", "Heart Failure", "Heart Attack"],
    ),
    ("slurred speech", &["Stroke"]),
    ("facial drooping", &["Stroke"]),
    ("sudden weakness", &["Stroke"]),
    ("severe headache", &["Stroke", "Migraine"]),
    ("loss of consciousness", &["Epilepsy", "Stroke"]),
    ("seizures", &["Epilepsy"]),
    ("coughing blood", &["Tuberculosis", "Pneumonia"]),
    ("blood in urine", &["Kidney Stones", "UTI"]),
    ("severe abdominal pain", &["Appendicitis", "Gallstones"]),
    ("jaundice", &["Hepatitis", "Cirrhosis", "Gallstones"]),
];

/// An age band and the diseases more common within it.
#[derive(Debug, Clone, Copy)]
pub struct AgeBand {
    pub label: &'static str,
    /// Inclusive upper bound, `None` for the open-ended last band
    pub max_age: Option<u32>,
    pub diseases: &'static [&'static str],
}

pub const AGE_BANDS: &[AgeBand] = &[
    AgeBand {
        label: "0-12",
        max_age: Some(12),
        diseases: &["Common Cold", "Influenza", "Asthma", "Type 1 Diabetes"],
    },
    AgeBand {
        label: "13-25",
        max_age: Some(25),
        diseases: &["Migraine", "Type 1 Diabetes", "PCOS", "IBS"],
    },
    AgeBand {
        label: "26-40",
        max_age: Some(40),
        diseases: &["Migraine", "IBS", "PCOS", "Multiple Sclerosis", "Crohn's Disease"],
    },
    AgeBand {
        label: "41-60",
        max_age: Some(60),
        diseases: &["Hypertension", "Type 2 Diabetes", "Rheumatoid Arthritis", "Gout"],
    },
    AgeBand {
        label: "61+",
        max_age: None,
        diseases: &[
            "Hypertension",
            "Type 2 Diabetes",
            "Heart Failure",
            "Stroke",
            "Alzheimer's Disease",
            "Osteoporosis",
        ],
    },
];

/// Symptom tuples that typically present together, and the diseases they suggest.
pub const COMMON_PATTERNS: &[(&[&str], &[&str])] = &[
    (&["fever", "cough"], &["Common Cold", "Influenza", "COVID-19", "Bronchitis"]),
    (&["fever", "headache"], &["Influenza", "Common Cold", "Tension Headache", "Migraine"]),
    (&["runny nose", "sneezing"], &["Common Cold", "Allergic Rhinitis"]),
    (&["sore throat", "fever"], &["Common Cold", "Influenza", "Tonsillitis"]),
    (&["headache", "fever"], &["Influenza", "Common Cold", "Tension Headache"]),
    (&["cough", "sore throat"], &["Common Cold", "Bronchitis", "Influenza"]),
    (&["body ache", "fever"], &["Influenza", "Common Cold"]),
    (&["fatigue", "fever"], &["Influenza", "Common Cold", "COVID-19"]),
    (&["headache", "nausea"], &["Migraine", "Tension Headache"]),
    (&["chest pain", "shortness of breath"], &["Heart Attack", "Angina", "Pneumonia"]),
];

/// Chronic-condition keywords and the diseases they make more likely.
pub const CHRONIC_CONDITION_BOOSTS: &[(&str, &[&str])] = &[
    (
        "diabetes",
        &["Type 2 Diabetes", "Type 1 Diabetes", "Chronic Kidney Disease", "Heart Attack", "Stroke"],
    ),
    (
        "hypertension",
        &["Hypertension", "Heart Attack", "Stroke", "Chronic Kidney Disease", "Heart Failure"],
    ),
    (
        "high blood pressure",
        &["Hypertension", "Heart Attack", "Stroke", "Chronic Kidney Disease"],
    ),
    ("asthma", &["Asthma", "COPD", "Bronchitis", "Pneumonia"]),
    ("heart disease", &["Heart Attack", "Angina", "Heart Failure", "Arrhythmia"]),
    ("kidney", &["Chronic Kidney Disease", "Kidney Stones", "UTI"]),
    ("thyroid", &["Hyperthyroidism", "Hypothyroidism"]),
    ("arthritis", &["Rheumatoid Arthritis", "Osteoarthritis", "Gout"]),
];

/// Highest severity multiplier whose word appears in `text` (lower-cased), 1.0 if none.
pub fn severity_multiplier(text: &str) -> f64 {
    SEVERITY_WORDS
        .iter()
        .filter(|(word, _)| text.contains(word))
        .map(|&(_, multiplier)| multiplier)
        .reduce(f64::max)
        .unwrap_or(1.0)
}

/// `text` with standalone severity words removed, or `text` itself when
/// nothing else is left.
pub fn strip_severity_words(text: &str) -> String {
    let stripped: Vec<&str> = text
        .split_whitespace()
        .filter(|token| !SEVERITY_WORDS.iter().any(|(word, _)| token == word))
        .collect();
    if stripped.is_empty() {
        text.to_string()
    } else {
        stripped.join(" ")
    }
}

/// The band containing `age`.
pub fn age_band(age: u32) -> &'static AgeBand {
    AGE_BANDS
        .iter()
        .find(|band| band.max_age.map_or(true, |max| age <= max))
        .unwrap_or(&AGE_BANDS[AGE_BANDS.len() - 1])
}

/// Diseases flagged by every critical symptom found in `text` (lower-cased).
/// A disease appears once per matching entry.
pub fn critical_diseases(text: &str) -> impl Iterator<Item = &'static str> + '_ {
    CRITICAL_SYMPTOMS
        .iter()
        .filter(move |(symptom, _)| text.contains(symptom))
        .flat_map(|(_, diseases)| diseases.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_takes_maximum() {
        assert_eq!(severity_multiplier("headache"), 1.0);
        assert_eq!(severity_multiplier("mild headache"), 0.7);
        assert_eq!(severity_multiplier("severe headache"), 1.4);
        assert_eq!(severity_multiplier("mild but sometimes unbearable pain"), 1.7);
        assert_eq!(severity_multiplier("severely painful"), 1.4);
    }

    #[test]
    fn test_strip_severity_words() {
        assert_eq!(strip_severity_words("severe chest pain"), "chest pain");
        assert_eq!(strip_severity_words("mild  headache"), "headache");
        assert_eq!(strip_severity_words("severely painful"), "severely painful");
        assert_eq!(strip_severity_words("extreme"), "extreme");
        assert_eq!(strip_severity_words("cough"), "cough");
    }

    #[test]
    fn test_age_bands() {
        assert_eq!(age_band(0).label, "0-12");
        assert_eq!(age_band(12).label, "0-12");
        assert_eq!(age_band(13).label, "13-25");
        assert_eq!(age_band(30).label, "26-40");
        assert_eq!(age_band(55).label, "41-60");
        assert_eq!(age_band(61).label, "61+");
        assert_eq!(age_band(130).label, "61+");
    }

    #[test]
    fn test_critical_entries_compound() {
        let hits: Vec<&str> = critical_diseases("severe chest pain").collect();
        assert_eq!(
            hits.iter().filter(|d| **d == "Heart Attack").count(),
            2,
            "both 'chest pain' and 'severe chest pain' apply"
        );
        assert!(hits.contains(&"Angina"));
        assert_eq!(critical_diseases("runny nose").count(), 0);
    }

    #[test]
    fn test_chronic_table_keys_lowercase() {
        for (keyword, diseases) in CHRONIC_CONDITION_BOOSTS {
            assert_eq!(*keyword, keyword.to_lowercase());
            assert!(!diseases.is_empty());
        }
    }
}
