//! Medicine catalog models and recommendation output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{PatientContext, Urgency};

/// Priority every medicine starts from.
pub const BASE_PRIORITY: u32 = 5;

/// Side-effect count above which a medicine loses one priority point.
pub const MANY_SIDE_EFFECTS: usize = 3;

/// A single medicine of the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicineInfo {
    /// Generic (international) name
    pub generic_name: String,
    /// Brand names the medicine is sold under
    #[serde(default)]
    pub brand_names: Vec<String>,
    /// Therapeutic class (e.g., "Analgesic", "Emergency antiplatelet")
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Dosage by population (e.g., "adult" → "500mg every 6 hours")
    #[serde(default)]
    pub dosage: BTreeMap<String, String>,
    /// Available over the counter
    #[serde(default)]
    pub otc: bool,
    #[serde(default)]
    pub pregnancy_safe: bool,
    #[serde(default)]
    pub side_effects: Vec<String>,
    #[serde(default)]
    pub contraindications: Vec<String>,
    /// Conditions and symptoms the medicine treats, for symptom search
    #[serde(default)]
    pub conditions: Vec<String>,
}

/// Minimum age for medicines whose generic name contains the restriction key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgeRestriction {
    pub min_age: u32,
    pub reason: String,
}

/// Outcome of the patient safety checks for one medicine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SafetyCheck {
    /// False when a hard restriction (age) applies
    pub safe: bool,
    pub warnings: Vec<String>,
    pub contraindications: Vec<String>,
}

impl MedicineInfo {
    pub fn new(generic_name: impl Into<String>) -> Self {
        Self {
            generic_name: generic_name.into(),
            brand_names: Vec::new(),
            kind: String::new(),
            dosage: BTreeMap::new(),
            otc: false,
            pregnancy_safe: false,
            side_effects: Vec::new(),
            contraindications: Vec::new(),
            conditions: Vec::new(),
        }
    }

    /// Ranking priority (at least 1). Over-the-counter and pregnancy-safe
    /// medicines rank higher; emergency medicines rank higher still when the
    /// condition is an emergency.
    pub fn priority(&self, urgency: Option<Urgency>) -> u32 {
        let mut priority = BASE_PRIORITY as i64;
        if self.otc {
            priority += 3;
        }
        if self.pregnancy_safe {
            priority += 2;
        }
        if self.side_effects.len() > MANY_SIDE_EFFECTS {
            priority -= 1;
        }
        if urgency == Some(Urgency::Emergency) && self.kind.to_lowercase().contains("emergency") {
            priority += 5;
        }
        priority.max(1) as u32
    }

    /// Check the medicine against the patient's age and pregnancy status.
    pub fn safety_check(
        &self,
        patient: &PatientContext,
        restrictions: &BTreeMap<String, AgeRestriction>,
    ) -> SafetyCheck {
        let mut check = SafetyCheck {
            safe: true,
            warnings: Vec::new(),
            contraindications: Vec::new(),
        };

        if let Some(age) = patient.age {
            let name = self.generic_name.to_lowercase();
            for (key, restriction) in restrictions {
                if name.contains(&key.to_lowercase()) && age < restriction.min_age {
                    check.safe = false;
                    check.contraindications.push(format!(
                        "Not recommended for age {age}. Minimum age: {}. Reason: {}",
                        restriction.min_age, restriction.reason
                    ));
                }
            }
        }

        if patient.pregnant && !self.pregnancy_safe {
            check
                .warnings
                .push("Consult doctor before use during pregnancy".to_string());
        }

        check.warnings.extend(
            self.contraindications
                .iter()
                .map(|c| format!("Contraindicated in: {c}")),
        );
        check
    }
}

/// One ranked medicine suggestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicineRecommendation {
    pub medicine_name: String,
    pub brand_names: Vec<String>,
    pub kind: String,
    pub dosage: BTreeMap<String, String>,
    pub otc_available: bool,
    pub pregnancy_safe: bool,
    pub side_effects: Vec<String>,
    pub safety_check: SafetyCheck,
    pub priority: u32,
}

/// Result of [`crate::medicine::MedicineCatalog::recommend`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicineReport {
    /// Condition as requested
    pub condition: String,
    /// Priority descending, safe before unsafe on ties
    pub recommendations: Vec<MedicineRecommendation>,
    /// Explanation, present whenever `recommendations` is empty
    pub message: Option<String>,
    pub disclaimers: Vec<String>,
    pub safety_warnings: Vec<String>,
}

impl MedicineReport {
    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }

    /// Any recommendation requires a prescription.
    pub fn has_prescription(&self) -> bool {
        self.recommendations.iter().any(|r| !r.otc_available)
    }
}

/// A medicine found by symptom search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicineMatch {
    pub medicine_name: String,
    pub brand_names: Vec<String>,
    pub kind: String,
    /// The medicine's conditions that mention a searched symptom
    pub matching_conditions: Vec<String>,
    pub otc_available: bool,
}

/// Full catalog entry plus interactions and disclaimers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicineDetails {
    pub info: MedicineInfo,
    pub drug_interactions: Vec<String>,
    pub disclaimers: BTreeMap<String, String>,
}
