//! Medicine recommendations for a predicted condition.
//!
//! Condition → medicine names → catalog entries → safety checks → ranking.
//! The catalog is a JSON document loaded once, like the knowledge base.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::models::{
    normalize_text, AgeRestriction, MedicineDetails, MedicineInfo, MedicineMatch,
    MedicineRecommendation, MedicineReport, PatientContext, Prediction, Urgency,
};

const BUILTIN_MEDICINE_CATALOG: &str = include_str!("../../data/medicine_database.json");

/// Message returned when no catalog could be loaded.
pub const CATALOG_UNAVAILABLE_MESSAGE: &str =
    "Medicine database not available. Please consult a healthcare professional.";

/// Message returned when the condition maps to no medicine.
pub const NO_RECOMMENDATION_MESSAGE: &str =
    "No specific medication recommendations available for this condition. Please consult a healthcare professional.";

/// Medicine catalog errors.
#[derive(Error, Debug)]
pub enum MedicineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type MedicineResult<T> = Result<T, MedicineError>;

/// Immutable medicine catalog.
///
/// Maps are ordered by key, so partial condition matches and searches are
/// deterministic.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedicineCatalog {
    #[serde(default)]
    condition_medicine_mapping: BTreeMap<String, Vec<String>>,
    /// Category → medicine name → entry
    #[serde(default)]
    medicine_database: BTreeMap<String, BTreeMap<String, MedicineInfo>>,
    #[serde(default)]
    age_restrictions: BTreeMap<String, AgeRestriction>,
    #[serde(default)]
    medical_disclaimers: BTreeMap<String, String>,
    #[serde(default)]
    drug_interactions: BTreeMap<String, Vec<String>>,
}

impl MedicineCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The catalog bundled with the crate.
    pub fn builtin() -> MedicineResult<Self> {
        Self::from_json_str(BUILTIN_MEDICINE_CATALOG)
    }

    pub fn from_json_str(json: &str) -> MedicineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> MedicineResult<Self> {
        let path = path.as_ref();
        let catalog = Self::from_json_str(&std::fs::read_to_string(path)?)?;
        tracing::info!(
            path = %path.display(),
            medicines = catalog.medicine_count(),
            conditions = catalog.condition_medicine_mapping.len(),
            "Medicine catalog loaded"
        );
        Ok(catalog)
    }

    /// Like [`MedicineCatalog::from_json_file`], but failures yield an empty catalog.
    pub fn load_json_file_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::from_json_file(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Medicine catalog unavailable, starting empty");
            Self::empty()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.medicine_database.values().all(BTreeMap::is_empty)
    }

    pub fn medicine_count(&self) -> usize {
        self.medicine_database.values().map(BTreeMap::len).sum()
    }

    /// Catalog entry by name (exact, then case-insensitive).
    pub fn medicine(&self, name: &str) -> Option<&MedicineInfo> {
        let medicines = || self.medicine_database.values().flat_map(|c| c.iter());
        medicines()
            .find(|(key, _)| key.as_str() == name)
            .or_else(|| medicines().find(|(key, _)| key.eq_ignore_ascii_case(name.trim())))
            .map(|(_, info)| info)
    }

    /// Medicine names for a condition: exact name, then case-insensitive,
    /// then the first mapping whose name contains or is contained in it.
    pub fn medicines_for(&self, condition: &str) -> &[String] {
        if let Some(names) = self.condition_medicine_mapping.get(condition) {
            return names;
        }
        let wanted = normalize_text(condition);
        if wanted.is_empty() {
            return &[];
        }
        let mapping = || self.condition_medicine_mapping.iter();
        mapping()
            .find(|(name, _)| name.to_lowercase() == wanted)
            .or_else(|| {
                mapping().find(|(name, _)| {
                    let name = name.to_lowercase();
                    name.contains(&wanted) || wanted.contains(&name)
                })
            })
            .map(|(_, names)| names.as_slice())
            .unwrap_or(&[])
    }

    /// Ranked, safety-checked medicines for `condition`. Never fails.
    pub fn recommend(
        &self,
        condition: &str,
        patient: &PatientContext,
        urgency: Option<Urgency>,
    ) -> MedicineReport {
        let mut report = MedicineReport {
            condition: condition.to_string(),
            recommendations: Vec::new(),
            message: None,
            disclaimers: Vec::new(),
            safety_warnings: Vec::new(),
        };

        if self.is_empty() {
            report.message = Some(CATALOG_UNAVAILABLE_MESSAGE.to_string());
            return report;
        }

        let mut recommendations: Vec<MedicineRecommendation> = self
            .medicines_for(condition)
            .iter()
            .filter_map(|name| {
                let info = self.medicine(name);
                if info.is_none() {
                    tracing::debug!(medicine = %name, "Mapped medicine missing from catalog");
                }
                info
            })
            .map(|info| MedicineRecommendation {
                medicine_name: info.generic_name.clone(),
                brand_names: info.brand_names.clone(),
                kind: info.kind.clone(),
                dosage: info.dosage.clone(),
                otc_available: info.otc,
                pregnancy_safe: info.pregnancy_safe,
                side_effects: info.side_effects.clone(),
                safety_check: info.safety_check(patient, &self.age_restrictions),
                priority: info.priority(urgency),
            })
            .collect();

        if recommendations.is_empty() {
            report.message = Some(NO_RECOMMENDATION_MESSAGE.to_string());
            return report;
        }

        // Stable: ties keep mapping order
        recommendations.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(b.safety_check.safe.cmp(&a.safety_check.safe))
        });
        report.recommendations = recommendations;
        report.disclaimers = self.disclaimers(&report);
        report.safety_warnings = safety_warnings(&report, urgency);

        tracing::debug!(
            condition = %condition,
            recommendations = report.recommendations.len(),
            "Medicine recommendations ready"
        );
        report
    }

    /// Recommendations for a prediction, using its severity as the urgency.
    pub fn recommend_for(&self, prediction: &Prediction, patient: &PatientContext) -> MedicineReport {
        self.recommend(&prediction.disease, patient, Some(prediction.severity))
    }

    /// Catalog entry with interactions and disclaimers.
    pub fn details(&self, name: &str) -> Option<MedicineDetails> {
        let info = self.medicine(name)?;
        Some(MedicineDetails {
            info: info.clone(),
            drug_interactions: self.interactions(&info.generic_name),
            disclaimers: self.medical_disclaimers.clone(),
        })
    }

    /// Interactions of the first entry whose key appears in `name`.
    pub fn interactions(&self, name: &str) -> Vec<String> {
        let name = name.to_lowercase();
        self.drug_interactions
            .iter()
            .find(|(key, _)| name.contains(&key.to_lowercase()))
            .map(|(_, interactions)| interactions.clone())
            .unwrap_or_default()
    }

    /// Medicines whose treated conditions mention any of `symptoms`.
    pub fn search_by_symptoms<S: AsRef<str>>(&self, symptoms: &[S]) -> Vec<MedicineMatch> {
        let symptoms: Vec<String> = symptoms
            .iter()
            .map(|s| normalize_text(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();

        let mut matches: Vec<MedicineMatch> = Vec::new();
        for info in self.medicine_database.values().flat_map(BTreeMap::values) {
            if matches.iter().any(|m| m.medicine_name == info.generic_name) {
                continue;
            }
            let matching_conditions: Vec<String> = info
                .conditions
                .iter()
                .filter(|condition| {
                    let condition = condition.to_lowercase();
                    symptoms
                        .iter()
                        .any(|s| condition.contains(s.as_str()) || s.contains(&condition))
                })
                .cloned()
                .collect();
            if matching_conditions.is_empty() {
                continue;
            }
            matches.push(MedicineMatch {
                medicine_name: info.generic_name.clone(),
                brand_names: info.brand_names.clone(),
                kind: info.kind.clone(),
                matching_conditions,
                otc_available: info.otc,
            });
        }
        matches
    }

    fn disclaimers(&self, report: &MedicineReport) -> Vec<String> {
        let mut keys = vec!["general"];
        if report.has_prescription() {
            keys.push("prescription");
        }
        keys.push("allergies");

        keys.into_iter()
            .filter_map(|key| self.medical_disclaimers.get(key))
            .filter(|text| !text.trim().is_empty())
            .cloned()
            .collect()
    }
}

fn safety_warnings(report: &MedicineReport, urgency: Option<Urgency>) -> Vec<String> {
    let mut warnings = Vec::new();
    if urgency == Some(Urgency::Emergency) {
        warnings.push(
            "For emergency conditions, seek immediate medical attention. Medications are supportive only."
                .to_string(),
        );
    }
    if report.recommendations.len() > 2 {
        warnings.push("If taking multiple medications, consult pharmacist for drug interactions.".to_string());
    }
    if report.has_prescription() {
        warnings.push("Some recommendations require prescription. Consult healthcare provider.".to_string());
    }
    warnings.push("Always read medication labels and follow dosing instructions.".to_string());
    warnings.push("Stop medication and seek help if you experience severe side effects.".to_string());
    warnings
}
