//! Knowledge-base models: diseases, canonical symptoms and their links.

use serde::{Deserialize, Serialize};

use super::Urgency;

/// Department used when a record does not name one.
pub const DEFAULT_DEPARTMENT: &str = "General Medicine";

/// Age group used when a record does not name one.
pub const DEFAULT_AGE_GROUP: &str = "All ages";

/// Coarse frequency label used to bias scores toward common conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prevalence {
    #[serde(rename = "Very Common")]
    VeryCommon,
    #[serde(rename = "Common")]
    Common,
    #[serde(rename = "Seasonal")]
    Seasonal,
    #[serde(rename = "Pandemic")]
    Pandemic,
    #[serde(rename = "Moderate")]
    Moderate,
    #[serde(rename = "Rare")]
    Rare,
    #[serde(rename = "Very Rare")]
    VeryRare,
}

impl Prevalence {
    /// Score multiplier applied during prevalence adjustment.
    pub fn multiplier(&self) -> f64 {
        match self {
            Prevalence::VeryCommon => 2.0,
            Prevalence::Common => 1.5,
            Prevalence::Seasonal => 1.3,
            Prevalence::Pandemic => 1.3,
            Prevalence::Moderate => 1.0,
            Prevalence::Rare => 0.6,
            Prevalence::VeryRare => 0.3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Prevalence::VeryCommon => "Very Common",
            Prevalence::Common => "Common",
            Prevalence::Seasonal => "Seasonal",
            Prevalence::Pandemic => "Pandemic",
            Prevalence::Moderate => "Moderate",
            Prevalence::Rare => "Rare",
            Prevalence::VeryRare => "Very Rare",
        }
    }

    /// Parse a label case-insensitively. "Uncommon" is treated as `Moderate`.
    pub fn parse_label(label: &str) -> Option<Prevalence> {
        match label.trim().to_lowercase().as_str() {
            "very common" => Some(Prevalence::VeryCommon),
            "common" => Some(Prevalence::Common),
            "seasonal" => Some(Prevalence::Seasonal),
            "pandemic" => Some(Prevalence::Pandemic),
            "moderate" | "uncommon" => Some(Prevalence::Moderate),
            "rare" => Some(Prevalence::Rare),
            "very rare" => Some(Prevalence::VeryRare),
            _ => None,
        }
    }
}

impl Default for Prevalence {
    fn default() -> Self {
        Prevalence::Common
    }
}

/// Diagnostic weight class of a disease-associated symptom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymptomClass {
    Primary,
    Secondary,
}

impl SymptomClass {
    /// Fixed link weight: primary 2.0, secondary 1.0.
    pub fn weight(&self) -> f64 {
        match self {
            SymptomClass::Primary => 2.0,
            SymptomClass::Secondary => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SymptomClass::Primary => "primary",
            SymptomClass::Secondary => "secondary",
        }
    }

    pub fn parse_label(label: &str) -> Option<SymptomClass> {
        match label.trim().to_lowercase().as_str() {
            "primary" => Some(SymptomClass::Primary),
            "secondary" => Some(SymptomClass::Secondary),
            _ => None,
        }
    }
}

/// A disease entry of the knowledge base. Read-only after load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiseaseRecord {
    /// Unique disease name
    pub name: String,
    /// Department that treats the condition
    pub department: String,
    /// Care level the condition usually requires
    pub severity: Urgency,
    /// Frequency class
    pub prevalence: Prevalence,
    /// Short clinical description
    pub description: String,
    /// Typical age group (free text, informational)
    pub age_group: String,
    /// Primary symptoms, in dataset order
    pub primary_symptoms: Vec<String>,
    /// Secondary symptoms, in dataset order
    pub secondary_symptoms: Vec<String>,
    /// Treatment notes from the metadata source
    pub treatment: Vec<String>,
    /// Guidance on when to seek care
    pub when_to_see_doctor: Option<String>,
    /// Typical duration
    pub duration: Option<String>,
}

impl DiseaseRecord {
    /// Create a record with defaults for every optional field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            department: DEFAULT_DEPARTMENT.to_string(),
            severity: Urgency::default(),
            prevalence: Prevalence::default(),
            description: String::new(),
            age_group: DEFAULT_AGE_GROUP.to_string(),
            primary_symptoms: Vec::new(),
            secondary_symptoms: Vec::new(),
            treatment: Vec::new(),
            when_to_see_doctor: None,
            duration: None,
        }
    }

    /// Number of associated symptoms (primary + secondary).
    pub fn total_symptoms(&self) -> usize {
        self.primary_symptoms.len() + self.secondary_symptoms.len()
    }

    /// All symptoms with their class, primary first.
    pub fn classified_symptoms(&self) -> impl Iterator<Item = (&str, SymptomClass)> {
        self.primary_symptoms
            .iter()
            .map(|s| (s.as_str(), SymptomClass::Primary))
            .chain(
                self.secondary_symptoms
                    .iter()
                    .map(|s| (s.as_str(), SymptomClass::Secondary)),
            )
    }

    /// Merge richer metadata from a secondary source.
    pub fn apply_metadata(&mut self, metadata: &DiseaseMetadata) {
        if !metadata.treatment.is_empty() {
            self.treatment = metadata.treatment.clone();
        }
        if metadata.when_to_see_doctor.is_some() {
            self.when_to_see_doctor = metadata.when_to_see_doctor.clone();
        }
        if metadata.duration.is_some() {
            self.duration = metadata.duration.clone();
        }
    }
}

/// Optional narrative metadata joined onto a [`DiseaseRecord`] by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiseaseMetadata {
    #[serde(default)]
    pub treatment: Vec<String>,
    #[serde(default)]
    pub when_to_see_doctor: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
}

/// Normalized symptom name plus the synonyms that resolve to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalSymptom {
    /// Lower-cased canonical name (index key)
    pub name: String,
    /// Lower-cased synonyms
    pub synonyms: Vec<String>,
}

impl CanonicalSymptom {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            synonyms: Vec::new(),
        }
    }
}

/// Reverse-index entry: a canonical symptom points at a disease.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymptomLink {
    /// Linked disease name
    pub disease: String,
    /// Fixed weight derived from the class
    pub weight: f64,
    /// Primary or secondary
    pub class: SymptomClass,
}

impl SymptomLink {
    pub fn new(disease: impl Into<String>, class: SymptomClass) -> Self {
        Self {
            disease: disease.into(),
            weight: class.weight(),
            class,
        }
    }
}

/// Normalize free text for matching: lower-case, trim, collapse whitespace.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
