//! Knowledge base sources: JSON bundles, metadata files and SQLite.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::{KnowledgeBase, KnowledgeBaseBuilder, KnowledgeBaseError, KnowledgeBaseResult};
use crate::db::Database;
use crate::models::{
    DiseaseMetadata, DiseaseRecord, Prevalence, Urgency, DEFAULT_AGE_GROUP, DEFAULT_DEPARTMENT,
};

const BUILTIN_KNOWLEDGE_BASE: &str = include_str!("../../data/knowledge_base.json");

/// A list given either as a JSON array or a comma-separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextList {
    Items(Vec<String>),
    Joined(String),
}

impl Default for TextList {
    fn default() -> Self {
        TextList::Items(Vec::new())
    }
}

impl TextList {
    fn into_vec(self) -> Vec<String> {
        match self {
            TextList::Items(items) => items,
            TextList::Joined(text) => text.split(',').map(|s| s.trim().to_string()).collect(),
        }
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect()
    }
}

/// Disease entry as found in a bundle. Every field but `name` is optional.
#[derive(Debug, Deserialize)]
struct DiseaseEntry {
    #[serde(alias = "disease", alias = "condition")]
    name: String,
    #[serde(default)]
    department: Option<String>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    prevalence: Option<String>,
    #[serde(default, alias = "age_group")]
    common_age_group: Option<String>,
    #[serde(default)]
    primary_symptoms: TextList,
    #[serde(default)]
    secondary_symptoms: TextList,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    treatment: TextList,
    #[serde(default)]
    when_to_see_doctor: Option<String>,
    #[serde(default)]
    duration: Option<String>,
}

impl DiseaseEntry {
    fn into_record(self) -> DiseaseRecord {
        let mut record = DiseaseRecord::new(self.name.trim());

        if let Some(department) = non_blank(self.department) {
            record.department = department;
        }
        if let Some(label) = non_blank(self.severity) {
            record.severity = Urgency::parse_label(&label).unwrap_or_else(|| {
                tracing::warn!(disease = %record.name, severity = %label, "Unknown severity, using GP");
                Urgency::Gp
            });
        }
        if let Some(label) = non_blank(self.prevalence) {
            record.prevalence = Prevalence::parse_label(&label).unwrap_or_else(|| {
                tracing::warn!(disease = %record.name, prevalence = %label, "Unknown prevalence, using Common");
                Prevalence::default()
            });
        }
        record.age_group =
            non_blank(self.common_age_group).unwrap_or_else(|| DEFAULT_AGE_GROUP.to_string());
        record.description = non_blank(self.description).unwrap_or_default();
        record.primary_symptoms = self.primary_symptoms.into_vec();
        record.secondary_symptoms = self.secondary_symptoms.into_vec();
        record.treatment = self.treatment.into_vec();
        record.when_to_see_doctor = non_blank(self.when_to_see_doctor);
        record.duration = non_blank(self.duration);

        if record.department.trim().is_empty() {
            record.department = DEFAULT_DEPARTMENT.to_string();
        }
        record
    }
}

/// Top-level bundle layout.
#[derive(Debug, Deserialize)]
struct Bundle {
    #[serde(default)]
    diseases: Vec<DiseaseEntry>,
    #[serde(default)]
    symptom_lexicon: BTreeMap<String, Vec<String>>,
    #[serde(default, alias = "disease_database")]
    disease_metadata: BTreeMap<String, DiseaseMetadata>,
}

/// Standalone metadata file: `{"disease_database": {"<name>": {...}}}`.
#[derive(Debug, Deserialize)]
struct MetadataFile {
    #[serde(alias = "disease_metadata")]
    disease_database: BTreeMap<String, DiseaseMetadata>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl KnowledgeBaseBuilder {
    /// Add every disease, synonym and metadata entry of a JSON bundle.
    pub fn add_json_bundle(&mut self, json: &str) -> KnowledgeBaseResult<usize> {
        let bundle: Bundle = serde_json::from_str(json)?;

        let mut added = 0;
        for entry in bundle.diseases {
            if self.add_disease(entry.into_record()) {
                added += 1;
            }
        }
        for (canonical, synonyms) in &bundle.symptom_lexicon {
            self.add_synonyms(canonical, synonyms);
        }
        for (name, metadata) in bundle.disease_metadata {
            self.add_metadata(&name, metadata);
        }
        Ok(added)
    }

    /// Add narrative metadata from a `disease_database` JSON document.
    pub fn add_metadata_json(&mut self, json: &str) -> KnowledgeBaseResult<usize> {
        let file: MetadataFile = serde_json::from_str(json)?;
        let count = file.disease_database.len();
        for (name, metadata) in file.disease_database {
            self.add_metadata(&name, metadata);
        }
        Ok(count)
    }
}

impl KnowledgeBase {
    /// The knowledge base bundled with the crate.
    pub fn builtin() -> KnowledgeBaseResult<Self> {
        let kb = Self::from_json_str(BUILTIN_KNOWLEDGE_BASE)?;
        if kb.is_empty() {
            return Err(KnowledgeBaseError::Invalid(
                "bundled knowledge base has no diseases".into(),
            ));
        }
        Ok(kb)
    }

    /// Parse a JSON bundle.
    pub fn from_json_str(json: &str) -> KnowledgeBaseResult<Self> {
        let mut builder = KnowledgeBaseBuilder::new();
        builder.add_json_bundle(json)?;
        Ok(builder.build())
    }

    /// Load a JSON bundle from disk, optionally joining a metadata file.
    pub fn from_json_file(
        path: impl AsRef<Path>,
        metadata: Option<&Path>,
    ) -> KnowledgeBaseResult<Self> {
        let path = path.as_ref();
        let mut builder = KnowledgeBaseBuilder::new();
        builder.add_json_bundle(&std::fs::read_to_string(path)?)?;

        if let Some(metadata) = metadata {
            let joined = builder.add_metadata_json(&std::fs::read_to_string(metadata)?)?;
            tracing::debug!(path = %metadata.display(), entries = joined, "Disease metadata loaded");
        }

        let kb = builder.build();
        tracing::info!(
            path = %path.display(),
            diseases = kb.disease_count(),
            symptoms = kb.symptom_count(),
            "Knowledge base loaded"
        );
        Ok(kb)
    }

    /// Load from a SQLite catalog created by [`Database::import_knowledge_base`].
    pub fn from_sqlite(path: impl AsRef<Path>) -> KnowledgeBaseResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(KnowledgeBaseError::Invalid(format!(
                "database not found: {}",
                path.display()
            )));
        }
        let db = Database::open(path)?;
        let kb = db.load_knowledge_base()?;
        tracing::info!(
            path = %path.display(),
            diseases = kb.disease_count(),
            symptoms = kb.symptom_count(),
            "Knowledge base loaded"
        );
        Ok(kb)
    }

    /// Like [`KnowledgeBase::from_json_file`], but a missing or malformed
    /// source yields an empty knowledge base instead of an error.
    pub fn load_json_file_or_empty(path: impl AsRef<Path>, metadata: Option<&Path>) -> Self {
        let path = path.as_ref();
        Self::from_json_file(path, metadata).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Knowledge base unavailable, starting empty");
            Self::empty()
        })
    }

    /// Like [`KnowledgeBase::from_sqlite`], but failures yield an empty knowledge base.
    pub fn load_sqlite_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::from_sqlite(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Knowledge base unavailable, starting empty");
            Self::empty()
        })
    }
}
