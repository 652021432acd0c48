//! Incremental construction of a [`KnowledgeBase`].

use std::collections::{HashMap, HashSet};

use sha2::{Digest, Sha256};

use super::KnowledgeBase;
use crate::models::{normalize_text, CanonicalSymptom, DiseaseMetadata, DiseaseRecord, SymptomLink};

/// Accumulates diseases, synonyms and metadata, then freezes them into a
/// [`KnowledgeBase`].
///
/// Duplicate disease names keep the first record. A symptom listed twice for
/// the same disease keeps its first (primary-before-secondary) link.
#[derive(Debug, Default)]
pub struct KnowledgeBaseBuilder {
    diseases: Vec<DiseaseRecord>,
    disease_names: HashSet<String>,
    symptoms: Vec<CanonicalSymptom>,
    symptom_index: HashMap<String, usize>,
    links: Vec<Vec<SymptomLink>>,
    lexicon: Vec<(String, Vec<String>)>,
    metadata: Vec<(String, DiseaseMetadata)>,
}

impl KnowledgeBaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a disease and index its symptoms. Returns `false` when skipped.
    ///
    /// Symptom lists are normalized; a symptom listed as both primary and
    /// secondary stays primary only.
    pub fn add_disease(&mut self, mut record: DiseaseRecord) -> bool {
        record.name = record.name.trim().to_string();
        if record.name.is_empty() {
            tracing::warn!("Skipping disease record without a name");
            return false;
        }
        if !self.disease_names.insert(record.name.clone()) {
            tracing::warn!(disease = %record.name, "Duplicate disease record ignored");
            return false;
        }

        record.primary_symptoms = clean_symptoms(&record.primary_symptoms, &[]);
        record.secondary_symptoms =
            clean_symptoms(&record.secondary_symptoms, &record.primary_symptoms);

        let classified: Vec<_> = record
            .classified_symptoms()
            .map(|(s, class)| (s.to_string(), class))
            .collect();
        for (symptom, class) in classified {
            let index = self.symptom_slot(&symptom);
            let links = &mut self.links[index];
            if links.iter().any(|l| l.disease == record.name) {
                continue;
            }
            links.push(SymptomLink::new(record.name.clone(), class));
        }

        self.diseases.push(record);
        true
    }

    /// Register synonyms for a canonical symptom. Applied at build time.
    pub fn add_synonyms<I, S>(&mut self, canonical: &str, synonyms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let canonical = normalize_text(canonical);
        if canonical.is_empty() {
            return;
        }
        let synonyms = synonyms
            .into_iter()
            .map(|s| normalize_text(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();
        self.lexicon.push((canonical, synonyms));
    }

    /// Attach narrative metadata to a disease by name. Applied at build time.
    pub fn add_metadata(&mut self, disease: &str, metadata: DiseaseMetadata) {
        self.metadata.push((disease.trim().to_string(), metadata));
    }

    pub fn disease_count(&self) -> usize {
        self.diseases.len()
    }

    /// Freeze into an immutable knowledge base.
    pub fn build(mut self) -> KnowledgeBase {
        self.apply_lexicon();
        self.apply_metadata();

        let fingerprint = fingerprint(&self.diseases, &self.symptoms);
        let kb = KnowledgeBase::from_parts(self.diseases, self.symptoms, self.links, fingerprint);

        let stats = kb.stats();
        tracing::debug!(
            diseases = stats.diseases,
            symptoms = stats.symptoms,
            synonyms = stats.synonyms,
            links = stats.links,
            "Knowledge base built"
        );
        kb
    }

    fn symptom_slot(&mut self, name: &str) -> usize {
        if let Some(&index) = self.symptom_index.get(name) {
            return index;
        }
        let index = self.symptoms.len();
        self.symptoms.push(CanonicalSymptom::new(name));
        self.symptom_index.insert(name.to_string(), index);
        self.links.push(Vec::new());
        index
    }

    fn apply_lexicon(&mut self) {
        let mut seen: HashSet<String> = self.symptom_index.keys().cloned().collect();

        for (canonical, synonyms) in std::mem::take(&mut self.lexicon) {
            let Some(&index) = self.symptom_index.get(&canonical) else {
                tracing::debug!(symptom = %canonical, "Synonyms for unreferenced symptom ignored");
                continue;
            };
            for synonym in synonyms {
                if !seen.insert(synonym.clone()) {
                    tracing::warn!(
                        symptom = %canonical,
                        synonym = %synonym,
                        "Synonym collides with an existing term, skipped"
                    );
                    continue;
                }
                self.symptoms[index].synonyms.push(synonym);
            }
        }
    }

    fn apply_metadata(&mut self) {
        for (name, metadata) in std::mem::take(&mut self.metadata) {
            match self
                .diseases
                .iter_mut()
                .find(|d| d.name.eq_ignore_ascii_case(&name))
            {
                Some(record) => record.apply_metadata(&metadata),
                None => tracing::debug!(disease = %name, "Metadata for unknown disease ignored"),
            }
        }
    }
}

/// Normalize, drop blanks and repeats, and drop anything already in `exclude`.
fn clean_symptoms(symptoms: &[String], exclude: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = exclude.iter().cloned().collect();
    symptoms
        .iter()
        .map(|s| normalize_text(s))
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

/// Content hash over diseases and vocabulary, field by field.
fn fingerprint(diseases: &[DiseaseRecord], symptoms: &[CanonicalSymptom]) -> String {
    const FIELD: &[u8] = &[0x1f];
    const RECORD: &[u8] = &[0x1e];

    let mut hasher = Sha256::new();
    for d in diseases {
        for field in [
            d.name.as_str(),
            d.department.as_str(),
            d.severity.as_str(),
            d.prevalence.as_str(),
            d.description.as_str(),
            d.age_group.as_str(),
            d.when_to_see_doctor.as_deref().unwrap_or(""),
            d.duration.as_deref().unwrap_or(""),
        ] {
            hasher.update(field.as_bytes());
            hasher.update(FIELD);
        }
        for list in [&d.primary_symptoms, &d.secondary_symptoms, &d.treatment] {
            hasher.update(list.join(",").as_bytes());
            hasher.update(FIELD);
        }
        hasher.update(RECORD);
    }
    for s in symptoms {
        hasher.update(s.name.as_bytes());
        hasher.update(FIELD);
        hasher.update(s.synonyms.join(",").as_bytes());
        hasher.update(RECORD);
    }
    hex::encode(hasher.finalize())
}
