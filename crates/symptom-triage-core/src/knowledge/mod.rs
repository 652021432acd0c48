//! Knowledge base: disease records and the symptom → disease reverse index.
//!
//! Loaded once at startup, then shared read-only (typically behind an `Arc`)
//! by every scoring request. Nothing here is mutated after [`KnowledgeBaseBuilder::build`].

mod builder;
mod sources;

pub use builder::*;
pub use sources::*;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{normalize_text, CanonicalSymptom, DiseaseRecord, SymptomLink};

/// Knowledge base errors.
#[derive(Error, Debug)]
pub enum KnowledgeBaseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),

    #[error("Invalid knowledge base: {0}")]
    Invalid(String),
}

pub type KnowledgeBaseResult<T> = Result<T, KnowledgeBaseError>;

/// A matchable vocabulary term: a canonical name or one of its synonyms.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchTerm {
    /// Lower-cased term text
    pub text: String,
    /// Index of the canonical symptom it resolves to
    pub symptom: usize,
}

/// Summary counts for logging and health checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeStats {
    pub diseases: usize,
    pub symptoms: usize,
    pub synonyms: usize,
    pub links: usize,
    pub fingerprint: String,
}

/// Immutable, indexed disease/symptom knowledge base.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    diseases: Vec<DiseaseRecord>,
    disease_index: HashMap<String, usize>,
    symptoms: Vec<CanonicalSymptom>,
    symptom_index: HashMap<String, usize>,
    /// Links per canonical symptom, aligned with `symptoms`
    links: Vec<Vec<SymptomLink>>,
    terms: Vec<MatchTerm>,
    fingerprint: String,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::empty()
    }
}

impl KnowledgeBase {
    /// An empty knowledge base. Every prediction against it yields "no match".
    pub fn empty() -> Self {
        KnowledgeBaseBuilder::new().build()
    }

    pub(crate) fn from_parts(
        diseases: Vec<DiseaseRecord>,
        symptoms: Vec<CanonicalSymptom>,
        links: Vec<Vec<SymptomLink>>,
        fingerprint: String,
    ) -> Self {
        let disease_index = diseases
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();
        let symptom_index = symptoms
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.clone(), i))
            .collect();

        let mut terms = Vec::new();
        for (i, symptom) in symptoms.iter().enumerate() {
            terms.push(MatchTerm {
                text: symptom.name.clone(),
                symptom: i,
            });
            for synonym in &symptom.synonyms {
                terms.push(MatchTerm {
                    text: synonym.clone(),
                    symptom: i,
                });
            }
        }

        Self {
            diseases,
            disease_index,
            symptoms,
            symptom_index,
            links,
            terms,
            fingerprint,
        }
    }

    /// Look up a disease by exact name.
    pub fn disease(&self, name: &str) -> Option<&DiseaseRecord> {
        self.disease_index.get(name).map(|&i| &self.diseases[i])
    }

    /// All diseases in load order.
    pub fn diseases(&self) -> &[DiseaseRecord] {
        &self.diseases
    }

    /// All canonical symptoms in first-seen order.
    pub fn symptoms(&self) -> &[CanonicalSymptom] {
        &self.symptoms
    }

    /// Canonical symptom by index (as carried by [`MatchTerm`]).
    pub fn symptom_at(&self, index: usize) -> Option<&CanonicalSymptom> {
        self.symptoms.get(index)
    }

    /// Links for a canonical symptom; empty when unknown.
    pub fn links(&self, symptom: &str) -> &[SymptomLink] {
        self.symptom_index
            .get(&normalize_text(symptom))
            .map(|&i| self.links[i].as_slice())
            .unwrap_or(&[])
    }

    /// Links for a canonical symptom by index.
    pub fn links_at(&self, index: usize) -> &[SymptomLink] {
        self.links.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve a canonical name or synonym (exact, case-insensitive).
    pub fn canonical_for(&self, term: &str) -> Option<&CanonicalSymptom> {
        let key = normalize_text(term);
        self.terms
            .iter()
            .find(|t| t.text == key)
            .and_then(|t| self.symptoms.get(t.symptom))
    }

    /// Matchable vocabulary: each canonical name followed by its synonyms.
    pub fn terms(&self) -> &[MatchTerm] {
        &self.terms
    }

    pub fn disease_count(&self) -> usize {
        self.diseases.len()
    }

    pub fn symptom_count(&self) -> usize {
        self.symptoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty()
    }

    /// SHA-256 (hex) over the canonical content of the knowledge base.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn stats(&self) -> KnowledgeStats {
        KnowledgeStats {
            diseases: self.diseases.len(),
            symptoms: self.symptoms.len(),
            synonyms: self.symptoms.iter().map(|s| s.synonyms.len()).sum(),
            links: self.links.iter().map(Vec::len).sum(),
            fingerprint: self.fingerprint.clone(),
        }
    }
}
