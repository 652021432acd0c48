//! Fuzzy mapping of free-text symptoms onto the canonical vocabulary.

use std::collections::HashSet;

use strsim::{jaro_winkler, normalized_levenshtein};

use crate::config::ScoringConfig;
use crate::knowledge::{KnowledgeBase, MatchTerm};

/// Confidence of an exact (case-insensitive) match.
pub const EXACT_CONFIDENCE: f64 = 1.0;

/// Confidence of a substring match in either direction.
pub const SUBSTRING_CONFIDENCE: f64 = 0.9;

/// Scale applied to the token-overlap ratio.
pub const TOKEN_OVERLAP_SCALE: f64 = 0.8;

/// Best vocabulary hit for one reported symptom.
#[derive(Debug, Clone, PartialEq)]
pub struct SymptomMatch<'a> {
    /// Index of the canonical symptom
    pub symptom: usize,
    /// Canonical symptom name
    pub canonical: &'a str,
    /// Vocabulary term that matched (canonical name or synonym)
    pub term: &'a str,
    pub confidence: f64,
}

/// Typo tier parameters.
#[derive(Debug, Clone, Copy)]
struct TypoTier {
    threshold: f64,
    scale: f64,
}

/// Matches normalized symptom text against a knowledge base's vocabulary.
pub struct SymptomMatcher<'a> {
    kb: &'a KnowledgeBase,
    min_confidence: f64,
    typo: Option<TypoTier>,
}

impl<'a> SymptomMatcher<'a> {
    pub fn new(kb: &'a KnowledgeBase, config: &ScoringConfig) -> Self {
        Self {
            kb,
            min_confidence: config.min_match_confidence,
            typo: config.typo_matching.then_some(TypoTier {
                threshold: config.typo_threshold,
                scale: config.typo_scale,
            }),
        }
    }

    /// Best match for `input` (already normalized), or `None` when nothing
    /// clears the confidence floor.
    ///
    /// Equal confidences prefer the longer term, then vocabulary order.
    pub fn best_match(&self, input: &str) -> Option<SymptomMatch<'a>> {
        if input.is_empty() {
            return None;
        }

        let mut best: Option<(&'a MatchTerm, f64)> = None;
        for term in self.kb.terms() {
            let confidence = self.confidence(input, &term.text);
            let better = match best {
                None => true,
                Some((current, current_confidence)) => {
                    confidence > current_confidence
                        || (confidence == current_confidence && term.text.len() > current.text.len())
                }
            };
            if better {
                best = Some((term, confidence));
            }
            if confidence >= EXACT_CONFIDENCE {
                break;
            }
        }

        let (term, confidence) = best?;
        if confidence <= self.min_confidence {
            tracing::trace!(best = confidence, "No symptom match above floor");
            return None;
        }

        let canonical = self.kb.symptom_at(term.symptom)?;
        tracing::trace!(
            canonical = %canonical.name,
            term = %term.text,
            confidence,
            "Symptom matched"
        );
        Some(SymptomMatch {
            symptom: term.symptom,
            canonical: &canonical.name,
            term: &term.text,
            confidence,
        })
    }

    /// Tiered confidence of `input` against one vocabulary term.
    pub fn confidence(&self, input: &str, term: &str) -> f64 {
        let tiered = tier_confidence(input, term);
        if tiered >= SUBSTRING_CONFIDENCE {
            return tiered;
        }
        match self.typo {
            Some(typo) => {
                let similarity = fuzzy_match(input, term);
                if similarity >= typo.threshold {
                    tiered.max(similarity * typo.scale)
                } else {
                    tiered
                }
            }
            None => tiered,
        }
    }
}

/// Exact, substring and token-overlap tiers.
pub fn tier_confidence(input: &str, term: &str) -> f64 {
    if input == term {
        return EXACT_CONFIDENCE;
    }
    if input.contains(term) || term.contains(input) {
        return SUBSTRING_CONFIDENCE;
    }
    token_overlap(input, term) * TOKEN_OVERLAP_SCALE
}

/// Jaccard ratio of the whitespace-separated word sets.
pub fn token_overlap(a: &str, b: &str) -> f64 {
    let a: HashSet<&str> = a.split_whitespace().collect();
    let b: HashSet<&str> = b.split_whitespace().collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Similarity used for the typo tier.
fn fuzzy_match(a: &str, b: &str) -> f64 {
    // Jaro-Winkler favors shared prefixes, Levenshtein overall edits
    let jw = jaro_winkler(a, b);
    let lev = normalized_levenshtein(a, b);

    jw * 0.6 + lev * 0.4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBaseBuilder;
    use crate::models::DiseaseRecord;

    fn kb() -> KnowledgeBase {
        let mut builder = KnowledgeBaseBuilder::new();
        let mut heart = DiseaseRecord::new("Heart Attack");
        heart.primary_symptoms = vec![
            "chest pain".into(),
            "severe chest pain".into(),
            "shortness of breath".into(),
        ];
        builder.add_disease(heart);

        let mut migraine = DiseaseRecord::new("Migraine");
        migraine.primary_symptoms = vec!["headache".into(), "nausea".into()];
        builder.add_disease(migraine);

        builder.add_synonyms("shortness of breath", ["breathlessness"]);
        builder.build()
    }

    #[test]
    fn test_tiers() {
        assert_eq!(tier_confidence("fever", "fever"), 1.0);
        assert_eq!(tier_confidence("high fever", "fever"), 0.9);
        assert_eq!(tier_confidence("ache", "body ache"), 0.9);
        // {pain, chest} vs {severe, chest, pain}: 2/3 * 0.8
        let overlap = tier_confidence("pain chest", "severe chest pain");
        assert!((overlap - 0.8 * 2.0 / 3.0).abs() < 1e-9, "got {overlap}");
        assert_eq!(tier_confidence("rash", "fever"), 0.0);
    }

    #[test]
    fn test_token_overlap() {
        assert_eq!(token_overlap("chest pain", "pain chest"), 1.0);
        assert_eq!(token_overlap("", ""), 0.0);
        assert!((token_overlap("sharp chest pain", "chest pain") - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_exact_beats_substring() {
        let kb = kb();
        let matcher = SymptomMatcher::new(&kb, &ScoringConfig::default());

        let hit = matcher.best_match("chest pain").unwrap();
        assert_eq!(hit.canonical, "chest pain");
        assert_eq!(hit.confidence, 1.0);
    }

    #[test]
    fn test_longer_term_wins_substring_tie() {
        let kb = kb();
        let matcher = SymptomMatcher::new(&kb, &ScoringConfig::default());

        let hit = matcher.best_match("very severe chest pain today").unwrap();
        assert_eq!(hit.canonical, "severe chest pain");
        assert_eq!(hit.confidence, 0.9);
    }

    #[test]
    fn test_synonym_resolves_to_canonical() {
        let kb = kb();
        let matcher = SymptomMatcher::new(&kb, &ScoringConfig::default());

        let hit = matcher.best_match("breathlessness").unwrap();
        assert_eq!(hit.canonical, "shortness of breath");
        assert_eq!(hit.term, "breathlessness");
        assert_eq!(hit.confidence, 1.0);
    }

    #[test]
    fn test_typo_tier() {
        let kb = kb();
        let matcher = SymptomMatcher::new(&kb, &ScoringConfig::default());

        let hit = matcher.best_match("headahce").unwrap();
        assert_eq!(hit.canonical, "headache");
        assert!(hit.confidence > 0.5 && hit.confidence <= 0.75);

        let strict = ScoringConfig {
            typo_matching: false,
            ..ScoringConfig::default()
        };
        assert!(SymptomMatcher::new(&kb, &strict).best_match("headahce").is_none());
    }

    #[test]
    fn test_floor_is_exclusive() {
        let kb = kb();
        let config = ScoringConfig {
            min_match_confidence: 0.9,
            ..ScoringConfig::default()
        };
        let matcher = SymptomMatcher::new(&kb, &config);

        assert!(matcher.best_match("mild nausea").is_none());
        assert!(matcher.best_match("nausea").is_some());
    }

    #[test]
    fn test_gibberish_and_empty() {
        let kb = kb();
        let matcher = SymptomMatcher::new(&kb, &ScoringConfig::default());
        assert!(matcher.best_match("unrecognized_gibberish_term").is_none());
        assert!(matcher.best_match("").is_none());
        assert!(SymptomMatcher::new(&KnowledgeBase::empty(), &ScoringConfig::default())
            .best_match("fever")
            .is_none());
    }
}
