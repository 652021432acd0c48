//! Disease scoring engine.
//!
//! Pipeline: Match → Accumulate → Critical scan → Age / Prevalence / Pattern /
//! Chronic adjustments → Normalize → Rank → Narrative

mod analysis;
mod matcher;
pub mod tables;

pub use analysis::*;
pub use matcher::*;

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::config::ScoringConfig;
use crate::knowledge::KnowledgeBase;
use crate::models::{
    normalize_text, DiseaseRecord, MatchDetail, PatientContext, Prediction, PredictionReport,
    SymptomClass,
};

/// Message returned when no non-blank symptom was supplied.
pub const NO_SYMPTOMS_MESSAGE: &str = "No symptoms provided for analysis";

/// Message returned when no symptom matched the vocabulary.
pub const NO_MATCH_MESSAGE: &str =
    "Unable to match symptoms to known conditions. Please consult a healthcare professional.";

/// Message returned when every candidate fell below the probability threshold.
pub const BELOW_THRESHOLD_MESSAGE: &str =
    "No condition reached the minimum probability threshold. Please consult a healthcare professional.";

/// Per-request running score for one disease.
#[derive(Debug, Clone)]
pub struct DiseaseScore<'a> {
    pub record: &'a DiseaseRecord,
    pub score: f64,
    pub details: Vec<MatchDetail>,
    pub primary_matched: usize,
    pub secondary_matched: usize,
    /// A critical symptom for this disease was reported
    pub critical: bool,
    /// Disease is on the risk list of the patient's age band
    pub age_related: bool,
}

impl<'a> DiseaseScore<'a> {
    fn new(record: &'a DiseaseRecord) -> Self {
        Self {
            record,
            score: 0.0,
            details: Vec::new(),
            primary_matched: 0,
            secondary_matched: 0,
            critical: false,
            age_related: false,
        }
    }
}

/// Accumulated scores of one request, before normalization.
#[derive(Debug, Clone, Default)]
pub struct ScoreSheet<'a> {
    /// Scores in first-touched order
    pub scores: Vec<DiseaseScore<'a>>,
    index: HashMap<&'a str, usize>,
    /// Normalized, non-blank reported symptoms
    pub reported: Vec<String>,
    /// Reported symptoms that matched the vocabulary
    pub matched_inputs: usize,
}

impl<'a> ScoreSheet<'a> {
    fn entry(&mut self, record: &'a DiseaseRecord) -> &mut DiseaseScore<'a> {
        let next = self.scores.len();
        let index = *self.index.entry(record.name.as_str()).or_insert(next);
        if index == next {
            self.scores.push(DiseaseScore::new(record));
        }
        &mut self.scores[index]
    }

    fn get_mut(&mut self, disease: &str) -> Option<&mut DiseaseScore<'a>> {
        let index = *self.index.get(disease)?;
        self.scores.get_mut(index)
    }

    fn boost(&mut self, diseases: &[&str], factor: f64) {
        for disease in diseases {
            if let Some(entry) = self.get_mut(disease) {
                entry.score *= factor;
            }
        }
    }

    pub fn get(&self, disease: &str) -> Option<&DiseaseScore<'a>> {
        self.index.get(disease).and_then(|&i| self.scores.get(i))
    }

    pub fn total_score(&self) -> f64 {
        self.scores.iter().map(|s| s.score).sum()
    }

    /// Normalized probabilities (percent, capped), unfiltered and unrounded.
    pub fn probabilities(&self, cap: f64) -> Vec<(&'a str, f64)> {
        let total = self.total_score();
        if total <= 0.0 {
            return Vec::new();
        }
        self.scores
            .iter()
            .map(|s| (s.record.name.as_str(), (100.0 * s.score / total).min(cap)))
            .collect()
    }
}

/// Scores diseases against reported symptoms.
pub struct SymptomScorer<'a> {
    kb: &'a KnowledgeBase,
    config: ScoringConfig,
    matcher: SymptomMatcher<'a>,
}

impl<'a> SymptomScorer<'a> {
    /// Create a scorer with default tunables.
    pub fn new(kb: &'a KnowledgeBase) -> Self {
        Self::with_config(kb, ScoringConfig::default())
    }

    pub fn with_config(kb: &'a KnowledgeBase, config: ScoringConfig) -> Self {
        let matcher = SymptomMatcher::new(kb, &config);
        Self {
            kb,
            config,
            matcher,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn matcher(&self) -> &SymptomMatcher<'a> {
        &self.matcher
    }

    /// Rank candidate conditions for the reported symptoms.
    pub fn predict<S: AsRef<str>>(&self, symptoms: &[S], patient: &PatientContext) -> PredictionReport {
        let sheet = self.score(symptoms, patient);
        let reported = sheet.reported.len();

        let mut report = PredictionReport {
            predictions: Vec::new(),
            analysis: None,
            message: None,
            total_conditions_analyzed: self.kb.disease_count(),
            symptoms_provided: reported,
            input_symptoms: sheet.reported.clone(),
            knowledge_base_version: self.kb.fingerprint().to_string(),
        };

        if reported == 0 {
            report.message = Some(NO_SYMPTOMS_MESSAGE.to_string());
            return report;
        }

        let probabilities = sheet.probabilities(self.config.probability_cap);
        if probabilities.is_empty() {
            tracing::debug!(symptoms = reported, "No symptom matched the vocabulary");
            report.message = Some(NO_MATCH_MESSAGE.to_string());
            return report;
        }

        let mut ranked: Vec<(f64, &DiseaseScore<'a>)> = probabilities
            .iter()
            .zip(&sheet.scores)
            .map(|(&(_, probability), score)| (probability, score))
            .filter(|(probability, _)| *probability >= self.config.min_probability)
            .collect();
        // Stable: ties keep first-touched order
        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        ranked.truncate(self.config.max_predictions);

        report.predictions = ranked
            .into_iter()
            .map(|(probability, score)| self.prediction(score, probability, reported))
            .collect();

        if report.predictions.is_empty() {
            report.message = Some(BELOW_THRESHOLD_MESSAGE.to_string());
        } else {
            report.analysis = clinical_analysis(&report.predictions, reported, patient.age);
        }

        tracing::debug!(
            symptoms = reported,
            matched = sheet.matched_inputs,
            candidates = sheet.scores.len(),
            predictions = report.predictions.len(),
            "Prediction complete"
        );
        report
    }

    /// Accumulate and adjust per-disease scores without normalizing.
    pub fn score<S: AsRef<str>>(&self, symptoms: &[S], patient: &PatientContext) -> ScoreSheet<'a> {
        let mut sheet = ScoreSheet {
            reported: symptoms
                .iter()
                .map(|s| normalize_text(s.as_ref()))
                .filter(|s| !s.is_empty())
                .collect(),
            ..ScoreSheet::default()
        };

        let reported = std::mem::take(&mut sheet.reported);
        for input in &reported {
            self.accumulate(&mut sheet, input);
        }
        sheet.reported = reported;

        self.apply_age(&mut sheet, patient);
        for entry in &mut sheet.scores {
            entry.score *= entry.record.prevalence.multiplier();
        }
        self.apply_patterns(&mut sheet);
        self.apply_chronic_conditions(&mut sheet, patient);

        sheet
    }

    fn accumulate(&self, sheet: &mut ScoreSheet<'a>, input: &str) {
        let severity = tables::severity_multiplier(input);

        // Severity scales the contribution; it never picks the term
        let core = tables::strip_severity_words(input);
        if let Some(hit) = self.matcher.best_match(&core) {
            sheet.matched_inputs += 1;
            for link in self.kb.links_at(hit.symptom) {
                let Some(record) = self.kb.disease(&link.disease) else {
                    continue;
                };
                let entry = sheet.entry(record);
                entry.score += link.weight * hit.confidence * severity;
                entry.details.push(MatchDetail {
                    input: input.to_string(),
                    matched: hit.canonical.to_string(),
                    confidence: hit.confidence,
                    class: link.class,
                    severity_multiplier: severity,
                });
                match link.class {
                    SymptomClass::Primary => entry.primary_matched += 1,
                    SymptomClass::Secondary => entry.secondary_matched += 1,
                }
            }
        }

        // Only diseases that already have score are boosted
        for disease in tables::critical_diseases(input) {
            if let Some(entry) = sheet.get_mut(disease) {
                entry.score *= self.config.critical_multiplier;
                entry.critical = true;
            }
        }
    }

    fn apply_age(&self, sheet: &mut ScoreSheet<'a>, patient: &PatientContext) {
        let band = tables::age_band(patient.age_or(self.config.default_age));
        for entry in &mut sheet.scores {
            if band.diseases.iter().any(|d| *d == entry.record.name) {
                entry.age_related = true;
                entry.score *= self.config.age_risk_multiplier;
            }
        }
    }

    fn apply_patterns(&self, sheet: &mut ScoreSheet<'a>) {
        for (pattern, diseases) in tables::COMMON_PATTERNS {
            let present = pattern
                .iter()
                .all(|p| sheet.reported.iter().any(|r| r.contains(p)));
            if present {
                sheet.boost(diseases, self.config.pattern_boost);
            }
        }
    }

    fn apply_chronic_conditions(&self, sheet: &mut ScoreSheet<'a>, patient: &PatientContext) {
        for condition in patient.chronic_conditions() {
            let condition = normalize_text(condition);
            for (keyword, diseases) in tables::CHRONIC_CONDITION_BOOSTS {
                if condition.contains(keyword) {
                    sheet.boost(diseases, self.config.chronic_boost);
                }
            }
        }
    }

    fn prediction(&self, score: &DiseaseScore<'a>, probability: f64, reported: usize) -> Prediction {
        let record = score.record;
        Prediction {
            disease: record.name.clone(),
            probability: round1(probability),
            confidence: self.confidence(score, reported),
            department: record.department.clone(),
            severity: record.severity,
            description: record.description.clone(),
            matched_symptoms: score.details.len(),
            total_symptoms: record.total_symptoms(),
            primary_symptoms_matched: score.primary_matched,
            secondary_symptoms_matched: score.secondary_matched,
            has_critical_symptoms: score.critical,
            age_related: score.age_related,
            symptom_details: score.details.clone(),
            treatment_info: record.treatment.clone(),
            when_to_see_doctor: record.when_to_see_doctor.clone(),
            duration: record.duration.clone(),
        }
    }

    /// 60% primary coverage plus 40% overall coverage, in percent.
    fn confidence(&self, score: &DiseaseScore<'a>, reported: usize) -> f64 {
        let total_primary = score.record.primary_symptoms.len();
        let primary_ratio = if total_primary > 0 {
            (score.primary_matched as f64 / total_primary as f64).min(1.0)
        } else {
            0.0
        };
        let coverage = (score.details.len() as f64 / reported.max(1) as f64).min(1.0);

        let mut confidence = (primary_ratio * 0.6 + coverage * 0.4) * 100.0;
        if score.critical {
            confidence = (confidence * self.config.critical_confidence_boost)
                .min(self.config.confidence_cap);
        }
        round1(confidence.clamp(0.0, 100.0))
    }
}

/// Round to one decimal place.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBaseBuilder;
    use crate::models::{Prevalence, Urgency};

    fn record(name: &str, prevalence: Prevalence, primary: &[&str], secondary: &[&str]) -> DiseaseRecord {
        let mut r = DiseaseRecord::new(name);
        r.prevalence = prevalence;
        r.primary_symptoms = primary.iter().map(|s| s.to_string()).collect();
        r.secondary_symptoms = secondary.iter().map(|s| s.to_string()).collect();
        r
    }

    fn kb() -> KnowledgeBase {
        let mut builder = KnowledgeBaseBuilder::new();
        builder.add_disease(record(
            "Common Cold",
            Prevalence::VeryCommon,
            &["runny nose", "sneezing", "cough"],
            &["fever"],
        ));
        builder.add_disease(record("Influenza", Prevalence::Seasonal, &["fever", "body ache"], &["cough"]));
        builder.add_disease(record("Tuberculosis", Prevalence::Rare, &["cough", "night sweats"], &[]));
        let mut heart = record(
            "Heart Attack",
            Prevalence::Common,
            &["chest pain", "shortness of breath"],
            &["nausea"],
        );
        heart.severity = Urgency::Emergency;
        heart.department = "Cardiology".into();
        builder.add_disease(heart);
        builder.build()
    }

    #[test]
    fn test_accumulation_before_adjustments() {
        let kb = kb();
        let config = ScoringConfig {
            age_risk_multiplier: 1.0,
            ..ScoringConfig::default()
        };
        let scorer = SymptomScorer::with_config(&kb, config);
        let sheet = scorer.score(&["night sweats"], &PatientContext::default());

        // primary 2.0 × exact 1.0 × severity 1.0 × Rare 0.6
        let tb = sheet.get("Tuberculosis").unwrap();
        assert!((tb.score - 1.2).abs() < 1e-9);
        assert_eq!(tb.primary_matched, 1);
        assert_eq!(sheet.scores.len(), 1);
    }

    #[test]
    fn test_severity_scales_contribution() {
        let kb = kb();
        let scorer = SymptomScorer::new(&kb);
        let mild = scorer.score(&["mild night sweats"], &PatientContext::default());
        let severe = scorer.score(&["severe night sweats"], &PatientContext::default());

        let mild = mild.get("Tuberculosis").unwrap().score;
        let severe = severe.get("Tuberculosis").unwrap().score;
        assert!((severe / mild - 2.0).abs() < 1e-9, "1.4 / 0.7");
    }

    #[test]
    fn test_severity_word_does_not_change_match() {
        let mut builder = KnowledgeBaseBuilder::new();
        builder.add_disease(record("Angina", Prevalence::Common, &["chest pain"], &[]));
        builder.add_disease(record("Migraine", Prevalence::Common, &["severe chest pain"], &[]));
        let kb = builder.build();
        let scorer = SymptomScorer::new(&kb);

        let mild = scorer.score(&["mild chest pain"], &PatientContext::default());
        let severe = scorer.score(&["severe chest pain"], &PatientContext::default());

        let mild_angina = mild.get("Angina").unwrap().score;
        let severe_angina = severe.get("Angina").map(|s| s.score).unwrap_or(0.0);
        assert!(severe_angina >= mild_angina, "{severe_angina} < {mild_angina}");
        assert!(severe.get("Migraine").is_none());

        let detail = &severe.get("Angina").unwrap().details[0];
        assert_eq!(detail.input, "severe chest pain");
        assert_eq!(detail.matched, "chest pain");
        assert_eq!(detail.severity_multiplier, 1.4);
    }

    #[test]
    fn test_critical_boost_needs_existing_score() {
        let kb = kb();
        let scorer = SymptomScorer::new(&kb);
        let sheet = scorer.score(&["chest pain"], &PatientContext::with_age(30));

        let heart = sheet.get("Heart Attack").unwrap();
        assert!(heart.critical);
        // 2.0 × 1.5 critical × 1.5 Common
        assert!((heart.score - 4.5).abs() < 1e-9);
        // Angina and Pneumonia are not in this knowledge base
        assert!(sheet.get("Angina").is_none());
    }

    #[test]
    fn test_pattern_boost() {
        let kb = kb();
        let scorer = SymptomScorer::new(&kb);
        let with = scorer.score(&["fever", "cough"], &PatientContext::with_age(30));
        let flu = with.get("Influenza").unwrap();
        let tb = with.get("Tuberculosis").unwrap();

        // Influenza: (2.0 + 1.0) × 1.3 Seasonal × 2.5 pattern
        assert!((flu.score - 3.0 * 1.3 * 2.5).abs() < 1e-9);
        // Tuberculosis is not on the pattern list: 2.0 × 0.6
        assert!((tb.score - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_chronic_condition_boost() {
        let kb = kb();
        let scorer = SymptomScorer::new(&kb);
        let plain = scorer.score(&["chest pain"], &PatientContext::with_age(30));

        let mut patient = PatientContext::with_age(30);
        patient.chronic_conditions = vec!["Type 2 Diabetes".into()];
        let boosted = scorer.score(&["chest pain"], &patient);

        let ratio = boosted.get("Heart Attack").unwrap().score / plain.get("Heart Attack").unwrap().score;
        assert!((ratio - 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_predict_shapes_report() {
        let kb = kb();
        let scorer = SymptomScorer::new(&kb);
        let report = scorer.predict(&["fever", "cough", "  "], &PatientContext::with_age(30));

        assert_eq!(report.symptoms_provided, 2);
        assert_eq!(report.total_conditions_analyzed, 4);
        assert_eq!(report.knowledge_base_version, kb.fingerprint());
        assert!(report.message.is_none());
        assert!(report.analysis.is_some());

        let top = report.top().unwrap();
        assert_eq!(top.disease, "Common Cold");
        for pair in report.predictions.windows(2) {
            assert!(pair[0].probability >= pair[1].probability);
        }
        for p in &report.predictions {
            assert!(p.probability >= 5.0 && p.probability <= 95.0);
            assert!(p.confidence >= 0.0 && p.confidence <= 100.0);
        }
    }

    #[test]
    fn test_probabilities_sum_at_most_100() {
        let kb = kb();
        let scorer = SymptomScorer::new(&kb);
        let sheet = scorer.score(&["fever", "cough", "chest pain"], &PatientContext::default());
        let sum: f64 = sheet.probabilities(95.0).iter().map(|(_, p)| p).sum();
        assert!(sum <= 100.0 + 1e-9);
    }

    #[test]
    fn test_confidence_formula() {
        let kb = kb();
        let scorer = SymptomScorer::new(&kb);
        let report = scorer.predict(&["night sweats", "rash"], &PatientContext::default());

        // 1 of 2 primary, 1 of 2 reported: (0.5 × 0.6 + 0.5 × 0.4) × 100
        let tb = &report.predictions[0];
        assert_eq!(tb.disease, "Tuberculosis");
        assert_eq!(tb.confidence, 50.0);
        assert_eq!(tb.probability, 95.0);
    }

    #[test]
    fn test_critical_confidence_capped() {
        let kb = kb();
        let scorer = SymptomScorer::new(&kb);
        let report = scorer.predict(&["chest pain", "shortness of breath"], &PatientContext::default());

        let heart = report
            .predictions
            .iter()
            .find(|p| p.disease == "Heart Attack")
            .unwrap();
        assert!(heart.has_critical_symptoms);
        // (1.0 × 0.6 + 1.0 × 0.4) × 100 × 1.2, capped
        assert_eq!(heart.confidence, 95.0);
    }

    #[test]
    fn test_empty_and_unmatched() {
        let kb = kb();
        let scorer = SymptomScorer::new(&kb);

        let empty: [&str; 0] = [];
        let report = scorer.predict(&empty, &PatientContext::default());
        assert!(report.is_empty());
        assert_eq!(report.message.as_deref(), Some(NO_SYMPTOMS_MESSAGE));

        let report = scorer.predict(&["  ", ""], &PatientContext::default());
        assert_eq!(report.message.as_deref(), Some(NO_SYMPTOMS_MESSAGE));

        let report = scorer.predict(&["unrecognized_gibberish_term"], &PatientContext::default());
        assert!(report.is_empty());
        assert_eq!(report.message.as_deref(), Some(NO_MATCH_MESSAGE));
        assert!(report.analysis.is_none());
    }

    #[test]
    fn test_max_predictions() {
        let kb = kb();
        let config = ScoringConfig {
            max_predictions: 1,
            min_probability: 0.0,
            ..ScoringConfig::default()
        };
        let scorer = SymptomScorer::with_config(&kb, config);
        let report = scorer.predict(&["fever", "cough"], &PatientContext::default());
        assert_eq!(report.predictions.len(), 1);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round1(66.66), 66.7);
        assert_eq!(round1(95.0), 95.0);
    }
}
