//! Knowledge base loading from files on disk.

use std::fs;

use symptom_triage_core::models::{PatientContext, Prevalence, SymptomClass, Urgency};
use symptom_triage_core::scoring::{SymptomScorer, NO_MATCH_MESSAGE};
use symptom_triage_core::{Database, KnowledgeBase};
use tempfile::TempDir;

const BUNDLE: &str = r#"{
    "diseases": [
        {
            "name": "Seasonal Sniffles",
            "department": "ENT",
            "severity": "self-care",
            "prevalence": "Very Common",
            "primary_symptoms": ["Runny Nose", "sneezing"],
            "secondary_symptoms": "itchy eyes, sneezing"
        },
        {
            "disease": "Night Fever",
            "primary_symptoms": ["fever", "night sweats"]
        }
    ],
    "symptom_lexicon": {
        "runny nose": ["drippy nose"],
        "fever": ["pyrexia"]
    }
}"#;

const METADATA: &str = r#"{
    "disease_database": {
        "seasonal sniffles": {
            "treatment": ["Saline rinse", "Rest"],
            "when_to_see_doctor": "If symptoms last more than two weeks",
            "duration": "7-10 days"
        },
        "Unknown Disease": {"treatment": ["Nothing"]}
    }
}"#;

fn write_bundle(dir: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let bundle = dir.path().join("knowledge_base.json");
    let metadata = dir.path().join("disease_metadata.json");
    fs::write(&bundle, BUNDLE).unwrap();
    fs::write(&metadata, METADATA).unwrap();
    (bundle, metadata)
}

#[test]
fn test_json_bundle_with_metadata() {
    let dir = TempDir::new().unwrap();
    let (bundle, metadata) = write_bundle(&dir);

    let kb = KnowledgeBase::from_json_file(&bundle, Some(metadata.as_path())).unwrap();
    assert_eq!(kb.disease_count(), 2);

    let sniffles = kb.disease("Seasonal Sniffles").unwrap();
    assert_eq!(sniffles.department, "ENT");
    assert_eq!(sniffles.severity, Urgency::SelfCare);
    assert_eq!(sniffles.prevalence, Prevalence::VeryCommon);
    assert_eq!(sniffles.primary_symptoms, vec!["runny nose", "sneezing"]);
    // Listed in both: kept as primary only
    assert_eq!(sniffles.secondary_symptoms, vec!["itchy eyes"]);
    assert_eq!(sniffles.treatment, vec!["Saline rinse", "Rest"]);
    assert_eq!(sniffles.duration.as_deref(), Some("7-10 days"));

    let fever = kb.disease("Night Fever").unwrap();
    assert_eq!(fever.department, "General Medicine");
    assert_eq!(fever.severity, Urgency::Gp);
    assert_eq!(fever.prevalence, Prevalence::Common);
    assert!(fever.treatment.is_empty());

    let links = kb.links("sneezing");
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].class, SymptomClass::Primary);
    assert_eq!(kb.canonical_for("Drippy Nose").map(|s| s.name.as_str()), Some("runny nose"));
}

#[test]
fn test_loaded_bundle_scores() {
    let dir = TempDir::new().unwrap();
    let (bundle, _) = write_bundle(&dir);
    let kb = KnowledgeBase::from_json_file(&bundle, None).unwrap();
    let scorer = SymptomScorer::new(&kb);

    let report = scorer.predict(&["drippy nose", "sneezing"], &PatientContext::default());
    assert_eq!(report.predictions.len(), 1);
    assert_eq!(report.predictions[0].disease, "Seasonal Sniffles");
    assert_eq!(report.predictions[0].probability, 95.0);
    assert_eq!(report.knowledge_base_version, kb.fingerprint());
}

#[test]
fn test_fingerprint_tracks_content() {
    let dir = TempDir::new().unwrap();
    let (bundle, metadata) = write_bundle(&dir);

    let plain = KnowledgeBase::from_json_file(&bundle, None).unwrap();
    let again = KnowledgeBase::from_json_file(&bundle, None).unwrap();
    let joined = KnowledgeBase::from_json_file(&bundle, Some(metadata.as_path())).unwrap();

    assert_eq!(plain.fingerprint(), again.fingerprint());
    assert_ne!(plain.fingerprint(), joined.fingerprint());
    assert_eq!(plain.fingerprint().len(), 64);
}

#[test]
fn test_missing_and_malformed_sources() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.json");
    let malformed = dir.path().join("malformed.json");
    fs::write(&malformed, "{ not json").unwrap();

    assert!(KnowledgeBase::from_json_file(&missing, None).is_err());
    assert!(KnowledgeBase::from_json_file(&malformed, None).is_err());
    assert!(KnowledgeBase::from_sqlite(dir.path().join("missing.sqlite")).is_err());

    for kb in [
        KnowledgeBase::load_json_file_or_empty(&missing, None),
        KnowledgeBase::load_json_file_or_empty(&malformed, None),
        KnowledgeBase::load_sqlite_or_empty(dir.path().join("missing.sqlite")),
    ] {
        assert!(kb.is_empty());
        let report = SymptomScorer::new(&kb).predict(&["fever"], &PatientContext::default());
        assert!(report.predictions.is_empty());
        assert_eq!(report.message.as_deref(), Some(NO_MATCH_MESSAGE));
    }
}

#[test]
fn test_sqlite_round_trip_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("knowledge.sqlite");
    let builtin = KnowledgeBase::builtin().unwrap();

    {
        let mut db = Database::open(&path).unwrap();
        assert_eq!(db.import_knowledge_base(&builtin).unwrap(), builtin.disease_count());
    }

    let kb = KnowledgeBase::from_sqlite(&path).unwrap();
    assert_eq!(kb.disease_count(), builtin.disease_count());
    assert_eq!(kb.fingerprint(), builtin.fingerprint());

    let patient = PatientContext::with_age(30);
    let from_disk = SymptomScorer::new(&kb).predict(&["fever", "cough"], &patient);
    let from_bundle = SymptomScorer::new(&builtin).predict(&["fever", "cough"], &patient);
    assert_eq!(from_disk, from_bundle);
}

#[test]
fn test_builtin_covers_rule_tables() {
    use symptom_triage_core::scoring::tables::{
        AGE_BANDS, CHRONIC_CONDITION_BOOSTS, COMMON_PATTERNS, CRITICAL_SYMPTOMS,
    };

    let kb = KnowledgeBase::builtin().unwrap();
    let named = CRITICAL_SYMPTOMS
        .iter()
        .flat_map(|(_, diseases)| diseases.iter())
        .chain(AGE_BANDS.iter().flat_map(|band| band.diseases.iter()))
        .chain(COMMON_PATTERNS.iter().flat_map(|(_, diseases)| diseases.iter()))
        .chain(CHRONIC_CONDITION_BOOSTS.iter().flat_map(|(_, diseases)| diseases.iter()));

    for disease in named {
        assert!(kb.disease(disease).is_some(), "{disease} missing from builtin knowledge base");
    }
}
