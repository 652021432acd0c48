//! Medicine recommendations driven by scoring predictions.

use symptom_triage_core::medicine::{MedicineCatalog, NO_RECOMMENDATION_MESSAGE};
use symptom_triage_core::models::{PatientContext, Urgency};
use symptom_triage_core::scoring::SymptomScorer;
use symptom_triage_core::KnowledgeBase;

#[test]
fn test_cardiac_prediction_recommendations() {
    let kb = KnowledgeBase::builtin().unwrap();
    let catalog = MedicineCatalog::builtin().unwrap();
    let scorer = SymptomScorer::new(&kb);

    let patient = PatientContext::with_age(55);
    let report = scorer.predict(&["severe chest pain", "shortness of breath"], &patient);
    let heart_attack = report
        .predictions
        .iter()
        .find(|p| p.disease == "Heart Attack")
        .unwrap();
    assert_eq!(heart_attack.severity, Urgency::Emergency);

    let medicines = catalog.recommend_for(heart_attack, &patient);
    let names: Vec<&str> = medicines
        .recommendations
        .iter()
        .map(|r| r.medicine_name.as_str())
        .collect();
    assert_eq!(names, vec!["Aspirin", "Nitroglycerin"]);
    assert!(medicines.recommendations.iter().all(|r| r.safety_check.safe));
    assert!(medicines.safety_warnings[0].contains("seek immediate medical attention"));
    assert!(medicines.has_prescription());
}

#[test]
fn test_every_prediction_gets_a_report() {
    let kb = KnowledgeBase::builtin().unwrap();
    let catalog = MedicineCatalog::builtin().unwrap();
    let scorer = SymptomScorer::new(&kb);
    let patient = PatientContext::default();

    let report = scorer.predict(&["fever", "cough", "headache"], &patient);
    assert!(!report.predictions.is_empty());
    for prediction in &report.predictions {
        let medicines = catalog.recommend_for(prediction, &patient);
        assert_eq!(medicines.condition, prediction.disease);
        // Either ranked suggestions or an explanation, never neither
        assert_ne!(medicines.is_empty(), medicines.message.is_none());
    }
}

#[test]
fn test_child_and_pregnancy_checks() {
    let catalog = MedicineCatalog::builtin().unwrap();

    let child = PatientContext::with_age(6);
    let report = catalog.recommend("Gastroenteritis", &child, Some(Urgency::Gp));
    let loperamide = report
        .recommendations
        .iter()
        .find(|r| r.medicine_name == "Loperamide")
        .unwrap();
    assert!(!loperamide.safety_check.safe);
    // Unsafe suggestions rank below safe ones of equal priority
    let last_safe = report
        .recommendations
        .iter()
        .rposition(|r| r.safety_check.safe && r.priority == loperamide.priority);
    let loperamide_at = report
        .recommendations
        .iter()
        .position(|r| r.medicine_name == "Loperamide")
        .unwrap();
    assert!(last_safe.map_or(true, |i| i < loperamide_at));

    let pregnant = PatientContext {
        age: Some(28),
        pregnant: true,
        ..Default::default()
    };
    let report = catalog.recommend("Migraine", &pregnant, None);
    for r in &report.recommendations {
        let warned = r
            .safety_check
            .warnings
            .iter()
            .any(|w| w == "Consult doctor before use during pregnancy");
        assert_eq!(warned, !r.pregnancy_safe, "{}", r.medicine_name);
    }
}

#[test]
fn test_unknown_condition() {
    let catalog = MedicineCatalog::builtin().unwrap();
    let report = catalog.recommend("Alzheimer's Disease", &PatientContext::default(), None);
    assert!(report.is_empty());
    assert_eq!(report.message.as_deref(), Some(NO_RECOMMENDATION_MESSAGE));
}

#[test]
fn test_custom_catalog_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medicines.json");
    std::fs::write(
        &path,
        r#"{
            "condition_medicine_mapping": {"Sore Throat": ["Lozenge", "Missing"]},
            "medicine_database": {"throat": {
                "Lozenge": {"generic_name": "Lozenge", "type": "Antiseptic", "otc": true,
                            "conditions": ["sore throat"]}
            }},
            "medical_disclaimers": {"general": "Ask a pharmacist.", "allergies": ""}
        }"#,
    )
    .unwrap();

    let catalog = MedicineCatalog::from_json_file(&path).unwrap();
    assert_eq!(catalog.medicine_count(), 1);

    // Partial condition match; names absent from the catalog are skipped
    let report = catalog.recommend("Severe sore throat", &PatientContext::default(), None);
    assert_eq!(report.recommendations.len(), 1);
    assert_eq!(report.recommendations[0].kind, "Antiseptic");
    assert_eq!(report.disclaimers, vec!["Ask a pharmacist.".to_string()]);

    let matches = catalog.search_by_symptoms(&["Sore Throat"]);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].matching_conditions, vec!["sore throat".to_string()]);

    std::fs::write(&path, "{ not json").unwrap();
    assert!(MedicineCatalog::from_json_file(&path).is_err());
    assert!(MedicineCatalog::load_json_file_or_empty(&path).is_empty());
}
