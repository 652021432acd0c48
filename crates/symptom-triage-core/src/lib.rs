//! Symptom-Triage Core Library
//!
//! Offline symptom analysis: ranked candidate conditions with calibrated
//! probabilities, plus an independent care-urgency classification.
//!
//! # Architecture
//!
//! ```text
//!                   symptoms + patient context
//!                               │
//!             ┌─────────────────┴─────────────────┐
//!             ▼                                   ▼
//!     Disease Scoring Engine              Triage Classifier
//!  match → accumulate → adjust        keywords → risk factors
//!    → normalize → rank                → combinations → max
//!             │                                   │
//!             ▼                                   ▼
//!     PredictionReport                      TriageResult
//!             ▲
//!             │ read-only, shared
//!      KnowledgeBase (JSON bundle | SQLite | built-in)
//! ```
//!
//! The knowledge base is loaded once and shared behind an `Arc`; both
//! components are pure functions over it and never fail on bad input.
//!
//! # Modules
//!
//! - [`models`]: Domain types (DiseaseRecord, Prediction, TriageResult, etc.)
//! - [`knowledge`]: Knowledge base loader and reverse symptom index
//! - [`db`]: SQLite storage for the knowledge base
//! - [`scoring`]: Disease scoring engine and narrative
//! - [`triage`]: Urgency classifier
//! - [`medicine`]: Medicine suggestions for a predicted condition
//! - [`config`]: Engine tunables loaded from TOML

pub mod config;
pub mod db;
pub mod knowledge;
pub mod medicine;
pub mod models;
pub mod scoring;
pub mod triage;

// Re-export commonly used types
pub use config::{EngineConfig, ScoringConfig, TriageConfig};
pub use db::Database;
pub use knowledge::{KnowledgeBase, KnowledgeBaseBuilder, KnowledgeStats};
pub use medicine::MedicineCatalog;
pub use models::{
    ClinicalAnalysis, CombinationAlert, DiseaseRecord, MedicineRecommendation, MedicineReport,
    PatientContext, Prediction, PredictionReport, TriageResult, Urgency,
};
pub use scoring::SymptomScorer;
pub use triage::TriageClassifier;

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::path::Path;
use std::sync::Arc;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum SymptomTriageError {
    #[error("Knowledge base error: {0}")]
    KnowledgeBaseError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Medicine catalog error: {0}")]
    MedicineError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<knowledge::KnowledgeBaseError> for SymptomTriageError {
    fn from(e: knowledge::KnowledgeBaseError) -> Self {
        match e {
            knowledge::KnowledgeBaseError::Database(e) => e.into(),
            other => SymptomTriageError::KnowledgeBaseError(other.to_string()),
        }
    }
}

impl From<db::DbError> for SymptomTriageError {
    fn from(e: db::DbError) -> Self {
        SymptomTriageError::DatabaseError(e.to_string())
    }
}

impl From<medicine::MedicineError> for SymptomTriageError {
    fn from(e: medicine::MedicineError) -> Self {
        SymptomTriageError::MedicineError(e.to_string())
    }
}

impl From<config::ConfigError> for SymptomTriageError {
    fn from(e: config::ConfigError) -> Self {
        SymptomTriageError::ConfigError(e.to_string())
    }
}

impl From<serde_json::Error> for SymptomTriageError {
    fn from(e: serde_json::Error) -> Self {
        SymptomTriageError::SerializationError(e.to_string())
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open the knowledge base bundled with the library.
#[uniffi::export]
pub fn open_builtin_knowledge_base() -> Result<Arc<SymptomTriageCore>, SymptomTriageError> {
    Ok(SymptomTriageCore::new(
        KnowledgeBase::builtin()?,
        MedicineCatalog::builtin()?,
        EngineConfig::default(),
    ))
}

/// Open a JSON knowledge base bundle.
#[uniffi::export]
pub fn open_knowledge_base_json(
    path: String,
    metadata_path: Option<String>,
) -> Result<Arc<SymptomTriageCore>, SymptomTriageError> {
    let kb = KnowledgeBase::from_json_file(&path, metadata_path.as_deref().map(Path::new))?;
    Ok(SymptomTriageCore::new(kb, MedicineCatalog::builtin()?, EngineConfig::default()))
}

/// Open a SQLite knowledge base.
#[uniffi::export]
pub fn open_knowledge_base_sqlite(path: String) -> Result<Arc<SymptomTriageCore>, SymptomTriageError> {
    let kb = KnowledgeBase::from_sqlite(&path)?;
    Ok(SymptomTriageCore::new(kb, MedicineCatalog::builtin()?, EngineConfig::default()))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Shared, lock-free engine handle for FFI.
#[derive(uniffi::Object)]
pub struct SymptomTriageCore {
    kb: Arc<KnowledgeBase>,
    medicines: Arc<MedicineCatalog>,
    config: EngineConfig,
}

impl SymptomTriageCore {
    /// Wrap a loaded knowledge base and medicine catalog.
    pub fn new(kb: KnowledgeBase, medicines: MedicineCatalog, config: EngineConfig) -> Arc<Self> {
        let stats = kb.stats();
        tracing::info!(
            diseases = stats.diseases,
            symptoms = stats.symptoms,
            links = stats.links,
            fingerprint = %stats.fingerprint,
            medicines = medicines.medicine_count(),
            "Symptom triage engine ready"
        );
        Arc::new(Self {
            kb: Arc::new(kb),
            medicines: Arc::new(medicines),
            config,
        })
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn medicine_catalog(&self) -> &MedicineCatalog {
        &self.medicines
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rank candidate conditions.
    pub fn predict_report(&self, symptoms: &[String], patient: &PatientContext) -> PredictionReport {
        SymptomScorer::with_config(&self.kb, self.config.scoring.clone()).predict(symptoms, patient)
    }

    /// Classify care urgency.
    pub fn classify_result(&self, symptoms: &[String], patient: &PatientContext) -> TriageResult {
        TriageClassifier::with_config(self.config.triage.clone()).classify(symptoms, patient)
    }

    /// Medicine suggestions for a condition. The urgency defaults to the
    /// condition's knowledge-base severity.
    pub fn medicine_report(
        &self,
        condition: &str,
        patient: &PatientContext,
        urgency: Option<Urgency>,
    ) -> MedicineReport {
        let urgency = urgency.or_else(|| self.kb.disease(condition).map(|d| d.severity));
        self.medicines.recommend(condition, patient, urgency)
    }
}

#[uniffi::export]
impl SymptomTriageCore {
    // =========================================================================
    // Analysis Operations
    // =========================================================================

    /// Rank candidate conditions for the reported symptoms.
    pub fn predict(&self, symptoms: Vec<String>, context: FfiPatientContext) -> FfiPredictionReport {
        self.predict_report(&symptoms, &context.into()).into()
    }

    /// Classify the care urgency of the reported symptoms.
    pub fn classify(&self, symptoms: Vec<String>, context: FfiPatientContext) -> FfiTriageResult {
        self.classify_result(&symptoms, &context.into()).into()
    }

    /// JSON in, JSON out. `symptoms_json` is an array of strings; non-string
    /// entries are ignored. `context_json` may be empty.
    pub fn predict_json(
        &self,
        symptoms_json: String,
        context_json: String,
    ) -> Result<String, SymptomTriageError> {
        let (symptoms, patient) = parse_request(&symptoms_json, &context_json)?;
        Ok(serde_json::to_string(&self.predict_report(&symptoms, &patient))?)
    }

    /// JSON variant of [`SymptomTriageCore::classify`].
    pub fn classify_json(
        &self,
        symptoms_json: String,
        context_json: String,
    ) -> Result<String, SymptomTriageError> {
        let (symptoms, patient) = parse_request(&symptoms_json, &context_json)?;
        Ok(serde_json::to_string(&self.classify_result(&symptoms, &patient))?)
    }

    // =========================================================================
    // Medicine Operations
    // =========================================================================

    /// Medicine suggestions for a condition, ranked and safety-checked.
    /// `urgency` takes the canonical labels; unknown labels are rejected.
    pub fn recommend_medicines(
        &self,
        condition: String,
        context: FfiPatientContext,
        urgency: Option<String>,
    ) -> Result<FfiMedicineReport, SymptomTriageError> {
        let urgency = urgency
            .map(|label| label.parse::<Urgency>())
            .transpose()
            .map_err(|e| SymptomTriageError::InvalidInput(e.to_string()))?;
        Ok(self.medicine_report(&condition, &context.into(), urgency).into())
    }

    /// JSON variant of [`SymptomTriageCore::recommend_medicines`]. An
    /// `"urgency"` key in `context_json` is honored when it parses.
    pub fn recommend_medicines_json(
        &self,
        condition: String,
        context_json: String,
    ) -> Result<String, SymptomTriageError> {
        let context = serde_json::from_str::<serde_json::Value>(&context_json).ok();
        let patient = context
            .as_ref()
            .map(PatientContext::from_json)
            .unwrap_or_default();
        let urgency = context
            .as_ref()
            .and_then(|v| v.get("urgency"))
            .and_then(serde_json::Value::as_str)
            .and_then(Urgency::parse_label);
        Ok(serde_json::to_string(&self.medicine_report(&condition, &patient, urgency))?)
    }

    // =========================================================================
    // Knowledge Base / Configuration
    // =========================================================================

    /// Fingerprint of the loaded knowledge base.
    pub fn knowledge_base_version(&self) -> String {
        self.kb.fingerprint().to_string()
    }

    pub fn disease_count(&self) -> u32 {
        self.kb.disease_count() as u32
    }

    /// A handle sharing this knowledge base with tunables read from a TOML file.
    pub fn with_config_file(&self, path: String) -> Result<Arc<SymptomTriageCore>, SymptomTriageError> {
        let config = EngineConfig::from_file(&path)?;
        Ok(Arc::new(SymptomTriageCore {
            kb: Arc::clone(&self.kb),
            medicines: Arc::clone(&self.medicines),
            config,
        }))
    }

    /// A handle sharing this knowledge base with a medicine catalog read from a JSON file.
    pub fn with_medicine_catalog_file(
        &self,
        path: String,
    ) -> Result<Arc<SymptomTriageCore>, SymptomTriageError> {
        let medicines = MedicineCatalog::from_json_file(&path)?;
        Ok(Arc::new(SymptomTriageCore {
            kb: Arc::clone(&self.kb),
            medicines: Arc::new(medicines),
            config: self.config.clone(),
        }))
    }

    pub fn medicine_count(&self) -> u32 {
        self.medicines.medicine_count() as u32
    }
}

fn parse_request(
    symptoms_json: &str,
    context_json: &str,
) -> Result<(Vec<String>, PatientContext), SymptomTriageError> {
    let symptoms = match serde_json::from_str::<serde_json::Value>(symptoms_json)? {
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(serde_json::Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => {
            return Err(SymptomTriageError::InvalidInput(
                "symptoms must be a JSON array".into(),
            ))
        }
    };

    // Malformed context degrades to defaults
    let patient = if context_json.trim().is_empty() {
        PatientContext::default()
    } else {
        serde_json::from_str::<serde_json::Value>(context_json)
            .map(|v| PatientContext::from_json(&v))
            .unwrap_or_default()
    };

    Ok((symptoms, patient))
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient context.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiPatientContext {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub chronic_conditions: Vec<String>,
    pub pregnant: bool,
}

impl From<FfiPatientContext> for PatientContext {
    fn from(ctx: FfiPatientContext) -> Self {
        PatientContext {
            age: ctx.age,
            gender: ctx.gender,
            chronic_conditions: ctx.chronic_conditions,
            pregnant: ctx.pregnant,
        }
    }
}

/// FFI-safe prediction.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPrediction {
    pub disease: String,
    pub probability: f64,
    pub confidence: f64,
    pub department: String,
    pub severity: String,
    pub description: String,
    pub matched_symptoms: u32,
    pub total_symptoms: u32,
    pub has_critical_symptoms: bool,
    pub age_related: bool,
    pub treatment_info: Vec<String>,
    pub when_to_see_doctor: Option<String>,
    pub duration: Option<String>,
}

impl From<Prediction> for FfiPrediction {
    fn from(p: Prediction) -> Self {
        Self {
            disease: p.disease,
            probability: p.probability,
            confidence: p.confidence,
            department: p.department,
            severity: p.severity.as_str().to_string(),
            description: p.description,
            matched_symptoms: p.matched_symptoms as u32,
            total_symptoms: p.total_symptoms as u32,
            has_critical_symptoms: p.has_critical_symptoms,
            age_related: p.age_related,
            treatment_info: p.treatment_info,
            when_to_see_doctor: p.when_to_see_doctor,
            duration: p.duration,
        }
    }
}

/// FFI-safe prediction report. Narrative fields are flattened.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPredictionReport {
    pub predictions: Vec<FfiPrediction>,
    pub message: Option<String>,
    pub summary: Option<String>,
    pub urgency: Option<String>,
    pub recommendation: Option<String>,
    pub confidence_level: Option<String>,
    pub next_steps: Option<String>,
    pub symptoms_provided: u32,
    pub knowledge_base_version: String,
}

impl From<PredictionReport> for FfiPredictionReport {
    fn from(report: PredictionReport) -> Self {
        let analysis = report.analysis;
        Self {
            predictions: report.predictions.into_iter().map(Into::into).collect(),
            message: report.message,
            summary: analysis.as_ref().map(|a| a.summary.clone()),
            urgency: analysis.as_ref().map(|a| a.urgency.clone()),
            recommendation: analysis.as_ref().map(|a| a.recommendation.clone()),
            confidence_level: analysis.as_ref().map(|a| a.confidence_level.clone()),
            next_steps: analysis.map(|a| a.next_steps),
            symptoms_provided: report.symptoms_provided as u32,
            knowledge_base_version: report.knowledge_base_version,
        }
    }
}

/// FFI-safe dangerous-combination alert.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCombinationAlert {
    pub name: String,
    pub match_ratio: f64,
    pub urgency: String,
    pub matched_symptoms: Vec<String>,
}

impl From<CombinationAlert> for FfiCombinationAlert {
    fn from(alert: CombinationAlert) -> Self {
        Self {
            name: alert.name,
            match_ratio: alert.match_ratio,
            urgency: alert.urgency.as_str().to_string(),
            matched_symptoms: alert.matched_symptoms,
        }
    }
}

/// FFI-safe triage result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTriageResult {
    pub urgency: String,
    pub base_urgency: String,
    pub confidence: f64,
    pub assessment: String,
    pub notes: String,
    pub potential_conditions: Vec<String>,
    pub department: String,
    pub recommendations: Vec<String>,
    pub follow_up_questions: Vec<String>,
    pub risk_score: f64,
    pub symptom_combinations: Vec<FfiCombinationAlert>,
}

impl From<TriageResult> for FfiTriageResult {
    fn from(result: TriageResult) -> Self {
        Self {
            urgency: result.urgency.as_str().to_string(),
            base_urgency: result.base_urgency.as_str().to_string(),
            confidence: result.confidence,
            assessment: result.assessment,
            notes: result.notes,
            potential_conditions: result.potential_conditions,
            department: result.department,
            recommendations: result.recommendations,
            follow_up_questions: result.follow_up_questions,
            risk_score: result.risk_assessment.risk_score,
            symptom_combinations: result
                .symptom_combinations
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

/// FFI-safe medicine recommendation.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicineRecommendation {
    pub medicine_name: String,
    pub brand_names: Vec<String>,
    pub kind: String,
    /// "population: dose" lines
    pub dosage: Vec<String>,
    pub otc_available: bool,
    pub pregnancy_safe: bool,
    pub side_effects: Vec<String>,
    pub safe: bool,
    pub warnings: Vec<String>,
    pub contraindications: Vec<String>,
    pub priority: u32,
}

impl From<MedicineRecommendation> for FfiMedicineRecommendation {
    fn from(r: MedicineRecommendation) -> Self {
        Self {
            medicine_name: r.medicine_name,
            brand_names: r.brand_names,
            kind: r.kind,
            dosage: r
                .dosage
                .into_iter()
                .map(|(population, dose)| format!("{population}: {dose}"))
                .collect(),
            otc_available: r.otc_available,
            pregnancy_safe: r.pregnancy_safe,
            side_effects: r.side_effects,
            safe: r.safety_check.safe,
            warnings: r.safety_check.warnings,
            contraindications: r.safety_check.contraindications,
            priority: r.priority,
        }
    }
}

/// FFI-safe medicine report.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicineReport {
    pub condition: String,
    pub recommendations: Vec<FfiMedicineRecommendation>,
    pub message: Option<String>,
    pub disclaimers: Vec<String>,
    pub safety_warnings: Vec<String>,
}

impl From<MedicineReport> for FfiMedicineReport {
    fn from(report: MedicineReport) -> Self {
        Self {
            condition: report.condition,
            recommendations: report.recommendations.into_iter().map(Into::into).collect(),
            message: report.message,
            disclaimers: report.disclaimers,
            safety_warnings: report.safety_warnings,
        }
    }
}
