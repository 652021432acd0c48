//! Engine tunables.
//!
//! Every field has a default that reproduces the stock scoring and triage
//! behavior, so a TOML file only needs the keys it overrides:
//!
//! ```toml
//! [scoring]
//! max_predictions = 3
//! typo_matching = false
//!
//! [triage]
//! high_risk_age = 70
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::DEFAULT_AGE;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    pub triage: TriageConfig,
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let config = Self::from_toml_str(&std::fs::read_to_string(path)?)?;
        tracing::info!(path = %path.display(), "Engine configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.scoring.validate()?;
        self.triage.validate()
    }
}

/// Disease scoring tunables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    /// Matches must score strictly above this
    pub min_match_confidence: f64,
    pub typo_matching: bool,
    /// Minimum string similarity for the typo tier
    pub typo_threshold: f64,
    /// Similarity → confidence scale for the typo tier
    pub typo_scale: f64,
    pub critical_multiplier: f64,
    pub age_risk_multiplier: f64,
    pub pattern_boost: f64,
    pub chronic_boost: f64,
    /// Per-disease probability ceiling (percent)
    pub probability_cap: f64,
    /// Predictions below this probability are dropped (percent)
    pub min_probability: f64,
    pub max_predictions: usize,
    /// Ceiling for critical-boosted confidence (percent)
    pub confidence_cap: f64,
    pub critical_confidence_boost: f64,
    /// Age assumed when the patient context has none
    pub default_age: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_match_confidence: 0.5,
            typo_matching: true,
            typo_threshold: 0.85,
            typo_scale: 0.75,
            critical_multiplier: 1.5,
            age_risk_multiplier: 1.2,
            pattern_boost: 2.5,
            chronic_boost: 1.6,
            probability_cap: 95.0,
            min_probability: 5.0,
            max_predictions: 5,
            confidence_cap: 95.0,
            critical_confidence_boost: 1.2,
            default_age: DEFAULT_AGE,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.min_match_confidence) {
            return Err(invalid("scoring.min_match_confidence must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.typo_threshold) || !(0.0..=1.0).contains(&self.typo_scale) {
            return Err(invalid("scoring.typo_threshold and typo_scale must be within [0, 1]"));
        }
        for (name, cap) in [
            ("probability_cap", self.probability_cap),
            ("confidence_cap", self.confidence_cap),
        ] {
            if !(cap > 0.0 && cap <= 100.0) {
                return Err(invalid(format!("scoring.{name} must be within (0, 100]")));
            }
        }
        if !(0.0..100.0).contains(&self.min_probability) {
            return Err(invalid("scoring.min_probability must be within [0, 100)"));
        }
        for (name, factor) in [
            ("critical_multiplier", self.critical_multiplier),
            ("age_risk_multiplier", self.age_risk_multiplier),
            ("pattern_boost", self.pattern_boost),
            ("chronic_boost", self.chronic_boost),
            ("critical_confidence_boost", self.critical_confidence_boost),
        ] {
            if !(factor.is_finite() && factor > 0.0) {
                return Err(invalid(format!("scoring.{name} must be positive")));
            }
        }
        if self.max_predictions == 0 {
            return Err(invalid("scoring.max_predictions must be at least 1"));
        }
        Ok(())
    }
}

/// Triage tunables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TriageConfig {
    /// Ages strictly above this are high risk
    pub high_risk_age: u32,
    /// Ages strictly above this are medium risk
    pub medium_risk_age: u32,
    pub high_age_risk: f64,
    pub medium_age_risk: f64,
    pub chronic_condition_risk: f64,
    pub severe_multiplier: f64,
    pub moderate_multiplier: f64,
    pub mild_multiplier: f64,
    /// Risk strictly above this escalates one level
    pub escalate_one_threshold: f64,
    /// Risk strictly above this escalates two levels
    pub escalate_two_threshold: f64,
    /// Fraction of a combination's symptoms needed to trigger it
    pub combination_match_ratio: f64,
    /// More distinct symptoms than this route to GP
    pub multi_symptom_threshold: usize,
    pub base_confidence: f64,
    pub max_potential_conditions: usize,
    pub max_follow_up_questions: usize,
    pub default_age: u32,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            high_risk_age: 65,
            medium_risk_age: 45,
            high_age_risk: 0.3,
            medium_age_risk: 0.1,
            chronic_condition_risk: 0.2,
            severe_multiplier: 2.0,
            moderate_multiplier: 1.5,
            mild_multiplier: 1.0,
            escalate_one_threshold: 1.0,
            escalate_two_threshold: 1.5,
            combination_match_ratio: 0.5,
            multi_symptom_threshold: 3,
            base_confidence: 0.7,
            max_potential_conditions: 3,
            max_follow_up_questions: 5,
            default_age: DEFAULT_AGE,
        }
    }
}

impl TriageConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.medium_risk_age > self.high_risk_age {
            return Err(invalid("triage.medium_risk_age must not exceed high_risk_age"));
        }
        for (name, value) in [
            ("high_age_risk", self.high_age_risk),
            ("medium_age_risk", self.medium_age_risk),
            ("chronic_condition_risk", self.chronic_condition_risk),
            ("severe_multiplier", self.severe_multiplier),
            ("moderate_multiplier", self.moderate_multiplier),
            ("mild_multiplier", self.mild_multiplier),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(format!("triage.{name} must be non-negative")));
            }
        }
        if self.escalate_one_threshold > self.escalate_two_threshold {
            return Err(invalid(
                "triage.escalate_one_threshold must not exceed escalate_two_threshold",
            ));
        }
        if !(self.combination_match_ratio > 0.0 && self.combination_match_ratio <= 1.0) {
            return Err(invalid("triage.combination_match_ratio must be within (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.base_confidence) {
            return Err(invalid("triage.base_confidence must be within [0, 1]"));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}
