//! Patient context supplied alongside a symptom list.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Age assumed when the caller does not provide one.
pub const DEFAULT_AGE: u32 = 30;

/// Oldest age accepted from untrusted input.
const MAX_PLAUSIBLE_AGE: u32 = 130;

/// Optional patient information. Every field has a safe default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientContext {
    /// Age in years
    #[serde(default)]
    pub age: Option<u32>,
    /// Gender (carried through, not used by scoring)
    #[serde(default)]
    pub gender: Option<String>,
    /// Free-text chronic conditions (e.g., "type 2 diabetes")
    #[serde(default)]
    pub chronic_conditions: Vec<String>,
    /// Used by medicine safety checks only
    #[serde(default)]
    pub pregnant: bool,
}

impl PatientContext {
    /// Context with only an age.
    pub fn with_age(age: u32) -> Self {
        Self {
            age: Some(age),
            ..Default::default()
        }
    }

    /// Age, falling back to `default_age`.
    pub fn age_or(&self, default_age: u32) -> u32 {
        self.age.unwrap_or(default_age)
    }

    /// Non-blank chronic conditions.
    pub fn chronic_conditions(&self) -> impl Iterator<Item = &str> {
        self.chronic_conditions
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
    }

    pub fn has_chronic_conditions(&self) -> bool {
        self.chronic_conditions().next().is_some()
    }

    /// Parse an untrusted JSON object without ever failing.
    ///
    /// Wrong-typed or out-of-range fields fall back to their defaults:
    /// - `age`: integer, float or numeric string in `0..=130`
    /// - `gender`: string
    /// - `chronic_conditions`: array of strings or a comma-separated string
    /// - `pregnant`: boolean or "true"/"yes"
    pub fn from_json(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let age = object.get("age").and_then(parse_age);

        let gender = object
            .get("gender")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string);

        let chronic_conditions = match object.get("chronic_conditions") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Value::String(joined)) => joined
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };

        let pregnant = match object.get("pregnant") {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(text)) => matches!(text.trim().to_lowercase().as_str(), "true" | "yes"),
            _ => false,
        };

        Self {
            age,
            gender,
            chronic_conditions,
            pregnant,
        }
    }
}

fn parse_age(value: &Value) -> Option<u32> {
    let years = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !years.is_finite() || years < 0.0 || years > MAX_PLAUSIBLE_AGE as f64 {
        return None;
    }
    Some(years.floor() as u32)
}
