//! SQLite schema definition.

/// Knowledge base schema.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Diseases
-- ============================================================================

CREATE TABLE IF NOT EXISTS diseases (
    name TEXT PRIMARY KEY,
    position INTEGER NOT NULL,                    -- load order
    department TEXT NOT NULL DEFAULT 'General Medicine',
    severity TEXT NOT NULL DEFAULT 'GP',          -- self-care | GP | urgent | emergency
    prevalence TEXT NOT NULL DEFAULT 'Common',
    description TEXT NOT NULL DEFAULT '',
    age_group TEXT NOT NULL DEFAULT 'All ages',
    treatment TEXT NOT NULL DEFAULT '[]',         -- JSON array of strings
    when_to_see_doctor TEXT,
    duration TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_diseases_position ON diseases(position);

-- ============================================================================
-- Symptom vocabulary
-- ============================================================================

CREATE TABLE IF NOT EXISTS symptoms (
    name TEXT PRIMARY KEY,                        -- lower-cased canonical name
    position INTEGER NOT NULL,
    synonyms TEXT NOT NULL DEFAULT '[]'           -- JSON array of strings
);

CREATE INDEX IF NOT EXISTS idx_symptoms_position ON symptoms(position);

-- ============================================================================
-- Disease ↔ symptom links
-- ============================================================================

CREATE TABLE IF NOT EXISTS disease_symptoms (
    disease TEXT NOT NULL REFERENCES diseases(name) ON DELETE CASCADE,
    symptom TEXT NOT NULL REFERENCES symptoms(name),
    symptom_class TEXT NOT NULL CHECK (symptom_class IN ('primary', 'secondary')),
    position INTEGER NOT NULL,                    -- order within the disease
    PRIMARY KEY (disease, symptom)
);

CREATE INDEX IF NOT EXISTS idx_disease_symptoms_symptom ON disease_symptoms(symptom);
"#;
