//! Disease and symptom-vocabulary operations.

use rusqlite::{params, Connection, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::knowledge::{KnowledgeBase, KnowledgeBaseBuilder};
use crate::models::{normalize_text, DiseaseRecord, Prevalence, SymptomClass, Urgency};

const DISEASE_COLUMNS: &str = r#"
    name, department, severity, prevalence, description, age_group,
    treatment, when_to_see_doctor, duration
"#;

impl Database {
    /// Insert or update a disease and replace its symptom links.
    pub fn upsert_disease(&mut self, record: &DiseaseRecord) -> DbResult<()> {
        let tx = self.conn.transaction()?;
        write_disease(&tx, record)?;
        tx.commit()?;
        Ok(())
    }

    /// Set the synonym list of a canonical symptom, creating it if needed.
    pub fn upsert_symptom_synonyms(&self, symptom: &str, synonyms: &[String]) -> DbResult<()> {
        write_synonyms(&self.conn, symptom, synonyms)
    }

    /// Get a disease by exact name.
    pub fn get_disease(&self, name: &str) -> DbResult<Option<DiseaseRecord>> {
        let sql = format!("SELECT {DISEASE_COLUMNS} FROM diseases WHERE name = ?");
        let row = self
            .conn
            .query_row(&sql, [name], DiseaseRow::from_row)
            .optional()?;

        match row {
            Some(row) => {
                let mut record: DiseaseRecord = row.try_into()?;
                self.fill_symptoms(&mut record)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// All diseases in load order.
    pub fn list_diseases(&self) -> DbResult<Vec<DiseaseRecord>> {
        let sql = format!("SELECT {DISEASE_COLUMNS} FROM diseases ORDER BY position");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], DiseaseRow::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            let mut record: DiseaseRecord = row?.try_into()?;
            self.fill_symptoms(&mut record)?;
            records.push(record);
        }
        Ok(records)
    }

    pub fn disease_count(&self) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM diseases", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Write every disease and synonym list of `kb` in one transaction.
    pub fn import_knowledge_base(&mut self, kb: &KnowledgeBase) -> DbResult<usize> {
        let tx = self.conn.transaction()?;
        for record in kb.diseases() {
            write_disease(&tx, record)?;
        }
        for symptom in kb.symptoms() {
            if !symptom.synonyms.is_empty() {
                write_synonyms(&tx, &symptom.name, &symptom.synonyms)?;
            }
        }
        tx.commit()?;

        tracing::info!(diseases = kb.disease_count(), "Knowledge base imported into SQLite");
        Ok(kb.disease_count())
    }

    /// Rebuild a [`KnowledgeBase`] from the stored tables.
    pub fn load_knowledge_base(&self) -> DbResult<KnowledgeBase> {
        let mut builder = KnowledgeBaseBuilder::new();
        for record in self.list_diseases()? {
            builder.add_disease(record);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT name, synonyms FROM symptoms ORDER BY position")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (name, synonyms) = row?;
            let synonyms: Vec<String> = serde_json::from_str(&synonyms)?;
            builder.add_synonyms(&name, &synonyms);
        }

        Ok(builder.build())
    }

    fn fill_symptoms(&self, record: &mut DiseaseRecord) -> DbResult<()> {
        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT symptom, symptom_class
            FROM disease_symptoms
            WHERE disease = ?
            ORDER BY position
            "#,
        )?;
        let rows = stmt.query_map([&record.name], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (symptom, class) = row?;
            match SymptomClass::parse_label(&class) {
                Some(SymptomClass::Primary) => record.primary_symptoms.push(symptom),
                Some(SymptomClass::Secondary) => record.secondary_symptoms.push(symptom),
                None => {
                    return Err(DbError::Constraint(format!(
                        "invalid symptom class '{class}' for {}",
                        record.name
                    )))
                }
            }
        }
        Ok(())
    }
}

fn write_disease(conn: &Connection, record: &DiseaseRecord) -> DbResult<()> {
    if record.name.trim().is_empty() {
        return Err(DbError::Constraint("disease name must not be empty".into()));
    }
    let treatment_json = serde_json::to_string(&record.treatment)?;

    conn.execute(
        r#"
        INSERT INTO diseases (
            name, position, department, severity, prevalence, description, age_group,
            treatment, when_to_see_doctor, duration, updated_at
        ) VALUES (
            ?1, (SELECT COALESCE(MAX(position) + 1, 0) FROM diseases),
            ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, datetime('now')
        )
        ON CONFLICT(name) DO UPDATE SET
            department = excluded.department,
            severity = excluded.severity,
            prevalence = excluded.prevalence,
            description = excluded.description,
            age_group = excluded.age_group,
            treatment = excluded.treatment,
            when_to_see_doctor = excluded.when_to_see_doctor,
            duration = excluded.duration,
            updated_at = datetime('now')
        "#,
        params![
            record.name,
            record.department,
            record.severity.as_str(),
            record.prevalence.as_str(),
            record.description,
            record.age_group,
            treatment_json,
            record.when_to_see_doctor,
            record.duration,
        ],
    )?;

    conn.execute("DELETE FROM disease_symptoms WHERE disease = ?", [&record.name])?;

    let mut position = 0i64;
    for (symptom, class) in record.classified_symptoms() {
        let symptom = normalize_text(symptom);
        if symptom.is_empty() {
            continue;
        }
        ensure_symptom(conn, &symptom)?;
        // First class wins when a symptom is listed twice
        let inserted = conn.execute(
            r#"
            INSERT INTO disease_symptoms (disease, symptom, symptom_class, position)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(disease, symptom) DO NOTHING
            "#,
            params![record.name, symptom, class.as_str(), position],
        )?;
        position += inserted as i64;
    }
    Ok(())
}

fn ensure_symptom(conn: &Connection, symptom: &str) -> DbResult<()> {
    conn.execute(
        r#"
        INSERT INTO symptoms (name, position)
        VALUES (?1, (SELECT COALESCE(MAX(position) + 1, 0) FROM symptoms))
        ON CONFLICT(name) DO NOTHING
        "#,
        [symptom],
    )?;
    Ok(())
}

fn write_synonyms(conn: &Connection, symptom: &str, synonyms: &[String]) -> DbResult<()> {
    let symptom = normalize_text(symptom);
    if symptom.is_empty() {
        return Err(DbError::Constraint("symptom name must not be empty".into()));
    }
    let synonyms: Vec<String> = synonyms
        .iter()
        .map(|s| normalize_text(s))
        .filter(|s| !s.is_empty())
        .collect();

    ensure_symptom(conn, &symptom)?;
    conn.execute(
        "UPDATE symptoms SET synonyms = ?2 WHERE name = ?1",
        params![symptom, serde_json::to_string(&synonyms)?],
    )?;
    Ok(())
}

/// Intermediate row struct for database mapping.
struct DiseaseRow {
    name: String,
    department: String,
    severity: String,
    prevalence: String,
    description: String,
    age_group: String,
    treatment: String,
    when_to_see_doctor: Option<String>,
    duration: Option<String>,
}

impl DiseaseRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(DiseaseRow {
            name: row.get(0)?,
            department: row.get(1)?,
            severity: row.get(2)?,
            prevalence: row.get(3)?,
            description: row.get(4)?,
            age_group: row.get(5)?,
            treatment: row.get(6)?,
            when_to_see_doctor: row.get(7)?,
            duration: row.get(8)?,
        })
    }
}

impl TryFrom<DiseaseRow> for DiseaseRecord {
    type Error = DbError;

    fn try_from(row: DiseaseRow) -> Result<Self, Self::Error> {
        let severity = Urgency::parse_label(&row.severity).ok_or_else(|| {
            DbError::Constraint(format!("invalid severity '{}' for {}", row.severity, row.name))
        })?;
        let prevalence = Prevalence::parse_label(&row.prevalence).ok_or_else(|| {
            DbError::Constraint(format!(
                "invalid prevalence '{}' for {}",
                row.prevalence, row.name
            ))
        })?;

        let mut record = DiseaseRecord::new(row.name);
        record.department = row.department;
        record.severity = severity;
        record.prevalence = prevalence;
        record.description = row.description;
        record.age_group = row.age_group;
        record.treatment = serde_json::from_str(&row.treatment)?;
        record.when_to_see_doctor = row.when_to_see_doctor;
        record.duration = row.duration;
        Ok(record)
    }
}
