use std::collections::HashMap;

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::core::metrics;
use crate::core::time::primitive_now_utc;
use crate::db::types::MarkType;
use crate::repositories;
use crate::repositories::scores::{BatchKey, NewScore};
use crate::services::carry_forward;
use crate::services::class_resolver::{self, ClassSelector, ResolveError};
use crate::services::scoring::{self, SubScores};

#[derive(Debug, Error)]
pub(crate) enum ScoreEntryError {
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{context}")]
    Store {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl ScoreEntryError {
    fn store(context: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Store { context, source }
    }
}

impl From<ResolveError> for ScoreEntryError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound(lookup) => Self::NotFound(format!("Class not found: {lookup}")),
            ResolveError::Store(source) => {
                Self::Store { context: "Failed to look up class", source }
            }
        }
    }
}

/// One student's submitted scores, coerced to numbers but not yet clamped.
#[derive(Debug, Clone)]
pub(crate) struct EntryInput {
    pub(crate) student_id: String,
    pub(crate) raw: SubScores,
    pub(crate) carry_forward: Option<bool>,
}

/// Scores for many students in one subject, class and grading period.
#[derive(Debug)]
pub(crate) struct ScoreBatch<'a> {
    pub(crate) mark_type: MarkType,
    pub(crate) subject_id: &'a str,
    pub(crate) class: ClassSelector<'a>,
    pub(crate) exam_id: Option<&'a str>,
    pub(crate) academic_year: &'a str,
    pub(crate) academic_term: &'a str,
    pub(crate) carry_forward: Option<bool>,
    pub(crate) entries: Vec<EntryInput>,
}

#[derive(Debug)]
pub(crate) struct SavedBatch {
    pub(crate) class_id: String,
    pub(crate) exam_id: Option<String>,
    pub(crate) count: usize,
}

/// Keeps the last entry per student (ids trimmed), in order of first appearance.
/// A single upsert statement may not touch the same key twice.
pub(crate) fn dedupe_entries(entries: Vec<EntryInput>) -> Vec<EntryInput> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<EntryInput> = Vec::with_capacity(entries.len());

    for entry in entries {
        let entry = EntryInput { student_id: entry.student_id.trim().to_string(), ..entry };
        match positions.get(&entry.student_id) {
            Some(&index) => unique[index] = entry,
            None => {
                positions.insert(entry.student_id.clone(), unique.len());
                unique.push(entry);
            }
        }
    }

    unique
}

fn require(value: &str, field: &str) -> Result<(), ScoreEntryError> {
    if value.trim().is_empty() {
        return Err(ScoreEntryError::Invalid(format!("{field} is required")));
    }
    Ok(())
}

/// Validates, normalizes and stores a batch of scores.
///
/// Terminal batches pull CA scores forward from midterm rows first. The whole batch
/// is written in one transaction, so resubmitting it overwrites instead of
/// duplicating and a failure leaves the stored rows untouched.
pub(crate) async fn save_batch(
    pool: &PgPool,
    batch: ScoreBatch<'_>,
) -> Result<SavedBatch, ScoreEntryError> {
    require(batch.subject_id, "subject_id")?;
    require(batch.academic_year, "academic_year")?;
    require(batch.academic_term, "academic_term")?;
    if batch.entries.is_empty() {
        return Err(ScoreEntryError::Invalid("scores must contain at least one entry".into()));
    }
    if batch.entries.iter().any(|entry| entry.student_id.trim().is_empty()) {
        return Err(ScoreEntryError::Invalid("every score needs a student_id".into()));
    }

    let subject_id = batch.subject_id.trim();
    let academic_year = batch.academic_year.trim();
    let academic_term = batch.academic_term.trim();

    let class_id = class_resolver::resolve(pool, batch.class).await?;

    let subject = repositories::subjects::find_by_id(pool, subject_id)
        .await
        .map_err(ScoreEntryError::store("Failed to fetch subject"))?
        .ok_or_else(|| ScoreEntryError::NotFound(format!("Subject not found: {subject_id}")))?;

    let exam_id = match batch.exam_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(exam_id) => {
            let exam = repositories::exams::find_by_id(pool, exam_id)
                .await
                .map_err(ScoreEntryError::store("Failed to fetch exam"))?
                .ok_or_else(|| ScoreEntryError::NotFound(format!("Exam not found: {exam_id}")))?;
            if exam.mark_type != batch.mark_type {
                return Err(ScoreEntryError::Invalid(format!(
                    "Exam {exam_id} is a {} exam, not {}",
                    exam.mark_type, batch.mark_type
                )));
            }
            Some(exam.id)
        }
        None => infer_exam_id(pool, &batch, &class_id).await?,
    };

    let entries = dedupe_entries(batch.entries);
    let student_ids: Vec<String> = entries.iter().map(|entry| entry.student_id.clone()).collect();

    let students = repositories::students::list_by_ids(pool, &student_ids)
        .await
        .map_err(ScoreEntryError::store("Failed to fetch students"))?;
    let names: HashMap<&str, String> =
        students.iter().map(|student| (student.id.as_str(), student.full_name())).collect();

    let missing: Vec<&str> = student_ids
        .iter()
        .map(String::as_str)
        .filter(|id| !names.contains_key(id))
        .collect();
    if !missing.is_empty() {
        return Err(ScoreEntryError::NotFound(format!(
            "Student not found: {}",
            missing.join(", ")
        )));
    }

    let key = BatchKey { subject_id, class_id: &class_id, academic_year, academic_term };

    let mut tx =
        pool.begin().await.map_err(ScoreEntryError::store("Failed to start transaction"))?;

    let midterms = match batch.mark_type {
        MarkType::Terminal => carry_forward::load_midterms(&mut *tx, key, &student_ids)
            .await
            .map_err(ScoreEntryError::store("Failed to fetch midterm scores"))?,
        MarkType::Midterm => HashMap::new(),
    };

    let mut carried = 0usize;
    let rows: Vec<NewScore> = entries
        .iter()
        .zip(&student_ids)
        .map(|(entry, student_id)| {
            let flag = entry.carry_forward.or(batch.carry_forward);
            let midterm = midterms.get(student_id).copied();
            let raw = carry_forward::apply(entry.raw, midterm, flag);
            if raw != entry.raw {
                carried += 1;
            }

            let score = scoring::normalize(batch.mark_type, raw);
            NewScore {
                id: Uuid::new_v4().to_string(),
                student_id: student_id.clone(),
                subject_id: subject.id.clone(),
                class_id: class_id.clone(),
                exam_id: exam_id.clone(),
                academic_year: academic_year.to_string(),
                academic_term: academic_term.to_string(),
                student_name: names.get(student_id.as_str()).cloned().unwrap_or_default(),
                subject_name: subject.name.clone(),
                ca1: score.ca1,
                ca2: score.ca2,
                exam: score.exam,
                total: score.total,
                percentage: score.display_percentage(),
                grade: score.grade.as_str().to_string(),
            }
        })
        .collect();

    repositories::scores::upsert_batch(&mut *tx, batch.mark_type, &rows, primitive_now_utc())
        .await
        .map_err(ScoreEntryError::store("Failed to save scores"))?;

    tx.commit().await.map_err(ScoreEntryError::store("Failed to commit scores"))?;

    metrics::record_score_batch(batch.mark_type.as_str(), rows.len());
    tracing::info!(
        mark_type = %batch.mark_type,
        class_id = %class_id,
        subject_id = %subject_id,
        academic_year = %academic_year,
        academic_term = %academic_term,
        rows = rows.len(),
        carried_forward = carried,
        "Saved score batch"
    );

    Ok(SavedBatch { class_id, exam_id, count: rows.len() })
}

/// Finds the exam a batch belongs to when the caller did not name one: the single
/// exam of this mark type and period scoped to the class or to every class.
async fn infer_exam_id(
    pool: &PgPool,
    batch: &ScoreBatch<'_>,
    class_id: &str,
) -> Result<Option<String>, ScoreEntryError> {
    let exams = repositories::exams::list(
        pool,
        repositories::exams::ExamFilter {
            mark_type: Some(batch.mark_type),
            academic_year: Some(batch.academic_year.trim()),
            academic_term: Some(batch.academic_term.trim()),
            class_id: Some(class_id),
        },
    )
    .await
    .map_err(ScoreEntryError::store("Failed to look up exam"))?;

    match exams.as_slice() {
        [exam] => Ok(Some(exam.id.clone())),
        _ => Ok(None),
    }
}
