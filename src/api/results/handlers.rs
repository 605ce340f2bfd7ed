use axum::extract::{Path, Query, State};
use axum::Json;

use crate::api::errors::ApiError;
use crate::api::guards::AdminKey;
use crate::core::state::AppState;
use crate::db::models::Exam;
use crate::repositories;
use crate::repositories::exams::ALL_CLASSES;
use crate::repositories::scores::ScoreFilter;
use crate::schemas::results::{
    ClassResultResponse, ExamSummary, ResultQuery, StudentResultResponse, SubjectResult,
};
use crate::services::results::{rank_students, subject_stats};

async fn load_exam(state: &AppState, query: &ResultQuery) -> Result<Exam, ApiError> {
    let exam_id = query
        .exam_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("exam_id is required".to_string()))?;

    repositories::exams::find_by_id(state.db(), exam_id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound(format!("Exam not found: {exam_id}")))
}

fn summary(exam: &Exam) -> ExamSummary {
    ExamSummary {
        id: exam.id.clone(),
        name: exam.name.clone(),
        mark_type: exam.mark_type,
        academic_year: exam.academic_year.clone(),
        academic_term: exam.academic_term.clone(),
    }
}

/// The class an exam is limited to, if any.
fn scoped_class(exam: &Exam) -> Option<&str> {
    Some(exam.class_scope.as_str()).filter(|scope| *scope != ALL_CLASSES)
}

pub(super) async fn student_result(
    _admin: AdminKey,
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Query(query): Query<ResultQuery>,
) -> Result<Json<StudentResultResponse>, ApiError> {
    let exam = load_exam(&state, &query).await?;

    let student = repositories::students::find_by_id(state.db(), &student_id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to fetch student"))?
        .ok_or_else(|| ApiError::NotFound(format!("Student not found: {student_id}")))?;

    let own_rows = repositories::scores::list(
        state.db(),
        exam.mark_type,
        ScoreFilter {
            student_id: Some(&student.id),
            class_id: scoped_class(&exam),
            academic_year: Some(&exam.academic_year),
            academic_term: Some(&exam.academic_term),
            ..ScoreFilter::default()
        },
    )
    .await
    .map_err(|e| ApiError::store(e, "Failed to fetch student scores"))?;

    // A student who changed class mid-term is ranked in the class of their latest entry.
    let class_id = own_rows
        .iter()
        .max_by_key(|row| row.updated_at)
        .map(|row| row.class_id.clone())
        .ok_or_else(|| {
            ApiError::NotFound(format!("No {} scores for student {student_id}", exam.mark_type))
        })?;

    let class_rows = repositories::scores::list(
        state.db(),
        exam.mark_type,
        ScoreFilter {
            class_id: Some(&class_id),
            academic_year: Some(&exam.academic_year),
            academic_term: Some(&exam.academic_term),
            ..ScoreFilter::default()
        },
    )
    .await
    .map_err(|e| ApiError::store(e, "Failed to fetch class scores"))?;

    let stats = subject_stats(&class_rows);
    let ranking = rank_students(&class_rows);
    let standing = ranking
        .iter()
        .find(|ranked| ranked.student_id == student.id)
        .ok_or_else(|| ApiError::internal("student missing from ranking", "Failed to rank"))?;

    let subjects = class_rows
        .iter()
        .filter(|row| row.student_id == student.id)
        .filter_map(|row| {
            let stat = stats.iter().find(|stat| stat.subject_id == row.subject_id)?;
            Some(SubjectResult {
                score: row.clone(),
                class_average: stat.class_average,
                class_highest: stat.class_highest,
                class_lowest: stat.class_lowest,
            })
        })
        .collect();

    Ok(Json(StudentResultResponse {
        exam: summary(&exam),
        student_id: student.id.clone(),
        student_name: student.full_name(),
        class_id,
        subjects,
        total: standing.total,
        average_percentage: standing.average_percentage,
        rank: standing.rank,
        class_size: ranking.len(),
    }))
}

pub(super) async fn class_result(
    _admin: AdminKey,
    State(state): State<AppState>,
    Path(class_id): Path<String>,
    Query(query): Query<ResultQuery>,
) -> Result<Json<ClassResultResponse>, ApiError> {
    let exam = load_exam(&state, &query).await?;

    let class = repositories::classes::find_by_id(state.db(), &class_id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to fetch class"))?
        .ok_or_else(|| ApiError::NotFound(format!("Class not found: {class_id}")))?;

    if let Some(scope) = scoped_class(&exam) {
        if scope != class.id {
            return Err(ApiError::BadRequest(format!(
                "Exam {} does not apply to class {}",
                exam.id, class.id
            )));
        }
    }

    let rows = repositories::scores::list(
        state.db(),
        exam.mark_type,
        ScoreFilter {
            class_id: Some(&class.id),
            academic_year: Some(&exam.academic_year),
            academic_term: Some(&exam.academic_term),
            ..ScoreFilter::default()
        },
    )
    .await
    .map_err(|e| ApiError::store(e, "Failed to fetch class scores"))?;

    Ok(Json(ClassResultResponse {
        exam: summary(&exam),
        class_name: class.label(),
        category: class.category,
        class_id: class.id,
        subjects: subject_stats(&rows),
        students: rank_students(&rows),
    }))
}
