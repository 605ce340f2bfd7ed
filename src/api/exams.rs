use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::ValidatedJson;
use crate::api::guards::AdminKey;
use crate::core::state::AppState;
use crate::core::time::{parse_date, primitive_now_utc, today_utc};
use crate::repositories;
use crate::repositories::exams::{CreateExam, ExamFilter, ALL_CLASSES};
use crate::schemas::exam::{parse_mark_type, ExamCreate, ExamListQuery, ExamResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(list_exams).post(create_exam)).route("/:exam_id", get(get_exam))
}

fn optional(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn invalid_mark_type(value: &str) -> ApiError {
    ApiError::BadRequest(format!("Invalid mark_type '{value}'. Must be midterm or terminal"))
}

async fn list_exams(
    _admin: AdminKey,
    State(state): State<AppState>,
    Query(params): Query<ExamListQuery>,
) -> Result<Json<Vec<ExamResponse>>, ApiError> {
    let mark_type = match optional(&params.mark_type) {
        Some(value) => Some(parse_mark_type(value).ok_or_else(|| invalid_mark_type(value))?),
        None => None,
    };

    let filter = ExamFilter {
        mark_type,
        academic_year: optional(&params.academic_year),
        academic_term: optional(&params.academic_term),
        class_id: optional(&params.class_id),
    };

    let exams = repositories::exams::list(state.db(), filter)
        .await
        .map_err(|e| ApiError::store(e, "Failed to list exams"))?;

    let today = today_utc();
    Ok(Json(exams.into_iter().map(|exam| ExamResponse::from_db(exam, today)).collect()))
}

async fn get_exam(
    _admin: AdminKey,
    State(state): State<AppState>,
    Path(exam_id): Path<String>,
) -> Result<Json<ExamResponse>, ApiError> {
    let exam = repositories::exams::find_by_id(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound(format!("Exam not found: {exam_id}")))?;

    Ok(Json(ExamResponse::from_db(exam, today_utc())))
}

async fn create_exam(
    _admin: AdminKey,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ExamCreate>,
) -> Result<(StatusCode, Json<ExamResponse>), ApiError> {
    let mark_type = parse_mark_type(&payload.mark_type)
        .ok_or_else(|| invalid_mark_type(&payload.mark_type))?;

    let start_date = parse_date(&payload.start_date)
        .ok_or_else(|| ApiError::BadRequest("start_date must be YYYY-MM-DD".to_string()))?;
    let end_date = parse_date(&payload.end_date)
        .ok_or_else(|| ApiError::BadRequest("end_date must be YYYY-MM-DD".to_string()))?;
    if end_date < start_date {
        return Err(ApiError::BadRequest("end_date must not be before start_date".to_string()));
    }

    let class_scope = match optional(&payload.class_scope) {
        Some(scope) if !scope.eq_ignore_ascii_case(ALL_CLASSES) => {
            let class = repositories::classes::find_by_id(state.db(), scope)
                .await
                .map_err(|e| ApiError::store(e, "Failed to fetch class"))?;
            if class.is_none() {
                return Err(ApiError::BadRequest(format!("Class not found: {scope}")));
            }
            scope
        }
        _ => ALL_CLASSES,
    };

    let id = Uuid::new_v4().to_string();
    let exam = repositories::exams::create(
        state.db(),
        CreateExam {
            id: &id,
            name: payload.name.trim(),
            mark_type,
            session: payload.session.trim(),
            academic_year: payload.academic_year.trim(),
            academic_term: payload.academic_term.trim(),
            start_date,
            end_date,
            class_scope,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::store(e, "Failed to create exam"))?;

    tracing::info!(exam_id = %exam.id, mark_type = %mark_type, "Created exam");

    Ok((StatusCode::CREATED, Json(ExamResponse::from_db(exam, today_utc()))))
}
