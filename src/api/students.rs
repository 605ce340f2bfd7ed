use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::ValidatedJson;
use crate::api::guards::AdminKey;
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::StudentStatus;
use crate::repositories;
use crate::repositories::students::{CreateStudent, StudentFilter};
use crate::schemas::student::{StudentCreate, StudentListQuery, StudentResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students).post(create_student))
        .route("/:student_id", get(get_student))
}

fn parse_status(value: Option<&str>) -> Result<Option<StudentStatus>, ApiError> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value.parse().map(Some).map_err(ApiError::BadRequest),
        None => Ok(None),
    }
}

fn optional(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

async fn list_students(
    _admin: AdminKey,
    State(state): State<AppState>,
    Query(params): Query<StudentListQuery>,
) -> Result<Json<Vec<StudentResponse>>, ApiError> {
    let filter = StudentFilter {
        class_id: optional(&params.class_id),
        status: parse_status(params.status.as_deref())?,
        search: optional(&params.search),
    };

    let students = repositories::students::list(state.db(), filter, params.skip, params.limit)
        .await
        .map_err(|e| ApiError::store(e, "Failed to list students"))?;

    Ok(Json(students.into_iter().map(StudentResponse::from_db).collect()))
}

async fn get_student(
    _admin: AdminKey,
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<StudentResponse>, ApiError> {
    let student = repositories::students::find_by_id(state.db(), &student_id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to fetch student"))?
        .ok_or_else(|| ApiError::NotFound(format!("Student not found: {student_id}")))?;

    Ok(Json(StudentResponse::from_db(student)))
}

async fn create_student(
    _admin: AdminKey,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<StudentCreate>,
) -> Result<(StatusCode, Json<StudentResponse>), ApiError> {
    let status = parse_status(payload.status.as_deref())?.unwrap_or(StudentStatus::Active);

    let class_id = optional(&payload.class_id);
    if let Some(class_id) = class_id {
        let class = repositories::classes::find_by_id(state.db(), class_id)
            .await
            .map_err(|e| ApiError::store(e, "Failed to fetch class"))?;
        if class.is_none() {
            return Err(ApiError::BadRequest(format!("Class not found: {class_id}")));
        }
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let id = Uuid::new_v4().to_string();
    let student = repositories::students::create(
        state.db(),
        CreateStudent {
            id: &id,
            first_name: payload.first_name.trim(),
            middle_name: optional(&payload.middle_name),
            last_name: payload.last_name.trim(),
            registration_number: payload.registration_number.trim(),
            class_id,
            section: optional(&payload.section),
            status,
            username: payload.username.trim(),
            hashed_password,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::store(e, "Failed to create student"))?;

    tracing::info!(student_id = %student.id, status = status.as_str(), "Created student");

    Ok((StatusCode::CREATED, Json(StudentResponse::from_db(student))))
}
