use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;

use crate::api::errors::ApiError;
use crate::api::extract::ValidatedJson;
use crate::api::guards::AdminKey;
use crate::core::state::AppState;
use crate::db::models::ScoreRecord;
use crate::db::types::MarkType;
use crate::repositories;
use crate::repositories::scores::{ScoreFilter, ScoredStudent};
use crate::schemas::marks::{MarksSaved, ScoreListQuery, ScoreSubmission};
use crate::services::class_resolver::{self, ClassSelector, ResolveError};
use crate::services::score_entry::{self, ScoreBatch};

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(super) enum ScoreListing {
    Rows(Vec<ScoreRecord>),
    Students(Vec<ScoredStudent>),
}

pub(super) async fn submit_midterm(
    admin: AdminKey,
    state: State<AppState>,
    payload: ValidatedJson<ScoreSubmission>,
) -> Result<Json<MarksSaved>, ApiError> {
    submit(MarkType::Midterm, admin, state, payload).await
}

pub(super) async fn submit_terminal(
    admin: AdminKey,
    state: State<AppState>,
    payload: ValidatedJson<ScoreSubmission>,
) -> Result<Json<MarksSaved>, ApiError> {
    submit(MarkType::Terminal, admin, state, payload).await
}

pub(super) async fn list_midterm(
    admin: AdminKey,
    state: State<AppState>,
    query: Query<ScoreListQuery>,
) -> Result<Json<ScoreListing>, ApiError> {
    list(MarkType::Midterm, admin, state, query).await
}

pub(super) async fn list_terminal(
    admin: AdminKey,
    state: State<AppState>,
    query: Query<ScoreListQuery>,
) -> Result<Json<ScoreListing>, ApiError> {
    list(MarkType::Terminal, admin, state, query).await
}

async fn submit(
    mark_type: MarkType,
    _admin: AdminKey,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ScoreSubmission>,
) -> Result<Json<MarksSaved>, ApiError> {
    let class = ClassSelector::from_request(
        payload.class_id.as_deref(),
        payload.class_name.as_deref(),
        payload.section.as_deref(),
    )
    .ok_or_else(|| ApiError::BadRequest("class_id or class_name is required".to_string()))?;

    let batch = ScoreBatch {
        mark_type,
        subject_id: &payload.subject_id,
        class,
        exam_id: payload.exam_id.as_deref(),
        academic_year: &payload.academic_year,
        academic_term: &payload.academic_term,
        carry_forward: payload.carry_forward,
        entries: payload.scores.into_iter().map(|entry| entry.into_input()).collect(),
    };

    let saved = score_entry::save_batch(state.db(), batch).await?;

    let label = match mark_type {
        MarkType::Midterm => "Midterm",
        MarkType::Terminal => "Terminal",
    };
    Ok(Json(MarksSaved {
        message: format!("{label} scores saved successfully"),
        count: saved.count,
        class_id: saved.class_id,
        exam_id: saved.exam_id,
    }))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

async fn list(
    mark_type: MarkType,
    _admin: AdminKey,
    State(state): State<AppState>,
    Query(query): Query<ScoreListQuery>,
) -> Result<Json<ScoreListing>, ApiError> {
    let students_only = query.get_students_list.unwrap_or(false);

    let class_id = match ClassSelector::from_request(
        query.class_id.as_deref(),
        query.class_name.as_deref(),
        query.section.as_deref(),
    ) {
        None => None,
        Some(selector) => match class_resolver::resolve(state.db(), selector).await {
            Ok(class_id) => Some(class_id),
            // An unknown class has no scores.
            Err(ResolveError::NotFound(_)) => return Ok(Json(empty_listing(students_only))),
            Err(ResolveError::Store(err)) => {
                return Err(ApiError::store(err, "Failed to look up class"))
            }
        },
    };

    let filter = ScoreFilter {
        exam_id: non_blank(&query.exam_id),
        subject_id: non_blank(&query.subject_id),
        class_id: class_id.as_deref(),
        student_id: None,
        academic_year: non_blank(&query.academic_year),
        academic_term: non_blank(&query.academic_term),
    };

    let listing = if students_only {
        let students = repositories::scores::list_students(state.db(), mark_type, filter)
            .await
            .map_err(|e| ApiError::store(e, "Failed to list scored students"))?;
        ScoreListing::Students(students)
    } else {
        let rows = repositories::scores::list(state.db(), mark_type, filter)
            .await
            .map_err(|e| ApiError::store(e, "Failed to list scores"))?;
        ScoreListing::Rows(rows)
    };

    Ok(Json(listing))
}

fn empty_listing(students_only: bool) -> ScoreListing {
    if students_only {
        ScoreListing::Students(Vec::new())
    } else {
        ScoreListing::Rows(Vec::new())
    }
}
