mod handlers;

use axum::{routing::get, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/students/:student_id", get(handlers::student_result))
        .route("/classes/:class_id", get(handlers::class_result))
}
