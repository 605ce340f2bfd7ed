mod handlers;

use axum::{routing::get, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/midterm", get(handlers::list_midterm).post(handlers::submit_midterm))
        .route("/terminal", get(handlers::list_terminal).post(handlers::submit_terminal))
}

#[cfg(test)]
mod tests;
