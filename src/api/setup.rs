use axum::{routing::post, Json, Router};

use crate::api::guards::AdminKey;
use crate::core::state::AppState;
use crate::db::SCHEMA_SQL;
use crate::schemas::SetupResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/setup-supabase", post(setup_schema))
}

/// Hands back the schema DDL for an operator to run in the hosted SQL editor.
/// Nothing is executed here; the server applies its own migrations at startup.
async fn setup_schema(_admin: AdminKey) -> Json<SetupResponse> {
    Json(SetupResponse {
        message: "Run this SQL in the database SQL editor to create the schema".to_string(),
        sql: SCHEMA_SQL,
    })
}
