use sqlx::PgPool;

use crate::db::models::Subject;

pub(crate) const COLUMNS: &str = "id, name";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>(&format!("SELECT {COLUMNS} FROM subjects WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}
