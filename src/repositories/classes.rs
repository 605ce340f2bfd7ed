use sqlx::PgPool;

use super::escape_like;
use crate::db::models::Class;

pub(crate) const COLUMNS: &str = "id, name, category, section";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Class>, sqlx::Error> {
    sqlx::query_as::<_, Class>(&format!("SELECT {COLUMNS} FROM classes WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Classes whose name equals or contains `lookup`, or whose name followed by a space
/// prefixes it (all case-insensitive).
///
/// The prefix arm lets "JSS 1 Gold" reach classes named "JSS 1" so the caller can
/// disambiguate on section. Rows come back oldest first.
pub(crate) async fn find_candidates_by_name(
    pool: &PgPool,
    lookup: &str,
) -> Result<Vec<Class>, sqlx::Error> {
    let pattern = format!("%{}%", escape_like(lookup));

    sqlx::query_as::<_, Class>(&format!(
        "SELECT {COLUMNS}
         FROM classes
         WHERE lower(name) = lower($1)
            OR name ILIKE $2 ESCAPE '\\'
            OR lower($1) LIKE lower(replace(replace(replace(name, '\\', '\\\\'), '%', '\\%'), '_', '\\_')) || ' %' ESCAPE '\\'
         ORDER BY created_at ASC, id ASC"
    ))
    .bind(lookup)
    .bind(pattern)
    .fetch_all(pool)
    .await
}
