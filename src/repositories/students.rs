use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use super::escape_like;
use crate::db::models::Student;
use crate::db::types::StudentStatus;

pub(crate) const COLUMNS: &str = "\
    id, first_name, middle_name, last_name, registration_number, class_id, section, \
    status, username, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_ids(
    pool: &PgPool,
    ids: &[String],
) -> Result<Vec<Student>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE id = ANY($1)"))
        .bind(ids)
        .fetch_all(pool)
        .await
}

#[derive(Debug, Default)]
pub(crate) struct StudentFilter<'a> {
    pub(crate) class_id: Option<&'a str>,
    pub(crate) status: Option<StudentStatus>,
    pub(crate) search: Option<&'a str>,
}

pub(crate) async fn list(
    pool: &PgPool,
    filter: StudentFilter<'_>,
    skip: i64,
    limit: i64,
) -> Result<Vec<Student>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM students WHERE TRUE"));

    if let Some(class_id) = filter.class_id {
        builder.push(" AND class_id = ");
        builder.push_bind(class_id);
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }
    if let Some(search) = filter.search {
        let pattern = format!("%{}%", escape_like(search));
        builder.push(" AND (first_name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" ESCAPE '\\' OR last_name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" ESCAPE '\\' OR registration_number ILIKE ");
        builder.push_bind(pattern);
        builder.push(" ESCAPE '\\')");
    }

    builder.push(" ORDER BY last_name ASC, first_name ASC, id ASC OFFSET ");
    builder.push_bind(skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit.clamp(1, 1000));

    builder.build_query_as::<Student>().fetch_all(pool).await
}

pub(crate) struct CreateStudent<'a> {
    pub(crate) id: &'a str,
    pub(crate) first_name: &'a str,
    pub(crate) middle_name: Option<&'a str>,
    pub(crate) last_name: &'a str,
    pub(crate) registration_number: &'a str,
    pub(crate) class_id: Option<&'a str>,
    pub(crate) section: Option<&'a str>,
    pub(crate) status: StudentStatus,
    pub(crate) username: &'a str,
    pub(crate) hashed_password: String,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateStudent<'_>,
) -> Result<Student, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "INSERT INTO students (
            id, first_name, middle_name, last_name, registration_number, class_id, section,
            status, username, hashed_password, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$11)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.first_name)
    .bind(params.middle_name)
    .bind(params.last_name)
    .bind(params.registration_number)
    .bind(params.class_id)
    .bind(params.section)
    .bind(params.status)
    .bind(params.username)
    .bind(params.hashed_password)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}
