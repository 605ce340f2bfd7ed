use sqlx::{PgPool, Postgres, QueryBuilder};
use time::{Date, PrimitiveDateTime};

use crate::db::models::Exam;
use crate::db::types::MarkType;

pub(crate) const COLUMNS: &str = "\
    id, name, mark_type, session, academic_year, academic_term, start_date, end_date, \
    class_scope, created_at, updated_at";

/// Scope marker for exams that cover every class.
pub(crate) const ALL_CLASSES: &str = "ALL";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

#[derive(Debug, Default)]
pub(crate) struct ExamFilter<'a> {
    pub(crate) mark_type: Option<MarkType>,
    pub(crate) academic_year: Option<&'a str>,
    pub(crate) academic_term: Option<&'a str>,
    pub(crate) class_id: Option<&'a str>,
}

pub(crate) async fn list(pool: &PgPool, filter: ExamFilter<'_>) -> Result<Vec<Exam>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM exams WHERE TRUE"));

    if let Some(mark_type) = filter.mark_type {
        builder.push(" AND mark_type = ");
        builder.push_bind(mark_type);
    }
    if let Some(year) = filter.academic_year {
        builder.push(" AND academic_year = ");
        builder.push_bind(year);
    }
    if let Some(term) = filter.academic_term {
        builder.push(" AND academic_term = ");
        builder.push_bind(term);
    }
    if let Some(class_id) = filter.class_id {
        builder.push(" AND (class_scope = ");
        builder.push_bind(class_id);
        builder.push(" OR class_scope = ");
        builder.push_bind(ALL_CLASSES);
        builder.push(")");
    }

    builder.push(" ORDER BY start_date DESC, created_at DESC, id ASC");

    builder.build_query_as::<Exam>().fetch_all(pool).await
}

pub(crate) struct CreateExam<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) mark_type: MarkType,
    pub(crate) session: &'a str,
    pub(crate) academic_year: &'a str,
    pub(crate) academic_term: &'a str,
    pub(crate) start_date: Date,
    pub(crate) end_date: Date,
    pub(crate) class_scope: &'a str,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateExam<'_>) -> Result<Exam, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "INSERT INTO exams (
            id, name, mark_type, session, academic_year, academic_term,
            start_date, end_date, class_scope, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$10)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.mark_type)
    .bind(params.session)
    .bind(params.academic_year)
    .bind(params.academic_term)
    .bind(params.start_date)
    .bind(params.end_date)
    .bind(params.class_scope)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}
