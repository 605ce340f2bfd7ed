use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::ScoreRecord;
use crate::db::types::MarkType;

pub(crate) const COLUMNS: &str = "\
    id, student_id, subject_id, class_id, exam_id, academic_year, academic_term, \
    student_name, subject_name, ca1, ca2, exam, total, percentage, grade, created_at, updated_at";

/// Rows per INSERT statement; at 17 binds a row this stays under the 65535 bind limit.
const UPSERT_CHUNK: usize = 500;

/// A normalized score row ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewScore {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) subject_id: String,
    pub(crate) class_id: String,
    pub(crate) exam_id: Option<String>,
    pub(crate) academic_year: String,
    pub(crate) academic_term: String,
    pub(crate) student_name: String,
    pub(crate) subject_name: String,
    pub(crate) ca1: f64,
    pub(crate) ca2: f64,
    pub(crate) exam: f64,
    pub(crate) total: f64,
    pub(crate) percentage: i32,
    pub(crate) grade: String,
}

/// The (subject, class, year, term) part of the score key shared by a batch.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BatchKey<'a> {
    pub(crate) subject_id: &'a str,
    pub(crate) class_id: &'a str,
    pub(crate) academic_year: &'a str,
    pub(crate) academic_term: &'a str,
}

/// Inserts or overwrites rows keyed on
/// (student_id, subject_id, class_id, academic_year, academic_term).
///
/// Callers run this inside a transaction so a batch lands completely or not at all.
/// The batch must not repeat a student.
pub(crate) async fn upsert_batch(
    conn: &mut PgConnection,
    mark_type: MarkType,
    rows: &[NewScore],
    now: PrimitiveDateTime,
) -> Result<u64, sqlx::Error> {
    let mut affected = 0;

    for chunk in rows.chunks(UPSERT_CHUNK) {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "INSERT INTO {} (
                id, student_id, subject_id, class_id, exam_id, academic_year, academic_term,
                student_name, subject_name, ca1, ca2, exam, total, percentage, grade,
                created_at, updated_at
            ) ",
            mark_type.score_table()
        ));

        builder.push_values(chunk, |mut values, row| {
            values
                .push_bind(row.id.clone())
                .push_bind(row.student_id.clone())
                .push_bind(row.subject_id.clone())
                .push_bind(row.class_id.clone())
                .push_bind(row.exam_id.clone())
                .push_bind(row.academic_year.clone())
                .push_bind(row.academic_term.clone())
                .push_bind(row.student_name.clone())
                .push_bind(row.subject_name.clone())
                .push_bind(row.ca1)
                .push_bind(row.ca2)
                .push_bind(row.exam)
                .push_bind(row.total)
                .push_bind(row.percentage)
                .push_bind(row.grade.clone())
                .push_bind(now)
                .push_bind(now);
        });

        builder.push(
            " ON CONFLICT (student_id, subject_id, class_id, academic_year, academic_term)
              DO UPDATE SET
                exam_id = EXCLUDED.exam_id,
                student_name = EXCLUDED.student_name,
                subject_name = EXCLUDED.subject_name,
                ca1 = EXCLUDED.ca1,
                ca2 = EXCLUDED.ca2,
                exam = EXCLUDED.exam,
                total = EXCLUDED.total,
                percentage = EXCLUDED.percentage,
                grade = EXCLUDED.grade,
                updated_at = EXCLUDED.updated_at",
        );

        affected += builder.build().execute(&mut *conn).await?.rows_affected();
    }

    Ok(affected)
}

/// Stored rows for the given students under one batch key.
pub(crate) async fn list_for_students(
    conn: &mut PgConnection,
    mark_type: MarkType,
    key: BatchKey<'_>,
    student_ids: &[String],
) -> Result<Vec<ScoreRecord>, sqlx::Error> {
    if student_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, ScoreRecord>(&format!(
        "SELECT {COLUMNS}
         FROM {}
         WHERE subject_id = $1 AND class_id = $2 AND academic_year = $3
           AND academic_term = $4 AND student_id = ANY($5)",
        mark_type.score_table()
    ))
    .bind(key.subject_id)
    .bind(key.class_id)
    .bind(key.academic_year)
    .bind(key.academic_term)
    .bind(student_ids)
    .fetch_all(conn)
    .await
}

#[derive(Debug, Default)]
pub(crate) struct ScoreFilter<'a> {
    pub(crate) exam_id: Option<&'a str>,
    pub(crate) subject_id: Option<&'a str>,
    pub(crate) class_id: Option<&'a str>,
    pub(crate) student_id: Option<&'a str>,
    pub(crate) academic_year: Option<&'a str>,
    pub(crate) academic_term: Option<&'a str>,
}

fn push_filter<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &ScoreFilter<'a>) {
    let clauses = [
        ("exam_id", filter.exam_id),
        ("subject_id", filter.subject_id),
        ("class_id", filter.class_id),
        ("student_id", filter.student_id),
        ("academic_year", filter.academic_year),
        ("academic_term", filter.academic_term),
    ];

    for (column, value) in clauses {
        if let Some(value) = value {
            builder.push(format!(" AND {column} = "));
            builder.push_bind(value);
        }
    }
}

pub(crate) async fn list(
    pool: &PgPool,
    mark_type: MarkType,
    filter: ScoreFilter<'_>,
) -> Result<Vec<ScoreRecord>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!(
        "SELECT {COLUMNS} FROM {} WHERE TRUE",
        mark_type.score_table()
    ));
    push_filter(&mut builder, &filter);
    builder.push(" ORDER BY student_name ASC, subject_name ASC, id ASC");

    builder.build_query_as::<ScoreRecord>().fetch_all(pool).await
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, sqlx::FromRow)]
pub(crate) struct ScoredStudent {
    pub(crate) student_id: String,
    pub(crate) student_name: String,
}

/// Distinct students that have at least one row matching `filter`.
pub(crate) async fn list_students(
    pool: &PgPool,
    mark_type: MarkType,
    filter: ScoreFilter<'_>,
) -> Result<Vec<ScoredStudent>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!(
        "SELECT DISTINCT ON (student_id) student_id, student_name FROM {} WHERE TRUE",
        mark_type.score_table()
    ));
    push_filter(&mut builder, &filter);
    builder.push(" ORDER BY student_id, updated_at DESC");

    let mut students = builder.build_query_as::<ScoredStudent>().fetch_all(pool).await?;
    students.sort_by(|a, b| a.student_name.cmp(&b.student_name));
    Ok(students)
}
