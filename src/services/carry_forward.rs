use std::collections::HashMap;

use sqlx::PgConnection;

use crate::db::types::MarkType;
use crate::repositories::scores::{self, BatchKey};
use crate::services::scoring::SubScores;

/// Whether terminal CA scores should be derived from the midterm row.
///
/// An explicit flag always wins. Without one, CA1 and CA2 both at zero mean
/// "not entered yet".
pub(crate) fn applies(flag: Option<bool>, incoming: SubScores) -> bool {
    match flag {
        Some(explicit) => explicit,
        None => incoming.ca1 == 0.0 && incoming.ca2 == 0.0,
    }
}

/// Terminal CA1 becomes midterm CA1 + CA2 and terminal CA2 becomes the midterm exam
/// score. The terminal exam score is never touched. Runs before normalization, so
/// the result is still clamped afterwards.
pub(crate) fn apply(
    incoming: SubScores,
    midterm: Option<SubScores>,
    flag: Option<bool>,
) -> SubScores {
    match midterm {
        Some(midterm) if applies(flag, incoming) => SubScores {
            ca1: midterm.ca1 + midterm.ca2,
            ca2: midterm.exam,
            exam: incoming.exam,
        },
        _ => incoming,
    }
}

/// Midterm sub-scores for each student in the batch that has a midterm row under the
/// same score key.
pub(crate) async fn load_midterms(
    conn: &mut PgConnection,
    key: BatchKey<'_>,
    student_ids: &[String],
) -> Result<HashMap<String, SubScores>, sqlx::Error> {
    let rows = scores::list_for_students(conn, MarkType::Midterm, key, student_ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.student_id, SubScores { ca1: row.ca1, ca2: row.ca2, exam: row.exam }))
        .collect())
}
