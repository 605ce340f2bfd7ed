use serde::{Deserialize, Serialize};

use crate::db::models::ScoreRecord;
use crate::db::types::{ClassCategory, MarkType};
use crate::services::results::{RankedStudent, SubjectStats};

#[derive(Debug, Deserialize)]
pub(crate) struct ResultQuery {
    #[serde(alias = "examId")]
    pub(crate) exam_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamSummary {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) mark_type: MarkType,
    pub(crate) academic_year: String,
    pub(crate) academic_term: String,
}

/// A student's subject row next to the class figures for that subject.
#[derive(Debug, Serialize)]
pub(crate) struct SubjectResult {
    #[serde(flatten)]
    pub(crate) score: ScoreRecord,
    pub(crate) class_average: f64,
    pub(crate) class_highest: f64,
    pub(crate) class_lowest: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentResultResponse {
    pub(crate) exam: ExamSummary,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) class_id: String,
    pub(crate) subjects: Vec<SubjectResult>,
    pub(crate) total: f64,
    pub(crate) average_percentage: f64,
    pub(crate) rank: u32,
    pub(crate) class_size: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct ClassResultResponse {
    pub(crate) exam: ExamSummary,
    pub(crate) class_id: String,
    pub(crate) class_name: String,
    pub(crate) category: ClassCategory,
    pub(crate) subjects: Vec<SubjectStats>,
    pub(crate) students: Vec<RankedStudent>,
}
