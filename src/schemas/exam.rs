use serde::{Deserialize, Serialize};
use time::Date;
use validator::Validate;

use crate::core::time::{format_date, format_primitive};
use crate::db::models::Exam;
use crate::db::types::MarkType;
use crate::services::exam_schedule::{status_on, ExamStatus};

/// Keys may be snake_case or camelCase, one spelling per field; sending both is a
/// duplicate-field error.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamCreate {
    #[validate(length(min = 1, message = "name is required"))]
    pub(crate) name: String,
    /// `midterm` or `terminal`, any case.
    #[serde(alias = "markType")]
    pub(crate) mark_type: String,
    #[serde(default)]
    pub(crate) session: String,
    #[serde(alias = "academicYear", alias = "academicYearId")]
    #[validate(length(min = 1, message = "academic_year is required"))]
    pub(crate) academic_year: String,
    #[serde(alias = "academicTerm", alias = "academicTermId")]
    #[validate(length(min = 1, message = "academic_term is required"))]
    pub(crate) academic_term: String,
    /// `YYYY-MM-DD`.
    #[serde(alias = "startDate")]
    pub(crate) start_date: String,
    #[serde(alias = "endDate")]
    pub(crate) end_date: String,
    /// A class id, or absent for every class.
    #[serde(default)]
    #[serde(alias = "classScope", alias = "class_id", alias = "classId")]
    pub(crate) class_scope: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExamListQuery {
    #[serde(default)]
    #[serde(alias = "markType")]
    pub(crate) mark_type: Option<String>,
    #[serde(default)]
    #[serde(alias = "academicYear", alias = "academicYearId")]
    pub(crate) academic_year: Option<String>,
    #[serde(default)]
    #[serde(alias = "academicTerm", alias = "academicTermId")]
    pub(crate) academic_term: Option<String>,
    #[serde(default)]
    #[serde(alias = "classId")]
    pub(crate) class_id: Option<String>,
}

pub(crate) fn parse_mark_type(value: &str) -> Option<MarkType> {
    match value.trim().to_ascii_lowercase().as_str() {
        "midterm" => Some(MarkType::Midterm),
        "terminal" => Some(MarkType::Terminal),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) mark_type: MarkType,
    pub(crate) session: String,
    pub(crate) academic_year: String,
    pub(crate) academic_term: String,
    pub(crate) start_date: String,
    pub(crate) end_date: String,
    pub(crate) class_scope: String,
    pub(crate) status: ExamStatus,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl ExamResponse {
    pub(crate) fn from_db(exam: Exam, today: Date) -> Self {
        Self {
            status: status_on(exam.start_date, exam.end_date, today),
            id: exam.id,
            name: exam.name,
            mark_type: exam.mark_type,
            session: exam.session,
            academic_year: exam.academic_year,
            academic_term: exam.academic_term,
            start_date: format_date(exam.start_date),
            end_date: format_date(exam.end_date),
            class_scope: exam.class_scope,
            created_at: format_primitive(exam.created_at),
            updated_at: format_primitive(exam.updated_at),
        }
    }
}
