use serde::Serialize;
use sqlx::FromRow;
use time::{Date, PrimitiveDateTime};

use crate::db::types::{ClassCategory, StudentStatus};

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Class {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) category: ClassCategory,
    pub(crate) section: String,
}

impl Class {
    /// "Name Section", or the bare name when the class has no section.
    pub(crate) fn label(&self) -> String {
        let section = self.section.trim();
        if section.is_empty() {
            self.name.trim().to_string()
        } else {
            format!("{} {}", self.name.trim(), section)
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Subject {
    pub(crate) id: String,
    pub(crate) name: String,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Student {
    pub(crate) id: String,
    pub(crate) first_name: String,
    pub(crate) middle_name: Option<String>,
    pub(crate) last_name: String,
    pub(crate) registration_number: String,
    pub(crate) class_id: Option<String>,
    pub(crate) section: Option<String>,
    pub(crate) status: StudentStatus,
    pub(crate) username: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

impl Student {
    /// "First Middle Last", skipping a blank middle name.
    pub(crate) fn full_name(&self) -> String {
        let mut parts = vec![self.first_name.trim()];
        if let Some(middle) = self.middle_name.as_deref().map(str::trim) {
            if !middle.is_empty() {
                parts.push(middle);
            }
        }
        parts.push(self.last_name.trim());
        parts.into_iter().filter(|part| !part.is_empty()).collect::<Vec<_>>().join(" ")
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Exam {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) mark_type: crate::db::types::MarkType,
    pub(crate) session: String,
    pub(crate) academic_year: String,
    pub(crate) academic_term: String,
    pub(crate) start_date: Date,
    pub(crate) end_date: Date,
    pub(crate) class_scope: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// One row of `midterm_scores` or `terminal_scores`; both tables share a layout.
#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct ScoreRecord {
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
    #[serde(serialize_with = "serialize_timestamp")]
    pub(crate) created_at: PrimitiveDateTime,
    #[serde(serialize_with = "serialize_timestamp")]
    pub(crate) updated_at: PrimitiveDateTime,
}

fn serialize_timestamp<S>(value: &PrimitiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&crate::core::time::format_primitive(*value))
}
