use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::services::score_entry::EntryInput;
use crate::services::scoring::{coerce_score, SubScores};

/// One student's raw sub-scores. Values may be numbers, numeric strings, or junk;
/// anything unparseable counts as zero.
#[derive(Debug, Deserialize, Serialize)]
#[serde(from = "ScoreEntryWire")]
pub(crate) struct ScoreEntry {
    pub(crate) student_id: String,
    pub(crate) ca1_score: Option<Value>,
    pub(crate) ca2_score: Option<Value>,
    pub(crate) exam_score: Option<Value>,
    pub(crate) carry_forward: Option<bool>,
}

impl ScoreEntry {
    pub(crate) fn into_input(self) -> EntryInput {
        EntryInput {
            raw: SubScores {
                ca1: coerce_score(self.ca1_score.as_ref()),
                ca2: coerce_score(self.ca2_score.as_ref()),
                exam: coerce_score(self.exam_score.as_ref()),
            },
            student_id: self.student_id,
            carry_forward: self.carry_forward,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(from = "ScoreSubmissionWire")]
pub(crate) struct ScoreSubmission {
    #[validate(length(min = 1, message = "scores must contain at least one entry"))]
    pub(crate) scores: Vec<ScoreEntry>,
    pub(crate) exam_id: Option<String>,
    #[validate(length(min = 1, message = "subject_id is required"))]
    pub(crate) subject_id: String,
    pub(crate) class_id: Option<String>,
    pub(crate) class_name: Option<String>,
    pub(crate) section: Option<String>,
    #[validate(length(min = 1, message = "academic_year is required"))]
    pub(crate) academic_year: String,
    #[validate(length(min = 1, message = "academic_term is required"))]
    pub(crate) academic_term: String,
    pub(crate) carry_forward: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(from = "ScoreListQueryWire")]
pub(crate) struct ScoreListQuery {
    pub(crate) exam_id: Option<String>,
    pub(crate) subject_id: Option<String>,
    pub(crate) class_id: Option<String>,
    pub(crate) class_name: Option<String>,
    pub(crate) section: Option<String>,
    pub(crate) academic_year: Option<String>,
    pub(crate) academic_term: Option<String>,
    pub(crate) get_students_list: Option<bool>,
}

// Portal clients mix snake_case and camelCase keys, sometimes both in one body.
// Every spelling gets its own slot and the first one present wins, snake_case first.

fn first<T>(spellings: impl IntoIterator<Item = Option<T>>) -> Option<T> {
    spellings.into_iter().flatten().next()
}

fn first_text(spellings: impl IntoIterator<Item = Option<String>>) -> Option<String> {
    first(spellings.into_iter().map(|value| value.filter(|text| !text.trim().is_empty())))
}

#[derive(Deserialize)]
struct ScoreEntryWire {
    student_id: Option<String>,
    #[serde(rename = "studentId")]
    student_id_camel: Option<String>,
    ca1_score: Option<Value>,
    ca1: Option<Value>,
    #[serde(rename = "ca1Score")]
    ca1_score_camel: Option<Value>,
    ca2_score: Option<Value>,
    ca2: Option<Value>,
    #[serde(rename = "ca2Score")]
    ca2_score_camel: Option<Value>,
    exam_score: Option<Value>,
    exam: Option<Value>,
    #[serde(rename = "examScore")]
    exam_score_camel: Option<Value>,
    carry_forward: Option<bool>,
    #[serde(rename = "carryForward")]
    carry_forward_camel: Option<bool>,
}

impl From<ScoreEntryWire> for ScoreEntry {
    fn from(wire: ScoreEntryWire) -> Self {
        Self {
            student_id: first_text([wire.student_id, wire.student_id_camel]).unwrap_or_default(),
            ca1_score: first([wire.ca1_score, wire.ca1, wire.ca1_score_camel]),
            ca2_score: first([wire.ca2_score, wire.ca2, wire.ca2_score_camel]),
            exam_score: first([wire.exam_score, wire.exam, wire.exam_score_camel]),
            carry_forward: first([wire.carry_forward, wire.carry_forward_camel]),
        }
    }
}

#[derive(Deserialize)]
struct ScoreSubmissionWire {
    #[serde(default)]
    scores: Vec<ScoreEntry>,
    exam_id: Option<String>,
    #[serde(rename = "examId")]
    exam_id_camel: Option<String>,
    subject_id: Option<String>,
    #[serde(rename = "subjectId")]
    subject_id_camel: Option<String>,
    class_id: Option<String>,
    #[serde(rename = "classId")]
    class_id_camel: Option<String>,
    class_name: Option<String>,
    #[serde(rename = "className")]
    class_name_camel: Option<String>,
    section: Option<String>,
    academic_year: Option<String>,
    #[serde(rename = "academicYear")]
    academic_year_camel: Option<String>,
    #[serde(rename = "academicYearId")]
    academic_year_id: Option<String>,
    academic_term: Option<String>,
    #[serde(rename = "academicTerm")]
    academic_term_camel: Option<String>,
    #[serde(rename = "academicTermId")]
    academic_term_id: Option<String>,
    carry_forward: Option<bool>,
    #[serde(rename = "carryForward")]
    carry_forward_camel: Option<bool>,
}

impl From<ScoreSubmissionWire> for ScoreSubmission {
    fn from(wire: ScoreSubmissionWire) -> Self {
        Self {
            scores: wire.scores,
            exam_id: first_text([wire.exam_id, wire.exam_id_camel]),
            subject_id: first_text([wire.subject_id, wire.subject_id_camel]).unwrap_or_default(),
            class_id: first_text([wire.class_id, wire.class_id_camel]),
            class_name: first_text([wire.class_name, wire.class_name_camel]),
            section: wire.section,
            academic_year: first_text([
                wire.academic_year,
                wire.academic_year_camel,
                wire.academic_year_id,
            ])
            .unwrap_or_default(),
            academic_term: first_text([
                wire.academic_term,
                wire.academic_term_camel,
                wire.academic_term_id,
            ])
            .unwrap_or_default(),
            carry_forward: first([wire.carry_forward, wire.carry_forward_camel]),
        }
    }
}

#[derive(Deserialize)]
struct ScoreListQueryWire {
    exam_id: Option<String>,
    #[serde(rename = "examId")]
    exam_id_camel: Option<String>,
    subject_id: Option<String>,
    #[serde(rename = "subjectId")]
    subject_id_camel: Option<String>,
    class_id: Option<String>,
    #[serde(rename = "classId")]
    class_id_camel: Option<String>,
    class_name: Option<String>,
    #[serde(rename = "className")]
    class_name_camel: Option<String>,
    section: Option<String>,
    academic_year: Option<String>,
    #[serde(rename = "academicYear")]
    academic_year_camel: Option<String>,
    #[serde(rename = "academicYearId")]
    academic_year_id: Option<String>,
    academic_term: Option<String>,
    #[serde(rename = "academicTerm")]
    academic_term_camel: Option<String>,
    #[serde(rename = "academicTermId")]
    academic_term_id: Option<String>,
    #[serde(rename = "getStudentsList")]
    get_students_list_camel: Option<bool>,
    get_students_list: Option<bool>,
}

impl From<ScoreListQueryWire> for ScoreListQuery {
    fn from(wire: ScoreListQueryWire) -> Self {
        Self {
            exam_id: first_text([wire.exam_id, wire.exam_id_camel]),
            subject_id: first_text([wire.subject_id, wire.subject_id_camel]),
            class_id: first_text([wire.class_id, wire.class_id_camel]),
            class_name: first_text([wire.class_name, wire.class_name_camel]),
            section: wire.section,
            academic_year: first_text([
                wire.academic_year,
                wire.academic_year_camel,
                wire.academic_year_id,
            ]),
            academic_term: first_text([
                wire.academic_term,
                wire.academic_term_camel,
                wire.academic_term_id,
            ]),
            get_students_list: first([wire.get_students_list_camel, wire.get_students_list]),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct MarksSaved {
    pub(crate) message: String,
    pub(crate) count: usize,
    pub(crate) class_id: String,
    pub(crate) exam_id: Option<String>,
}
