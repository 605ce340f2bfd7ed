use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "classcategory", rename_all = "lowercase")]
pub(crate) enum ClassCategory {
    Junior,
    Senior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "studentstatus", rename_all = "lowercase")]
pub(crate) enum StudentStatus {
    Active,
    Inactive,
    Suspended,
    Graduated,
    Transferred,
    Withdrawn,
}

impl StudentStatus {
    pub(crate) const ALL: [StudentStatus; 6] = [
        StudentStatus::Active,
        StudentStatus::Inactive,
        StudentStatus::Suspended,
        StudentStatus::Graduated,
        StudentStatus::Transferred,
        StudentStatus::Withdrawn,
    ];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            StudentStatus::Active => "active",
            StudentStatus::Inactive => "inactive",
            StudentStatus::Suspended => "suspended",
            StudentStatus::Graduated => "graduated",
            StudentStatus::Transferred => "transferred",
            StudentStatus::Withdrawn => "withdrawn",
        }
    }
}

impl FromStr for StudentStatus {
    type Err = String;

    /// Case-insensitive, so admin forms may send `Active` or `ACTIVE`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|status| status.as_str() == normalized).ok_or_else(|| {
            let allowed: Vec<&str> = Self::ALL.iter().map(|status| status.as_str()).collect();
            format!("Invalid status '{value}'. Must be one of: {}", allowed.join(", "))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "marktype", rename_all = "lowercase")]
pub(crate) enum MarkType {
    Midterm,
    Terminal,
}

impl MarkType {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            MarkType::Midterm => "midterm",
            MarkType::Terminal => "terminal",
        }
    }

    /// Table holding this mark type's score rows.
    pub(crate) fn score_table(self) -> &'static str {
        match self {
            MarkType::Midterm => "midterm_scores",
            MarkType::Terminal => "terminal_scores",
        }
    }
}

impl fmt::Display for MarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_status_parses_case_insensitively() {
        assert_eq!("Active".parse::<StudentStatus>(), Ok(StudentStatus::Active));
        assert_eq!(" WITHDRAWN ".parse::<StudentStatus>(), Ok(StudentStatus::Withdrawn));
        assert_eq!("transferred".parse::<StudentStatus>(), Ok(StudentStatus::Transferred));
    }

    #[test]
    fn student_status_rejects_unknown_values() {
        let err = "expelled".parse::<StudentStatus>().unwrap_err();
        assert!(err.contains("expelled"));
        assert!(err.contains("graduated"));
    }

    #[test]
    fn mark_type_tables() {
        assert_eq!(MarkType::Midterm.score_table(), "midterm_scores");
        assert_eq!(MarkType::Terminal.score_table(), "terminal_scores");
        assert_eq!(MarkType::Terminal.to_string(), "terminal");
    }
}
