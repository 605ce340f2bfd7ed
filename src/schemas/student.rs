use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Student;
use crate::db::types::StudentStatus;

/// One spelling per key, snake_case or camelCase.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct StudentCreate {
    #[serde(alias = "firstName")]
    #[validate(length(min = 1, message = "first_name is required"))]
    pub(crate) first_name: String,
    #[serde(default)]
    #[serde(alias = "middleName")]
    pub(crate) middle_name: Option<String>,
    #[serde(alias = "lastName")]
    #[validate(length(min = 1, message = "last_name is required"))]
    pub(crate) last_name: String,
    #[serde(alias = "registrationNumber")]
    #[validate(length(min = 1, message = "registration_number is required"))]
    pub(crate) registration_number: String,
    #[serde(default)]
    #[serde(alias = "classId")]
    pub(crate) class_id: Option<String>,
    #[serde(default)]
    pub(crate) section: Option<String>,
    /// Free text so a bad value gets a readable message instead of a serde error.
    #[serde(default)]
    pub(crate) status: Option<String>,
    #[validate(length(min = 3, max = 64, message = "username must be 3-64 characters"))]
    pub(crate) username: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters long"))]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StudentListQuery {
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "default_limit")]
    pub(crate) limit: i64,
    #[serde(default)]
    #[serde(alias = "classId")]
    pub(crate) class_id: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<String>,
    #[serde(default)]
    pub(crate) search: Option<String>,
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentResponse {
    pub(crate) id: String,
    pub(crate) first_name: String,
    pub(crate) middle_name: Option<String>,
    pub(crate) last_name: String,
    pub(crate) full_name: String,
    pub(crate) registration_number: String,
    pub(crate) class_id: Option<String>,
    pub(crate) section: Option<String>,
    pub(crate) status: StudentStatus,
    pub(crate) username: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl StudentResponse {
    pub(crate) fn from_db(student: Student) -> Self {
        Self {
            full_name: student.full_name(),
            id: student.id,
            first_name: student.first_name,
            middle_name: student.middle_name,
            last_name: student.last_name,
            registration_number: student.registration_number,
            class_id: student.class_id,
            section: student.section,
            status: student.status,
            username: student.username,
            created_at: format_primitive(student.created_at),
            updated_at: format_primitive(student.updated_at),
        }
    }
}
