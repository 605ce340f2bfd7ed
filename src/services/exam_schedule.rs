use serde::Serialize;
use time::Date;

/// Exam status is never stored; it is read off the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ExamStatus {
    Scheduled,
    InProgress,
    Completed,
}

/// Both `start` and `end` days count as in progress.
pub(crate) fn status_on(start: Date, end: Date, today: Date) -> ExamStatus {
    if today < start {
        ExamStatus::Scheduled
    } else if today <= end {
        ExamStatus::InProgress
    } else {
        ExamStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn status_follows_calendar() {
        let start = date!(2024 - 11 - 04);
        let end = date!(2024 - 11 - 08);

        assert_eq!(status_on(start, end, date!(2024 - 11 - 03)), ExamStatus::Scheduled);
        assert_eq!(status_on(start, end, start), ExamStatus::InProgress);
        assert_eq!(status_on(start, end, date!(2024 - 11 - 06)), ExamStatus::InProgress);
        assert_eq!(status_on(start, end, end), ExamStatus::InProgress);
        assert_eq!(status_on(start, end, date!(2024 - 11 - 09)), ExamStatus::Completed);
    }

    #[test]
    fn single_day_exam() {
        let day = date!(2025 - 03 - 10);
        assert_eq!(status_on(day, day, day), ExamStatus::InProgress);
        assert_eq!(status_on(day, day, date!(2025 - 03 - 11)), ExamStatus::Completed);
    }
}
