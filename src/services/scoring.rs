//! Score normalization: clamping raw sub-scores into the ranges of each exam type,
//! totalling them and classifying the result into a letter grade.
//!
//! Normalization never fails. Anything that is not a finite number is scored as 0
//! and out-of-range values are clamped into range.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::db::types::MarkType;

/// Maximum value of each sub-score for one exam type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScoreScale {
    pub(crate) ca_max: f64,
    pub(crate) exam_max: f64,
}

impl ScoreScale {
    pub(crate) const MIDTERM: ScoreScale = ScoreScale { ca_max: 10.0, exam_max: 20.0 };
    pub(crate) const TERMINAL: ScoreScale = ScoreScale { ca_max: 20.0, exam_max: 60.0 };

    pub(crate) fn for_mark_type(mark_type: MarkType) -> Self {
        match mark_type {
            MarkType::Midterm => Self::MIDTERM,
            MarkType::Terminal => Self::TERMINAL,
        }
    }

    /// 40 for midterm, 100 for terminal.
    pub(crate) fn max_total(self) -> f64 {
        self.ca_max * 2.0 + self.exam_max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) enum Grade {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Grade {
    /// Boundaries apply to the unrounded percentage.
    pub(crate) fn from_percentage(percentage: f64) -> Self {
        match percentage {
            p if p >= 80.0 => Grade::A,
            p if p >= 70.0 => Grade::B,
            p if p >= 60.0 => Grade::C,
            p if p >= 50.0 => Grade::D,
            p if p >= 40.0 => Grade::E,
            _ => Grade::F,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-scores as submitted, already coerced to numbers but not yet clamped.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct SubScores {
    pub(crate) ca1: f64,
    pub(crate) ca2: f64,
    pub(crate) exam: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct NormalizedScore {
    pub(crate) ca1: f64,
    pub(crate) ca2: f64,
    pub(crate) exam: f64,
    pub(crate) total: f64,
    /// Unrounded; the grade is derived from this value.
    pub(crate) percentage: f64,
    pub(crate) grade: Grade,
}

impl NormalizedScore {
    pub(crate) fn display_percentage(&self) -> i32 {
        self.percentage.round() as i32
    }
}

/// Reads a JSON sub-score: numbers and numeric strings count, everything else is 0.
pub(crate) fn coerce_score(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|value| value.is_finite()).unwrap_or(0.0)
}

fn clamp_score(value: f64, max: f64) -> f64 {
    if value.is_finite() {
        round2(value.clamp(0.0, max))
    } else {
        0.0
    }
}

/// Rounds to hundredths, the precision scores are entered and stored with.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Drops float noise below a millionth so a true 60% is not classified as 59.999..%.
fn snap_percentage(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

pub(crate) fn normalize(mark_type: MarkType, raw: SubScores) -> NormalizedScore {
    let scale = ScoreScale::for_mark_type(mark_type);

    let ca1 = clamp_score(raw.ca1, scale.ca_max);
    let ca2 = clamp_score(raw.ca2, scale.ca_max);
    let exam = clamp_score(raw.exam, scale.exam_max);
    let total = round2(ca1 + ca2 + exam);
    let percentage = snap_percentage(total / scale.max_total() * 100.0);

    NormalizedScore { ca1, ca2, exam, total, percentage, grade: Grade::from_percentage(percentage) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(ca1: f64, ca2: f64, exam: f64) -> SubScores {
        SubScores { ca1, ca2, exam }
    }

    #[test]
    fn grade_boundaries() {
        assert_eq!(Grade::from_percentage(100.0), Grade::A);
        assert_eq!(Grade::from_percentage(80.0), Grade::A);
        assert_eq!(Grade::from_percentage(79.9), Grade::B);
        assert_eq!(Grade::from_percentage(70.0), Grade::B);
        assert_eq!(Grade::from_percentage(69.99), Grade::C);
        assert_eq!(Grade::from_percentage(60.0), Grade::C);
        assert_eq!(Grade::from_percentage(50.0), Grade::D);
        assert_eq!(Grade::from_percentage(40.0), Grade::E);
        assert_eq!(Grade::from_percentage(39.9), Grade::F);
        assert_eq!(Grade::from_percentage(0.0), Grade::F);
    }

    #[test]
    fn coerce_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_score(Some(&json!(7))), 7.0);
        assert_eq!(coerce_score(Some(&json!(7.5))), 7.5);
        assert_eq!(coerce_score(Some(&json!(" 15 "))), 15.0);
        assert_eq!(coerce_score(Some(&json!("-3"))), -3.0);
    }

    #[test]
    fn coerce_treats_garbage_as_zero() {
        assert_eq!(coerce_score(None), 0.0);
        assert_eq!(coerce_score(Some(&Value::Null)), 0.0);
        assert_eq!(coerce_score(Some(&json!("abc"))), 0.0);
        assert_eq!(coerce_score(Some(&json!("NaN"))), 0.0);
        assert_eq!(coerce_score(Some(&json!("inf"))), 0.0);
        assert_eq!(coerce_score(Some(&json!(true))), 0.0);
        assert_eq!(coerce_score(Some(&json!([1]))), 0.0);
    }

    #[test]
    fn midterm_clamps_and_grades() {
        let score = normalize(MarkType::Midterm, raw(15.0, -3.0, 25.0));
        assert_eq!(score.ca1, 10.0);
        assert_eq!(score.ca2, 0.0);
        assert_eq!(score.exam, 20.0);
        assert_eq!(score.total, 30.0);
        assert_eq!(score.display_percentage(), 75);
        assert_eq!(score.grade, Grade::B);
    }

    #[test]
    fn midterm_ranges_hold_for_extreme_input() {
        for input in [
            raw(f64::MAX, f64::MAX, f64::MAX),
            raw(-1e9, -1e9, -1e9),
            raw(f64::NAN, f64::INFINITY, f64::NEG_INFINITY),
            raw(9.5, 10.0, 19.5),
        ] {
            let score = normalize(MarkType::Midterm, input);
            assert!((0.0..=10.0).contains(&score.ca1));
            assert!((0.0..=10.0).contains(&score.ca2));
            assert!((0.0..=20.0).contains(&score.exam));
            assert_eq!(score.total, score.ca1 + score.ca2 + score.exam);
            assert!(score.total <= 40.0);
        }
    }

    #[test]
    fn terminal_percentage_equals_total() {
        let score = normalize(MarkType::Terminal, raw(17.0, 15.0, 48.0));
        assert_eq!(score.total, 80.0);
        assert_eq!(score.percentage, 80.0);
        assert_eq!(score.grade, Grade::A);

        let score = normalize(MarkType::Terminal, raw(25.0, 30.0, 75.0));
        assert_eq!((score.ca1, score.ca2, score.exam), (20.0, 20.0, 60.0));
        assert_eq!(score.total, 100.0);
    }

    #[test]
    fn display_percentage_rounds_to_nearest() {
        let score = normalize(MarkType::Midterm, raw(10.0, 9.0, 12.9));
        assert!((score.percentage - 79.75).abs() < 1e-9);
        assert_eq!(score.display_percentage(), 80);
        assert_eq!(score.grade, Grade::B);
    }

    #[test]
    fn fractional_scores_on_a_boundary_get_that_grade() {
        let score = normalize(MarkType::Midterm, raw(6.6, 9.7, 7.7));
        assert_eq!(score.total, 24.0);
        assert_eq!(score.percentage, 60.0);
        assert_eq!((score.display_percentage(), score.grade), (60, Grade::C));

        let score = normalize(MarkType::Terminal, raw(12.2, 19.9, 17.9));
        assert_eq!(score.total, 50.0);
        assert_eq!((score.display_percentage(), score.grade), (50, Grade::D));
    }

    #[test]
    fn grade_agrees_with_stored_percentage_across_hundredths() {
        for mark_type in [MarkType::Midterm, MarkType::Terminal] {
            for cents in 0..=2000 {
                let ca = f64::from(cents) / 100.0;
                let score = normalize(mark_type, raw(ca, ca, ca));
                let percentage = score.total / ScoreScale::for_mark_type(mark_type).max_total();
                let exact = Grade::from_percentage(round2(percentage * 100.0));
                assert_eq!(score.grade, exact, "{mark_type} {ca}");
            }
        }
    }

    #[test]
    fn sub_scores_are_kept_to_hundredths() {
        let score = normalize(MarkType::Midterm, raw(3.14159, 2.005, 0.1 + 0.2));
        assert_eq!((score.ca1, score.exam), (3.14, 0.3));
        assert_eq!(score.total, round2(score.ca1 + score.ca2 + score.exam));
    }

    #[test]
    fn scales() {
        assert_eq!(ScoreScale::MIDTERM.max_total(), 40.0);
        assert_eq!(ScoreScale::TERMINAL.max_total(), 100.0);
    }
}
