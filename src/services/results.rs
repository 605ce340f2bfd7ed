//! Read-side aggregation over stored score rows: per-subject class statistics and
//! class ranking by summed totals.
//!
//! Ranking is standard competition ranking: a student's rank is one more than the
//! number of classmates with a strictly greater total, so equal totals share a rank
//! and the following rank is skipped (1, 2, 2, 4).

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::db::models::ScoreRecord;
use crate::services::scoring::round2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct SubjectStats {
    pub(crate) subject_id: String,
    pub(crate) subject_name: String,
    pub(crate) students: usize,
    pub(crate) class_average: f64,
    pub(crate) class_highest: f64,
    pub(crate) class_lowest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct RankedStudent {
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) subjects: usize,
    pub(crate) total: f64,
    pub(crate) average_percentage: f64,
    pub(crate) rank: u32,
}

/// Statistics for every subject present in `rows`, ordered by subject name.
pub(crate) fn subject_stats(rows: &[ScoreRecord]) -> Vec<SubjectStats> {
    let mut by_subject: BTreeMap<&str, (&str, Vec<f64>)> = BTreeMap::new();
    for row in rows {
        by_subject
            .entry(row.subject_id.as_str())
            .or_insert_with(|| (row.subject_name.as_str(), Vec::new()))
            .1
            .push(row.total);
    }

    let mut stats: Vec<SubjectStats> = by_subject
        .into_iter()
        .map(|(subject_id, (subject_name, totals))| {
            let highest = totals.iter().copied().fold(f64::MIN, f64::max);
            let lowest = totals.iter().copied().fold(f64::MAX, f64::min);
            SubjectStats {
                subject_id: subject_id.to_string(),
                subject_name: subject_name.to_string(),
                students: totals.len(),
                class_average: round2(totals.iter().sum::<f64>() / totals.len() as f64),
                class_highest: highest,
                class_lowest: lowest,
            }
        })
        .collect();

    stats.sort_by(|a, b| {
        a.subject_name.cmp(&b.subject_name).then_with(|| a.subject_id.cmp(&b.subject_id))
    });
    stats
}

/// Every student in `rows` with their summed total and competition rank, best first.
/// Equal totals are listed by name.
pub(crate) fn rank_students(rows: &[ScoreRecord]) -> Vec<RankedStudent> {
    struct Tally<'r> {
        name: &'r str,
        subjects: usize,
        total: f64,
        percentage_sum: f64,
    }

    let mut tallies: HashMap<&str, Tally<'_>> = HashMap::new();
    for row in rows {
        let tally = tallies.entry(row.student_id.as_str()).or_insert(Tally {
            name: row.student_name.as_str(),
            subjects: 0,
            total: 0.0,
            percentage_sum: 0.0,
        });
        tally.subjects += 1;
        tally.total += row.total;
        tally.percentage_sum += f64::from(row.percentage);
    }

    let totals: Vec<f64> = tallies.values().map(|tally| tally.total).collect();

    let mut ranked: Vec<RankedStudent> = tallies
        .into_iter()
        .map(|(student_id, tally)| RankedStudent {
            student_id: student_id.to_string(),
            student_name: tally.name.to_string(),
            subjects: tally.subjects,
            total: tally.total,
            average_percentage: round2(tally.percentage_sum / tally.subjects as f64),
            rank: competition_rank(tally.total, &totals),
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.rank
            .cmp(&b.rank)
            .then_with(|| a.student_name.cmp(&b.student_name))
            .then_with(|| a.student_id.cmp(&b.student_id))
    });
    ranked
}

/// 1 + the number of totals strictly greater than `total`.
pub(crate) fn competition_rank(total: f64, all_totals: &[f64]) -> u32 {
    1 + all_totals.iter().filter(|other| **other > total).count() as u32
}
