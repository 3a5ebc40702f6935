use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;

use super::domain::{BoardExamResult, CompetencyRating, Enrollment, SurveyAnswer, SurveyResponse};
use super::filter::{rating_bucket_year, rating_in_year, response_year};
use super::scoring::{mean_of, round_half_up, round_to_tenth};
use super::year::extract_year;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermTrend {
    pub term: String,
    pub avg_grade: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardExamTrend {
    pub year: String,
    pub passers: u64,
    pub takers: u64,
    /// Whole-number percentage.
    pub passing_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyTrend {
    pub year: String,
    pub responses: usize,
    pub avg_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackTrend {
    pub year: String,
    pub count: usize,
    pub avg_rating: f64,
}

/// Mean grade per distinct term. Terms sort as plain strings, so "Fall 2023"
/// precedes "Spring 2023".
pub fn grade_trend_by_term(enrollments: &[&Enrollment]) -> Vec<TermTrend> {
    let mut by_term: BTreeMap<&str, Vec<i32>> = BTreeMap::new();
    for enrollment in enrollments {
        by_term
            .entry(enrollment.term.as_str())
            .or_default()
            .push(enrollment.grade);
    }

    by_term
        .into_iter()
        .map(|(term, grades)| TermTrend {
            term: term.to_string(),
            avg_grade: round_to_tenth(mean_of(&grades)),
            count: grades.len(),
        })
        .collect()
}

/// Pass rates per exam year across the full history. Exams without a year are skipped.
pub fn board_exam_trend(exams: &[BoardExamResult]) -> Vec<BoardExamTrend> {
    let mut by_year: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for exam in exams {
        if let Some(year) = extract_year(exam.exam_date.as_deref()) {
            let totals = by_year.entry(year).or_default();
            totals.0 += u64::from(exam.passers);
            totals.1 += u64::from(exam.takers);
        }
    }

    by_year
        .into_iter()
        .map(|(year, (passers, takers))| BoardExamTrend {
            year,
            passers,
            takers,
            passing_rate: passing_rate(passers, takers),
        })
        .collect()
}

pub(crate) fn passing_rate(passers: u64, takers: u64) -> u32 {
    if takers == 0 {
        return 0;
    }
    round_half_up(passers as f64 / takers as f64 * 100.0) as u32
}

/// Response counts and mean rating per submission year across the full history.
/// Every rated answer counts, whether or not its question is linked to an outcome.
pub fn survey_trend(responses: &[SurveyResponse], answers: &[SurveyAnswer]) -> Vec<SurveyTrend> {
    let mut by_year: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for response in responses {
        if let Some(year) = response_year(response) {
            by_year.entry(year).or_default().push(response.id);
        }
    }

    by_year
        .into_iter()
        .map(|(year, response_ids)| {
            let members: HashSet<i64> = response_ids.iter().copied().collect();
            let ratings: Vec<i32> = answers
                .iter()
                .filter(|answer| members.contains(&answer.response_id))
                .filter_map(SurveyAnswer::rating)
                .collect();
            SurveyTrend {
                year,
                responses: response_ids.len(),
                avg_rating: round_to_tenth(mean_of(&ratings)),
            }
        })
        .collect()
}

/// Employer ratings per cohort year across the full history.
///
/// Buckets are keyed by batch year (creation year when no batch is recorded), but a
/// rating joins every bucket whose year matches either its batch or its creation
/// date, so a rating can be counted in two years.
pub fn feedback_trend(ratings: &[CompetencyRating]) -> Vec<FeedbackTrend> {
    let years: BTreeSet<String> = ratings.iter().filter_map(rating_bucket_year).collect();

    years
        .into_iter()
        .map(|year| {
            let values: Vec<i32> = ratings
                .iter()
                .filter(|rating| rating_in_year(rating, &year))
                .map(|rating| rating.rating)
                .collect();
            FeedbackTrend {
                count: values.len(),
                avg_rating: round_to_tenth(mean_of(&values)),
                year,
            }
        })
        .collect()
}
