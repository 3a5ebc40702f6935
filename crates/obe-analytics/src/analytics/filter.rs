use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use super::domain::{BoardExamResult, CompetencyRating, Enrollment, SurveyAnswer, SurveyResponse};
use super::repository::AnalyticsSnapshot;
use super::year::{extract_year, optional_calendar_year};

/// Temporal narrowing requested by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum YearFilter {
    #[default]
    All,
    Year(String),
}

impl YearFilter {
    /// Absent, blank and `"all"` mean no narrowing; anything else is matched verbatim.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            None => Self::All,
            Some(raw) if raw.is_empty() || raw == "all" => Self::All,
            Some(raw) => Self::Year(raw.to_string()),
        }
    }

    pub fn year(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Year(year) => Some(year),
        }
    }
}

/// Year-filtered view over a snapshot. Rows are borrowed, never copied.
#[derive(Debug, Clone, Default)]
pub struct TemporalSlice<'a> {
    pub enrollments: Vec<&'a Enrollment>,
    pub board_exams: Vec<&'a BoardExamResult>,
    pub competency_ratings: Vec<&'a CompetencyRating>,
    pub survey_responses: Vec<&'a SurveyResponse>,
    pub survey_answers: Vec<&'a SurveyAnswer>,
}

pub fn filter_by_year<'a>(
    filter: &YearFilter,
    snapshot: &'a AnalyticsSnapshot,
) -> TemporalSlice<'a> {
    let (enrollments, board_exams, competency_ratings, survey_responses): (
        Vec<&Enrollment>,
        Vec<&BoardExamResult>,
        Vec<&CompetencyRating>,
        Vec<&SurveyResponse>,
    ) = match filter.year() {
        None => (
            snapshot.enrollments.iter().collect(),
            snapshot.board_exam_results.iter().collect(),
            snapshot.competency_ratings.iter().collect(),
            snapshot.survey_responses.iter().collect(),
        ),
        Some(year) => (
            snapshot
                .enrollments
                .iter()
                .filter(|enrollment| enrollment_in_year(enrollment, year))
                .collect(),
            snapshot
                .board_exam_results
                .iter()
                .filter(|exam| {
                    extract_year(exam.exam_date.as_deref()).as_deref() == Some(year)
                })
                .collect(),
            snapshot
                .competency_ratings
                .iter()
                .filter(|rating| rating_in_year(rating, year))
                .collect(),
            snapshot
                .survey_responses
                .iter()
                .filter(|response| response_year(response).as_deref() == Some(year))
                .collect(),
        ),
    };

    let response_ids: HashSet<i64> = survey_responses
        .iter()
        .map(|response| response.id)
        .collect();
    let survey_answers = snapshot
        .survey_answers
        .iter()
        .filter(|answer| response_ids.contains(&answer.response_id))
        .collect();

    TemporalSlice {
        enrollments,
        board_exams,
        competency_ratings,
        survey_responses,
        survey_answers,
    }
}

/// Every year observable in the snapshot, newest first, regardless of any active filter.
pub fn collect_available_years(snapshot: &AnalyticsSnapshot) -> Vec<String> {
    let mut years = BTreeSet::new();

    years.extend(
        snapshot
            .enrollments
            .iter()
            .filter_map(|enrollment| extract_year(Some(&enrollment.term))),
    );
    years.extend(
        snapshot
            .board_exam_results
            .iter()
            .filter_map(|exam| extract_year(exam.exam_date.as_deref())),
    );
    years.extend(
        snapshot
            .competency_ratings
            .iter()
            .filter_map(rating_bucket_year),
    );
    years.extend(snapshot.survey_responses.iter().filter_map(response_year));

    years.into_iter().rev().collect()
}

// Either column matching is enough; historical rows are inconsistent.
fn enrollment_in_year(enrollment: &Enrollment, year: &str) -> bool {
    extract_year(Some(&enrollment.term)).as_deref() == Some(year)
        || extract_year(Some(&enrollment.academic_year)).as_deref() == Some(year)
}

pub(crate) fn rating_in_year(rating: &CompetencyRating, year: &str) -> bool {
    extract_year(rating.batch.as_deref()).as_deref() == Some(year)
        || optional_calendar_year(rating.created_at.as_ref()).as_deref() == Some(year)
}

/// The batch year when a batch is recorded, otherwise the creation year.
/// A batch without a four-digit run yields nothing and does not fall back.
pub(crate) fn rating_bucket_year(rating: &CompetencyRating) -> Option<String> {
    match rating.batch.as_deref().filter(|batch| !batch.is_empty()) {
        Some(batch) => extract_year(Some(batch)),
        None => optional_calendar_year(rating.created_at.as_ref()),
    }
}

pub(crate) fn response_year(response: &SurveyResponse) -> Option<String> {
    optional_calendar_year(response.submitted_at.as_ref())
}
