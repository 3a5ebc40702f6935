use serde::Serialize;

use super::filter::{collect_available_years, filter_by_year, YearFilter};
use super::repository::AnalyticsSnapshot;
use super::scoring::{compute_po_score, PoAnalytics, ScoringInputs};
use super::trends::{
    board_exam_trend, feedback_trend, grade_trend_by_term, survey_trend, BoardExamTrend,
    FeedbackTrend, SurveyTrend, TermTrend,
};

/// Caller-supplied narrowing. `program_id` is already scoped by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyticsQuery {
    pub program_id: Option<i64>,
    pub year: YearFilter,
}

impl AnalyticsQuery {
    pub fn new(program_id: Option<i64>, year: YearFilter) -> Self {
        Self { program_id, year }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_courses: usize,
    #[serde(rename = "totalPOs")]
    pub total_pos: usize,
    pub total_enrollments: usize,
    pub total_survey_responses: usize,
    pub total_feedback: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub po_analytics: Vec<PoAnalytics>,
    pub trend_data: Vec<TermTrend>,
    pub board_exam_trend: Vec<BoardExamTrend>,
    pub survey_trend: Vec<SurveyTrend>,
    pub feedback_trend: Vec<FeedbackTrend>,
    pub available_years: Vec<String>,
    pub summary: AnalyticsSummary,
}

/// Computes the full analytics payload from one snapshot. Pure: the same snapshot and
/// query always produce the same report.
///
/// Outcome scores and the per-term grade trend use the year-filtered rows; the
/// board, survey and feedback trends always span the full history since they bucket
/// by year themselves.
pub fn build_report(snapshot: &AnalyticsSnapshot, query: &AnalyticsQuery) -> AnalyticsReport {
    // Program 0 is the dashboard's "all programs" choice.
    let program_id = query.program_id.filter(|id| *id != 0);
    let outcomes: Vec<_> = snapshot
        .outcomes
        .iter()
        .filter(|po| program_id.map_or(true, |id| po.program_id == id))
        .collect();

    let slice = filter_by_year(&query.year, snapshot);
    let inputs = ScoringInputs {
        course_mappings: &snapshot.course_po_mappings,
        enrollments: &slice.enrollments,
        questions: &snapshot.survey_questions,
        answers: &slice.survey_answers,
        competency_mappings: &snapshot.competency_po_mappings,
        ratings: &slice.competency_ratings,
        programs: &snapshot.programs,
        board_exams: &slice.board_exams,
    };

    let po_analytics = outcomes
        .iter()
        .map(|po| compute_po_score(po, &inputs))
        .collect();

    AnalyticsReport {
        po_analytics,
        trend_data: grade_trend_by_term(&slice.enrollments),
        board_exam_trend: board_exam_trend(&snapshot.board_exam_results),
        survey_trend: survey_trend(&snapshot.survey_responses, &snapshot.survey_answers),
        feedback_trend: feedback_trend(&snapshot.competency_ratings),
        available_years: collect_available_years(snapshot),
        summary: AnalyticsSummary {
            total_courses: snapshot.courses.len(),
            total_pos: outcomes.len(),
            total_enrollments: slice.enrollments.len(),
            total_survey_responses: slice.survey_responses.len(),
            total_feedback: slice.competency_ratings.len(),
        },
    }
}
