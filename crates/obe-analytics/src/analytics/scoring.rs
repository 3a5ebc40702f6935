use std::collections::HashSet;

use serde::Serialize;

use super::domain::{
    BoardExamResult, CompetencyPoMapping, CompetencyRating, CoursePoMapping, Enrollment, Program,
    ProgramOutcome, SurveyAnswer, SurveyQuestion,
};

/// Upper bound of the common attainment scale.
pub const ATTAINMENT_SCALE: f64 = 5.0;

/// Rows an outcome is scored against. Temporal sets are already year-filtered.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInputs<'a> {
    pub course_mappings: &'a [CoursePoMapping],
    pub enrollments: &'a [&'a Enrollment],
    pub questions: &'a [SurveyQuestion],
    pub answers: &'a [&'a SurveyAnswer],
    pub competency_mappings: &'a [CompetencyPoMapping],
    pub ratings: &'a [&'a CompetencyRating],
    pub programs: &'a [Program],
    pub board_exams: &'a [&'a BoardExamResult],
}

/// Attainment breakdown for one program outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoAnalytics {
    pub po: ProgramOutcome,
    pub grade_count: usize,
    /// Mean grade on the 0..100 scale.
    pub avg_grade: f64,
    pub survey_count: usize,
    pub avg_survey: f64,
    pub feedback_count: usize,
    pub avg_feedback: f64,
    /// Program-wide pass rate scaled to 0..5; reported even for non-board programs.
    pub board_exam_score: f64,
    pub is_board_program: bool,
    pub overall_score: f64,
}

pub fn compute_po_score(po: &ProgramOutcome, inputs: &ScoringInputs<'_>) -> PoAnalytics {
    let course_ids: HashSet<i64> = inputs
        .course_mappings
        .iter()
        .filter(|mapping| mapping.po_id == po.id)
        .map(|mapping| mapping.course_id)
        .collect();
    let grades: Vec<i32> = inputs
        .enrollments
        .iter()
        .filter(|enrollment| course_ids.contains(&enrollment.course_id))
        .map(|enrollment| enrollment.grade)
        .collect();
    let avg_grade = mean_of(&grades);

    let question_ids: HashSet<i64> = inputs
        .questions
        .iter()
        .filter(|question| question.scores_outcome(po.id))
        .map(|question| question.id)
        .collect();
    let survey_values: Vec<i32> = inputs
        .answers
        .iter()
        .filter(|answer| question_ids.contains(&answer.question_id))
        .filter_map(|answer| answer.rating())
        .collect();
    let avg_survey = mean_of(&survey_values);

    let competency_ids: HashSet<i64> = inputs
        .competency_mappings
        .iter()
        .filter(|mapping| mapping.po_id == po.id)
        .map(|mapping| mapping.competency_id)
        .collect();
    let ratings: Vec<i32> = inputs
        .ratings
        .iter()
        .filter(|rating| competency_ids.contains(&rating.competency_id))
        .map(|rating| rating.rating)
        .collect();
    let avg_feedback = mean_of(&ratings);

    let is_board_program = inputs
        .programs
        .iter()
        .find(|program| program.id == po.program_id)
        .is_some_and(|program| program.program_type.is_board());
    let (passers, takers) = inputs
        .board_exams
        .iter()
        .filter(|exam| exam.program_id == po.program_id)
        .fold((0u64, 0u64), |(passers, takers), exam| {
            (passers + u64::from(exam.passers), takers + u64::from(exam.takers))
        });
    let avg_board_exam = board_exam_score(passers, takers);

    // A zero sub-score is indistinguishable from "no data" and is left out of the mean.
    let mut present = Vec::with_capacity(4);
    if avg_grade > 0.0 {
        present.push(avg_grade / 100.0 * ATTAINMENT_SCALE);
    }
    if avg_survey > 0.0 {
        present.push(avg_survey);
    }
    if avg_feedback > 0.0 {
        present.push(avg_feedback);
    }
    if is_board_program && avg_board_exam > 0.0 {
        present.push(avg_board_exam);
    }

    let overall_score = if present.is_empty() {
        0.0
    } else {
        round_to_tenth(present.iter().sum::<f64>() / present.len() as f64)
    };

    PoAnalytics {
        po: po.clone(),
        grade_count: grades.len(),
        avg_grade: round_to_tenth(avg_grade),
        survey_count: survey_values.len(),
        avg_survey: round_to_tenth(avg_survey),
        feedback_count: ratings.len(),
        avg_feedback: round_to_tenth(avg_feedback),
        board_exam_score: round_to_tenth(avg_board_exam),
        is_board_program,
        overall_score,
    }
}

/// Pass rate scaled to the attainment range; zero when nobody sat the exam.
pub fn board_exam_score(passers: u64, takers: u64) -> f64 {
    if takers == 0 {
        return 0.0;
    }
    (passers as f64 / takers as f64) * ATTAINMENT_SCALE
}

/// Round half up to one decimal place.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

/// Round half up to a whole number.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Arithmetic mean, or zero for an empty set.
pub(crate) fn mean_of(values: &[i32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let total: i64 = values.iter().map(|value| i64::from(*value)).sum();
    total as f64 / values.len() as f64
}
