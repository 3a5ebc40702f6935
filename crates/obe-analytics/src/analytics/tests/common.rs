use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::analytics::domain::{
    BoardExamResult, Competency, CompetencyPoMapping, CompetencyRating, Course, CoursePoMapping,
    Enrollment, Program, ProgramOutcome, ProgramType, QuestionType, SurveyAnswer, SurveyQuestion,
    SurveyResponse,
};
use crate::analytics::repository::{AnalyticsRepository, AnalyticsSnapshot, RepositoryError};
use crate::analytics::{analytics_router, AnalyticsService};

pub(super) fn at(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 9, 0, 0).single()
}

pub(super) fn program(id: i64, program_type: ProgramType) -> Program {
    Program {
        id,
        code: format!("PRG-{id}"),
        name: None,
        program_type,
    }
}

pub(super) fn outcome(id: i64, program_id: i64, code: &str) -> ProgramOutcome {
    ProgramOutcome {
        id,
        program_id,
        code: code.to_string(),
        description: format!("{code} description"),
    }
}

pub(super) fn course(id: i64) -> Course {
    Course {
        id,
        code: format!("CRS-{id}"),
        name: None,
        credits: 3,
        program_id: None,
    }
}

pub(super) fn course_mapping(course_id: i64, po_id: i64) -> CoursePoMapping {
    CoursePoMapping {
        id: None,
        course_id,
        po_id,
        weight: Some(1),
    }
}

pub(super) fn enrollment(id: i64, course_id: i64, grade: i32, term: &str) -> Enrollment {
    Enrollment {
        id,
        user_id: format!("student-{id}"),
        course_id,
        grade,
        academic_year: String::new(),
        term: term.to_string(),
        program_id: None,
    }
}

pub(super) fn question(
    id: i64,
    linked_po_id: Option<i64>,
    question_type: QuestionType,
) -> SurveyQuestion {
    SurveyQuestion {
        id,
        survey_id: 1,
        text: None,
        question_type,
        linked_po_id,
    }
}

pub(super) fn response(id: i64, submitted_at: Option<DateTime<Utc>>) -> SurveyResponse {
    SurveyResponse {
        id,
        survey_id: 1,
        user_id: None,
        submitted_at,
    }
}

pub(super) fn answer(
    id: i64,
    response_id: i64,
    question_id: i64,
    value: Option<i32>,
) -> SurveyAnswer {
    SurveyAnswer {
        id,
        response_id,
        question_id,
        answer_value: value,
        answer_text: None,
    }
}

pub(super) fn board_exam(
    id: i64,
    program_id: i64,
    exam_date: Option<&str>,
    passers: u32,
    takers: u32,
) -> BoardExamResult {
    BoardExamResult {
        id,
        program_id,
        exam_name: "Licensure Examination".to_string(),
        exam_date: exam_date.map(str::to_string),
        passers,
        takers,
    }
}

pub(super) fn competency(id: i64, program_id: i64) -> Competency {
    Competency {
        id,
        program_id,
        name: format!("Competency {id}"),
    }
}

pub(super) fn competency_mapping(competency_id: i64, po_id: i64) -> CompetencyPoMapping {
    CompetencyPoMapping {
        id: None,
        competency_id,
        po_id,
    }
}

pub(super) fn rating(
    id: i64,
    competency_id: i64,
    batch: Option<&str>,
    value: i32,
    created_at: Option<DateTime<Utc>>,
) -> CompetencyRating {
    CompetencyRating {
        id,
        competency_id,
        batch: batch.map(str::to_string),
        rating: value,
        created_at,
    }
}

/// Two programs: a board program (id 1) with outcomes 10 and 11 and a non-board
/// program (id 2) with outcome 20, with data spread over 2023 and 2024.
pub(super) fn campus_snapshot() -> AnalyticsSnapshot {
    AnalyticsSnapshot {
        programs: vec![
            program(1, ProgramType::Board),
            program(2, ProgramType::NonBoard),
        ],
        outcomes: vec![
            outcome(10, 1, "PO1"),
            outcome(11, 1, "PO2"),
            outcome(20, 2, "PO1"),
        ],
        courses: vec![course(100), course(101), course(200)],
        course_po_mappings: vec![
            course_mapping(100, 10),
            course_mapping(101, 10),
            course_mapping(101, 11),
            course_mapping(200, 20),
        ],
        enrollments: vec![
            enrollment(1, 100, 80, "Fall 2023"),
            enrollment(2, 101, 90, "Spring 2024"),
            enrollment(3, 101, 70, "Fall 2024"),
            enrollment(4, 200, 60, "Fall 2023"),
        ],
        surveys: Vec::new(),
        survey_questions: vec![
            question(500, Some(10), QuestionType::Scale),
            question(501, Some(20), QuestionType::Scale),
            question(502, Some(10), QuestionType::Text),
        ],
        survey_responses: vec![
            response(600, at(2023, 6, 1)),
            response(601, at(2024, 6, 1)),
        ],
        survey_answers: vec![
            answer(700, 600, 500, Some(4)),
            answer(701, 601, 500, Some(2)),
            answer(702, 601, 501, Some(5)),
            answer(703, 601, 502, None),
        ],
        board_exam_results: vec![
            board_exam(800, 1, Some("October 2023"), 8, 10),
            board_exam(801, 1, Some("March 2024"), 5, 10),
        ],
        competencies: vec![competency(900, 1)],
        competency_po_mappings: vec![competency_mapping(900, 11)],
        competency_ratings: vec![
            rating(950, 900, Some("2023"), 4, at(2024, 1, 15)),
            rating(951, 900, None, 5, at(2024, 3, 1)),
        ],
    }
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    snapshot: Mutex<AnalyticsSnapshot>,
}

impl MemoryRepository {
    pub(super) fn with_snapshot(snapshot: AnalyticsSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
        }
    }

    pub(super) fn replace(&self, snapshot: AnalyticsSnapshot) {
        *self.snapshot.lock().expect("snapshot mutex poisoned") = snapshot;
    }
}

impl AnalyticsRepository for MemoryRepository {
    fn snapshot(&self) -> Result<AnalyticsSnapshot, RepositoryError> {
        Ok(self.snapshot.lock().expect("snapshot mutex poisoned").clone())
    }
}

pub(super) struct UnavailableRepository;

impl AnalyticsRepository for UnavailableRepository {
    fn snapshot(&self) -> Result<AnalyticsSnapshot, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service(
    snapshot: AnalyticsSnapshot,
) -> (AnalyticsService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::with_snapshot(snapshot));
    (AnalyticsService::new(repository.clone()), repository)
}

pub(super) fn analytics_router_with_service(
    service: AnalyticsService<MemoryRepository>,
) -> axum::Router {
    analytics_router(Arc::new(service))
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = read_body(response).await;
    serde_json::from_slice(&body).expect("json payload")
}
