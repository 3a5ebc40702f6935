use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::domain::{
    BoardExamResult, Competency, CompetencyPoMapping, CompetencyRating, Course, CoursePoMapping,
    Enrollment, Program, ProgramOutcome, Survey, SurveyAnswer, SurveyQuestion, SurveyResponse,
};

/// Every source table the aggregation reads, captured at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsSnapshot {
    pub programs: Vec<Program>,
    pub outcomes: Vec<ProgramOutcome>,
    pub courses: Vec<Course>,
    pub course_po_mappings: Vec<CoursePoMapping>,
    pub enrollments: Vec<Enrollment>,
    pub surveys: Vec<Survey>,
    pub survey_questions: Vec<SurveyQuestion>,
    pub survey_responses: Vec<SurveyResponse>,
    pub survey_answers: Vec<SurveyAnswer>,
    pub board_exam_results: Vec<BoardExamResult>,
    pub competencies: Vec<Competency>,
    pub competency_po_mappings: Vec<CompetencyPoMapping>,
    pub competency_ratings: Vec<CompetencyRating>,
}

impl AnalyticsSnapshot {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RepositoryError> {
        serde_json::from_reader(reader).map_err(RepositoryError::Malformed)
    }
}

/// Storage abstraction so the service can be exercised without a database.
pub trait AnalyticsRepository: Send + Sync {
    /// Reads the full, unfiltered snapshot. Called once per report.
    fn snapshot(&self) -> Result<AnalyticsSnapshot, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("snapshot source unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot is not valid analytics JSON: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Reads a JSON snapshot from disk on every call, so edits show up on the next request.
#[derive(Debug, Clone)]
pub struct JsonSnapshotRepository {
    path: PathBuf,
}

impl JsonSnapshotRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AnalyticsRepository for JsonSnapshotRepository {
    fn snapshot(&self) -> Result<AnalyticsSnapshot, RepositoryError> {
        let file = File::open(&self.path)?;
        AnalyticsSnapshot::from_reader(BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_tables_default_to_empty() {
        let snapshot = AnalyticsSnapshot::from_reader(
            r#"{"programs":[{"id":1,"code":"BSN","type":"board"}]}"#.as_bytes(),
        )
        .expect("partial snapshot parses");
        assert_eq!(snapshot.programs.len(), 1);
        assert!(snapshot.outcomes.is_empty());
        assert!(snapshot.competency_ratings.is_empty());
        assert!(snapshot.programs[0].program_type.is_board());
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = AnalyticsSnapshot::from_reader("{\"programs\": 3}".as_bytes())
            .expect_err("programs must be an array");
        assert!(matches!(err, RepositoryError::Malformed(_)));
    }

    #[test]
    fn json_repository_rereads_file_each_call() {
        let path = std::env::temp_dir().join(format!(
            "obe-analytics-snapshot-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"courses":[]}"#).expect("write snapshot");
        let repository = JsonSnapshotRepository::new(&path);
        assert!(repository.snapshot().expect("reads").courses.is_empty());

        let mut file = std::fs::File::create(&path).expect("rewrite snapshot");
        file.write_all(br#"{"courses":[{"id":1,"code":"IT101"}]}"#)
            .expect("write snapshot");
        drop(file);

        let snapshot = repository.snapshot().expect("reads again");
        assert_eq!(snapshot.courses.len(), 1);
        assert_eq!(snapshot.courses[0].credits, 3);

        std::fs::remove_file(&path).ok();
        assert!(matches!(
            repository.snapshot(),
            Err(RepositoryError::Io(_))
        ));
    }
}
