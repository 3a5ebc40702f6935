use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Whether graduates of a program sit a licensure exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramType {
    Board,
    #[default]
    NonBoard,
}

impl ProgramType {
    pub const fn is_board(self) -> bool {
        matches!(self, Self::Board)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: i64,
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub program_type: ProgramType,
}

/// The unit of aggregation: one attainment score is produced per outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramOutcome {
    pub id: i64,
    pub program_id: i64,
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_credits")]
    pub credits: i32,
    #[serde(default)]
    pub program_id: Option<i64>,
}

fn default_credits() -> i32 {
    3
}

/// Links a course to an outcome. The weight is stored but does not affect scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePoMapping {
    #[serde(default)]
    pub id: Option<i64>,
    pub course_id: i64,
    pub po_id: i64,
    #[serde(default)]
    pub weight: Option<i32>,
}

/// One graded student-course-term record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: i64,
    pub user_id: String,
    pub course_id: i64,
    pub grade: i32,
    pub academic_year: String,
    pub term: String,
    #[serde(default)]
    pub program_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyTargetRole {
    Student,
    Graduate,
    Employer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    pub target_role: SurveyTargetRole,
    #[serde(default)]
    pub program_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    Scale,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyQuestion {
    pub id: i64,
    pub survey_id: i64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub linked_po_id: Option<i64>,
}

impl SurveyQuestion {
    /// Only linked scale questions carry a rating that can be attributed to an outcome.
    pub fn scores_outcome(&self, po_id: i64) -> bool {
        match self.question_type {
            QuestionType::Scale => self.linked_po_id == Some(po_id),
            QuestionType::Text => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    pub id: i64,
    pub survey_id: i64,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyAnswer {
    pub id: i64,
    pub response_id: i64,
    pub question_id: i64,
    #[serde(default)]
    pub answer_value: Option<i32>,
    #[serde(default)]
    pub answer_text: Option<String>,
}

impl SurveyAnswer {
    /// A missing or zero value counts as "no rating given".
    pub fn rating(&self) -> Option<i32> {
        self.answer_value.filter(|value| *value != 0)
    }
}

/// Program-level licensure results; `exam_date` is free text such as "October 2025".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardExamResult {
    pub id: i64,
    pub program_id: i64,
    pub exam_name: String,
    #[serde(default)]
    pub exam_date: Option<String>,
    #[serde(default)]
    pub passers: u32,
    #[serde(default)]
    pub takers: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competency {
    pub id: i64,
    pub program_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyPoMapping {
    #[serde(default)]
    pub id: Option<i64>,
    pub competency_id: i64,
    pub po_id: i64,
}

/// Employer rating of a graduate against one competency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyRating {
    pub id: i64,
    pub competency_id: i64,
    #[serde(default)]
    pub batch: Option<String>,
    pub rating: i32,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Unreadable timestamps leave the row without a year instead of failing the load.
pub(crate) fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => {
            let parsed = parse_timestamp(raw);
            if parsed.is_none() {
                warn!(value = raw, "ignoring unrecognized timestamp");
            }
            Ok(parsed)
        }
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and bare dates; naive values are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
