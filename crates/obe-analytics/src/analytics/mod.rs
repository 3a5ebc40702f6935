//! Program outcome attainment analytics.
//!
//! The engine is a pure function over an [`AnalyticsSnapshot`]: it never writes, and
//! every call recomputes from the rows it is given. The service and router wrap it
//! with a repository read and an HTTP surface.

pub mod domain;
pub mod engine;
pub mod export;
pub mod filter;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod trends;
pub mod year;

#[cfg(test)]
mod tests;

pub use domain::{
    BoardExamResult, Competency, CompetencyPoMapping, CompetencyRating, Course, CoursePoMapping,
    Enrollment, Program, ProgramOutcome, ProgramType, QuestionType, Survey, SurveyAnswer,
    SurveyQuestion, SurveyResponse, SurveyTargetRole,
};
pub use engine::{build_report, AnalyticsQuery, AnalyticsReport, AnalyticsSummary};
pub use export::{write_section, ExportError, ExportSection};
pub use filter::{collect_available_years, filter_by_year, TemporalSlice, YearFilter};
pub use repository::{
    AnalyticsRepository, AnalyticsSnapshot, JsonSnapshotRepository, RepositoryError,
};
pub use router::{analytics_router, AnalyticsParams};
pub use scoring::{compute_po_score, round_to_tenth, PoAnalytics, ScoringInputs};
pub use service::{AnalyticsService, AnalyticsServiceError};
pub use trends::{BoardExamTrend, FeedbackTrend, SurveyTrend, TermTrend};
pub use year::extract_year;
