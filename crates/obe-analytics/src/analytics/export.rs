use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::Serialize;

use super::engine::AnalyticsReport;
use super::filter::YearFilter;
use super::scoring::PoAnalytics;

/// One tabular section of the analytics report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportSection {
    #[default]
    Outcomes,
    Grades,
    BoardExams,
    Surveys,
    Feedback,
    Summary,
}

impl ExportSection {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Outcomes,
            Self::Grades,
            Self::BoardExams,
            Self::Surveys,
            Self::Feedback,
            Self::Summary,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Outcomes => "outcomes",
            Self::Grades => "grades",
            Self::BoardExams => "board-exams",
            Self::Surveys => "surveys",
            Self::Feedback => "feedback",
            Self::Summary => "summary",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Outcomes => "PO Analytics",
            Self::Grades => "Grade Trends",
            Self::BoardExams => "Board Exam Trends",
            Self::Surveys => "Survey Trends",
            Self::Feedback => "Feedback Trends",
            Self::Summary => "Summary",
        }
    }

    /// Suggested download name, e.g. `po_analytics_outcomes_2024.csv`.
    pub fn file_name(self, year: &YearFilter) -> String {
        let section = self.key().replace('-', "_");
        match year.year() {
            Some(year) => format!("po_analytics_{section}_{year}.csv"),
            None => format!("po_analytics_{section}.csv"),
        }
    }
}

impl fmt::Display for ExportSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ExportSection {
    type Err = ExportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Self::ordered()
            .into_iter()
            .find(|section| section.key() == normalized)
            .ok_or_else(|| ExportError::UnknownSection(value.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("unknown export section '{0}'")]
    UnknownSection(String),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV output: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct OutcomeRow<'a> {
    #[serde(rename = "PO Code")]
    code: &'a str,
    #[serde(rename = "Description")]
    description: &'a str,
    #[serde(rename = "Grade Avg")]
    avg_grade: f64,
    #[serde(rename = "Grade Count")]
    grade_count: usize,
    #[serde(rename = "Survey Avg")]
    avg_survey: f64,
    #[serde(rename = "Survey Count")]
    survey_count: usize,
    #[serde(rename = "Feedback Avg")]
    avg_feedback: f64,
    #[serde(rename = "Feedback Count")]
    feedback_count: usize,
    #[serde(rename = "Board Exam Score")]
    board_exam_score: String,
    #[serde(rename = "Overall Score")]
    overall_score: f64,
}

impl<'a> From<&'a PoAnalytics> for OutcomeRow<'a> {
    fn from(item: &'a PoAnalytics) -> Self {
        let board_exam_score = if item.is_board_program {
            format!("{:.1}", item.board_exam_score)
        } else {
            "N/A".to_string()
        };

        Self {
            code: &item.po.code,
            description: &item.po.description,
            avg_grade: item.avg_grade,
            grade_count: item.grade_count,
            avg_survey: item.avg_survey,
            survey_count: item.survey_count,
            avg_feedback: item.avg_feedback,
            feedback_count: item.feedback_count,
            board_exam_score,
            overall_score: item.overall_score,
        }
    }
}

#[derive(Debug, Serialize)]
struct SummaryRow {
    #[serde(rename = "Total Courses")]
    total_courses: usize,
    #[serde(rename = "Total POs")]
    total_pos: usize,
    #[serde(rename = "Total Enrollments")]
    total_enrollments: usize,
    #[serde(rename = "Total Survey Responses")]
    total_survey_responses: usize,
    #[serde(rename = "Total Employer Feedback")]
    total_feedback: usize,
}

/// Writes one report section as CSV with a header row, even when the section is empty.
pub fn write_section<W: Write>(
    report: &AnalyticsReport,
    section: ExportSection,
    writer: W,
) -> Result<(), ExportError> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);

    match section {
        ExportSection::Outcomes => {
            write_header(
                &mut csv_writer,
                &[
                    "PO Code",
                    "Description",
                    "Grade Avg",
                    "Grade Count",
                    "Survey Avg",
                    "Survey Count",
                    "Feedback Avg",
                    "Feedback Count",
                    "Board Exam Score",
                    "Overall Score",
                ],
                report.po_analytics.is_empty(),
            )?;
            for item in &report.po_analytics {
                csv_writer.serialize(OutcomeRow::from(item))?;
            }
        }
        ExportSection::Grades => {
            write_header(
                &mut csv_writer,
                &["term", "avgGrade", "count"],
                report.trend_data.is_empty(),
            )?;
            for row in &report.trend_data {
                csv_writer.serialize(row)?;
            }
        }
        ExportSection::BoardExams => {
            write_header(
                &mut csv_writer,
                &["year", "passers", "takers", "passingRate"],
                report.board_exam_trend.is_empty(),
            )?;
            for row in &report.board_exam_trend {
                csv_writer.serialize(row)?;
            }
        }
        ExportSection::Surveys => {
            write_header(
                &mut csv_writer,
                &["year", "responses", "avgRating"],
                report.survey_trend.is_empty(),
            )?;
            for row in &report.survey_trend {
                csv_writer.serialize(row)?;
            }
        }
        ExportSection::Feedback => {
            write_header(
                &mut csv_writer,
                &["year", "count", "avgRating"],
                report.feedback_trend.is_empty(),
            )?;
            for row in &report.feedback_trend {
                csv_writer.serialize(row)?;
            }
        }
        ExportSection::Summary => {
            let summary = &report.summary;
            csv_writer.serialize(SummaryRow {
                total_courses: summary.total_courses,
                total_pos: summary.total_pos,
                total_enrollments: summary.total_enrollments,
                total_survey_responses: summary.total_survey_responses,
                total_feedback: summary.total_feedback,
            })?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}

// serde-driven headers only appear with the first row, so empty sections need one written by hand.
fn write_header<W: Write>(
    csv_writer: &mut csv::Writer<W>,
    header: &[&str],
    empty: bool,
) -> Result<(), csv::Error> {
    if empty {
        csv_writer.write_record(header)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_section_keys_leniently() {
        assert_eq!(
            "board_exams".parse::<ExportSection>().expect("known section"),
            ExportSection::BoardExams
        );
        assert_eq!(
            " Outcomes ".parse::<ExportSection>().expect("known section"),
            ExportSection::Outcomes
        );
        assert!(matches!(
            "charts".parse::<ExportSection>(),
            Err(ExportError::UnknownSection(value)) if value == "charts"
        ));
    }

    #[test]
    fn file_name_carries_the_selected_year() {
        assert_eq!(
            ExportSection::BoardExams.file_name(&YearFilter::Year("2024".to_string())),
            "po_analytics_board_exams_2024.csv"
        );
        assert_eq!(
            ExportSection::Summary.file_name(&YearFilter::All),
            "po_analytics_summary.csv"
        );
    }

    #[test]
    fn empty_sections_still_emit_headers() {
        let report = AnalyticsReport::default();
        let mut buffer = Vec::new();
        write_section(&report, ExportSection::Grades, &mut buffer).expect("export succeeds");
        assert_eq!(String::from_utf8(buffer).expect("utf8"), "term,avgGrade,count\n");

        let mut buffer = Vec::new();
        write_section(&report, ExportSection::Summary, &mut buffer).expect("export succeeds");
        let text = String::from_utf8(buffer).expect("utf8");
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Total Courses,Total POs,Total Enrollments,Total Survey Responses,Total Employer Feedback")
        );
        assert_eq!(lines.next(), Some("0,0,0,0,0"));
    }
}
