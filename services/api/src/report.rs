use crate::infra::parse_section;
use clap::Args;
use obe_analytics::analytics::{
    AnalyticsQuery, AnalyticsReport, AnalyticsService, ExportSection, JsonSnapshotRepository,
    YearFilter,
};
use obe_analytics::error::AppError;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// JSON snapshot to analyse
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Limit outcomes to a single program
    #[arg(long)]
    pub(crate) program_id: Option<i64>,
    /// Restrict evidence to one year, e.g. 2024 (defaults to all years)
    #[arg(long)]
    pub(crate) year: Option<String>,
    /// Print the dashboard JSON payload instead of the text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// JSON snapshot to analyse
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Limit outcomes to a single program
    #[arg(long)]
    pub(crate) program_id: Option<i64>,
    /// Restrict evidence to one year, e.g. 2024 (defaults to all years)
    #[arg(long)]
    pub(crate) year: Option<String>,
    /// Report section to export
    #[arg(long, default_value = "outcomes", value_parser = parse_section)]
    pub(crate) section: ExportSection,
    /// Destination file; writes to stdout when omitted
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

fn service_for(snapshot: PathBuf) -> AnalyticsService<JsonSnapshotRepository> {
    AnalyticsService::new(Arc::new(JsonSnapshotRepository::new(snapshot)))
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        snapshot,
        program_id,
        year,
        json,
    } = args;

    let query = AnalyticsQuery::new(program_id, YearFilter::from_param(year.as_deref()));
    let report = service_for(snapshot).report(&query)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &report).map_err(io::Error::from)?;
        writeln!(out)?;
    } else {
        render_report(&report, &query, &mut out)?;
    }
    Ok(())
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs {
        snapshot,
        program_id,
        year,
        section,
        output,
    } = args;

    let query = AnalyticsQuery::new(program_id, YearFilter::from_param(year.as_deref()));
    let service = service_for(snapshot);

    match output {
        Some(path) => {
            let file = File::create(&path)?;
            service.export(&query, section, BufWriter::new(file))?;
            info!(%section, path = %path.display(), "analytics export written");
        }
        None => {
            let stdout = io::stdout();
            service.export(&query, section, stdout.lock())?;
        }
    }
    Ok(())
}

pub(crate) fn render_report<W: Write>(
    report: &AnalyticsReport,
    query: &AnalyticsQuery,
    out: &mut W,
) -> io::Result<()> {
    let scope = query
        .program_id
        .map_or_else(|| "all programs".to_string(), |id| format!("program {id}"));
    let year = query.year.year().unwrap_or("all years");

    writeln!(out, "Program outcome analytics")?;
    writeln!(out, "Scope: {scope} | Year: {year}")?;

    if report.po_analytics.is_empty() {
        writeln!(out, "\n{}: none", ExportSection::Outcomes.label())?;
    } else {
        writeln!(out, "\n{}", ExportSection::Outcomes.label())?;
        for item in &report.po_analytics {
            let board = if item.is_board_program {
                format!("{:.1}", item.board_exam_score)
            } else {
                "N/A".to_string()
            };
            writeln!(
                out,
                "  - {} overall {:.1} | grade {:.1} ({}) | survey {:.1} ({}) | feedback {:.1} ({}) | board {}",
                item.po.code,
                item.overall_score,
                item.avg_grade,
                item.grade_count,
                item.avg_survey,
                item.survey_count,
                item.avg_feedback,
                item.feedback_count,
                board
            )?;
        }
    }

    if !report.trend_data.is_empty() {
        writeln!(out, "\n{}", ExportSection::Grades.label())?;
        for entry in &report.trend_data {
            writeln!(
                out,
                "  - {}: avg {:.1} across {} enrollment(s)",
                entry.term, entry.avg_grade, entry.count
            )?;
        }
    }

    if !report.board_exam_trend.is_empty() {
        writeln!(out, "\n{}", ExportSection::BoardExams.label())?;
        for entry in &report.board_exam_trend {
            writeln!(
                out,
                "  - {}: {}/{} passed ({}%)",
                entry.year, entry.passers, entry.takers, entry.passing_rate
            )?;
        }
    }

    if !report.survey_trend.is_empty() {
        writeln!(out, "\n{}", ExportSection::Surveys.label())?;
        for entry in &report.survey_trend {
            writeln!(
                out,
                "  - {}: {} response(s), avg rating {:.1}",
                entry.year, entry.responses, entry.avg_rating
            )?;
        }
    }

    if !report.feedback_trend.is_empty() {
        writeln!(out, "\n{}", ExportSection::Feedback.label())?;
        for entry in &report.feedback_trend {
            writeln!(
                out,
                "  - {}: {} rating(s), avg {:.1}",
                entry.year, entry.count, entry.avg_rating
            )?;
        }
    }

    let summary = &report.summary;
    writeln!(out, "\n{}", ExportSection::Summary.label())?;
    writeln!(
        out,
        "  Courses {} | Outcomes {} | Enrollments {} | Survey responses {} | Employer feedback {}",
        summary.total_courses,
        summary.total_pos,
        summary.total_enrollments,
        summary.total_survey_responses,
        summary.total_feedback
    )?;

    if !report.available_years.is_empty() {
        writeln!(
            out,
            "Available years: {}",
            report.available_years.join(", ")
        )?;
    }

    Ok(())
}
