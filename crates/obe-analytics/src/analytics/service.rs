use std::io::Write;
use std::sync::Arc;

use tracing::{debug, warn};

use super::engine::{build_report, AnalyticsQuery, AnalyticsReport};
use super::export::{write_section, ExportError, ExportSection};
use super::repository::{AnalyticsRepository, RepositoryError};

/// Loads a fresh snapshot per call and runs the aggregation over it.
pub struct AnalyticsService<R> {
    repository: Arc<R>,
}

impl<R> AnalyticsService<R>
where
    R: AnalyticsRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn report(
        &self,
        query: &AnalyticsQuery,
    ) -> Result<AnalyticsReport, AnalyticsServiceError> {
        let snapshot = self.repository.snapshot().map_err(|err| {
            warn!(error = %err, "analytics snapshot unavailable");
            err
        })?;

        let report = build_report(&snapshot, query);
        debug!(
            program_id = ?query.program_id,
            year = ?query.year.year(),
            outcomes = report.po_analytics.len(),
            enrollments = report.summary.total_enrollments,
            "analytics report computed"
        );
        Ok(report)
    }

    /// Computes the report and writes a single section of it as CSV.
    pub fn export<W: Write>(
        &self,
        query: &AnalyticsQuery,
        section: ExportSection,
        writer: W,
    ) -> Result<(), AnalyticsServiceError> {
        let report = self.report(query)?;
        write_section(&report, section, writer)?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyticsServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
