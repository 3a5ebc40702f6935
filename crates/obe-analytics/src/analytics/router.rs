use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Deserializer};

use super::engine::AnalyticsQuery;
use super::export::{ExportError, ExportSection};
use super::filter::YearFilter;
use super::repository::{AnalyticsRepository, RepositoryError};
use super::service::{AnalyticsService, AnalyticsServiceError};
use crate::error::AppError;

/// Query string shared by the report and export endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsParams {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub program_id: Option<i64>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
}

impl AnalyticsParams {
    pub fn query(&self) -> AnalyticsQuery {
        AnalyticsQuery::new(self.program_id, YearFilter::from_param(self.year.as_deref()))
    }
}

/// Router builder exposing the analytics report and its CSV export.
pub fn analytics_router<R>(service: Arc<AnalyticsService<R>>) -> Router
where
    R: AnalyticsRepository + 'static,
{
    Router::new()
        .route("/api/analytics", get(report_handler::<R>))
        .route("/api/analytics/export", get(export_handler::<R>))
        .with_state(service)
}

pub(crate) async fn report_handler<R>(
    State(service): State<Arc<AnalyticsService<R>>>,
    params: Result<Query<AnalyticsParams>, QueryRejection>,
) -> Result<Response, AppError>
where
    R: AnalyticsRepository + 'static,
{
    let Query(params) = params?;
    let query = params.query();
    let report = tokio::task::spawn_blocking(move || service.report(&query)).await??;
    Ok((StatusCode::OK, Json(report)).into_response())
}

pub(crate) async fn export_handler<R>(
    State(service): State<Arc<AnalyticsService<R>>>,
    params: Result<Query<AnalyticsParams>, QueryRejection>,
) -> Result<Response, AppError>
where
    R: AnalyticsRepository + 'static,
{
    let Query(params) = params?;
    let section = match params.section.as_deref() {
        None | Some("") => ExportSection::default(),
        Some(raw) => raw
            .parse::<ExportSection>()
            .map_err(AnalyticsServiceError::from)?,
    };

    let query = params.query();
    let file_name = section.file_name(&query.year);
    let body = tokio::task::spawn_blocking(move || {
        let mut buffer = Vec::new();
        service.export(&query, section, &mut buffer).map(|()| buffer)
    })
    .await??;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response())
}

pub(crate) fn status_for(err: &AnalyticsServiceError) -> StatusCode {
    match err {
        AnalyticsServiceError::Repository(
            RepositoryError::Unavailable(_) | RepositoryError::Io(_),
        ) => StatusCode::SERVICE_UNAVAILABLE,
        AnalyticsServiceError::Repository(RepositoryError::Malformed(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        AnalyticsServiceError::Export(ExportError::UnknownSection(_)) => StatusCode::BAD_REQUEST,
        AnalyticsServiceError::Export(ExportError::Csv(_) | ExportError::Io(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

// Blank ids mean "no program filter"; anything else must be an integer.
fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<i64>().map(Some).map_err(|_| {
            serde::de::Error::custom(format!("programId '{raw}' is not an integer"))
        }),
    }
}
