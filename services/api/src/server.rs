use crate::cli::ServeArgs;
use crate::infra::{AppState, ConfiguredRepository};
use crate::routes::with_analytics_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use obe_analytics::analytics::AnalyticsService;
use obe_analytics::config::AppConfig;
use obe_analytics::error::AppError;
use obe_analytics::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(snapshot) = args.snapshot.take() {
        config.data.snapshot_path = Some(snapshot);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = ConfiguredRepository::from_path(config.data.snapshot_path.clone());
    let source = repository.describe();
    let analytics_service = Arc::new(AnalyticsService::new(Arc::new(repository)));

    let app = with_analytics_routes(analytics_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, snapshot = %source, "outcome analytics service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
