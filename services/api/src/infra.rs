use metrics_exporter_prometheus::PrometheusHandle;
use obe_analytics::analytics::{
    AnalyticsRepository, AnalyticsSnapshot, ExportSection, JsonSnapshotRepository,
    RepositoryError,
};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Serves a fixed snapshot from process memory; used when no snapshot file is configured.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAnalyticsRepository {
    snapshot: Arc<AnalyticsSnapshot>,
}

impl InMemoryAnalyticsRepository {
    pub(crate) fn new(snapshot: AnalyticsSnapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
        }
    }
}

impl AnalyticsRepository for InMemoryAnalyticsRepository {
    fn snapshot(&self) -> Result<AnalyticsSnapshot, RepositoryError> {
        Ok(self.snapshot.as_ref().clone())
    }
}

/// Snapshot source chosen at startup from configuration or CLI flags.
#[derive(Clone)]
pub(crate) enum ConfiguredRepository {
    File(JsonSnapshotRepository),
    Memory(InMemoryAnalyticsRepository),
}

impl ConfiguredRepository {
    pub(crate) fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => Self::File(JsonSnapshotRepository::new(path)),
            None => Self::Memory(InMemoryAnalyticsRepository::new(AnalyticsSnapshot::default())),
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::File(repository) => repository.path().display().to_string(),
            Self::Memory(_) => "in-memory".to_string(),
        }
    }
}

impl AnalyticsRepository for ConfiguredRepository {
    fn snapshot(&self) -> Result<AnalyticsSnapshot, RepositoryError> {
        match self {
            Self::File(repository) => repository.snapshot(),
            Self::Memory(repository) => repository.snapshot(),
        }
    }
}

pub(crate) fn parse_section(raw: &str) -> Result<ExportSection, String> {
    raw.parse::<ExportSection>().map_err(|err| {
        let known: Vec<&str> = ExportSection::ordered()
            .into_iter()
            .map(ExportSection::key)
            .collect();
        format!("{err} (expected one of: {})", known.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use obe_analytics::analytics::Program;
    use obe_analytics::analytics::ProgramType;

    #[test]
    fn missing_path_falls_back_to_memory() {
        let repository = ConfiguredRepository::from_path(None);
        assert_eq!(repository.describe(), "in-memory");
        let snapshot = repository.snapshot().expect("memory snapshot");
        assert!(snapshot.outcomes.is_empty());
    }

    #[test]
    fn memory_repository_returns_its_snapshot() {
        let snapshot = AnalyticsSnapshot {
            programs: vec![Program {
                id: 7,
                code: "BSED".to_string(),
                name: None,
                program_type: ProgramType::Board,
            }],
            ..AnalyticsSnapshot::default()
        };
        let repository = InMemoryAnalyticsRepository::new(snapshot.clone());
        assert_eq!(repository.snapshot().expect("first read"), snapshot);
        assert_eq!(repository.clone().snapshot().expect("second read"), snapshot);
    }

    #[test]
    fn file_repository_surfaces_missing_files() {
        let repository =
            ConfiguredRepository::from_path(Some(PathBuf::from("/nonexistent/snapshot.json")));
        assert_eq!(repository.describe(), "/nonexistent/snapshot.json");
        assert!(matches!(
            repository.snapshot(),
            Err(RepositoryError::Io(_))
        ));
    }

    #[test]
    fn section_parser_lists_known_sections() {
        assert_eq!(parse_section("summary"), Ok(ExportSection::Summary));
        let err = parse_section("pivot").expect_err("unknown section");
        assert!(err.contains("pivot"));
        assert!(err.contains("board-exams"));
    }
}
