//! CLI-level error type: wraps I/O, JSON, and scheduler-core failures into
//! one `Result` the runner can propagate with `?`.

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },
    #[error("failed to parse {path} as JSON: {source}")]
    Json { path: String, #[source] source: serde_json::Error },
    #[error(transparent)]
    Schedule(#[from] sequencer_core::ScheduleError),
}

pub type CliResult<T> = Result<T, CliError>;
