use std::fs::File;
use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::Path;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Where log output goes and how much of it.
///
/// `RUST_LOG`, when set, overrides `level`.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    /// Append to this file instead of writing to stderr.
    pub file: Option<PathBuf>,
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            file: None,
        }
    }

    pub fn with_file(mut self, file: Option<PathBuf>) -> Self {
        self.file = file;
        self
    }
}

/// Keeps the background log writer alive; logs are flushed on drop.
#[derive(Debug)]
pub struct TelemetryGuard {
    _guard: Option<WorkerGuard>,
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn stderr_writer() -> (BoxMakeWriter, Option<WorkerGuard>, bool) {
    (
        BoxMakeWriter::new(std::io::stderr),
        None,
        std::io::stderr().is_terminal(),
    )
}

pub fn init_tracing(config: &LogConfig) -> TelemetryGuard {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (writer, guard, ansi) = match config.file.as_deref().map(|p| (p, open_log_file(p))) {
        Some((_, Ok(file))) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            (BoxMakeWriter::new(non_blocking), Some(guard), false)
        }
        Some((path, Err(err))) => {
            eprintln!(
                "Warning: cannot write log file {}: {}; logging to stderr",
                path.display(),
                err
            );
            stderr_writer()
        }
        None => stderr_writer(),
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(writer)
        .try_init()
        .is_ok();

    TelemetryGuard {
        _guard: if installed { guard } else { None },
    }
}
