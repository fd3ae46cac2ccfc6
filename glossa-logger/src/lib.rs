use glossa_core::EngineConfig;
use log::error;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const DEFAULT_LOG_DIR: &str = "./logs";
const DEFAULT_FILE_PREFIX: &str = "glossa.log";
const DEFAULT_LEVEL: &str = "info";
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 3600;

/// Logging setup for an application embedding the locale engine.
///
/// Built with the setters below or read from the `logging:` section of
/// the engine configuration:
///
/// ```yaml
/// logging:
///   level: "info,glossa_core=debug"
///   file: false
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// `EnvFilter` directives, e.g. `warn` or `info,glossa_core=debug`.
    level: String,
    console: bool,
    file: bool,
    log_dir: PathBuf,
    /// Rolled files are named `<prefix>.<date>`.
    file_prefix: String,
    /// chrono strftime format.
    time_format: String,
    /// Keep only this many rolled files.
    max_files: Option<usize>,
    cleanup_interval_secs: u64,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            console: true,
            file: true,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            max_files: None,
            cleanup_interval_secs: DEFAULT_CLEANUP_INTERVAL_SECS,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the `logging:` section; defaults when the section is absent.
    pub fn from_engine_config(config: &EngineConfig) -> Result<Self, serde_yaml::Error> {
        match &config.logging {
            Some(section) => serde_yaml::from_value(section.clone()),
            None => Ok(Self::default()),
        }
    }

    pub fn level(mut self, directives: impl Into<String>) -> Self {
        self.level = directives.into();
        self
    }

    pub fn enable_console(mut self, enable: bool) -> Self {
        self.console = enable;
        self
    }

    pub fn enable_file(mut self, enable: bool) -> Self {
        self.file = enable;
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    pub fn time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    pub fn max_files(mut self, count: usize) -> Self {
        self.max_files = Some(count);
        self
    }

    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval_secs = interval.as_secs().max(1);
        self
    }

    /// Install the global subscriber.
    ///
    /// The returned guard flushes the file writer on drop and must be held
    /// for as long as logs should reach disk.
    pub fn init(self) -> Result<Option<WorkerGuard>, TryInitError> {
        let console_layer = self.console.then(|| {
            fmt::layer()
                .with_timer(ChronoLocal::new(self.time_format.clone()))
                .with_writer(std::io::stdout)
                .with_filter(self.filter())
        });

        let (file_layer, guard) = if self.file {
            let appender = tracing_appender::rolling::daily(&self.log_dir, &self.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_timer(ChronoLocal::new(self.time_format.clone()))
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(self.filter());
            (Some(layer), Some(guard))
        } else {
            (None, None)
        };

        Registry::default()
            .with(console_layer)
            .with(file_layer)
            .try_init()?;

        self.spawn_cleanup_task_if_needed();
        Ok(guard)
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.level).unwrap_or_else(|err| {
            eprintln!("invalid log directives {:?}: {err}", self.level);
            EnvFilter::new(DEFAULT_LEVEL)
        })
    }

    fn spawn_cleanup_task_if_needed(&self) {
        let Some(max_files) = self.max_files.filter(|_| self.file) else {
            return;
        };

        let log_dir = self.log_dir.clone();
        let file_prefix = self.file_prefix.clone();
        let interval = Duration::from_secs(self.cleanup_interval_secs.max(1));

        std::thread::spawn(move || {
            loop {
                cleanup_old_logs(&log_dir, &file_prefix, max_files);
                std::thread::sleep(interval);
            }
        });
    }
}

/// Keep the newest `max_files` files starting with `file_prefix`.
///
/// Relies on the date suffix sorting lexically (`.2024-05-01`).
fn cleanup_old_logs(log_dir: &Path, file_prefix: &str, max_files: usize) {
    if !log_dir.exists() {
        return;
    }

    let read_dir = match std::fs::read_dir(log_dir) {
        Ok(dir) => dir,
        Err(e) => {
            error!("Failed to read log directory: {}", e);
            return;
        }
    };

    let mut log_files: Vec<_> = read_dir
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let file_name = entry.file_name().into_string().ok()?;
            file_name
                .starts_with(file_prefix)
                .then_some((entry.path(), file_name))
        })
        .collect();

    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    for (path, _) in log_files.iter().skip(max_files) {
        if let Err(e) = std::fs::remove_file(path) {
            error!("Failed to remove old log file {:?}: {}", path, e);
        }
    }
}
