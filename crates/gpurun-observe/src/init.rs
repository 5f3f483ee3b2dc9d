use std::fs::OpenOptions;
use std::sync::Arc;

use tracing::Subscriber;
use tracing_subscriber::{
    fmt, fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{LogConfig, LogFormat, ObserveError, ObserveResult, timefmt::UtcRfc3339};

/// Install the global tracing subscriber for this launch.
///
/// Called once at startup, before any setup step runs, so that setup
/// failures are visible in the job log. Re-initialization is an error.
pub fn init_tracing(cfg: &LogConfig) -> ObserveResult<()> {
    match cfg.format {
        LogFormat::Text => init_text(cfg),
        LogFormat::Json => init_json(cfg),
        LogFormat::Journald => init_journald(cfg),
    }
}

/// Resolve the writer: job log file in append mode, or stdout.
///
/// Parent directories are created because the scheduler's own log
/// redirection does the same for its `--output` patterns.
fn sink(cfg: &LogConfig) -> ObserveResult<BoxMakeWriter> {
    let Some(path) = &cfg.file else {
        return Ok(BoxMakeWriter::new(std::io::stdout));
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| ObserveError::SinkOpen {
                path: path.clone(),
                source: e,
            })?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ObserveError::SinkOpen {
            path: path.clone(),
            source: e,
        })?;

    Ok(BoxMakeWriter::new(Arc::new(file)))
}

fn init_text(cfg: &LogConfig) -> ObserveResult<()> {
    let layer = fmt::layer()
        .with_writer(sink(cfg)?)
        .with_ansi(cfg.should_use_color())
        .with_target(cfg.with_targets)
        .with_timer(UtcRfc3339);

    let subscriber = tracing_subscriber::registry()
        .with(cfg.level.to_env_filter())
        .with(layer);
    install(subscriber)
}

fn init_json(cfg: &LogConfig) -> ObserveResult<()> {
    let layer = fmt::layer()
        .json()
        .with_writer(sink(cfg)?)
        .with_ansi(false)
        .with_target(cfg.with_targets)
        .with_timer(UtcRfc3339);

    let subscriber = tracing_subscriber::registry()
        .with(cfg.level.to_env_filter())
        .with(layer);
    install(subscriber)
}

#[cfg(target_os = "linux")]
fn init_journald(cfg: &LogConfig) -> ObserveResult<()> {
    let journald = tracing_journald::layer()
        .map_err(|e| ObserveError::JournaldInitFailed(e.to_string()))?;

    let subscriber = tracing_subscriber::registry()
        .with(cfg.level.to_env_filter())
        .with(journald);
    install(subscriber)
}

#[cfg(not(target_os = "linux"))]
fn init_journald(_cfg: &LogConfig) -> ObserveResult<()> {
    Err(ObserveError::JournaldNotSupported)
}

fn install<S>(subscriber: S) -> ObserveResult<()>
where
    S: Subscriber + Send + Sync + 'static,
{
    subscriber
        .try_init()
        .map_err(|_| ObserveError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::sink;
    use crate::{LogConfig, ObserveError};

    #[test]
    fn stdout_sink_when_no_file_configured() {
        let cfg = LogConfig::default();
        assert!(sink(&cfg).is_ok());
    }

    #[test]
    fn file_sink_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("train-42.out");
        let cfg = LogConfig {
            file: Some(path.clone()),
            ..Default::default()
        };

        sink(&cfg).unwrap();
        assert!(path.exists());
        assert!(path.parent().unwrap().is_dir());
    }

    #[test]
    fn unwritable_sink_path_errors() {
        let cfg = LogConfig {
            file: Some("/proc/definitely/not/writable.log".into()),
            ..Default::default()
        };
        let err = sink(&cfg).unwrap_err();
        assert!(matches!(err, ObserveError::SinkOpen { .. }));
    }
}
