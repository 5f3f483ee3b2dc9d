use std::io::IsTerminal;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{LogFormat, LogLevel};

/// Tracing configuration for a launch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Output format.
    pub format: LogFormat,
    /// Level filter expression.
    pub level: LogLevel,
    /// Include module targets in output.
    pub with_targets: bool,
    /// Colored output (only honored when writing to a terminal).
    pub use_color: bool,
    /// Append output to this file instead of stdout.
    ///
    /// Under the scheduler this is the expanded job log path (the batch
    /// directives' `%x-%j` pattern); interactive runs leave it unset.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::default(),
            with_targets: true,
            use_color: true,
            file: None,
        }
    }
}

impl LogConfig {
    /// Whether ANSI colors should actually be emitted.
    ///
    /// File sinks and redirected stdout never get colors regardless of the
    /// config flag.
    pub fn should_use_color(&self) -> bool {
        self.use_color && self.file.is_none() && std::io::stdout().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::LogConfig;
    use crate::LogFormat;

    #[test]
    fn default_values() {
        let cfg = LogConfig::default();
        assert_eq!(cfg.format, LogFormat::Text);
        assert_eq!(cfg.level.as_str(), "info");
        assert!(cfg.with_targets);
        assert!(cfg.use_color);
        assert!(cfg.file.is_none());
    }

    #[test]
    fn file_sink_disables_color() {
        let cfg = LogConfig {
            file: Some("logs/train-1.out".into()),
            use_color: true,
            ..Default::default()
        };
        assert!(!cfg.should_use_color());
    }

    #[test]
    fn serde_defaults_for_missing_fields() {
        let cfg: LogConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.level.as_str(), "info");
        assert!(cfg.file.is_none());
    }

    #[test]
    fn serde_partial_config() {
        let cfg: LogConfig =
            serde_json::from_str(r#"{"format": "json", "file": "logs/out.log"}"#).unwrap();
        assert_eq!(cfg.format, LogFormat::Json);
        assert_eq!(cfg.file.as_deref(), Some(std::path::Path::new("logs/out.log")));
        assert!(cfg.with_targets);
    }
}
