use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use gpurun_model::BatchDirectives;
use gpurun_observe::LogConfig;

/// Full launch configuration.
///
/// Everything has a default reproducing the original submission, so an
/// empty (or absent) config file gives the original behavior: purge and
/// load the GPU toolkit plus the environment manager, activate the training
/// environment, probe devices, launch four workers on one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RunConfig {
    /// Scheduler resource directives (used by `batch-script`).
    pub directives: BatchDirectives,
    /// Environment-module loads performed before launching.
    pub modules: ModulesConfig,
    /// Runtime environment to activate, by prefix path.
    ///
    /// `None` skips activation and launches against the module environment.
    pub env_prefix: Option<PathBuf>,
    /// Device diagnostic probe.
    pub probe: ProbeConfig,
    /// Distributed launcher invocation.
    pub launcher: LauncherConfig,
    /// Verbosity exported to the distributed-communication runtime.
    ///
    /// `None` leaves `NCCL_DEBUG` untouched.
    pub nccl_debug: Option<String>,
    /// Tracing output for the shim itself.
    pub log: LogConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            directives: BatchDirectives::default(),
            modules: ModulesConfig::default(),
            env_prefix: None,
            probe: ProbeConfig::default(),
            launcher: LauncherConfig::default(),
            nccl_debug: Some("INFO".to_string()),
            log: LogConfig::default(),
        }
    }
}

impl RunConfig {
    /// Load the config from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("cannot parse config {}", path.display()))
    }

    /// Load from a file when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

/// Module loads for the toolchain baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ModulesConfig {
    /// Reset inherited module state first.
    pub purge: bool,
    /// Module names in load order.
    pub load: Vec<String>,
    /// Shell evaluating the module commands.
    pub shell: PathBuf,
    /// Run it as a login shell (module functions usually live in profiles).
    pub login: bool,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            purge: true,
            load: vec!["cuda/12.4".to_string(), "miniforge3/24.3.0".to_string()],
            shell: PathBuf::from("/bin/bash"),
            login: true,
        }
    }
}

/// Diagnostic probe settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProbeConfig {
    /// Run the probe at all.
    pub enabled: bool,
    /// Probe binary, resolved through the prepared PATH.
    pub command: String,
    pub args: Vec<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "nvidia-smi".to_string(),
            args: Vec::new(),
        }
    }
}

/// The distributed launcher and its fixed target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LauncherConfig {
    /// Launcher program.
    pub program: String,
    /// Training entry point handed to the launcher.
    pub entry_point: PathBuf,
    /// Arguments passed through to the entry point.
    pub args: Vec<String>,
    /// Append launcher output to this job-keyed path pattern
    /// (`%j` job id, `%x` job name). `None` inherits the shim's stdio.
    pub log_pattern: Option<String>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            program: "torchrun".to_string(),
            entry_point: PathBuf::from("train.py"),
            args: Vec::new(),
            log_pattern: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RunConfig;
    use std::io::Write;

    #[test]
    fn defaults_reproduce_the_original_submission() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.launcher.program, "torchrun");
        assert_eq!(cfg.launcher.entry_point.to_str(), Some("train.py"));
        assert!(cfg.modules.purge);
        assert_eq!(cfg.modules.load.len(), 2);
        assert_eq!(cfg.nccl_debug.as_deref(), Some("INFO"));
        assert_eq!(cfg.probe.command, "nvidia-smi");
        assert_eq!(cfg.directives.partition, "hgx");
    }

    #[test]
    fn empty_json_is_all_defaults() {
        let cfg: RunConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.launcher.program, "torchrun");
        assert!(cfg.env_prefix.is_none());
    }

    #[test]
    fn partial_overrides_keep_remaining_defaults() {
        let json = r#"{
            "launcher": {"program": "torchrun", "entry-point": "main.py"},
            "nccl-debug": null,
            "modules": {"load": ["cuda/12.1"]}
        }"#;
        let cfg: RunConfig = serde_json::from_str(json).unwrap();

        assert_eq!(cfg.launcher.entry_point.to_str(), Some("main.py"));
        assert!(cfg.nccl_debug.is_none());
        assert_eq!(cfg.modules.load, vec!["cuda/12.1"]);
        assert!(cfg.modules.purge);
        assert_eq!(cfg.probe.command, "nvidia-smi");
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        assert!(RunConfig::load(std::path::Path::new("/no/such/config.json")).is_err());

        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "not json").unwrap();
        assert!(RunConfig::load(f.path()).is_err());
    }

    #[test]
    fn load_or_default_without_path_is_default() {
        let cfg = RunConfig::load_or_default(None).unwrap();
        assert_eq!(cfg.directives.gpus_per_node.count(), 4);
    }
}
