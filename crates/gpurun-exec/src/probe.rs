use std::process::Stdio;

use tokio::process::Command;
use tracing::{info, warn};

use gpurun_model::EnvMap;

/// Diagnostic probe of the accelerator devices visible on this node.
///
/// Purely informational: the output lands in the job log so a failed run
/// can be triaged without re-queueing. A missing or failing probe binary
/// must never take the job down, so every error path here degrades to a
/// warning.
#[derive(Debug, Clone)]
pub struct DeviceProbe {
    command: String,
    args: Vec<String>,
}

impl DeviceProbe {
    pub fn new<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Run the probe with the prepared environment and log its output.
    ///
    /// Returns whether the probe ran and exited zero.
    pub async fn run(&self, env: &EnvMap) -> bool {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args);
        cmd.env_clear();
        for (k, v) in env.iter() {
            cmd.env(k, v);
        }
        cmd.stdin(Stdio::null());

        let output = match cmd.output().await {
            Ok(out) => out,
            Err(e) => {
                warn!(command = %self.command, error = %e, "device probe could not run");
                return false;
            }
        };

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            info!(target: "gpurun::probe", "{line}");
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            warn!(target: "gpurun::probe", "{line}");
        }

        if !output.status.success() {
            warn!(
                command = %self.command,
                status = output.status.code().unwrap_or(-1),
                "device probe exited non-zero"
            );
            return false;
        }
        true
    }
}

impl Default for DeviceProbe {
    fn default() -> Self {
        Self::new("nvidia-smi", Vec::<String>::new())
    }
}
