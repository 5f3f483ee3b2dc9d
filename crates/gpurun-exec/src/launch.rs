use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::{debug, info};

use gpurun_model::EnvMap;

use crate::ExecError;

/// One distributed-launch invocation.
///
/// Maps one-to-one onto the launcher's command line: standalone rendezvous,
/// a fixed node count of one, and one worker process per reserved device.
/// Building the argument vector is pure and deterministic so the exact
/// invocation can be tested and printed without spawning anything.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    /// Launcher program (e.g. `torchrun`), resolved through the prepared PATH.
    pub program: String,
    /// Single-node rendezvous without an external coordination service.
    pub standalone: bool,
    /// Node count. Always 1 for standalone launches.
    pub nnodes: u32,
    /// Worker processes per node, derived from the accelerator reservation.
    pub nproc_per_node: u32,
    /// Training entry point handed to the launcher.
    pub entry_point: PathBuf,
    /// Arguments passed through to the entry point.
    pub passthrough: Vec<String>,
    /// Fully prepared child environment.
    pub env: EnvMap,
    /// Working directory. `None` inherits the parent's.
    pub cwd: Option<PathBuf>,
    /// Append stdout/stderr to this file instead of inheriting.
    pub log_file: Option<PathBuf>,
}

impl LaunchSpec {
    /// A standalone single-node launch with `nproc` workers.
    pub fn standalone(
        program: impl Into<String>,
        entry_point: impl Into<PathBuf>,
        nproc: u32,
    ) -> Self {
        Self {
            program: program.into(),
            standalone: true,
            nnodes: 1,
            nproc_per_node: nproc,
            entry_point: entry_point.into(),
            passthrough: Vec::new(),
            env: EnvMap::new(),
            cwd: None,
            log_file: None,
        }
    }

    /// Build the launcher's argument vector.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.standalone {
            args.push("--standalone".to_string());
        }
        args.push("--nnodes".to_string());
        args.push(self.nnodes.to_string());
        args.push("--nproc-per-node".to_string());
        args.push(self.nproc_per_node.to_string());
        args.push(self.entry_point.to_string_lossy().into_owned());
        args.extend(self.passthrough.iter().cloned());
        args
    }

    /// Human-readable rendering of the full invocation, for dry runs.
    pub fn render(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.build_args());
        parts.join(" ")
    }

    /// Spawn the launcher and block until it exits.
    ///
    /// The child runs in the foreground of this process; there is no
    /// cancellation path here. Killing the job is the scheduler's business,
    /// and a scheduler kill takes the whole process group down with it.
    pub async fn run(&self) -> Result<ExitStatus, ExecError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.build_args());
        cmd.env_clear();
        for (k, v) in self.env.iter() {
            cmd.env(k, v);
        }
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        cmd.stdin(Stdio::null());

        match &self.log_file {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                let out = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)?;
                let err = out.try_clone()?;
                cmd.stdout(Stdio::from(out));
                cmd.stderr(Stdio::from(err));
            }
            None => {
                cmd.stdout(Stdio::inherit());
                cmd.stderr(Stdio::inherit());
            }
        }

        info!(invocation = %self.render(), "starting launcher");

        let mut child = cmd.spawn().map_err(|e| ExecError::Spawn {
            command: self.program.clone(),
            source: e,
        })?;

        let status = child.wait().await?;
        debug!(code = ?status.code(), "launcher exited");
        Ok(status)
    }
}

/// Map a child exit status onto this process's exit code.
///
/// Signal deaths follow shell convention (128 + signal number) so the
/// scheduler's accounting distinguishes an OOM kill from an exit(1).
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
