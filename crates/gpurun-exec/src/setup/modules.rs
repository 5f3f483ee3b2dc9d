use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, trace};

use gpurun_model::EnvMap;

use crate::ExecError;

/// Environment-module loads to perform before launching.
///
/// The module system is a shell-function affair, so the loads run inside a
/// login shell and the resulting environment is read back through
/// `env -0`. The captured map replaces the parent snapshot wholesale,
/// which is exactly what `module purge` semantics require.
#[derive(Debug, Clone)]
pub struct ModuleSet {
    /// Reset inherited module state before loading.
    purge: bool,
    /// Module names in load order (e.g. `cuda/12.4`).
    loads: Vec<String>,
    /// Shell used to evaluate the module commands.
    shell: PathBuf,
    /// Run the shell as a login shell so module functions are defined.
    login: bool,
}

impl ModuleSet {
    /// Module set with the given loads, purging inherited state first.
    pub fn new<I, S>(loads: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            purge: true,
            loads: loads.into_iter().map(Into::into).collect(),
            shell: PathBuf::from("/bin/bash"),
            login: true,
        }
    }

    /// An empty set: no purge, no loads, capture is the parent snapshot.
    pub fn none() -> Self {
        Self {
            purge: false,
            loads: Vec::new(),
            shell: PathBuf::from("/bin/bash"),
            login: false,
        }
    }

    /// Override the shell (tests use `/bin/sh` without login semantics).
    pub fn with_shell(mut self, shell: impl Into<PathBuf>, login: bool) -> Self {
        self.shell = shell.into();
        self.login = login;
        self
    }

    /// Enable or disable the initial `module purge`.
    pub fn with_purge(mut self, purge: bool) -> Self {
        self.purge = purge;
        self
    }

    pub fn loads(&self) -> &[String] {
        &self.loads
    }

    /// The shell snippet evaluated inside the capture shell.
    fn script(&self) -> String {
        let mut parts = Vec::new();
        if self.purge {
            parts.push("module purge".to_string());
        }
        if !self.loads.is_empty() {
            parts.push(format!("module load {}", self.loads.join(" ")));
        }
        parts.push("env -0".to_string());
        parts.join(" && ")
    }

    /// Run the module loads and capture the resulting environment.
    ///
    /// A non-zero shell exit (unknown module, broken module system) aborts
    /// the whole launch: a training job on a half-configured toolchain is
    /// worse than no job.
    pub async fn capture(&self) -> Result<EnvMap, ExecError> {
        if !self.purge && self.loads.is_empty() {
            trace!("no module loads configured; using parent environment");
            return Ok(EnvMap::from_process());
        }

        let script = self.script();
        debug!(shell = %self.shell.display(), script = %script, "capturing module environment");

        let mut cmd = Command::new(&self.shell);
        if self.login {
            cmd.arg("-l");
        }
        cmd.arg("-c").arg(&script);
        cmd.stdin(Stdio::null());

        let output = cmd.output().await.map_err(|e| ExecError::Spawn {
            command: self.shell.display().to_string(),
            source: e,
        })?;

        if !output.status.success() {
            return Err(ExecError::ModuleCapture {
                status: output.status.code().unwrap_or(-1),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let env = parse_env0(&output.stdout)?;
        debug!(vars = env.len(), "module environment captured");
        Ok(env)
    }
}

/// Parse `env -0` output (NUL-separated `KEY=VALUE` records).
///
/// NUL separation is the only safe framing here: module files routinely put
/// newlines into values (shell functions exported by the module system).
fn parse_env0(bytes: &[u8]) -> Result<EnvMap, ExecError> {
    let mut env = EnvMap::new();

    for record in bytes.split(|&b| b == 0) {
        if record.is_empty() {
            continue;
        }
        let record = std::str::from_utf8(record)
            .map_err(|e| ExecError::EnvParse(format!("non-utf8 record: {e}")))?;
        let (key, value) = record
            .split_once('=')
            .ok_or_else(|| ExecError::EnvParse(format!("record without '=': {record:?}")))?;
        if key.is_empty() {
            return Err(ExecError::EnvParse(format!("empty key in {record:?}")));
        }
        env.set(key, value);
    }

    Ok(env)
}
