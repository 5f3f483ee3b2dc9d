use std::path::PathBuf;

use tracing::debug;

use gpurun_model::EnvMap;

use crate::ExecError;

/// Activation of a pre-existing runtime environment by prefix path.
///
/// Equivalent to sourcing the environment's activate script, minus the
/// shell: prepend `<prefix>/bin` to PATH and mark the prefix. User-site
/// isolation is a separate setup step and not tied to activation.
#[derive(Debug, Clone)]
pub struct Activation {
    /// Environment prefix (e.g. `~/.conda/envs/train`).
    prefix: PathBuf,
}

impl Activation {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &PathBuf {
        &self.prefix
    }

    /// Apply the activation to the environment under construction.
    ///
    /// Fails when the prefix or its `bin/` directory does not exist; the
    /// environment must be created beforehand, this tool never builds one.
    pub fn apply(&self, env: &mut EnvMap) -> Result<(), ExecError> {
        let bin = self.prefix.join("bin");
        if !self.prefix.is_dir() || !bin.is_dir() {
            return Err(ExecError::MissingPrefix(self.prefix.clone()));
        }

        let bin_str = bin.to_string_lossy().into_owned();
        env.prepend_path("PATH", &bin_str);
        env.set("VIRTUAL_ENV", self.prefix.to_string_lossy());

        debug!(prefix = %self.prefix.display(), "runtime environment activated");
        Ok(())
    }
}
