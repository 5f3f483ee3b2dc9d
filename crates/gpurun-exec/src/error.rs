use std::path::PathBuf;

use thiserror::Error;

use gpurun_model::ModelError;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("module environment capture failed (exit status {status}): {detail}")]
    ModuleCapture { status: i32, detail: String },

    #[error("cannot parse captured environment: {0}")]
    EnvParse(String),

    #[error("runtime environment prefix not usable: {0}")]
    MissingPrefix(PathBuf),

    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Model(#[from] ModelError),
}
