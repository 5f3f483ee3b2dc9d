use crate::{EnvMap, GresSpec, ModelError};

/// Variable carrying the per-node accelerator reservation.
pub const VAR_GPUS_PER_NODE: &str = "SLURM_GPUS_PER_NODE";
/// Variable carrying the numeric job id.
pub const VAR_JOB_ID: &str = "SLURM_JOB_ID";
/// Variable carrying the job name.
pub const VAR_JOB_NAME: &str = "SLURM_JOB_NAME";
/// Variable carrying the execution node's hostname.
pub const VAR_NODE_NAME: &str = "SLURMD_NODENAME";

/// Scheduler-injected identity of the running job.
///
/// All fields except the reservation are informational: they key log file
/// names and diagnostics. The reservation is the one input the launch
/// actually derives an argument from, so it stays raw here and is parsed
/// fail-hard at launch time via [`JobContext::reservation`].
#[derive(Debug, Clone, Default)]
pub struct JobContext {
    /// Numeric job id, if running under the scheduler.
    pub job_id: Option<String>,
    /// Job name, if running under the scheduler.
    pub job_name: Option<String>,
    /// Hostname of the allocated node.
    pub node_name: Option<String>,
    /// Raw accelerator-reservation string (e.g. `a100:4`).
    pub gpus_per_node: Option<String>,
}

impl JobContext {
    /// Read the job context from an environment snapshot.
    pub fn from_env(env: &EnvMap) -> Self {
        let var = |k: &str| env.get(k).map(str::to_string);
        Self {
            job_id: var(VAR_JOB_ID),
            job_name: var(VAR_JOB_NAME),
            node_name: var(VAR_NODE_NAME),
            gpus_per_node: var(VAR_GPUS_PER_NODE),
        }
    }

    /// Read the job context from the current process environment.
    pub fn from_process() -> Self {
        Self::from_env(&EnvMap::from_process())
    }

    /// Parse the accelerator reservation.
    ///
    /// Fails when the variable is absent or malformed. The original
    /// submission script behaved the same way: an unset reservation produced
    /// an invalid launcher argument and the job died before training started.
    pub fn reservation(&self) -> Result<GresSpec, ModelError> {
        match &self.gpus_per_node {
            Some(raw) => raw.parse(),
            None => Err(ModelError::MissingVariable(VAR_GPUS_PER_NODE)),
        }
    }

    /// True when the scheduler injected a job id, i.e. we run inside an
    /// allocation rather than on someone's workstation.
    pub fn is_scheduled(&self) -> bool {
        self.job_id.is_some()
    }
}
