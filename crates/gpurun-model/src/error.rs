use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid accelerator reservation {0:?} (expected <name>:<count> or <count>)")]
    InvalidReservation(String),

    #[error("invalid time limit {0:?} (expected [D-]HH:MM:SS)")]
    InvalidTimeLimit(String),

    #[error("invalid memory size {0:?} (expected <n><K|M|G|T>[B])")]
    InvalidMemSize(String),

    #[error("required variable {0} is not set")]
    MissingVariable(&'static str),
}

pub type ModelResult<T> = Result<T, ModelError>;
