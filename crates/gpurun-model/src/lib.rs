mod domain;
pub use domain::{EnvMap, GresSpec, MemSize, TimeLimit};

mod error;
pub use error::{ModelError, ModelResult};

mod directives;
pub use directives::BatchDirectives;

mod job;
pub use job::{JobContext, VAR_GPUS_PER_NODE, VAR_JOB_ID, VAR_JOB_NAME, VAR_NODE_NAME};

mod logpath;
pub use logpath::LogPattern;
