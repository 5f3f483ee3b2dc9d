mod config;
pub use config::LogConfig;

mod error;
pub use error::{ObserveError, ObserveResult};

mod format;
pub use format::LogFormat;

mod level;
pub use level::LogLevel;

mod init;
pub use init::init_tracing;

mod timefmt;
