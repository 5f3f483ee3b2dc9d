mod error;
pub use error::ExecError;

mod setup;
pub use setup::{Activation, ModuleSet};

mod probe;
pub use probe::DeviceProbe;

mod launch;
pub use launch::{LaunchSpec, exit_code};
