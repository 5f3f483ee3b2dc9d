//! Environment setup for the launched training process.
//!
//! Two steps, both fail-fast: capturing the environment produced by the
//! cluster's module system, and activating a pre-existing runtime
//! environment by path. The launcher is only ever spawned after both
//! steps have succeeded.
mod activate;
mod modules;

pub use activate::Activation;
pub use modules::ModuleSet;
