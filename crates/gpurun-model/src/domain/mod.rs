mod env;
pub use env::EnvMap;

mod gres;
pub use gres::GresSpec;

mod limits;
pub use limits::{MemSize, TimeLimit};
