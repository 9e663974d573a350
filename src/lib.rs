pub mod config;
pub mod disk;
pub mod error;
pub mod runner;
pub mod vm;
pub mod workload;

pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use runner::{run, RunReport};
