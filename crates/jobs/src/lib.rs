pub mod cache_sweep;
pub mod registry_reload;
pub mod runner;

pub use cache_sweep::CacheSweepJob;
pub use registry_reload::RegistryReloadJob;
pub use runner::{JobRunner, RunningJobs};
