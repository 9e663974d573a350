use crate::error::{SimError, SimResult};
use crate::vm::PolicyKind;
use crate::workload::WorkloadKind;
use std::path::PathBuf;

pub const DEFAULT_DISK_PATH: &str = "myvirtualdisk";

/// Everything needed to start one simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub pages: usize,
    pub frames: usize,
    pub policy: PolicyKind,
    pub workload: WorkloadKind,
    /// Seeds both the random policy and the workload generators.
    pub seed: u64,
    pub disk_path: PathBuf,
}

impl SimConfig {
    pub fn new(pages: usize, frames: usize, policy: &str, workload: &str) -> SimResult<Self> {
        let config = Self {
            pages,
            frames,
            policy: policy.parse()?,
            workload: workload.parse()?,
            seed: 0,
            disk_path: PathBuf::from(DEFAULT_DISK_PATH),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_disk_path(mut self, disk_path: impl Into<PathBuf>) -> Self {
        self.disk_path = disk_path.into();
        self
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.pages == 0 {
            return Err(SimError::InvalidConfig(
                "page count must be at least 1".to_string(),
            ));
        }
        if self.frames == 0 {
            return Err(SimError::InvalidConfig(
                "frame count must be at least 1".to_string(),
            ));
        }
        if u32::try_from(self.pages).is_err() || u32::try_from(self.frames).is_err() {
            return Err(SimError::InvalidConfig(format!(
                "page and frame counts must fit in 32 bits (got {} pages, {} frames)",
                self.pages, self.frames
            )));
        }
        Ok(())
    }
}
