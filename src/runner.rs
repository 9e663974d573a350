//! High-level entry point: build a simulated machine from a config and run
//! its workload to completion.

use crate::config::SimConfig;
use crate::disk::FileDisk;
use crate::error::SimResult;
use crate::vm::{Simulation, Stats};
use crate::workload::WorkloadKind;
use log::info;

/// What a finished run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub workload: WorkloadKind,
    pub checksum: u64,
    pub stats: Stats,
}

/// Create the disk image, assemble the simulation and run the workload.
pub fn run(config: &SimConfig) -> SimResult<RunReport> {
    config.validate()?;

    let disk = FileDisk::create(&config.disk_path, config.pages)?;
    let policy = config.policy.build(config.frames, config.seed);
    let mut sim = Simulation::new(config.pages, config.frames, policy, Box::new(disk))?;

    info!(
        "running {} with {} pages, {} frames, policy {}",
        config.workload,
        config.pages,
        config.frames,
        sim.policy_name()
    );

    let checksum = config.workload.run(&mut sim, config.seed)?;
    sim.check_invariants()?;

    let stats = sim.stats();
    info!("{} finished: {}", config.workload, stats);

    Ok(RunReport {
        workload: config.workload,
        checksum,
        stats,
    })
}
