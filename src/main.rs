//! vibevm - demand paging simulator comparing page replacement policies

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use std::path::PathBuf;
use vibevm::config::{SimConfig, DEFAULT_DISK_PATH};

/// Simulate demand paging and report faults and disk traffic
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of virtual pages
    npages: usize,

    /// Number of physical frames
    nframes: usize,

    /// Replacement policy: rand, fifo or lru
    policy: String,

    /// Workload: sort, scan or focus
    program: String,

    /// Seed for the random policy and the workloads
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Path of the simulated disk image
    #[arg(long, default_value = DEFAULT_DISK_PATH)]
    disk: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = SimConfig::new(args.npages, args.nframes, &args.policy, &args.program)
        .context("Invalid configuration")?
        .with_seed(args.seed)
        .with_disk_path(args.disk);

    let report = vibevm::run(&config)
        .with_context(|| format!("Simulation failed (disk image {:?})", config.disk_path))?;

    println!("{} result is {}", report.workload, report.checksum);
    println!("{}", report.stats);

    Ok(())
}
