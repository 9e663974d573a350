//! Synthetic programs that drive the virtual address space.
//!
//! Each one touches every byte of the region and returns a checksum so runs
//! with different policies can be compared for correctness as well as cost.

use crate::error::{SimError, SimResult};
use crate::vm::Simulation;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::str::FromStr;

const SCAN_PASSES: usize = 10;
const FOCUS_ROUNDS: usize = 100;
const FOCUS_WRITES: usize = 100;
const FOCUS_WINDOW: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadKind {
    Sort,
    Scan,
    Focus,
}

impl WorkloadKind {
    pub fn run(self, sim: &mut Simulation, seed: u64) -> SimResult<u64> {
        match self {
            WorkloadKind::Sort => sort(sim, seed),
            WorkloadKind::Scan => scan(sim),
            WorkloadKind::Focus => focus(sim, seed),
        }
    }
}

impl FromStr for WorkloadKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sort" => Ok(WorkloadKind::Sort),
            "scan" => Ok(WorkloadKind::Scan),
            "focus" => Ok(WorkloadKind::Focus),
            other => Err(SimError::UnknownWorkload(other.to_string())),
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkloadKind::Sort => "sort",
            WorkloadKind::Scan => "scan",
            WorkloadKind::Focus => "focus",
        };
        f.write_str(name)
    }
}

fn checksum(sim: &mut Simulation) -> SimResult<u64> {
    let mut total = 0u64;
    for addr in 0..sim.len() {
        total += u64::from(sim.read_byte(addr)?);
    }
    Ok(total)
}

/// Sequential fill, then repeated sequential sums.
pub fn scan(sim: &mut Simulation) -> SimResult<u64> {
    for addr in 0..sim.len() {
        sim.write_byte(addr, (addr % 256) as u8)?;
    }

    let mut total = 0u64;
    for _ in 0..SCAN_PASSES {
        total += checksum(sim)?;
    }
    Ok(total)
}

/// Random fill followed by an in-place quicksort of every byte.
pub fn sort(sim: &mut Simulation, seed: u64) -> SimResult<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    for addr in 0..sim.len() {
        sim.write_byte(addr, rng.gen())?;
    }

    quicksort(sim)?;
    checksum(sim)
}

/// Many short bursts of writes clustered around random spots.
pub fn focus(sim: &mut Simulation, seed: u64) -> SimResult<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let len = sim.len();
    for addr in 0..len {
        sim.write_byte(addr, 0)?;
    }

    for _ in 0..FOCUS_ROUNDS {
        let start = rng.gen_range(0..len);
        for _ in 0..FOCUS_WRITES {
            let addr = (start + rng.gen_range(0..FOCUS_WINDOW)) % len;
            sim.write_byte(addr, rng.gen())?;
        }
    }

    checksum(sim)
}

/// Iterative Hoare-partition quicksort over the whole region.
fn quicksort(sim: &mut Simulation) -> SimResult<()> {
    let mut ranges = vec![(0usize, sim.len())];

    while let Some((lo, hi)) = ranges.pop() {
        if hi - lo < 2 {
            continue;
        }
        let pivot = sim.read_byte(lo + (hi - lo - 1) / 2)?;
        let mut i = lo;
        let mut j = hi - 1;
        loop {
            while sim.read_byte(i)? < pivot {
                i += 1;
            }
            while sim.read_byte(j)? > pivot {
                j -= 1;
            }
            if i >= j {
                break;
            }
            let a = sim.read_byte(i)?;
            let b = sim.read_byte(j)?;
            sim.write_byte(i, b)?;
            sim.write_byte(j, a)?;
            i += 1;
            j -= 1;
        }
        // [lo, j] and (j, hi)
        ranges.push((lo, j + 1));
        ranges.push((j + 1, hi));
    }
    Ok(())
}
