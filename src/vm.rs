//! Demand-paged virtual memory for vibevm.
//!
//! A fixed pool of physical frames backs a larger virtual address space.
//! Key components:
//!
//! - **PageTable**: maps virtual pages to a frame and a protection level
//! - **FrameTable**: what each physical frame holds, including its bytes
//! - **ReplacementPolicy**: picks a victim frame when none is free (rand, fifo, lru)
//! - **Pager**: the fault handler that ties the pieces together
//! - **Simulation**: the context object workloads drive through byte accesses

pub mod frame;
pub mod page_table;
pub mod pager;
pub mod policy;
pub mod simulation;
pub mod stats;

pub use frame::{Frame, FrameTable};
pub use page_table::{Access, PageEntry, PageMapping, PageNumber, PageTable, Protection};
pub use pager::Pager;
pub use policy::{PolicyKind, ReplacementPolicy};
pub use simulation::Simulation;
pub use stats::Stats;

/// Size of a virtual page, a physical frame and a disk block.
pub const PAGE_SIZE: usize = 4096;

pub type FrameId = u32;
