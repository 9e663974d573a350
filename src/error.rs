//! Simulator error types.

use crate::vm::{FrameId, PageNumber};
use thiserror::Error;

/// Errors that can occur while configuring or running a simulation.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown replacement policy: {0} (expected rand, fifo or lru)")]
    UnknownPolicy(String),

    #[error("Unknown workload: {0} (expected sort, scan or focus)")]
    UnknownWorkload(String),

    #[error("Fault on page {page} which already has full permission")]
    SpuriousFault { page: PageNumber },

    #[error("Frame {frame} should hold page {expected} but holds {found:?}")]
    FrameMismatch {
        frame: FrameId,
        expected: PageNumber,
        found: Option<PageNumber>,
    },

    #[error("FIFO queue out of sync with frame table: {len} queued, capacity {capacity}")]
    QueueDesync { len: usize, capacity: usize },

    #[error("Page {page} is resident but not tracked by the replacement policy")]
    NotTracked { page: PageNumber },

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Access to page {page} keeps faulting after the fault was resolved")]
    FaultLoop { page: PageNumber },

    #[error("Page {page} out of range (page count {page_count})")]
    PageOutOfRange { page: PageNumber, page_count: usize },

    #[error("Address {addr:#x} out of range (virtual size {len:#x})")]
    AddressOutOfRange { addr: usize, len: usize },

    #[error("Buffer size must be PAGE_SIZE ({expected}), got {actual}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Disk block {block} does not exist (image has {blocks} blocks)")]
    BlockOutOfRange { block: PageNumber, blocks: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// Whether the error means the frame table, the mapping and the policy
    /// no longer agree with each other.
    pub fn is_fatal_consistency(&self) -> bool {
        matches!(
            self,
            SimError::SpuriousFault { .. }
                | SimError::FrameMismatch { .. }
                | SimError::QueueDesync { .. }
                | SimError::NotTracked { .. }
                | SimError::InvariantViolation(_)
                | SimError::FaultLoop { .. }
        )
    }
}

/// Result type for simulator operations.
pub type SimResult<T> = Result<T, SimError>;
