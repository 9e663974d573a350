pub mod fifo;
pub mod lru;
pub mod random;

use super::page_table::{PageMapping, PageNumber};
use super::FrameId;
use crate::error::{SimError, SimResult};
use std::fmt::{self, Debug};
use std::str::FromStr;

pub use fifo::FifoPolicy;
pub use lru::LruPolicy;
pub use random::RandomPolicy;

pub trait ReplacementPolicy: Send + Debug {
    fn name(&self) -> &'static str;

    /// Pick an occupied frame to reclaim. Called only when no frame is free;
    /// the caller evicts the returned frame.
    fn victim(&mut self, page_table: &dyn PageMapping) -> SimResult<FrameId>;

    /// A page was loaded into `frame_id`.
    fn installed(&mut self, frame_id: FrameId, page: PageNumber) -> SimResult<()>;

    /// A resident page was referenced again (the read to write upgrade).
    fn referenced(&mut self, frame_id: FrameId, page: PageNumber) -> SimResult<()>;

    /// Number of frames the policy was sized for.
    fn capacity(&self) -> usize;

    /// Number of frames or pages the policy currently orders.
    fn tracked(&self) -> usize;

    /// Verify the policy's ordering covers exactly the resident pages.
    fn check(&self, _resident: &[(FrameId, PageNumber)]) -> SimResult<()> {
        Ok(())
    }
}

/// The closed set of selectable policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Random,
    Fifo,
    Lru,
}

impl PolicyKind {
    pub fn build(self, frame_count: usize, seed: u64) -> Box<dyn ReplacementPolicy> {
        match self {
            PolicyKind::Random => Box::new(RandomPolicy::new(frame_count, seed)),
            PolicyKind::Fifo => Box::new(FifoPolicy::new(frame_count)),
            PolicyKind::Lru => Box::new(LruPolicy::new(frame_count)),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rand" | "random" => Ok(PolicyKind::Random),
            "fifo" => Ok(PolicyKind::Fifo),
            "lru" => Ok(PolicyKind::Lru),
            other => Err(SimError::UnknownPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PolicyKind::Random => "rand",
            PolicyKind::Fifo => "fifo",
            PolicyKind::Lru => "lru",
        };
        f.write_str(name)
    }
}
