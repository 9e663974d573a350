use super::ReplacementPolicy;
use crate::error::{SimError, SimResult};
use crate::vm::page_table::{PageMapping, PageNumber};
use crate::vm::FrameId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Evicts a uniformly drawn frame. Keeps no ordering state.
#[derive(Debug)]
pub struct RandomPolicy {
    rng: StdRng,
    frame_count: usize,
}

impl RandomPolicy {
    pub fn new(frame_count: usize, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            frame_count,
        }
    }
}

impl ReplacementPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "rand"
    }

    fn victim(&mut self, _page_table: &dyn PageMapping) -> SimResult<FrameId> {
        if self.frame_count == 0 {
            return Err(SimError::InvariantViolation(
                "random victim requested with no frames".to_string(),
            ));
        }
        Ok(self.rng.gen_range(0..self.frame_count) as FrameId)
    }

    fn installed(&mut self, _frame_id: FrameId, _page: PageNumber) -> SimResult<()> {
        Ok(())
    }

    fn referenced(&mut self, _frame_id: FrameId, _page: PageNumber) -> SimResult<()> {
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.frame_count
    }

    fn tracked(&self) -> usize {
        0
    }
}
