use super::ReplacementPolicy;
use crate::error::{SimError, SimResult};
use crate::vm::page_table::{PageMapping, PageNumber};
use crate::vm::FrameId;

/// Evicts frames in the order pages were loaded into them.
///
/// A fixed ring of frame ids with separate front and end cursors. Repeated
/// references never reorder it.
#[derive(Debug)]
pub struct FifoPolicy {
    queue: Vec<FrameId>,
    front: usize,
    end: usize,
    len: usize,
}

impl FifoPolicy {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: vec![0; capacity],
            front: 0,
            end: 0,
            len: 0,
        }
    }

    /// Queued frames, oldest first.
    pub fn order(&self) -> Vec<FrameId> {
        (0..self.len)
            .map(|i| self.queue[(self.front + i) % self.capacity()])
            .collect()
    }
}

impl ReplacementPolicy for FifoPolicy {
    fn name(&self) -> &'static str {
        "fifo"
    }

    fn victim(&mut self, _page_table: &dyn PageMapping) -> SimResult<FrameId> {
        // Only asked when every frame is occupied, so the ring must be full
        if self.len != self.capacity() || self.capacity() == 0 {
            return Err(SimError::QueueDesync {
                len: self.len,
                capacity: self.capacity(),
            });
        }
        let frame_id = self.queue[self.front];
        self.front = (self.front + 1) % self.capacity();
        self.len -= 1;
        Ok(frame_id)
    }

    fn installed(&mut self, frame_id: FrameId, _page: PageNumber) -> SimResult<()> {
        if self.len == self.capacity() {
            return Err(SimError::QueueDesync {
                len: self.len + 1,
                capacity: self.capacity(),
            });
        }
        self.queue[self.end] = frame_id;
        self.end = (self.end + 1) % self.capacity();
        self.len += 1;
        Ok(())
    }

    fn referenced(&mut self, _frame_id: FrameId, _page: PageNumber) -> SimResult<()> {
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.queue.len()
    }

    fn tracked(&self) -> usize {
        self.len
    }

    fn check(&self, resident: &[(FrameId, PageNumber)]) -> SimResult<()> {
        let mut queued = self.order();
        let mut occupied: Vec<FrameId> = resident.iter().map(|(frame, _)| *frame).collect();
        queued.sort_unstable();
        occupied.sort_unstable();
        if queued != occupied {
            return Err(SimError::InvariantViolation(format!(
                "fifo queue holds frames {:?} but occupied frames are {:?}",
                queued, occupied
            )));
        }
        Ok(())
    }
}
