use super::frame::FrameTable;
use super::page_table::{PageMapping, PageNumber, Protection};
use super::policy::ReplacementPolicy;
use super::stats::Stats;
use super::FrameId;
use crate::disk::Disk;
use crate::error::{SimError, SimResult};
use log::trace;

/// The fault handler. Owns physical memory, the active replacement policy,
/// the disk and the counters; the page table is lent in on every fault.
pub struct Pager {
    frames: FrameTable,
    policy: Box<dyn ReplacementPolicy>,
    disk: Box<dyn Disk>,
    stats: Stats,
}

impl Pager {
    /// The policy must be sized for exactly `frame_count` frames.
    pub fn new(
        frame_count: usize,
        policy: Box<dyn ReplacementPolicy>,
        disk: Box<dyn Disk>,
    ) -> SimResult<Self> {
        if frame_count == 0 {
            return Err(SimError::InvalidConfig(
                "frame count must be at least 1".to_string(),
            ));
        }
        if policy.capacity() != frame_count {
            return Err(SimError::InvalidConfig(format!(
                "{} policy sized for {} frames but the frame table has {}",
                policy.name(),
                policy.capacity(),
                frame_count
            )));
        }

        Ok(Self {
            frames: FrameTable::new(frame_count),
            policy,
            disk,
            stats: Stats::default(),
        })
    }

    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut FrameTable {
        &mut self.frames
    }

    pub fn policy(&self) -> &dyn ReplacementPolicy {
        self.policy.as_ref()
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Resolve a fault on `page`.
    ///
    /// An unmapped page is loaded read-only into a free frame, evicting a
    /// victim chosen by the policy when none is free. A read-only page is
    /// upgraded to read-write in place. A fault on a read-write page means
    /// the caller's view of the mapping is broken.
    pub fn handle_fault(&mut self, page_table: &mut dyn PageMapping, page: PageNumber) -> SimResult<()> {
        self.stats.record_fault();
        let entry = page_table.get_entry(page)?;
        trace!("fault on page {} ({:?})", page, entry.protection);

        match entry.protection {
            Protection::None => self.load(page_table, page),
            Protection::Read => self.upgrade(page_table, page, entry.frame),
            Protection::ReadWrite => Err(SimError::SpuriousFault { page }),
        }
    }

    fn load(&mut self, page_table: &mut dyn PageMapping, page: PageNumber) -> SimResult<()> {
        let frame_id = match self.frames.allocate_free() {
            Some(frame_id) => frame_id,
            None => {
                let victim = self.policy.victim(page_table)?;
                if victim as usize >= self.frames.len() {
                    return Err(SimError::InvariantViolation(format!(
                        "{} picked frame {} beyond {} frames",
                        self.policy.name(),
                        victim,
                        self.frames.len()
                    )));
                }
                self.frames
                    .evict(victim, page_table, self.disk.as_mut(), &mut self.stats)?;
                victim
            }
        };

        self.policy.installed(frame_id, page)?;
        self.disk
            .read(page, self.frames.frame_mut(frame_id).data_mut())?;
        self.stats.record_read();

        page_table.set_entry(page, frame_id, Protection::Read)?;
        self.frames.install(frame_id, page, Protection::Read);
        Ok(())
    }

    fn upgrade(
        &mut self,
        page_table: &mut dyn PageMapping,
        page: PageNumber,
        frame_id: FrameId,
    ) -> SimResult<()> {
        self.frames.upgrade(frame_id, page)?;
        page_table.set_entry(page, frame_id, Protection::ReadWrite)?;
        self.policy.referenced(frame_id, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::MemoryDisk;
    use crate::vm::page_table::PageTable;
    use crate::vm::policy::{FifoPolicy, LruPolicy, RandomPolicy};
    use crate::vm::PAGE_SIZE;

    fn pager_with(
        policy: Box<dyn ReplacementPolicy>,
        frames: usize,
        pages: usize,
    ) -> SimResult<Pager> {
        Pager::new(frames, policy, Box::new(MemoryDisk::new(pages)))
    }

    /// Accepts every victim request but refuses to track new pages.
    #[derive(Debug)]
    struct RefusingPolicy;

    impl ReplacementPolicy for RefusingPolicy {
        fn name(&self) -> &'static str {
            "refusing"
        }

        fn victim(&mut self, _page_table: &dyn PageMapping) -> SimResult<FrameId> {
            Ok(0)
        }

        fn installed(&mut self, _frame_id: FrameId, page: PageNumber) -> SimResult<()> {
            Err(SimError::NotTracked { page })
        }

        fn referenced(&mut self, _frame_id: FrameId, _page: PageNumber) -> SimResult<()> {
            Ok(())
        }

        fn capacity(&self) -> usize {
            1
        }

        fn tracked(&self) -> usize {
            0
        }
    }

    #[test]
    fn test_first_touch_loads_read_only() -> SimResult<()> {
        let mut pt = PageTable::new(4);
        let mut pager = pager_with(Box::new(FifoPolicy::new(2)), 2, 4)?;

        pager.handle_fault(&mut pt, PageNumber(3))?;

        let entry = pt.get_entry(PageNumber(3))?;
        assert_eq!(entry.protection, Protection::Read);
        assert_eq!(entry.frame, 0);
        assert_eq!(pager.frames().frame(0).page(), Some(PageNumber(3)));
        assert_eq!(pager.stats().faults, 1);
        assert_eq!(pager.stats().reads, 1);
        assert_eq!(pager.stats().writes, 0);
        assert_eq!(pager.policy().tracked(), 1);
        Ok(())
    }

    #[test]
    fn test_second_fault_upgrades_in_place() -> SimResult<()> {
        let mut pt = PageTable::new(4);
        let mut pager = pager_with(Box::new(LruPolicy::new(2)), 2, 4)?;

        pager.handle_fault(&mut pt, PageNumber(1))?;
        pager.handle_fault(&mut pt, PageNumber(1))?;

        let entry = pt.get_entry(PageNumber(1))?;
        assert_eq!(entry.protection, Protection::ReadWrite);
        assert_eq!(entry.frame, 0);
        assert!(pager.frames().frame(0).is_dirty());
        assert_eq!(pager.stats().faults, 2);
        assert_eq!(pager.stats().reads, 1);
        Ok(())
    }

    #[test]
    fn test_fault_at_full_permission_is_fatal() -> SimResult<()> {
        let mut pt = PageTable::new(2);
        let mut pager = pager_with(Box::new(LruPolicy::new(1)), 1, 2)?;

        pager.handle_fault(&mut pt, PageNumber(0))?;
        pager.handle_fault(&mut pt, PageNumber(0))?;
        let err = pager.handle_fault(&mut pt, PageNumber(0)).unwrap_err();
        assert!(matches!(err, SimError::SpuriousFault { .. }));
        assert!(err.is_fatal_consistency());
        Ok(())
    }

    #[test]
    fn test_eviction_writes_back_dirty_data() -> SimResult<()> {
        let mut pt = PageTable::new(3);
        let mut pager = pager_with(Box::new(FifoPolicy::new(1)), 1, 3)?;

        pager.handle_fault(&mut pt, PageNumber(0))?;
        pager.handle_fault(&mut pt, PageNumber(0))?;
        pager.frames_mut().frame_mut(0).data_mut()[0] = 0xAB;

        // Page 1 pushes page 0 out
        pager.handle_fault(&mut pt, PageNumber(1))?;
        assert_eq!(pager.stats().writes, 1);
        assert_eq!(pt.get_entry(PageNumber(0))?.protection, Protection::None);
        assert_eq!(pager.frames().frame(0).data()[0], 0);

        // Page 0 comes back with its bytes
        pager.handle_fault(&mut pt, PageNumber(0))?;
        assert_eq!(pager.frames().frame(0).data()[0], 0xAB);
        assert_eq!(pager.stats().reads, 3);
        // Page 1 was clean
        assert_eq!(pager.stats().writes, 1);
        Ok(())
    }

    #[test]
    fn test_random_policy_evicts_when_full() -> SimResult<()> {
        let mut pt = PageTable::new(4);
        let mut pager = pager_with(Box::new(RandomPolicy::new(2, 1)), 2, 4)?;

        for page in 0..4 {
            pager.handle_fault(&mut pt, PageNumber(page))?;
        }

        assert_eq!(pt.mapped_pages().count(), 2);
        assert_eq!(pager.stats().reads, 4);
        assert_eq!(pager.frames().allocate_free(), None);
        Ok(())
    }

    #[test]
    fn test_frame_buffers_are_page_sized() -> SimResult<()> {
        let pager = pager_with(Box::new(LruPolicy::new(1)), 1, 1)?;
        assert_eq!(pager.frames().frame(0).data().len(), PAGE_SIZE);
        Ok(())
    }

    #[test]
    fn test_policy_capacity_must_match_frames() {
        // Oversized random policy would pick frames the table lacks
        assert!(matches!(
            pager_with(Box::new(RandomPolicy::new(50, 1)), 2, 6),
            Err(SimError::InvalidConfig(_))
        ));
        // Undersized fifo ring would desync once the third frame fills
        assert!(matches!(
            pager_with(Box::new(FifoPolicy::new(2)), 3, 6),
            Err(SimError::InvalidConfig(_))
        ));
        assert!(matches!(
            pager_with(Box::new(LruPolicy::new(4)), 3, 6),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_frames_rejected() {
        assert!(matches!(
            pager_with(Box::new(RandomPolicy::new(0, 0)), 0, 1),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_failed_install_leaves_state_untouched() -> SimResult<()> {
        let mut pt = PageTable::new(2);
        let mut pager = pager_with(Box::new(RefusingPolicy), 1, 2)?;
        pager.frames_mut().frame_mut(0).data_mut()[0] = 0xCD;

        let err = pager.handle_fault(&mut pt, PageNumber(1)).unwrap_err();
        assert!(matches!(err, SimError::NotTracked { .. }));

        // No read counted, frame bytes not overwritten, page not mapped
        assert_eq!(pager.stats().faults, 1);
        assert_eq!(pager.stats().reads, 0);
        assert_eq!(pager.frames().frame(0).data()[0], 0xCD);
        assert!(pager.frames().frame(0).is_free());
        assert_eq!(pt.get_entry(PageNumber(1))?.protection, Protection::None);
        Ok(())
    }
}
