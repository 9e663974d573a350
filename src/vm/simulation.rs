use super::page_table::{Access, PageMapping, PageNumber, PageTable};
use super::pager::Pager;
use super::policy::ReplacementPolicy;
use super::stats::Stats;
use super::{FrameId, PAGE_SIZE};
use crate::disk::Disk;
use crate::error::{SimError, SimResult};

/// A write to an unmapped page faults once to load it and once to upgrade it.
const MAX_FAULTS_PER_ACCESS: usize = 2;

/// One self-contained simulated machine: virtual address space, physical
/// frames, replacement policy, backing disk and counters.
pub struct Simulation {
    page_table: PageTable,
    pager: Pager,
}

impl Simulation {
    pub fn new(
        page_count: usize,
        frame_count: usize,
        policy: Box<dyn ReplacementPolicy>,
        disk: Box<dyn Disk>,
    ) -> SimResult<Self> {
        if page_count == 0 || frame_count == 0 {
            return Err(SimError::InvalidConfig(format!(
                "pages ({}) and frames ({}) must both be at least 1",
                page_count, frame_count
            )));
        }
        if disk.block_count() < page_count {
            return Err(SimError::InvalidConfig(format!(
                "disk has {} blocks but {} pages need backing",
                disk.block_count(),
                page_count
            )));
        }

        Ok(Self {
            page_table: PageTable::new(page_count),
            pager: Pager::new(frame_count, policy, disk)?,
        })
    }

    /// Size of the virtual region in bytes.
    pub fn len(&self) -> usize {
        self.page_table.page_count() * PAGE_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn page_count(&self) -> usize {
        self.page_table.page_count()
    }

    pub fn frame_count(&self) -> usize {
        self.pager.frames().len()
    }

    pub fn stats(&self) -> Stats {
        self.pager.stats()
    }

    pub fn policy_name(&self) -> &'static str {
        self.pager.policy().name()
    }

    pub fn policy(&self) -> &dyn ReplacementPolicy {
        self.pager.policy()
    }

    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    pub fn read_byte(&mut self, addr: usize) -> SimResult<u8> {
        let (frame_id, offset) = self.resolve(addr, Access::Read)?;
        Ok(self.pager.frames().frame(frame_id).data()[offset])
    }

    pub fn write_byte(&mut self, addr: usize, value: u8) -> SimResult<()> {
        let (frame_id, offset) = self.resolve(addr, Access::Write)?;
        self.pager.frames_mut().frame_mut(frame_id).data_mut()[offset] = value;
        Ok(())
    }

    /// Access the first byte of `page`.
    pub fn touch(&mut self, page: PageNumber, access: Access) -> SimResult<()> {
        let addr = page.index() * PAGE_SIZE;
        match access {
            Access::Read => self.read_byte(addr).map(|_| ()),
            Access::Write => {
                let value = self.read_byte(addr)?;
                self.write_byte(addr, value)
            }
        }
    }

    /// Resident pages in page order.
    pub fn resident_pages(&self) -> Vec<PageNumber> {
        self.page_table.mapped_pages().map(|(page, _)| page).collect()
    }

    /// Check that frames, mappings and the policy agree.
    pub fn check_invariants(&self) -> SimResult<()> {
        let frames = self.pager.frames();
        let mut resident: Vec<(FrameId, PageNumber)> = Vec::new();

        for (page, entry) in self.page_table.mapped_pages() {
            if entry.frame as usize >= frames.len() {
                return Err(SimError::InvariantViolation(format!(
                    "page {} maps to frame {} beyond {} frames",
                    page,
                    entry.frame,
                    frames.len()
                )));
            }
            let frame = frames.frame(entry.frame);
            if frame.page() != Some(page) || frame.protection() != entry.protection {
                return Err(SimError::FrameMismatch {
                    frame: entry.frame,
                    expected: page,
                    found: frame.page(),
                });
            }
            resident.push((entry.frame, page));
        }

        let occupied = frames.iter().filter(|(_, frame)| !frame.is_free()).count();
        if occupied != resident.len() {
            return Err(SimError::InvariantViolation(format!(
                "{} frames occupied but {} pages mapped",
                occupied,
                resident.len()
            )));
        }

        self.pager.policy().check(&resident)
    }

    fn resolve(&mut self, addr: usize, access: Access) -> SimResult<(FrameId, usize)> {
        if addr >= self.len() {
            return Err(SimError::AddressOutOfRange {
                addr,
                len: self.len(),
            });
        }
        let page = PageNumber((addr / PAGE_SIZE) as u32);

        let mut faults = 0;
        loop {
            let entry = self.page_table.get_entry(page)?;
            if entry.protection.permits(access) {
                return Ok((entry.frame, addr % PAGE_SIZE));
            }
            if faults == MAX_FAULTS_PER_ACCESS {
                return Err(SimError::FaultLoop { page });
            }
            self.pager.handle_fault(&mut self.page_table, page)?;
            faults += 1;
        }
    }
}
