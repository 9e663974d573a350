use super::FrameId;
use crate::error::{SimError, SimResult};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageNumber(pub u32);

impl PageNumber {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of memory access that raised a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Access permission of a mapped page. `None` means unmapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protection {
    #[default]
    None,
    Read,
    ReadWrite,
}

impl Protection {
    pub fn permits(self, access: Access) -> bool {
        match (self, access) {
            (Protection::None, _) => false,
            (Protection::Read, Access::Read) => true,
            (Protection::Read, Access::Write) => false,
            (Protection::ReadWrite, _) => true,
        }
    }

    pub fn is_mapped(self) -> bool {
        self != Protection::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageEntry {
    pub frame: FrameId,
    pub protection: Protection,
}

/// The page-table contract the fault handler consumes.
pub trait PageMapping {
    fn page_count(&self) -> usize;

    /// Current frame and protection of `page`.
    fn get_entry(&self, page: PageNumber) -> SimResult<PageEntry>;

    fn set_entry(
        &mut self,
        page: PageNumber,
        frame: FrameId,
        protection: Protection,
    ) -> SimResult<()>;
}

/// Vector-backed page table. Every page starts unmapped at frame 0.
#[derive(Debug)]
pub struct PageTable {
    entries: Vec<PageEntry>,
}

impl PageTable {
    pub fn new(page_count: usize) -> Self {
        Self {
            entries: vec![PageEntry::default(); page_count],
        }
    }

    /// Pages whose protection is not `None`, in page order.
    pub fn mapped_pages(&self) -> impl Iterator<Item = (PageNumber, PageEntry)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.protection.is_mapped())
            .map(|(page, entry)| (PageNumber(page as u32), *entry))
    }

    fn check(&self, page: PageNumber) -> SimResult<usize> {
        if page.index() >= self.entries.len() {
            return Err(SimError::PageOutOfRange {
                page,
                page_count: self.entries.len(),
            });
        }
        Ok(page.index())
    }
}

impl PageMapping for PageTable {
    fn page_count(&self) -> usize {
        self.entries.len()
    }

    fn get_entry(&self, page: PageNumber) -> SimResult<PageEntry> {
        let idx = self.check(page)?;
        Ok(self.entries[idx])
    }

    fn set_entry(
        &mut self,
        page: PageNumber,
        frame: FrameId,
        protection: Protection,
    ) -> SimResult<()> {
        let idx = self.check(page)?;
        self.entries[idx] = PageEntry { frame, protection };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protection_permits() {
        assert!(!Protection::None.permits(Access::Read));
        assert!(!Protection::None.permits(Access::Write));
        assert!(Protection::Read.permits(Access::Read));
        assert!(!Protection::Read.permits(Access::Write));
        assert!(Protection::ReadWrite.permits(Access::Write));
    }

    #[test]
    fn test_new_table_is_unmapped() -> SimResult<()> {
        let pt = PageTable::new(4);
        assert_eq!(pt.page_count(), 4);
        for page in 0..4 {
            let entry = pt.get_entry(PageNumber(page))?;
            assert_eq!(entry.protection, Protection::None);
            assert_eq!(entry.frame, 0);
        }
        assert_eq!(pt.mapped_pages().count(), 0);
        Ok(())
    }

    #[test]
    fn test_set_and_get_entry() -> SimResult<()> {
        let mut pt = PageTable::new(4);
        pt.set_entry(PageNumber(2), 1, Protection::Read)?;

        let entry = pt.get_entry(PageNumber(2))?;
        assert_eq!(entry.frame, 1);
        assert_eq!(entry.protection, Protection::Read);

        let mapped: Vec<_> = pt.mapped_pages().map(|(page, _)| page).collect();
        assert_eq!(mapped, vec![PageNumber(2)]);
        Ok(())
    }

    #[test]
    fn test_out_of_range() {
        let mut pt = PageTable::new(2);
        assert!(matches!(
            pt.get_entry(PageNumber(2)),
            Err(SimError::PageOutOfRange { page_count: 2, .. })
        ));
        assert!(pt.set_entry(PageNumber(9), 0, Protection::Read).is_err());
    }
}
