use super::ReplacementPolicy;
use crate::error::{SimError, SimResult};
use crate::vm::page_table::{PageMapping, PageNumber};
use crate::vm::FrameId;
use log::trace;
use std::collections::HashMap;

const NIL: usize = usize::MAX;

#[derive(Debug, Clone, Copy)]
struct Node {
    page: PageNumber,
    /// Towards the least recently used end.
    older: usize,
    /// Towards the most recently used end.
    newer: usize,
}

/// Strict least-recently-used replacement over resident pages.
///
/// Recency is a doubly linked list stored in a vector and addressed by
/// slot index; `index` finds a page's slot in O(1). Slots freed by eviction
/// are reused through `free`.
#[derive(Debug)]
pub struct LruPolicy {
    nodes: Vec<Node>,
    free: Vec<usize>,
    index: HashMap<PageNumber, usize>,
    /// Most recently used.
    top: usize,
    /// Least recently used.
    bottom: usize,
    capacity: usize,
}

impl LruPolicy {
    pub fn new(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            index: HashMap::with_capacity(capacity),
            top: NIL,
            bottom: NIL,
            capacity,
        }
    }

    pub fn contains(&self, page: PageNumber) -> bool {
        self.index.contains_key(&page)
    }

    /// Tracked pages from most to least recently used.
    pub fn order(&self) -> Vec<PageNumber> {
        let mut pages = Vec::with_capacity(self.index.len());
        let mut cursor = self.top;
        while cursor != NIL {
            let node = self.nodes[cursor];
            pages.push(node.page);
            cursor = node.older;
        }
        pages
    }

    fn alloc(&mut self, page: PageNumber) -> usize {
        let node = Node {
            page,
            older: NIL,
            newer: NIL,
        };
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn link_top(&mut self, slot: usize) {
        self.nodes[slot].older = self.top;
        self.nodes[slot].newer = NIL;
        if self.top != NIL {
            self.nodes[self.top].newer = slot;
        } else {
            self.bottom = slot;
        }
        self.top = slot;
    }

    fn unlink(&mut self, slot: usize) {
        let Node { older, newer, .. } = self.nodes[slot];
        if newer != NIL {
            self.nodes[newer].older = older;
        } else {
            self.top = older;
        }
        if older != NIL {
            self.nodes[older].newer = newer;
        } else {
            self.bottom = newer;
        }
        self.nodes[slot].older = NIL;
        self.nodes[slot].newer = NIL;
    }

    fn push(&mut self, page: PageNumber) {
        let slot = self.alloc(page);
        self.index.insert(page, slot);
        self.link_top(slot);
    }

    /// Move `page` to the most recently used end. Returns false if untracked.
    fn promote(&mut self, page: PageNumber) -> bool {
        let Some(&slot) = self.index.get(&page) else {
            return false;
        };
        if slot != self.top {
            self.unlink(slot);
            self.link_top(slot);
            trace!("lru promoted page {}", page);
        }
        true
    }

    fn pop_bottom(&mut self) -> Option<PageNumber> {
        if self.bottom == NIL {
            return None;
        }
        let slot = self.bottom;
        let page = self.nodes[slot].page;
        self.unlink(slot);
        self.index.remove(&page);
        self.free.push(slot);
        Some(page)
    }
}

impl ReplacementPolicy for LruPolicy {
    fn name(&self) -> &'static str {
        "lru"
    }

    fn victim(&mut self, page_table: &dyn PageMapping) -> SimResult<FrameId> {
        let page = self.pop_bottom().ok_or_else(|| {
            SimError::InvariantViolation("lru list is empty but no frame is free".to_string())
        })?;
        let entry = page_table.get_entry(page)?;
        if !entry.protection.is_mapped() {
            return Err(SimError::InvariantViolation(format!(
                "lru victim page {} is not mapped",
                page
            )));
        }
        trace!("lru victim page {} in frame {}", page, entry.frame);
        Ok(entry.frame)
    }

    fn installed(&mut self, _frame_id: FrameId, page: PageNumber) -> SimResult<()> {
        // Never push a page twice
        if !self.promote(page) {
            self.push(page);
        }
        Ok(())
    }

    fn referenced(&mut self, _frame_id: FrameId, page: PageNumber) -> SimResult<()> {
        if self.promote(page) {
            Ok(())
        } else {
            Err(SimError::NotTracked { page })
        }
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn tracked(&self) -> usize {
        self.index.len()
    }

    fn check(&self, resident: &[(FrameId, PageNumber)]) -> SimResult<()> {
        let listed = self.order();
        if listed.len() != self.index.len() {
            return Err(SimError::InvariantViolation(format!(
                "lru list has {} nodes but index has {}",
                listed.len(),
                self.index.len()
            )));
        }
        if listed.len() != resident.len() {
            return Err(SimError::InvariantViolation(format!(
                "lru tracks {} pages but {} are resident",
                listed.len(),
                resident.len()
            )));
        }
        for (_, page) in resident {
            if !self.contains(*page) {
                return Err(SimError::NotTracked { page: *page });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::page_table::{PageTable, Protection};

    fn pages(ids: &[u32]) -> Vec<PageNumber> {
        ids.iter().map(|&id| PageNumber(id)).collect()
    }

    fn map(pt: &mut PageTable, page: u32, frame: FrameId) -> SimResult<()> {
        pt.set_entry(PageNumber(page), frame, Protection::Read)
    }

    #[test]
    fn test_push_order() -> SimResult<()> {
        let mut policy = LruPolicy::new(3);
        assert_eq!(policy.tracked(), 0);

        policy.installed(0, PageNumber(1))?;
        policy.installed(1, PageNumber(2))?;
        policy.installed(2, PageNumber(3))?;

        assert_eq!(policy.order(), pages(&[3, 2, 1]));
        assert_eq!(policy.tracked(), 3);
        Ok(())
    }

    #[test]
    fn test_reference_promotes() -> SimResult<()> {
        let mut policy = LruPolicy::new(3);
        policy.installed(0, PageNumber(1))?;
        policy.installed(1, PageNumber(2))?;
        policy.installed(2, PageNumber(3))?;

        // Bottom to top
        policy.referenced(0, PageNumber(1))?;
        assert_eq!(policy.order(), pages(&[1, 3, 2]));

        // Middle to top
        policy.referenced(2, PageNumber(3))?;
        assert_eq!(policy.order(), pages(&[3, 1, 2]));

        // Already on top
        policy.referenced(2, PageNumber(3))?;
        assert_eq!(policy.order(), pages(&[3, 1, 2]));
        Ok(())
    }

    #[test]
    fn test_victim_is_least_recent() -> SimResult<()> {
        let mut pt = PageTable::new(8);
        let mut policy = LruPolicy::new(3);
        for (frame, page) in [(0, 1), (1, 2), (2, 3)] {
            map(&mut pt, page, frame)?;
            policy.installed(frame, PageNumber(page))?;
        }
        policy.referenced(0, PageNumber(1))?;

        // Page 2 lives in frame 1
        assert_eq!(policy.victim(&pt)?, 1);
        assert!(!policy.contains(PageNumber(2)));
        assert_eq!(policy.order(), pages(&[1, 3]));
        Ok(())
    }

    #[test]
    fn test_slots_are_reused() -> SimResult<()> {
        let mut pt = PageTable::new(8);
        let mut policy = LruPolicy::new(2);
        map(&mut pt, 0, 0)?;
        map(&mut pt, 1, 1)?;
        policy.installed(0, PageNumber(0))?;
        policy.installed(1, PageNumber(1))?;

        for page in 2..6 {
            let frame = policy.victim(&pt)?;
            map(&mut pt, page, frame)?;
            policy.installed(frame, PageNumber(page))?;
        }

        assert_eq!(policy.nodes.len(), 2);
        assert_eq!(policy.order(), pages(&[5, 4]));
        Ok(())
    }

    #[test]
    fn test_install_of_tracked_page_is_not_duplicated() -> SimResult<()> {
        let mut policy = LruPolicy::new(2);
        policy.installed(0, PageNumber(1))?;
        policy.installed(1, PageNumber(2))?;
        policy.installed(0, PageNumber(1))?;

        assert_eq!(policy.order(), pages(&[1, 2]));
        assert_eq!(policy.tracked(), 2);
        Ok(())
    }

    #[test]
    fn test_empty_list_errors() {
        let pt = PageTable::new(1);
        let mut policy = LruPolicy::new(1);
        assert!(policy.victim(&pt).is_err());
        assert!(matches!(
            policy.referenced(0, PageNumber(0)),
            Err(SimError::NotTracked { .. })
        ));
    }

    #[test]
    fn test_check_matches_resident_set() -> SimResult<()> {
        let mut policy = LruPolicy::new(2);
        policy.installed(0, PageNumber(4))?;
        policy.installed(1, PageNumber(5))?;

        policy.check(&[(0, PageNumber(4)), (1, PageNumber(5))])?;
        assert!(policy.check(&[(0, PageNumber(4))]).is_err());
        assert!(policy
            .check(&[(0, PageNumber(4)), (1, PageNumber(6))])
            .is_err());
        Ok(())
    }
}
