use super::page_table::{PageMapping, PageNumber, Protection};
use super::stats::Stats;
use super::{FrameId, PAGE_SIZE};
use crate::disk::Disk;
use crate::error::{SimError, SimResult};
use log::debug;

/// One physical frame: its bytes plus what currently lives in it.
pub struct Frame {
    data: Box<[u8; PAGE_SIZE]>,
    page: Option<PageNumber>,
    protection: Protection,
    dirty: bool,
}

impl Frame {
    fn new() -> Self {
        Self {
            data: Box::new([0u8; PAGE_SIZE]),
            page: None,
            protection: Protection::None,
            dirty: false,
        }
    }

    fn reset(&mut self) {
        self.page = None;
        self.protection = Protection::None;
        self.dirty = false;
    }

    pub fn page(&self) -> Option<PageNumber> {
        self.page
    }

    pub fn protection(&self) -> Protection {
        self.protection
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_free(&self) -> bool {
        self.protection == Protection::None
    }

    pub fn data(&self) -> &[u8; PAGE_SIZE] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8; PAGE_SIZE] {
        &mut self.data
    }
}

/// Physical memory: a fixed array of frames sized once at startup.
pub struct FrameTable {
    frames: Vec<Frame>,
}

impl FrameTable {
    pub fn new(frame_count: usize) -> Self {
        Self {
            frames: (0..frame_count).map(|_| Frame::new()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, frame_id: FrameId) -> &Frame {
        &self.frames[frame_id as usize]
    }

    pub fn frame_mut(&mut self, frame_id: FrameId) -> &mut Frame {
        &mut self.frames[frame_id as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (FrameId, &Frame)> {
        self.frames
            .iter()
            .enumerate()
            .map(|(idx, frame)| (idx as FrameId, frame))
    }

    /// First frame with no protection, lowest index first.
    pub fn allocate_free(&self) -> Option<FrameId> {
        self.frames
            .iter()
            .position(Frame::is_free)
            .map(|idx| idx as FrameId)
    }

    /// Record `page` as the occupant of `frame_id`. The caller has already
    /// loaded the bytes and updated the mapping.
    pub fn install(&mut self, frame_id: FrameId, page: PageNumber, protection: Protection) {
        let frame = &mut self.frames[frame_id as usize];
        frame.page = Some(page);
        frame.protection = protection;
        frame.dirty = protection == Protection::ReadWrite;
    }

    /// Grant write permission to the resident page and mark it dirty.
    pub fn upgrade(&mut self, frame_id: FrameId, page: PageNumber) -> SimResult<()> {
        let frame = &mut self.frames[frame_id as usize];
        if frame.page != Some(page) || frame.is_free() {
            return Err(SimError::FrameMismatch {
                frame: frame_id,
                expected: page,
                found: frame.page,
            });
        }
        frame.protection = Protection::ReadWrite;
        frame.dirty = true;
        Ok(())
    }

    /// Make `frame_id` free again. A dirty occupant is written back first;
    /// clean pages are dropped because the disk copy is already current.
    /// The occupant's mapping becomes `(frame_id, None)`.
    ///
    /// Returns the page that was evicted.
    pub fn evict(
        &mut self,
        frame_id: FrameId,
        page_table: &mut dyn PageMapping,
        disk: &mut dyn Disk,
        stats: &mut Stats,
    ) -> SimResult<PageNumber> {
        let frame = &mut self.frames[frame_id as usize];
        let page = match frame.page {
            Some(page) if !frame.is_free() => page,
            _ => {
                return Err(SimError::InvariantViolation(format!(
                    "evicting frame {} which holds no page",
                    frame_id
                )));
            }
        };

        if frame.dirty {
            disk.write(page, &frame.data[..])?;
            stats.record_write();
        }
        debug!(
            "evicted page {} from frame {} (dirty: {})",
            page, frame_id, frame.dirty
        );

        page_table.set_entry(page, frame_id, Protection::None)?;
        frame.reset();
        Ok(page)
    }
}
