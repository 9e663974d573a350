//! Simulated block storage backing the virtual address space.
//!
//! One block holds exactly one page; block `n` is the home of virtual page `n`.

pub mod file_disk;

pub use file_disk::FileDisk;

use crate::error::{SimError, SimResult};
use crate::vm::{PageNumber, PAGE_SIZE};

pub trait Disk: Send {
    fn block_count(&self) -> usize;

    /// Read the block of `page` into `buf`, which must be `PAGE_SIZE` long.
    fn read(&mut self, page: PageNumber, buf: &mut [u8]) -> SimResult<()>;

    /// Write `data`, which must be `PAGE_SIZE` long, to the block of `page`.
    fn write(&mut self, page: PageNumber, data: &[u8]) -> SimResult<()>;
}

pub(crate) fn check_transfer(page: PageNumber, len: usize, blocks: usize) -> SimResult<()> {
    if len != PAGE_SIZE {
        return Err(SimError::BufferSize {
            expected: PAGE_SIZE,
            actual: len,
        });
    }
    if page.index() >= blocks {
        return Err(SimError::BlockOutOfRange { block: page, blocks });
    }
    Ok(())
}

/// Disk image held entirely in memory, zero filled on creation.
#[derive(Debug)]
pub struct MemoryDisk {
    blocks: Vec<Box<[u8; PAGE_SIZE]>>,
}

impl MemoryDisk {
    pub fn new(blocks: usize) -> Self {
        Self {
            blocks: (0..blocks).map(|_| Box::new([0u8; PAGE_SIZE])).collect(),
        }
    }
}

impl Disk for MemoryDisk {
    fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn read(&mut self, page: PageNumber, buf: &mut [u8]) -> SimResult<()> {
        check_transfer(page, buf.len(), self.blocks.len())?;
        buf.copy_from_slice(self.blocks[page.index()].as_ref());
        Ok(())
    }

    fn write(&mut self, page: PageNumber, data: &[u8]) -> SimResult<()> {
        check_transfer(page, data.len(), self.blocks.len())?;
        self.blocks[page.index()].copy_from_slice(data);
        Ok(())
    }
}
