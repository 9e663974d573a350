use super::{check_transfer, Disk};
use crate::error::SimResult;
use crate::vm::{PageNumber, PAGE_SIZE};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Disk image stored in a regular file, one `PAGE_SIZE` block per page.
#[derive(Debug)]
pub struct FileDisk {
    file: File,
    blocks: usize,
}

impl FileDisk {
    /// Create (or truncate) an image of `blocks` zeroed blocks.
    pub fn create(path: &Path, blocks: usize) -> SimResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(Self::block_offset(blocks))?;

        Ok(Self { file, blocks })
    }

    pub fn open(path: &Path) -> SimResult<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let blocks = (file.metadata()?.len() / PAGE_SIZE as u64) as usize;

        Ok(Self { file, blocks })
    }

    fn block_offset(block: usize) -> u64 {
        block as u64 * PAGE_SIZE as u64
    }
}

impl Disk for FileDisk {
    fn block_count(&self) -> usize {
        self.blocks
    }

    fn read(&mut self, page: PageNumber, buf: &mut [u8]) -> SimResult<()> {
        check_transfer(page, buf.len(), self.blocks)?;
        self.file
            .seek(SeekFrom::Start(Self::block_offset(page.index())))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    fn write(&mut self, page: PageNumber, data: &[u8]) -> SimResult<()> {
        check_transfer(page, data.len(), self.blocks)?;
        self.file
            .seek(SeekFrom::Start(Self::block_offset(page.index())))?;
        self.file.write_all(data)?;
        Ok(())
    }
}
