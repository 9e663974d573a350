use std::fmt;

/// Run-wide fault and disk I/O counters. They only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub faults: u64,
    pub reads: u64,
    pub writes: u64,
}

impl Stats {
    pub(crate) fn record_fault(&mut self) {
        self.faults += 1;
    }

    pub(crate) fn record_read(&mut self) {
        self.reads += 1;
    }

    pub(crate) fn record_write(&mut self) {
        self.writes += 1;
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Page Faults: {}, Disk Reads: {}, Disk Writes: {}",
            self.faults, self.reads, self.writes
        )
    }
}
