use memory::{PhysicalMemory, Word};
use swap::SwapFile;

/// Running totals of the backend traffic one address space generated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BackendStats {
    pub reads: u64,
    pub writes: u64,
    pub pages_in: u64,
    pub pages_out: u64,
}

/// The four primitives the translation core runs against: word
/// read/write over the frame array and whole-page moves to and from the
/// swap file.
pub(crate) struct Backend {
    mem: PhysicalMemory,
    swap: SwapFile,
    reads: u64,
    writes: u64,
    pages_in: u64,
    pages_out: u64,
}

impl Backend {
    pub(crate) fn new(mem: PhysicalMemory, swap: SwapFile) -> Self {
        Backend {
            mem,
            swap,
            reads: 0,
            writes: 0,
            pages_in: 0,
            pages_out: 0,
        }
    }

    pub(crate) fn read(&mut self, address: usize) -> Word {
        self.reads += 1;
        self.mem.read(address)
    }

    pub(crate) fn write(&mut self, address: usize, word: Word) {
        self.writes += 1;
        self.mem.write(address, word);
    }

    /// Copy the page's swap slot into the frame.
    pub(crate) fn restore(&mut self, frame_index: usize, page_number: u64) {
        let words = self.swap.read_page(page_number as usize).unwrap();
        self.mem.frame_mut(frame_index).copy_from_slice(&words);
        self.pages_in += 1;
    }

    /// Copy the frame out to the page's swap slot.
    pub(crate) fn evict(&mut self, frame_index: usize, page_number: u64) {
        self.swap
            .write_page(page_number as usize, self.mem.frame(frame_index))
            .unwrap();
        self.pages_out += 1;
    }

    /// Uncounted read for diagnostics.
    pub(crate) fn peek(&self, address: usize) -> Word {
        self.mem.read(address)
    }

    pub(crate) fn stats(&self) -> BackendStats {
        BackendStats {
            reads: self.reads,
            writes: self.writes,
            pages_in: self.pages_in,
            pages_out: self.pages_out,
        }
    }
}
