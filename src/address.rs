/// Geometry of one address space: the derived quantities every walk
/// needs, plus the pure address arithmetic over them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub offset_width: u32,
    pub page_size: usize,
    pub tables_depth: usize,
    pub num_frames: usize,
    pub num_pages: u64,
}

impl Layout {
    /// In-frame offset of a virtual address.
    #[inline]
    pub fn page_offset(&self, address: u64) -> u64 {
        address & ((1u64 << self.offset_width) - 1)
    }

    /// Extend a partial walk path by one more slot index.
    #[inline]
    pub fn concat_path(&self, path: u64, slot: u64) -> u64 {
        (path << self.offset_width) | slot
    }

    /// Shorter of the two arc lengths between two page numbers on the
    /// ring of `num_pages` pages.
    pub fn cyclic_distance(&self, a: u64, b: u64) -> u64 {
        let direct = a.abs_diff(b);
        direct.min(self.num_pages - direct)
    }

    /// Slot index a virtual address consumes at one table level.
    #[inline]
    pub fn slot(&self, address: u64, level: usize) -> usize {
        let shift = (self.tables_depth - level) as u32 * self.offset_width;
        self.page_offset(address >> shift) as usize
    }
}
