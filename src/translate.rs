use log::debug;

use memory::Word;

use crate::selector::FrameSearch;
use crate::VirtualMemory;

impl<const OFFSET_WIDTH: u32, const VIRTUAL_ADDRESS_WIDTH: u32, const PHYSICAL_ADDRESS_WIDTH: u32>
    VirtualMemory<OFFSET_WIDTH, VIRTUAL_ADDRESS_WIDTH, PHYSICAL_ADDRESS_WIDTH>
{
    /// Walk the table tree for a virtual address, materializing any
    /// missing level, and return the physical word address.
    pub(crate) fn translate(&mut self, address: u64) -> usize {
        let layout = Self::layout();
        let page_number = address >> OFFSET_WIDTH;
        let mut frame = 0;
        let mut forbidden = None;
        for level in 0..layout.tables_depth {
            let slot_address = frame * layout.page_size + layout.slot(address, level);
            let entry = self.backend.read(slot_address);
            frame = if entry == 0 {
                self.install_frame(page_number, level, &mut forbidden, slot_address)
            } else {
                entry as usize
            };
        }
        frame * layout.page_size + layout.page_offset(address) as usize
    }

    /// Pick a frame for one missing table entry and link it in. In order
    /// of preference: an empty table already in the tree, a frame never
    /// used before, or the frame of the resident page farthest from the
    /// faulting one.
    fn install_frame(
        &mut self,
        faulting_page: u64,
        level: usize,
        forbidden: &mut Option<usize>,
        target_slot: usize,
    ) -> usize {
        let layout = Self::layout();
        let mut search = FrameSearch::new(layout, faulting_page, target_slot, *forbidden);
        search.run(&mut self.backend);

        let frame = if let Some(frame) = search.empty_table() {
            debug!("reclaiming empty table frame[{}]", frame);
            frame
        } else if search.max_seen() + 1 < layout.num_frames {
            let frame = search.max_seen() + 1;
            self.backend.write(target_slot, frame as Word);
            frame
        } else {
            let victim = search
                .victim()
                .expect("a fully occupied tree holds at least one resident page");
            debug!(
                "evicting page[{}] from frame[{}] for page[{}]",
                victim.page, victim.frame, faulting_page
            );
            self.backend.evict(victim.frame, victim.page);
            // Unlink the victim before relinking its frame, so no two
            // slots ever reference the same frame.
            let parent_slot =
                victim.parent_frame * layout.page_size + layout.page_offset(victim.page) as usize;
            self.backend.write(parent_slot, 0);
            self.backend.write(target_slot, victim.frame as Word);
            victim.frame
        };

        if level == layout.tables_depth - 1 {
            self.backend.restore(frame, faulting_page);
        } else {
            self.wipe_frame(frame);
            *forbidden = Some(frame);
        }
        frame
    }

    fn wipe_frame(&mut self, frame: usize) {
        let base = frame * Self::PAGE_SIZE;
        for slot in 0..Self::PAGE_SIZE {
            self.backend.write(base + slot, 0);
        }
    }
}
