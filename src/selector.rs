use memory::Word;

use crate::address::Layout;
use crate::backend::Backend;

/// Resident page picked for eviction, with the table slot mapping it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Victim {
    pub page: u64,
    pub parent_frame: usize,
    pub frame: usize,
}

/// One depth-first pass over the table tree gathering everything a
/// single allocation decision needs: the highest frame index in use,
/// the first reclaimable empty table, and the resident page farthest
/// from the faulting one.
pub(crate) struct FrameSearch {
    layout: Layout,
    faulting_page: u64,
    target_slot: usize,
    target_parent: usize,
    forbidden: Option<usize>,
    max_seen: usize,
    best_distance: u64,
    victim: Option<Victim>,
    empty_table: Option<usize>,
}

impl FrameSearch {
    pub(crate) fn new(
        layout: Layout,
        faulting_page: u64,
        target_slot: usize,
        forbidden: Option<usize>,
    ) -> Self {
        FrameSearch {
            layout,
            faulting_page,
            target_slot,
            target_parent: target_slot / layout.page_size,
            forbidden,
            max_seen: 0,
            best_distance: 0,
            victim: None,
            empty_table: None,
        }
    }

    pub(crate) fn run(&mut self, backend: &mut Backend) {
        self.visit(backend, 0, 0, 0, None);
    }

    /// Highest frame index any table entry references.
    pub(crate) fn max_seen(&self) -> usize {
        self.max_seen
    }

    /// Empty table adopted during the walk, already detached from its
    /// old parent and linked into the destination slot.
    pub(crate) fn empty_table(&self) -> Option<usize> {
        self.empty_table
    }

    pub(crate) fn victim(&self) -> Option<Victim> {
        self.victim
    }

    fn visit(
        &mut self,
        backend: &mut Backend,
        frame: usize,
        level: usize,
        path: u64,
        parent_slot: Option<usize>,
    ) {
        if level == self.layout.tables_depth {
            return;
        }
        let base = frame * self.layout.page_size;
        let mut occupied = false;
        for slot in 0..self.layout.page_size {
            let entry = backend.read(base + slot);
            if entry == 0 {
                continue;
            }
            occupied = true;
            let child = entry as usize;
            if child < self.layout.num_frames && child > self.max_seen {
                self.max_seen = child;
            }
            let child_path = self.layout.concat_path(path, slot as u64);
            if level == self.layout.tables_depth - 1 {
                // Children of the last table level are data pages; they
                // are judged for eviction, never entered. Ties keep the
                // earliest candidate in slot order.
                let distance = self.layout.cyclic_distance(self.faulting_page, child_path);
                if self.victim.is_none() || distance > self.best_distance {
                    self.best_distance = distance;
                    self.victim = Some(Victim {
                        page: child_path,
                        parent_frame: frame,
                        frame: child,
                    });
                }
                continue;
            }
            self.visit(backend, child, level + 1, child_path, Some(base + slot));
            if self.empty_table.is_some() {
                return;
            }
        }
        if !occupied {
            self.try_adopt(backend, frame, parent_slot);
        }
    }

    /// A table with no children can be unlinked and reused on the spot.
    /// Never adopted: the root, the frame the caller just claimed, and
    /// the frame owning the destination slot (adopting that one would
    /// point the slot into its own frame).
    fn try_adopt(&mut self, backend: &mut Backend, frame: usize, parent_slot: Option<usize>) {
        let parent = match parent_slot {
            Some(parent) => parent,
            None => return,
        };
        if self.forbidden == Some(frame) || frame == self.target_parent {
            return;
        }
        backend.write(parent, 0);
        backend.write(self.target_slot, frame as Word);
        self.empty_table = Some(frame);
    }
}
