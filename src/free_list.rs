use crate::{arena::Arena, blocks::FreeBlock};

/// An explicit, doubly linked list of all the free blocks in the heap.
///
/// The list is unordered: freed blocks are always pushed to the front, so
/// iterating it visits the most recently freed blocks first.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeList {
    head: Option<FreeBlock>,
}

impl FreeList {
    /// Creates a new empty free list.
    pub const fn new() -> Self {
        Self { head: None }
    }

    /// The first block in the list, if any.
    pub fn head(&self) -> Option<FreeBlock> {
        self.head
    }

    /// Inserts the given block at the front of the list.
    pub fn insert_front<A: Arena>(&mut self, arena: &mut A, block: FreeBlock) {
        block.set_prev_free(arena, None);
        block.set_next_free(arena, self.head);

        if let Some(old_head) = self.head {
            old_head.set_prev_free(arena, Some(block));
        }

        self.head = Some(block);
    }

    /// Unlinks the given block from the list.
    ///
    /// The block must currently be linked into this list.
    pub fn remove<A: Arena>(&mut self, arena: &mut A, block: FreeBlock) {
        // change the state:
        // ```
        // prev <-> block <-> next
        // ```
        // to the state:
        // ```
        // prev <-> next
        // ```
        let prev = block.prev_free(arena);
        let next = block.next_free(arena);

        match (prev, next) {
            (Some(prev), Some(next)) => {
                next.set_prev_free(arena, Some(prev));
                prev.set_next_free(arena, Some(next));
            }
            (None, Some(next)) => {
                // the block is the head
                next.set_prev_free(arena, None);
                self.head = Some(next);
            }
            (Some(prev), None) => {
                // the block is the tail
                prev.set_next_free(arena, None);
            }
            (None, None) => {
                // the block is the only block in the list
                self.head = None;
            }
        }
    }

    /// Returns the first block in list order whose size is at least `size`.
    pub fn find_fit<A: Arena>(&self, arena: &A, size: usize) -> Option<FreeBlock> {
        self.iter(arena).find(|block| block.size(arena) >= size)
    }

    /// Returns an iterator over the blocks of the list, in list order.
    pub fn iter<'a, A: Arena>(&self, arena: &'a A) -> Iter<'a, A> {
        Iter {
            arena,
            cur: self.head,
        }
    }
}

/// An iterator over the blocks of a [`FreeList`].
pub struct Iter<'a, A: Arena> {
    arena: &'a A,
    cur: Option<FreeBlock>,
}

impl<'a, A: Arena> Iterator for Iter<'a, A> {
    type Item = FreeBlock;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.cur?;
        self.cur = cur.next_free(self.arena);
        Some(cur)
    }
}
