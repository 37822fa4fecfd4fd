//! An ordered index over the decoded memory blocks.

use crate::format::MemoryBlock;
use crate::memory::page_start;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The sparse address space of a capture: every decoded block, keyed by its
/// first address.
///
/// Built once from the decoded block list and read-only afterward. When two
/// blocks share a start address the later one wins, as with any map built
/// from a sequential list.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AddressSpace {
    blocks: BTreeMap<u64, MemoryBlock>,
}

impl AddressSpace {
    /// Build an `AddressSpace` from a decoded block list.
    pub fn new(blocks: Vec<MemoryBlock>) -> AddressSpace {
        let mut map = BTreeMap::new();
        for block in blocks {
            map.insert(block.first(), block);
        }
        AddressSpace { blocks: map }
    }

    /// Get the blocks of this address space, in ascending address order.
    pub fn blocks(&self) -> &BTreeMap<u64, MemoryBlock> {
        &self.blocks
    }

    /// The number of blocks in this address space.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// `true` if this address space holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// `true` if a block starts at the page-aligned start of `address`.
    ///
    /// Presence is keyed on page-aligned block starts, not on arbitrary
    /// coverage: an address inside a block that starts mid-page is reported
    /// absent. Callers depend on this exact rule; do not generalize it to a
    /// coverage test.
    pub fn contains(&self, address: u64) -> bool {
        self.blocks.contains_key(&page_start(address))
    }

    /// Get the block starting exactly at `address`, if any.
    pub fn block_at(&self, address: u64) -> Option<&MemoryBlock> {
        self.blocks.get(&address)
    }

    /// Iterate the blocks whose address range intersects `[first, last]`,
    /// in ascending order.
    ///
    /// This walks every block starting at or below `last` and filters; the
    /// map cannot lower-bound the walk without knowing a maximum block
    /// size, so the cost is linear in the blocks below the interval, not
    /// in the overlaps alone.
    pub fn overlapping(&self, first: u64, last: u64) -> impl Iterator<Item = &MemoryBlock> + '_ {
        self.blocks
            .range(..=last)
            .map(|(_, block)| block)
            .filter(move |block| block.last() >= first)
    }
}
