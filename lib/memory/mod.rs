//! The sparse model of a captured address space.
//!
//! A state file rarely covers a whole address space; it holds whichever
//! pages the capture tool walked. [`AddressSpace`] indexes the decoded block
//! descriptors by start address so queries can find the blocks overlapping
//! an address interval without touching the payload bytes on disk.

mod index;

pub use self::index::AddressSpace;

/// The size of a captured page in bytes.
pub const PAGE_SIZE: usize = 4096;

/// Masks an address down to the start of its page.
pub const PAGE_MASK: u64 = !(PAGE_SIZE as u64 - 1);

/// Round an address down to the start of its page.
pub fn page_start(address: u64) -> u64 {
    address & PAGE_MASK
}
