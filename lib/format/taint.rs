//! Taint metadata attached to memory blocks by taint-tracking captures.
//!
//! Taint is recorded per 4096-byte page as up to [`REGIONS_PER_PAGE`]
//! regions, each covering [`BYTES_PER_REGION`] bytes with a one-bit-per-byte
//! mask. Decoding taint from a state file is unimplemented; any attempt
//! fails with [`Error::UnimplementedTaint`](crate::Error::UnimplementedTaint)
//! rather than producing corrupt results. These types exist so in-memory
//! taint can still be represented and counted.

use serde::{Deserialize, Serialize};

/// The number of taint regions covering one page.
pub const REGIONS_PER_PAGE: usize = 64;

/// The number of bytes covered by one taint region's mask.
pub const BYTES_PER_REGION: usize = 64;

/// One 64-byte sub-block of taint metadata.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TaintRegion {
    start_addr: u64,
    mask: u64,
    position: u64,
}

impl TaintRegion {
    /// Create a new `TaintRegion`.
    pub fn new(start_addr: u64, mask: u64, position: u64) -> TaintRegion {
        TaintRegion {
            start_addr,
            mask,
            position,
        }
    }

    /// Get the address of the first byte this region covers.
    pub fn start_addr(&self) -> u64 {
        self.start_addr
    }

    /// Get the one-bit-per-byte taint mask for this region.
    pub fn mask(&self) -> u64 {
        self.mask
    }

    /// Get the position of this region's taint records in the capture's
    /// taint store.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// The number of tainted bytes in this region.
    pub fn tainted_bytes(&self) -> u32 {
        self.mask.count_ones()
    }
}
