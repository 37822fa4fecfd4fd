//! Memory-initialization facts for an external analysis engine.
//!
//! Downstream symbolic/IR engines want captured memory as a sequence of
//! facts of the form `target[address] = byte`, where `target` names the
//! engine's memory variable. [`range_inits`] is the only surface those
//! engines consume; everything else in this crate exists to feed it.

use crate::state::State;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Seek};

/// A single memory-initialization fact.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MemoryInit {
    target: String,
    address: u64,
    value: u8,
}

impl MemoryInit {
    /// Create a new `MemoryInit` fact.
    pub fn new<S: Into<String>>(target: S, address: u64, value: u8) -> MemoryInit {
        MemoryInit {
            target: target.into(),
            address,
            value,
        }
    }

    /// The name of the memory variable being initialized.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The address being initialized.
    pub fn address(&self) -> u64 {
        self.address
    }

    /// The byte value at that address.
    pub fn value(&self) -> u8 {
        self.value
    }
}

impl fmt::Display for MemoryInit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}[0x{:x}] = 0x{:02x}",
            self.target, self.address, self.value
        )
    }
}

/// Produce one initialization fact per captured byte in the given ranges.
///
/// Ranges are processed in input order; within each range facts are in
/// ascending address order. Addresses no block covers produce no fact.
pub fn range_inits<R: Read + Seek>(
    state: &mut State<R>,
    ranges: &[(u64, u64)],
    target: &str,
) -> Result<Vec<MemoryInit>, Error> {
    let mut inits = Vec::new();

    for &(first, last) in ranges {
        for (address, value) in state.read_range(first, last)? {
            inits.push(MemoryInit::new(target, address, value));
        }
    }

    Ok(inits)
}
