//! Statefile is a loader and sparse memory model for memory snapshots
//! ("state files") captured by an external instrumentation tool.
//!
//! A state file records a point-in-time image of a process or system address
//! space: an optional versioned header, an optional general-purpose register
//! snapshot, and a sequence of memory blocks, each carrying the raw bytes of
//! one contiguous captured region. Statefile decodes the descriptors up
//! front and leaves every payload on disk, so opening a large snapshot is
//! cheap and queries are satisfied with seek-and-read I/O.
//!
//! ```no_run
//! use statefile::state::State;
//! use statefile::types::Endian;
//!
//! fn example() -> Result<(), statefile::Error> {
//!     let mut state = State::open("process.state")?;
//!
//!     println!("eip = 0x{:08x}", state.registers()?.eip);
//!
//!     let return_address = state.get_word(0xbfff_f000, Endian::Little)?;
//!
//!     for (address, byte) in state.read_range(0x0804_8000, 0x0804_80ff)? {
//!         println!("0x{:08x}: {:02x}", address, byte);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Four historical on-disk layouts (versions 10 through 40) are supported;
//! the codecs in [`format`] reproduce each of them bit-for-bit.

pub mod format;
pub mod inits;
pub mod memory;
pub mod state;
#[cfg(test)]
mod tests;
pub mod types;

use thiserror::Error;

/// Error for all statefile operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A custom error
    #[error("custom error: {0}")]
    Custom(String),

    /// A fill region in a stream write exceeded the maximum permitted length
    #[error("gap of {0} bytes exceeds the maximum fill length")]
    GapTooLarge(u64),

    /// A fixed-width read could not be fully satisfied from captured memory
    #[error("incomplete {width}-byte value at address 0x{address:x}")]
    IncompleteValue { address: u64, width: usize },

    /// An error from std::io
    #[error("i/o error")]
    Io(#[from] std::io::Error),

    /// The state file does not include a register snapshot
    #[error("state file does not include registers")]
    RegistersUnavailable,

    /// The state file carries taint metadata, which cannot be decoded
    #[error("taint decoding is unimplemented for version {0} state files")]
    UnimplementedTaint(u32),

    /// The state file header reported an unsupported version
    #[error("unknown state file version {0}")]
    UnknownVersion(u32),
}

impl From<&str> for Error {
    fn from(error: &str) -> Error {
        Error::Custom(error.to_string())
    }
}

impl From<String> for Error {
    fn from(error: String) -> Error {
        Error::Custom(error)
    }
}
