//! Wire codecs for the state file binary format.
//!
//! A state file is laid out as: an optional header prologue (magic and
//! version), a version-dependent header body, an optional register snapshot,
//! and zero or more memory block records running to the end of the file.
//! All integers are little-endian.
//!
//! Four layouts exist in the wild. Version 10 files have no header at all
//! and are recognized by the absence of the magic constant. Versions 20, 30
//! and 40 open with [`MAGIC`] followed by the version; 30 and 40 add a word
//! size and a feature flag word. The codecs here reproduce each layout
//! exactly, including its quirks, for compatibility with files produced by
//! every revision of the capture tool.
//!
//! Block decoding is lazy: a block record's payload bytes are never read,
//! only their location in the file is recorded. See [`block::BlockCodec`].

pub mod block;
pub mod header;
pub mod registers;
pub mod taint;

pub use self::block::{BlockCodec, MemoryBlock};
pub use self::header::{Header, StateFlags, Version};
pub use self::registers::Registers;
pub use self::taint::TaintRegion;

/// The magic constant opening every state file of version 20 and above.
pub const MAGIC: u32 = 0xFFFE_FFFE;
