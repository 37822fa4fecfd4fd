//! Types used across multiple statefile modules.

use serde::{Deserialize, Serialize};

/// The byte order applied when assembling multi-byte values from captured
/// memory.
///
/// State files themselves are always little-endian on disk; endianness only
/// matters when interpreting the bytes of the captured address space.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Endian {
    Big,
    Little,
}
