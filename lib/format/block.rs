//! Memory block descriptors and the per-version block record codecs.

use crate::format::taint::TaintRegion;
use crate::format::{StateFlags, Version};
use crate::Error;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};

/// One contiguous run of captured memory.
///
/// A block describes an inclusive address range `[first, last]` and where
/// that range's raw bytes live in the backing storage. The payload is never
/// held in memory; readers seek to `payload_offset` on demand.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MemoryBlock {
    first: u64,
    last: u64,
    payload_offset: u64,
    taint: Option<Vec<TaintRegion>>,
}

impl MemoryBlock {
    /// Create a new `MemoryBlock` without taint metadata.
    pub fn new(first: u64, last: u64, payload_offset: u64) -> MemoryBlock {
        MemoryBlock {
            first,
            last,
            payload_offset,
            taint: None,
        }
    }

    /// Create a new `MemoryBlock` carrying taint metadata.
    pub fn new_with_taint(
        first: u64,
        last: u64,
        payload_offset: u64,
        taint: Vec<TaintRegion>,
    ) -> MemoryBlock {
        MemoryBlock {
            first,
            last,
            payload_offset,
            taint: Some(taint),
        }
    }

    /// Get the address of the first byte of this block.
    pub fn first(&self) -> u64 {
        self.first
    }

    /// Get the address of the last byte of this block, inclusive.
    pub fn last(&self) -> u64 {
        self.last
    }

    /// Get the offset into the backing storage where this block's payload
    /// begins.
    pub fn payload_offset(&self) -> u64 {
        self.payload_offset
    }

    /// Get the taint metadata for this block, if any.
    pub fn taint(&self) -> Option<&[TaintRegion]> {
        self.taint.as_deref()
    }

    /// Get the size of this block in bytes.
    pub fn len(&self) -> u64 {
        self.last.wrapping_sub(self.first).wrapping_add(1)
    }

    /// `true` if this block covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of tainted bytes in this block, summed over its taint
    /// regions.
    pub fn tainted_bytes(&self) -> u32 {
        self.taint
            .as_ref()
            .map(|regions| regions.iter().map(TaintRegion::tainted_bytes).sum())
            .unwrap_or(0)
    }
}

impl fmt::Display for MemoryBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "0x{:08x}-0x{:08x} ({} bytes) at offset 0x{:x}",
            self.first,
            self.last,
            self.len(),
            self.payload_offset
        )
    }
}

/// The block record codec for one state file version, selected once at
/// header-decode time.
///
/// All four layouts store a block as two 32-bit address fields followed
/// immediately by the payload bytes; they differ in how the address fields
/// are interpreted and whether a taint footer may follow the payload.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BlockCodec {
    V10,
    V20,
    V30,
    V40,
}

impl BlockCodec {
    /// Get the codec matching a state file version.
    pub fn for_version(version: Version) -> BlockCodec {
        match version {
            Version::V10 => BlockCodec::V10,
            Version::V20 => BlockCodec::V20,
            Version::V30 => BlockCodec::V30,
            Version::V40 => BlockCodec::V40,
        }
    }

    /// Decode the next block record.
    ///
    /// Returns `Ok(None)` on a clean end of input, which terminates block
    /// enumeration normally. The payload is not read: its position is
    /// recorded and the cursor is advanced past it so the next record can
    /// be decoded.
    ///
    /// Version 10 stores signed addresses with an end-exclusive `last`;
    /// later versions store unsigned addresses with an inclusive `last`.
    /// Versions 30 and 40 may carry a taint footer after the payload, which
    /// cannot be decoded; such input fails with `UnimplementedTaint` rather
    /// than desynchronizing the record stream.
    pub fn decode<R: Read + Seek>(
        &self,
        flags: StateFlags,
        input: &mut R,
    ) -> Result<Option<MemoryBlock>, Error> {
        let (first, last) = match *self {
            BlockCodec::V10 => {
                let first = match input.read_i32::<LittleEndian>() {
                    Ok(first) => i64::from(first) as u64,
                    Err(ref e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
                    Err(e) => return Err(e.into()),
                };
                let last = (i64::from(input.read_i32::<LittleEndian>()?) - 1) as u64;
                (first, last)
            }
            BlockCodec::V20 | BlockCodec::V30 | BlockCodec::V40 => {
                let first = match input.read_u32::<LittleEndian>() {
                    Ok(first) => u64::from(first),
                    Err(ref e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
                    Err(e) => return Err(e.into()),
                };
                let last = u64::from(input.read_u32::<LittleEndian>()?);
                (first, last)
            }
        };

        if flags.contains(StateFlags::TAINT) {
            match *self {
                BlockCodec::V30 => return Err(Error::UnimplementedTaint(30)),
                BlockCodec::V40 => return Err(Error::UnimplementedTaint(40)),
                BlockCodec::V10 | BlockCodec::V20 => {}
            }
        }

        let block = MemoryBlock::new(first, last, input.stream_position()?);
        input.seek(SeekFrom::Current(block.len() as i64))?;

        Ok(Some(block))
    }

    /// Encode a block record with the given payload bytes.
    ///
    /// The payload must be exactly `block.len()` bytes. Taint metadata is
    /// never persisted, even when the block carries some; this matches the
    /// capture tool, which has no taint writer.
    pub fn encode<W: Write>(
        &self,
        block: &MemoryBlock,
        payload: &[u8],
        output: &mut W,
    ) -> Result<(), Error> {
        if payload.len() as u64 != block.len() {
            return Err(format!(
                "payload is {} bytes but block 0x{:x}-0x{:x} covers {}",
                payload.len(),
                block.first(),
                block.last(),
                block.len()
            )
            .into());
        }

        match *self {
            BlockCodec::V10 => {
                output.write_i32::<LittleEndian>(block.first() as i32)?;
                output.write_i32::<LittleEndian>(block.last().wrapping_add(1) as i32)?;
            }
            BlockCodec::V20 | BlockCodec::V30 | BlockCodec::V40 => {
                output.write_i32::<LittleEndian>(block.first() as i32)?;
                output.write_i32::<LittleEndian>(block.last() as i32)?;
            }
        }
        output.write_all(payload)?;

        Ok(())
    }
}
