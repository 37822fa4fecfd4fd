//! The state file header: format version, word size and feature flags.

use crate::format::MAGIC;
use crate::Error;
use bitflags::bitflags;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};

/// A state file format version.
///
/// The version dictates the header body layout and which [`BlockCodec`]
/// variant decodes the block records.
///
/// [`BlockCodec`]: crate::format::BlockCodec
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Version {
    V10,
    V20,
    V30,
    V40,
}

impl Version {
    /// Translate an on-disk version number into a `Version`.
    pub fn from_u32(version: u32) -> Result<Version, Error> {
        match version {
            10 => Ok(Version::V10),
            20 => Ok(Version::V20),
            30 => Ok(Version::V30),
            40 => Ok(Version::V40),
            _ => Err(Error::UnknownVersion(version)),
        }
    }

    /// Get the on-disk version number for this `Version`.
    pub fn to_u32(self) -> u32 {
        match self {
            Version::V10 => 10,
            Version::V20 => 20,
            Version::V30 => 30,
            Version::V40 => 40,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_u32())
    }
}

bitflags! {
    /// Feature flags carried by a state file header.
    ///
    /// The flag values are the bit positions of the on-disk flag word.
    #[derive(Deserialize, Serialize)]
    pub struct StateFlags: u16 {
        /// A register snapshot follows the header.
        const REGISTERS         = 0b00001;
        /// Kernel memory was captured in addition to user memory.
        const KERNEL_MEM        = 0b00010;
        /// Block records carry taint metadata.
        const TAINT             = 0b00100;
        /// Block addresses are virtual addresses.
        const VIRTUAL_ADDRESSES = 0b01000;
        /// The capture covers a single process rather than the whole system.
        const PROCESS_SNAPSHOT  = 0b10000;
    }
}

impl StateFlags {
    /// The flag set implied by headerless and version 20 files.
    fn legacy() -> StateFlags {
        StateFlags::REGISTERS | StateFlags::VIRTUAL_ADDRESSES | StateFlags::PROCESS_SNAPSHOT
    }
}

/// The decoded state file header.
///
/// Created exactly once per opened file and immutable afterward.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Header {
    version: Version,
    word_size: u16,
    flags: StateFlags,
}

impl Header {
    /// Create a header by hand, for authoring state files.
    pub fn new(version: Version, word_size: u16, flags: StateFlags) -> Header {
        Header {
            version,
            word_size,
            flags,
        }
    }

    /// Decode a header from the start of a state file.
    ///
    /// The first four bytes are peeked for [`MAGIC`]. When it is absent, or
    /// the file is shorter than four bytes, the file is a headerless version
    /// 10 capture and the cursor is reset to byte 0 so block decoding starts
    /// at the top of the file.
    pub fn decode<R: Read + Seek>(input: &mut R) -> Result<Header, Error> {
        let version = match input.read_u32::<LittleEndian>() {
            Ok(MAGIC) => Version::from_u32(input.read_u32::<LittleEndian>()?)?,
            Ok(_) => {
                input.seek(SeekFrom::Start(0))?;
                Version::V10
            }
            Err(ref e) if e.kind() == ErrorKind::UnexpectedEof => {
                input.seek(SeekFrom::Start(0))?;
                Version::V10
            }
            Err(e) => return Err(e.into()),
        };

        // Versions 10 and 20 predate the word size field and imply 32.
        let word_size = match version {
            Version::V10 | Version::V20 => 32,
            Version::V30 | Version::V40 => input.read_u16::<LittleEndian>()?,
        };

        let flags = match version {
            Version::V10 | Version::V20 => StateFlags::legacy(),
            // Version 30 defined only the low three bits; the capture tool
            // always produced process snapshots with virtual addresses, so
            // those two flags are forced on whatever the stored bits say.
            Version::V30 => {
                let bits = StateFlags::from_bits_truncate(input.read_u16::<LittleEndian>()?);
                (bits & (StateFlags::REGISTERS | StateFlags::KERNEL_MEM | StateFlags::TAINT))
                    | StateFlags::VIRTUAL_ADDRESSES
                    | StateFlags::PROCESS_SNAPSHOT
            }
            Version::V40 => StateFlags::from_bits_truncate(input.read_u16::<LittleEndian>()?),
        };

        Ok(Header {
            version,
            word_size,
            flags,
        })
    }

    /// Encode this header in its version's on-disk layout.
    ///
    /// Version 10 writes nothing. Version 20 writes only the magic and
    /// version; its word size and flags are implied, matching the decode
    /// path. Versions 30 and 40 write the full header.
    pub fn encode<W: Write>(&self, output: &mut W) -> Result<(), Error> {
        match self.version {
            Version::V10 => {}
            Version::V20 => {
                output.write_u32::<LittleEndian>(MAGIC)?;
                output.write_u32::<LittleEndian>(self.version.to_u32())?;
            }
            Version::V30 | Version::V40 => {
                output.write_u32::<LittleEndian>(MAGIC)?;
                output.write_u32::<LittleEndian>(self.version.to_u32())?;
                output.write_u16::<LittleEndian>(self.word_size)?;
                output.write_u16::<LittleEndian>(self.flags.bits())?;
            }
        }
        Ok(())
    }

    /// Get the format version of this header.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Get the word size of the captured machine in bits.
    pub fn word_size(&self) -> u16 {
        self.word_size
    }

    /// Get the feature flags of this header.
    pub fn flags(&self) -> StateFlags {
        self.flags
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "version {} word_size {} flags {:?}",
            self.version, self.word_size, self.flags
        )
    }
}
