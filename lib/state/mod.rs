//! The session interface over one open state file.
//!
//! A [`State`] owns the backing storage handle exclusively. Every query
//! seeks the shared read cursor and reads on demand; nothing is cached, so
//! repeated reads of the same address re-read from storage. This is the
//! right trade for typically-one-shot forensic queries and keeps the read
//! path allocation-light. Interleaved use from multiple threads is
//! prevented by the `&mut self` receivers; wrap the `State` in a lock if it
//! must be shared.
//!
//! Dropping a `State` (or letting [`State::into_inner`] consume it)
//! releases the storage handle.

mod range;
mod value;

pub use self::range::{DEFAULT_FILL_BYTE, MAX_FILL_LENGTH};

use crate::format::{BlockCodec, Header, Registers, StateFlags, Version};
use crate::memory::AddressSpace;
use crate::Error;
use log::{debug, trace};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

/// An open state file: header, optional registers, the block index, and the
/// storage handle the block payloads are read from.
#[derive(Debug)]
pub struct State<R: Read + Seek> {
    input: R,
    header: Header,
    registers: Option<Registers>,
    memory: AddressSpace,
}

impl State<File> {
    /// Open a state file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<State<File>, Error> {
        State::from_reader(File::open(path)?)
    }
}

impl<R: Read + Seek> State<R> {
    /// Decode a state file from any seekable input.
    ///
    /// Decodes the header, the register snapshot when the header announces
    /// one, and every block descriptor up to end of input. Block payloads
    /// stay on storage; only their locations are indexed.
    pub fn from_reader(mut input: R) -> Result<State<R>, Error> {
        let header = Header::decode(&mut input)?;

        let registers = if header.flags().contains(StateFlags::REGISTERS) {
            Some(Registers::decode(&mut input)?)
        } else {
            None
        };

        let codec = BlockCodec::for_version(header.version());
        let mut blocks = Vec::new();
        while let Some(block) = codec.decode(header.flags(), &mut input)? {
            trace!("decoded block {}", block);
            blocks.push(block);
        }

        debug!("opened state file: {}, {} blocks", header, blocks.len());

        Ok(State {
            input,
            header,
            registers,
            memory: AddressSpace::new(blocks),
        })
    }

    /// Get the header of this state file.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Get the format version of this state file.
    pub fn version(&self) -> Version {
        self.header.version()
    }

    /// Get the feature flags of this state file.
    pub fn flags(&self) -> StateFlags {
        self.header.flags()
    }

    /// Get the word size of the captured machine in bits.
    pub fn word_size(&self) -> u16 {
        self.header.word_size()
    }

    /// Get the register snapshot.
    ///
    /// Fails with `RegistersUnavailable` when the header says no snapshot
    /// was captured; there is no default register state.
    pub fn registers(&self) -> Result<&Registers, Error> {
        self.registers.as_ref().ok_or(Error::RegistersUnavailable)
    }

    /// Get the sparse address space of this state file.
    pub fn memory(&self) -> &AddressSpace {
        &self.memory
    }

    /// `true` if a block starts at the page-aligned start of `address`.
    /// See [`AddressSpace::contains`] for the exact rule.
    pub fn exists(&self, address: u64) -> bool {
        self.memory.contains(address)
    }

    /// Consume this `State` and take back the storage handle.
    pub fn into_inner(self) -> R {
        self.input
    }
}
