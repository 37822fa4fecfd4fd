//! Typed reads over captured memory: scalars, arrays, and strings.

use crate::memory::page_start;
use crate::state::State;
use crate::types::Endian;
use crate::Error;
use std::io::{Read, Seek, SeekFrom};

impl<R: Read + Seek> State<R> {
    // Fetches exactly `width` bytes at `address`, in the order the requested
    // endianness wants them assembled. Every fixed-width read funnels
    // through here, so a shortfall anywhere becomes IncompleteValue.
    fn value_bytes(
        &mut self,
        address: u64,
        width: usize,
        endian: Endian,
    ) -> Result<Vec<u8>, Error> {
        // A value whose tail would run past the top of the address space can
        // never be fully covered, so it is incomplete, not a wrapped read.
        let last = match address.checked_add(width as u64 - 1) {
            Some(last) => last,
            None => return Err(Error::IncompleteValue { address, width }),
        };
        let pairs = self.read_range(address, last)?;
        if pairs.len() != width {
            return Err(Error::IncompleteValue { address, width });
        }

        let mut bytes: Vec<u8> = pairs.into_iter().map(|(_, byte)| byte).collect();
        if let Endian::Big = endian {
            bytes.reverse();
        }
        Ok(bytes)
    }

    /// Read the byte at `address`.
    pub fn get_byte(&mut self, address: u64) -> Result<u8, Error> {
        Ok(self.value_bytes(address, 1, Endian::Little)?[0])
    }

    /// Read the byte at `address` as a character.
    pub fn get_char(&mut self, address: u64) -> Result<char, Error> {
        Ok(self.get_byte(address)? as char)
    }

    /// Read the 16-bit value at `address`.
    pub fn get_short(&mut self, address: u64, endian: Endian) -> Result<u16, Error> {
        let bytes = self.value_bytes(address, 2, endian)?;
        Ok(bytes
            .iter()
            .enumerate()
            .fold(0, |value, (i, &byte)| value | u16::from(byte) << (8 * i)))
    }

    /// Read the 32-bit value at `address`.
    pub fn get_word(&mut self, address: u64, endian: Endian) -> Result<u32, Error> {
        let bytes = self.value_bytes(address, 4, endian)?;
        Ok(bytes
            .iter()
            .enumerate()
            .fold(0, |value, (i, &byte)| value | u32::from(byte) << (8 * i)))
    }

    /// Read the 64-bit value at `address`.
    pub fn get_long(&mut self, address: u64, endian: Endian) -> Result<u64, Error> {
        let bytes = self.value_bytes(address, 8, endian)?;
        Ok(bytes
            .iter()
            .enumerate()
            .fold(0, |value, (i, &byte)| value | u64::from(byte) << (8 * i)))
    }

    /// Read the 32-bit value at `address` as an IEEE-754 float.
    pub fn get_float(&mut self, address: u64, endian: Endian) -> Result<f32, Error> {
        Ok(f32::from_bits(self.get_word(address, endian)?))
    }

    /// Read the 64-bit value at `address` as an IEEE-754 double.
    pub fn get_double(&mut self, address: u64, endian: Endian) -> Result<f64, Error> {
        Ok(f64::from_bits(self.get_long(address, endian)?))
    }

    /// Read exactly `length` bytes starting at `address`.
    ///
    /// Partial coverage is rejected with `IncompleteValue`, never truncated.
    pub fn get_array(&mut self, address: u64, length: usize) -> Result<Vec<u8>, Error> {
        if length == 0 {
            return Ok(Vec::new());
        }
        self.value_bytes(address, length, Endian::Little)
    }

    /// Read a fixed-length string of exactly `length` bytes at `address`.
    pub fn get_string(&mut self, address: u64, length: usize) -> Result<String, Error> {
        let bytes = self.get_array(address, length)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    // The string scanners share a gating rule: scanning may begin only when
    // a block starts exactly at the page-aligned start of `address`. From
    // there every subsequent block in ascending order is scanned regardless
    // of its alignment, with gaps between blocks ignored. Returns the
    // (offset, length) spans to read, in order.
    fn string_spans(&self, address: u64) -> Vec<(u64, usize)> {
        let key = page_start(address);
        if self.memory.block_at(key).is_none() {
            return Vec::new();
        }

        self.memory
            .blocks()
            .range(key..)
            .filter_map(|(&start, block)| {
                let begin = if start == key { address } else { block.first() };
                if begin > block.last() {
                    return None;
                }
                let offset = block.payload_offset() + (begin - block.first());
                Some((offset, (block.last() - begin + 1) as usize))
            })
            .collect()
    }

    /// Scan forward from `address` for a zero-terminated ASCII string.
    ///
    /// Accumulates bytes up to, and excluding, the first zero byte found in
    /// any qualifying block. An unterminated string yields whatever was
    /// accumulated; an address whose page has no block at its start yields
    /// the empty string.
    pub fn get_ascii_string(&mut self, address: u64) -> Result<String, Error> {
        let mut bytes = Vec::new();

        'scan: for (offset, length) in self.string_spans(address) {
            let mut buf = vec![0u8; length];
            self.input.seek(SeekFrom::Start(offset))?;
            self.input.read_exact(&mut buf)?;

            for byte in buf {
                if byte == 0 {
                    break 'scan;
                }
                bytes.push(byte);
            }
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Scan forward from `address` for a wide string terminated by an
    /// aligned zero code unit.
    ///
    /// Code units are 16-bit little-endian, aligned to the string start.
    /// The low byte of a unit cut in half by a block boundary carries over
    /// to the next block, so a terminator is found whether it sits inside
    /// one block, straddles the boundary with one zero on each side, or was
    /// completed by the block's own trailing zeros.
    pub fn get_wide_string(&mut self, address: u64) -> Result<String, Error> {
        let mut units = Vec::new();
        let mut pending: Option<u8> = None;

        'scan: for (offset, length) in self.string_spans(address) {
            let mut buf = vec![0u8; length];
            self.input.seek(SeekFrom::Start(offset))?;
            self.input.read_exact(&mut buf)?;

            for byte in buf {
                match pending.take() {
                    Some(low) => {
                        if low == 0 && byte == 0 {
                            break 'scan;
                        }
                        units.push(u16::from(low) | u16::from(byte) << 8);
                    }
                    None => pending = Some(byte),
                }
            }
        }

        // A dangling half unit from an unterminated string is dropped.
        Ok(String::from_utf16_lossy(&units))
    }
}
