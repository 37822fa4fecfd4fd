//! Range queries: clipped multi-block reads and filled stream writes.

use crate::state::State;
use crate::Error;
use log::trace;
use std::cmp;
use std::io::{Read, Seek, SeekFrom, Write};

/// The byte substituted for uncaptured addresses by [`State::write_range`].
/// x86 NOP, so padded code ranges stay harmlessly executable.
pub const DEFAULT_FILL_BYTE: u8 = 0x90;

/// The longest single fill region [`State::write_range`] will emit. A gap
/// wider than this fails with `GapTooLarge` instead of allocating without
/// bound.
pub const MAX_FILL_LENGTH: u64 = 0x1000_0000;

impl<R: Read + Seek> State<R> {
    /// Read every captured byte in `[first, last]`, inclusive.
    ///
    /// Returns `(address, byte)` pairs in ascending address order,
    /// restricted to the intersection of the range with the captured
    /// blocks. Addresses no block covers are simply absent; gaps are never
    /// zero-filled here. Each overlapping block costs one seek and one
    /// bounded read.
    pub fn read_range(&mut self, first: u64, last: u64) -> Result<Vec<(u64, u8)>, Error> {
        let mut result = Vec::new();

        for block in self.memory.overlapping(first, last) {
            let clip_first = cmp::max(first, block.first());
            let clip_last = cmp::min(last, block.last());

            let offset = block.payload_offset() + (clip_first - block.first());
            let mut buf = vec![0u8; (clip_last - clip_first + 1) as usize];
            self.input.seek(SeekFrom::Start(offset))?;
            self.input.read_exact(&mut buf)?;

            result.extend(
                buf.into_iter()
                    .enumerate()
                    .map(|(i, byte)| (clip_first + i as u64, byte)),
            );
        }

        trace!(
            "read_range 0x{:x}-0x{:x}: {} bytes present",
            first,
            last,
            result.len()
        );

        Ok(result)
    }

    /// Write the bytes of `[first, last]` as one contiguous stream,
    /// substituting [`DEFAULT_FILL_BYTE`] for uncaptured addresses.
    pub fn write_range<W: Write>(
        &mut self,
        output: &mut W,
        first: u64,
        last: u64,
    ) -> Result<(), Error> {
        self.write_range_fill(output, first, last, DEFAULT_FILL_BYTE)
    }

    /// Write the bytes of `[first, last]` as one contiguous stream,
    /// substituting `fill` for uncaptured addresses.
    ///
    /// Emits exactly `last - first + 1` bytes: for each overlapping block in
    /// ascending order, a fill region covering the gap since the previous
    /// emission point, then the block's clipped payload verbatim; then a
    /// trailing fill region up to `last`. Any single fill region longer
    /// than [`MAX_FILL_LENGTH`] fails with `GapTooLarge` before anything is
    /// allocated for it.
    pub fn write_range_fill<W: Write>(
        &mut self,
        output: &mut W,
        first: u64,
        last: u64,
        fill: u8,
    ) -> Result<(), Error> {
        // next address to emit
        let mut cursor = first;

        for block in self.memory.overlapping(first, last) {
            let clip_first = cmp::max(first, block.first());
            let clip_last = cmp::min(last, block.last());

            if clip_first > cursor {
                let gap = clip_first - cursor;
                if gap > MAX_FILL_LENGTH {
                    return Err(Error::GapTooLarge(gap));
                }
                output.write_all(&vec![fill; gap as usize])?;
            }

            let offset = block.payload_offset() + (clip_first - block.first());
            let mut buf = vec![0u8; (clip_last - clip_first + 1) as usize];
            self.input.seek(SeekFrom::Start(offset))?;
            self.input.read_exact(&mut buf)?;
            output.write_all(&buf)?;

            // A block ending at the top of the address space has emitted the
            // final byte of any representable range.
            cursor = match clip_last.checked_add(1) {
                Some(next) => next,
                None => return Ok(()),
            };
        }

        if cursor <= last {
            let gap = last - cursor + 1;
            if gap > MAX_FILL_LENGTH {
                return Err(Error::GapTooLarge(gap));
            }
            output.write_all(&vec![fill; gap as usize])?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fixtures::state_with_blocks;

    #[test]
    fn read_range_is_ascending_and_clipped() {
        let mut state = state_with_blocks(&[
            (0x1000, (0u8..16).collect()),
            (0x1020, vec![0xff; 16]),
        ]);

        let pairs = state.read_range(0x1008, 0x1023).unwrap();

        // eight bytes from the first block, four from the second
        assert_eq!(pairs.len(), 12);
        let addresses: Vec<u64> = pairs.iter().map(|&(a, _)| a).collect();
        let mut sorted = addresses.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(addresses, sorted);
        assert!(addresses.iter().all(|&a| (0x1008..=0x1023).contains(&a)));

        assert_eq!(pairs[0], (0x1008, 8));
        assert_eq!(pairs[7], (0x100f, 15));
        assert_eq!(pairs[8], (0x1020, 0xff));
    }

    #[test]
    fn read_range_of_a_gap_is_empty() {
        let mut state = state_with_blocks(&[(0x1000, vec![1, 2, 3, 4])]);
        assert!(state.read_range(0x2000, 0x2fff).unwrap().is_empty());
    }

    #[test]
    fn read_range_rereads_from_storage() {
        let mut state = state_with_blocks(&[(0x1000, vec![0x41; 8])]);
        let a = state.read_range(0x1000, 0x1007).unwrap();
        let b = state.read_range(0x1000, 0x1007).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn write_range_fills_gaps() {
        let mut state = state_with_blocks(&[
            (0x1000, vec![0xaa; 4]),
            (0x100e, vec![0xbb; 4]),
        ]);

        // ten-byte gap between the blocks
        let mut out = Vec::new();
        state.write_range(&mut out, 0x1000, 0x1011).unwrap();

        assert_eq!(out.len(), 0x12);
        assert_eq!(&out[0..4], &[0xaa; 4]);
        assert_eq!(&out[4..14], &[0x90; 10]);
        assert_eq!(&out[14..18], &[0xbb; 4]);
    }

    #[test]
    fn write_range_fills_leading_and_trailing_gaps() {
        let mut state = state_with_blocks(&[(0x1004, vec![0x41, 0x42])]);

        let mut out = Vec::new();
        state
            .write_range_fill(&mut out, 0x1000, 0x1007, 0xcc)
            .unwrap();

        assert_eq!(out, vec![0xcc, 0xcc, 0xcc, 0xcc, 0x41, 0x42, 0xcc, 0xcc]);
    }

    #[test]
    fn write_range_of_nothing_is_all_fill() {
        let mut state = state_with_blocks(&[(0x1000, vec![1])]);

        let mut out = Vec::new();
        state.write_range(&mut out, 0x2000, 0x200f).unwrap();
        assert_eq!(out, vec![0x90; 16]);
    }

    #[test]
    fn oversized_gap_fails() {
        let mut state = state_with_blocks(&[
            (0x1000, vec![1]),
            (0x8000_0000, vec![2]),
        ]);

        let mut out = Vec::new();
        match state.write_range(&mut out, 0x1000, 0x8000_0000) {
            Err(Error::GapTooLarge(_)) => {}
            r => panic!("expected GapTooLarge, got {:?}", r),
        }
    }
}
