//! The general-purpose register snapshot of a 32-bit x86 capture.

use crate::Error;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};

/// The register values of the captured CPU at snapshot time.
///
/// Present in a state file only when the header carries
/// [`StateFlags::REGISTERS`](crate::format::StateFlags::REGISTERS).
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Registers {
    pub eax: u32,
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
    pub esi: u32,
    pub edi: u32,
    pub ebp: u32,
    pub esp: u32,
    pub eip: u32,
    pub eflags: u32,
    pub xcs: u32,
    pub xds: u32,
    pub xes: u32,
    pub xfs: u32,
    pub xgs: u32,
    pub xss: u32,
}

impl Registers {
    /// Decode a register snapshot.
    ///
    /// The wire layout is seventeen 32-bit little-endian words in a fixed
    /// order inherited from the capture tool's kernel-side register struct.
    /// The twelfth word is a reserved slot and is discarded.
    pub fn decode<R: Read>(input: &mut R) -> Result<Registers, Error> {
        let mut registers = Registers::default();
        registers.ebx = input.read_u32::<LittleEndian>()?;
        registers.ecx = input.read_u32::<LittleEndian>()?;
        registers.edx = input.read_u32::<LittleEndian>()?;
        registers.esi = input.read_u32::<LittleEndian>()?;
        registers.edi = input.read_u32::<LittleEndian>()?;
        registers.ebp = input.read_u32::<LittleEndian>()?;
        registers.eax = input.read_u32::<LittleEndian>()?;
        registers.xds = input.read_u32::<LittleEndian>()?;
        registers.xes = input.read_u32::<LittleEndian>()?;
        registers.xfs = input.read_u32::<LittleEndian>()?;
        registers.xgs = input.read_u32::<LittleEndian>()?;
        // reserved slot
        input.read_u32::<LittleEndian>()?;
        registers.eip = input.read_u32::<LittleEndian>()?;
        registers.xcs = input.read_u32::<LittleEndian>()?;
        registers.eflags = input.read_u32::<LittleEndian>()?;
        registers.esp = input.read_u32::<LittleEndian>()?;
        registers.xss = input.read_u32::<LittleEndian>()?;
        Ok(registers)
    }

    /// Encode this register snapshot in its wire layout.
    ///
    /// Emits the same seventeen words `decode` consumes, with the reserved
    /// slot written as zero.
    pub fn encode<W: Write>(&self, output: &mut W) -> Result<(), Error> {
        output.write_u32::<LittleEndian>(self.ebx)?;
        output.write_u32::<LittleEndian>(self.ecx)?;
        output.write_u32::<LittleEndian>(self.edx)?;
        output.write_u32::<LittleEndian>(self.esi)?;
        output.write_u32::<LittleEndian>(self.edi)?;
        output.write_u32::<LittleEndian>(self.ebp)?;
        output.write_u32::<LittleEndian>(self.eax)?;
        output.write_u32::<LittleEndian>(self.xds)?;
        output.write_u32::<LittleEndian>(self.xes)?;
        output.write_u32::<LittleEndian>(self.xfs)?;
        output.write_u32::<LittleEndian>(self.xgs)?;
        output.write_u32::<LittleEndian>(0)?;
        output.write_u32::<LittleEndian>(self.eip)?;
        output.write_u32::<LittleEndian>(self.xcs)?;
        output.write_u32::<LittleEndian>(self.eflags)?;
        output.write_u32::<LittleEndian>(self.esp)?;
        output.write_u32::<LittleEndian>(self.xss)?;
        Ok(())
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "eax {:08x} ebx {:08x} ecx {:08x} edx {:08x}",
            self.eax, self.ebx, self.ecx, self.edx
        )?;
        writeln!(
            f,
            "esi {:08x} edi {:08x} ebp {:08x} esp {:08x}",
            self.esi, self.edi, self.ebp, self.esp
        )?;
        writeln!(f, "eip {:08x} eflags {:08x}", self.eip, self.eflags)?;
        write!(
            f,
            "cs {:04x} ds {:04x} es {:04x} fs {:04x} gs {:04x} ss {:04x}",
            self.xcs, self.xds, self.xes, self.xfs, self.xgs, self.xss
        )
    }
}
