//! Packed DNA storage and the base-level cursor.
//!
//! Bases are stored 2-bit packed, four per byte, MSB-first within the byte:
//! the shift for position `p` is `((!p & 3) << 1)`. Complementation is
//! `3 - code` (A<->T, C<->G). `DnaIterator` is the single primitive that
//! materializes bases; segment `get_string` and every external consumer of
//! raw sequence go through it.

use crate::error::{HalError, HalResult};
use crate::genome::Genome;
use crate::storage::ArrayHandle;

/// ASCII -> 2-bit code; 4 marks characters that are not A/C/G/T.
pub const NT4_TABLE: [u8; 256] = [
    4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4,
    4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4,
    4, 0, 4, 1, 4, 4, 4, 2, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 3, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4,
    4, 0, 4, 1, 4, 4, 4, 2, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 3, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4,
    4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4,
    4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4,
    4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4,
    4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4,
];

/// 2-bit code -> uppercase ASCII base.
pub const NT4_TO_CHAR: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// Base-wise complement of a 2-bit code: A<->T (0<->3), C<->G (1<->2).
#[inline]
pub fn complement(code: u8) -> u8 {
    3 - code
}

/// Concatenated 2-bit packed base array for one genome.
pub struct PackedDna {
    bytes: ArrayHandle<u8>,
    length: u64,
}

impl PackedDna {
    pub fn new() -> Self {
        PackedDna {
            bytes: ArrayHandle::in_memory(),
            length: 0,
        }
    }

    pub fn from_store(bytes: ArrayHandle<u8>, length: u64) -> Self {
        PackedDna { bytes, length }
    }

    /// Number of bases stored, not bytes.
    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[inline]
    fn shift(position: u64) -> u8 {
        // Same bit order as a .pac file: position 0 occupies the high bits.
        ((!(position as u8)) & 3) << 1
    }

    /// Appends one base; lowercase (soft-masked) input is folded to uppercase.
    pub fn push(&mut self, character: u8) -> HalResult<()> {
        let code = NT4_TABLE[character as usize];
        if code >= 4 {
            return Err(HalError::InvalidCharacter {
                character: character as char,
            });
        }
        let byte_index = (self.length / 4) as usize;
        if self.bytes.len() <= byte_index {
            self.bytes.resize(byte_index + 1);
        }
        let shift = Self::shift(self.length);
        if let Some(byte) = self.bytes.get_mut(byte_index) {
            *byte = (*byte & !(0x3 << shift)) | (code << shift);
        }
        self.length += 1;
        Ok(())
    }

    /// Appends a whole string of bases.
    pub fn push_str(&mut self, bases: &str) -> HalResult<()> {
        for character in bases.bytes() {
            self.push(character)?;
        }
        Ok(())
    }

    /// Overwrites the base at an existing position.
    pub fn set_base(&mut self, position: u64, character: u8) -> HalResult<()> {
        if position >= self.length {
            return Err(HalError::OutOfRange {
                context: "packed DNA".to_string(),
                position: position as i64,
                limit: self.length,
            });
        }
        let code = NT4_TABLE[character as usize];
        if code >= 4 {
            return Err(HalError::InvalidCharacter {
                character: character as char,
            });
        }
        let byte_index = (position / 4) as usize;
        let shift = Self::shift(position);
        if let Some(byte) = self.bytes.get_mut(byte_index) {
            *byte = (*byte & !(0x3 << shift)) | (code << shift);
        }
        Ok(())
    }

    /// 2-bit code at a position.
    pub fn base(&self, position: u64) -> HalResult<u8> {
        if position >= self.length {
            return Err(HalError::OutOfRange {
                context: "packed DNA".to_string(),
                position: position as i64,
                limit: self.length,
            });
        }
        let byte = self
            .bytes
            .get((position / 4) as usize)
            .copied()
            .unwrap_or(0);
        Ok((byte >> Self::shift(position)) & 0x3)
    }
}

impl Default for PackedDna {
    fn default() -> Self {
        PackedDna::new()
    }
}

impl std::fmt::Debug for PackedDna {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackedDna").field("length", &self.length).finish()
    }
}

/// Cursor over a genome's packed base array.
///
/// Forward reads emit bases left to right and advance the position; reversed
/// reads emit the reverse-complement directly, complementing while walking
/// backward, and move the position leftward. The forward strand is never
/// materialized first.
#[derive(Clone, Copy)]
pub struct DnaIterator<'a> {
    genome: &'a Genome,
    position: i64,
    reversed: bool,
}

impl<'a> DnaIterator<'a> {
    pub(crate) fn new(genome: &'a Genome, position: u64) -> HalResult<Self> {
        if position >= genome.length() {
            return Err(HalError::OutOfRange {
                context: format!("DNA of genome '{}'", genome.name()),
                position: position as i64,
                limit: genome.length(),
            });
        }
        Ok(DnaIterator {
            genome,
            position: position as i64,
            reversed: false,
        })
    }

    pub fn genome(&self) -> &'a Genome {
        self.genome
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn set_reversed(&mut self, reversed: bool) {
        self.reversed = reversed;
    }

    fn out_of_range(&self, position: i64) -> HalError {
        HalError::OutOfRange {
            context: format!("DNA of genome '{}'", self.genome.name()),
            position,
            limit: self.genome.length(),
        }
    }

    /// Reads one base and steps by one in the read direction.
    pub fn read_base(&mut self) -> HalResult<char> {
        let limit = self.genome.length() as i64;
        if self.position < 0 || self.position >= limit {
            return Err(self.out_of_range(self.position));
        }
        let code = self.genome.dna().base(self.position as u64)?;
        let code = if self.reversed { complement(code) } else { code };
        self.position += if self.reversed { -1 } else { 1 };
        Ok(NT4_TO_CHAR[code as usize] as char)
    }

    /// Appends the next `count` bases to `out`, honoring the reversal flag.
    ///
    /// The whole read is bounds-checked up front; on failure neither the
    /// output string nor the cursor position changes.
    pub fn read_string(&mut self, out: &mut String, count: u64) -> HalResult<()> {
        if count == 0 {
            return Ok(());
        }
        let limit = self.genome.length() as i64;
        if self.reversed {
            let last = self.position - (count as i64 - 1);
            if self.position >= limit || last < 0 {
                return Err(self.out_of_range(last.min(self.position)));
            }
            for k in (last..=self.position).rev() {
                let code = complement(self.genome.dna().base(k as u64)?);
                out.push(NT4_TO_CHAR[code as usize] as char);
            }
            self.position -= count as i64;
        } else {
            let end = self.position + count as i64;
            if self.position < 0 || end > limit {
                return Err(self.out_of_range(end - 1));
            }
            for k in self.position..end {
                let code = self.genome.dna().base(k as u64)?;
                out.push(NT4_TO_CHAR[code as usize] as char);
            }
            self.position = end;
        }
        Ok(())
    }
}

#[path = "dna_test.rs"]
mod dna_test;
