//! Per-genome sequence (chromosome/contig) table and its cursor.

use crate::error::{HalError, HalResult};
use crate::genome::Genome;

/// One entry of a genome's sequence table: a named contiguous block of the
/// genome's base-coordinate space. Runs never cross a sequence boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    name: String,
    start: u64,
    length: u64,
}

impl Sequence {
    pub(crate) fn new(name: String, start: u64, length: u64) -> Self {
        Sequence { name, start, length }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Genome coordinate of the first base.
    pub fn start_position(&self) -> u64 {
        self.start
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// Genome coordinate of the last base.
    pub fn end_position(&self) -> u64 {
        self.start + self.length - 1
    }

    pub fn contains(&self, position: u64) -> bool {
        position >= self.start && position < self.start + self.length
    }
}

/// Stepping cursor over a genome's sorted sequence table.
///
/// Stepping may leave the cursor one entry past either end; `sequence()`
/// then fails with `InvalidIterator`.
#[derive(Debug, Clone, Copy)]
pub struct SequenceIterator<'a> {
    genome: &'a Genome,
    index: i64,
}

impl<'a> SequenceIterator<'a> {
    pub(crate) fn new(genome: &'a Genome, index: usize) -> HalResult<Self> {
        if index >= genome.num_sequences() {
            return Err(HalError::InvalidIterator {
                context: format!("sequence table of genome '{}'", genome.name()),
                index: index as i64,
                limit: genome.num_sequences() as u64,
            });
        }
        Ok(SequenceIterator {
            genome,
            index: index as i64,
        })
    }

    pub fn genome(&self) -> &'a Genome {
        self.genome
    }

    pub fn array_index(&self) -> i64 {
        self.index
    }

    /// Steps to the next table entry; the cursor moves even when it lands
    /// past the end, and the move is then reported as out of range.
    pub fn to_next(&mut self) -> HalResult<()> {
        self.step(1)
    }

    pub fn to_prev(&mut self) -> HalResult<()> {
        self.step(-1)
    }

    fn step(&mut self, delta: i64) -> HalResult<()> {
        let limit = self.genome.num_sequences() as i64;
        let next = (self.index + delta).clamp(-1, limit);
        self.index = next;
        if next < 0 || next >= limit {
            return Err(HalError::OutOfRange {
                context: format!("sequence table of genome '{}'", self.genome.name()),
                position: next,
                limit: limit as u64,
            });
        }
        Ok(())
    }

    /// Current sequence descriptor.
    pub fn sequence(&self) -> HalResult<&'a Sequence> {
        let limit = self.genome.num_sequences();
        if self.index < 0 || self.index as usize >= limit {
            return Err(HalError::InvalidIterator {
                context: format!("sequence table of genome '{}'", self.genome.name()),
                index: self.index,
                limit: limit as u64,
            });
        }
        Ok(&self.genome.sequences()[self.index as usize])
    }

    /// Same genome (by identity, not by arena id) and same table index.
    pub fn equals(&self, other: &SequenceIterator<'_>) -> bool {
        std::ptr::eq(self.genome, other.genome) && self.index == other.index
    }
}
