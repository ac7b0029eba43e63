//! One node of the genome tree: arrays, sequence table, and tree linkage.

use std::collections::HashMap;

use crate::dna::{DnaIterator, PackedDna};
use crate::error::{HalError, HalResult};
use crate::segment::{BottomSegmentRecord, TopSegmentRecord};
use crate::sequence::{Sequence, SequenceIterator};
use crate::storage::ArrayHandle;

/// Arena identifier of a genome within its `Alignment`.
pub type GenomeId = usize;

/// A named genome in the alignment tree.
///
/// Owns its top and bottom segment arrays, its packed base array, and its
/// sequence table. Arrays are populated during a bulk build under `&mut`
/// access; once published, any number of cursors may read them concurrently.
pub struct Genome {
    id: GenomeId,
    name: String,
    parent: Option<GenomeId>,
    children: Vec<GenomeId>,
    // Child genome -> slot index, built as the tree is loaded so repeated
    // slot resolution is O(1) instead of a linear scan.
    child_slots: HashMap<GenomeId, usize>,
    sequences: Vec<Sequence>,
    top: ArrayHandle<TopSegmentRecord>,
    bottom: ArrayHandle<BottomSegmentRecord>,
    dna: PackedDna,
}

impl Genome {
    pub(crate) fn new(id: GenomeId, name: String, parent: Option<GenomeId>) -> Self {
        Genome {
            id,
            name,
            parent,
            children: Vec::new(),
            child_slots: HashMap::new(),
            sequences: Vec::new(),
            top: ArrayHandle::in_memory(),
            bottom: ArrayHandle::in_memory(),
            dna: PackedDna::new(),
        }
    }

    pub fn id(&self) -> GenomeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<GenomeId> {
        self.parent
    }

    pub fn children(&self) -> &[GenomeId] {
        &self.children
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, slot: usize) -> Option<GenomeId> {
        self.children.get(slot).copied()
    }

    /// Slot index of a child genome, or None if it is not a child.
    pub fn child_slot(&self, child: GenomeId) -> Option<usize> {
        self.child_slots.get(&child).copied()
    }

    pub(crate) fn add_child(&mut self, child: GenomeId) {
        let slot = self.children.len();
        self.children.push(child);
        self.child_slots.insert(child, slot);
    }

    /// Total number of bases.
    pub fn length(&self) -> u64 {
        self.dna.len()
    }

    pub fn dna(&self) -> &PackedDna {
        &self.dna
    }

    pub fn dna_mut(&mut self) -> &mut PackedDna {
        &mut self.dna
    }

    /// Appends bases to the packed array during a bulk build.
    pub fn append_dna(&mut self, bases: &str) -> HalResult<()> {
        self.dna.push_str(bases)
    }

    /// Cursor over the packed base array, positioned at `position`.
    pub fn dna_iterator(&self, position: u64) -> HalResult<DnaIterator<'_>> {
        DnaIterator::new(self, position)
    }

    // ---- sequence table ----

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn num_sequences(&self) -> usize {
        self.sequences.len()
    }

    /// Looks a sequence up by name.
    pub fn sequence(&self, name: &str) -> Option<&Sequence> {
        self.sequences.iter().find(|sequence| sequence.name() == name)
    }

    /// Appends a sequence during a bulk build; its start offset is the sum
    /// of the lengths added so far.
    pub fn add_sequence(&mut self, name: &str, length: u64) -> HalResult<()> {
        if length == 0 {
            return Err(HalError::CorruptTopology {
                genome: self.name.clone(),
                reason: format!("sequence '{name}' has zero length"),
            });
        }
        if self.sequence(name).is_some() {
            return Err(HalError::CorruptTopology {
                genome: self.name.clone(),
                reason: format!("duplicate sequence name '{name}'"),
            });
        }
        let start = self
            .sequences
            .last()
            .map(|sequence| sequence.start_position() + sequence.length())
            .unwrap_or(0);
        self.sequences.push(Sequence::new(name.to_string(), start, length));
        Ok(())
    }

    /// Resolves a genome position to its owning sequence by binary search.
    pub fn sequence_at(&self, position: u64) -> HalResult<&Sequence> {
        Ok(&self.sequences[self.sequence_index_at(position)?])
    }

    /// Binary search over the sorted, non-overlapping sequence table.
    pub fn sequence_index_at(&self, position: u64) -> HalResult<usize> {
        if position >= self.length() || self.sequences.is_empty() {
            return Err(HalError::OutOfRange {
                context: format!("sequence table of genome '{}'", self.name),
                position: position as i64,
                limit: self.length(),
            });
        }
        let mut left = 0usize;
        let mut right = self.sequences.len();
        let mut mid = 0usize;
        while left < right {
            mid = (left + right) >> 1;
            if position >= self.sequences[mid].start_position() {
                if mid == self.sequences.len() - 1 {
                    break;
                }
                if position < self.sequences[mid + 1].start_position() {
                    break;
                }
                left = mid + 1;
            } else {
                right = mid;
            }
        }
        Ok(mid)
    }

    /// Cursor over the sequence table, positioned at the entry owning
    /// `position`.
    pub fn sequence_iterator(&self, position: u64) -> HalResult<SequenceIterator<'_>> {
        SequenceIterator::new(self, self.sequence_index_at(position)?)
    }

    /// Cursor over the sequence table by table index.
    pub fn sequence_iterator_at_index(&self, index: usize) -> HalResult<SequenceIterator<'_>> {
        SequenceIterator::new(self, index)
    }

    // ---- segment arrays ----

    pub fn num_top_segments(&self) -> usize {
        self.top.len()
    }

    pub fn num_bottom_segments(&self) -> usize {
        self.bottom.len()
    }

    pub fn top(&self, index: usize) -> HalResult<&TopSegmentRecord> {
        self.top.get(index).ok_or_else(|| HalError::OutOfRange {
            context: format!("top segments of genome '{}'", self.name),
            position: index as i64,
            limit: self.top.len() as u64,
        })
    }

    pub fn top_mut(&mut self, index: usize) -> HalResult<&mut TopSegmentRecord> {
        let limit = self.top.len() as u64;
        let context = format!("top segments of genome '{}'", self.name);
        self.top.get_mut(index).ok_or(HalError::OutOfRange {
            context,
            position: index as i64,
            limit,
        })
    }

    pub fn bottom(&self, index: usize) -> HalResult<&BottomSegmentRecord> {
        self.bottom.get(index).ok_or_else(|| HalError::OutOfRange {
            context: format!("bottom segments of genome '{}'", self.name),
            position: index as i64,
            limit: self.bottom.len() as u64,
        })
    }

    pub fn bottom_mut(&mut self, index: usize) -> HalResult<&mut BottomSegmentRecord> {
        let limit = self.bottom.len() as u64;
        let context = format!("bottom segments of genome '{}'", self.name);
        self.bottom.get_mut(index).ok_or(HalError::OutOfRange {
            context,
            position: index as i64,
            limit,
        })
    }

    /// Sizes the top-segment array for a bulk build.
    pub fn allocate_top_segments(&mut self, count: usize) {
        self.top.resize(count);
    }

    /// Sizes the bottom-segment array for a bulk build. Each record gets one
    /// child slot per child genome, so the tree must be fully loaded first.
    pub fn allocate_bottom_segments(&mut self, count: usize) {
        self.bottom.resize(count);
        let num_children = self.children.len();
        for index in 0..count {
            if let Some(record) = self.bottom.get_mut(index) {
                record.resize_children(num_children);
            }
        }
    }

    /// Binary search for the top run overlapping a genome position.
    pub fn top_index_at(&self, position: u64) -> HalResult<usize> {
        Self::segment_index_at(
            position,
            self.top.len(),
            |index| self.top.get(index).map(|record| record.start_position()),
            || format!("top segments of genome '{}'", self.name),
            self.length(),
        )
    }

    /// Binary search for the bottom run overlapping a genome position.
    pub fn bottom_index_at(&self, position: u64) -> HalResult<usize> {
        Self::segment_index_at(
            position,
            self.bottom.len(),
            |index| self.bottom.get(index).map(|record| record.start_position()),
            || format!("bottom segments of genome '{}'", self.name),
            self.length(),
        )
    }

    fn segment_index_at(
        position: u64,
        count: usize,
        start_of: impl Fn(usize) -> Option<u64>,
        context: impl Fn() -> String,
        length: u64,
    ) -> HalResult<usize> {
        if count == 0 || position >= length {
            return Err(HalError::OutOfRange {
                context: context(),
                position: position as i64,
                limit: length,
            });
        }
        let mut left = 0usize;
        let mut right = count;
        let mut mid = 0usize;
        while left < right {
            mid = (left + right) >> 1;
            let start = start_of(mid).unwrap_or(u64::MAX);
            if position >= start {
                if mid == count - 1 {
                    break;
                }
                if start_of(mid + 1).map(|next| position < next).unwrap_or(true) {
                    break;
                }
                left = mid + 1;
            } else {
                right = mid;
            }
        }
        Ok(mid)
    }
}

impl std::fmt::Debug for Genome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Genome")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("length", &self.length())
            .field("num_sequences", &self.num_sequences())
            .field("num_top_segments", &self.num_top_segments())
            .field("num_bottom_segments", &self.num_bottom_segments())
            .finish()
    }
}
