//! Segment run records and the shared segment contract.
//!
//! A genome's homology structure is stored as two run-length arrays of plain
//! records. Top records point up to the parent genome and sideways along
//! paralogy cycles; bottom records point down to child genomes. Records carry
//! no genome reference; identity is (genome, array index) and cursors supply
//! the rest.

use crate::dna::DnaIterator;
use crate::error::HalResult;
use crate::genome::Genome;
use crate::sequence::Sequence;

/// One run of the top-segment array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopSegmentRecord {
    start: u64,
    length: u64,
    parent_index: Option<usize>,
    parent_reversed: bool,
    bottom_parse_index: Option<usize>,
    bottom_parse_offset: u64,
    next_paralogy_index: Option<usize>,
    canonical_paralog: bool,
}

impl TopSegmentRecord {
    pub fn start_position(&self) -> u64 {
        self.start
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// Genome coordinate of the last base. Requires coordinates populated
    /// via `set_coordinates`; a zero-length record has no end.
    pub fn end_position(&self) -> u64 {
        self.start + self.length - 1
    }

    pub fn set_coordinates(&mut self, start: u64, length: u64) {
        self.start = start;
        self.length = length;
    }

    /// Index of the homologous run in the parent genome's bottom array.
    pub fn parent_index(&self) -> Option<usize> {
        self.parent_index
    }

    pub fn has_parent(&self) -> bool {
        self.parent_index.is_some()
    }

    pub fn set_parent_index(&mut self, index: Option<usize>) {
        self.parent_index = index;
    }

    /// Whether the parent homology maps to the reverse strand.
    pub fn parent_reversed(&self) -> bool {
        self.parent_reversed
    }

    pub fn set_parent_reversed(&mut self, reversed: bool) {
        self.parent_reversed = reversed;
    }

    /// Index of the same-genome bottom run covering this run's start.
    pub fn bottom_parse_index(&self) -> Option<usize> {
        self.bottom_parse_index
    }

    pub fn has_parse_down(&self) -> bool {
        self.bottom_parse_index.is_some()
    }

    pub fn set_bottom_parse_index(&mut self, index: Option<usize>) {
        self.bottom_parse_index = index;
    }

    /// Offset of this run's start within the parse-down bottom run.
    pub fn bottom_parse_offset(&self) -> u64 {
        self.bottom_parse_offset
    }

    pub fn set_bottom_parse_offset(&mut self, offset: u64) {
        self.bottom_parse_offset = offset;
    }

    /// Next member of this run's paralogy cycle, absent when unique.
    pub fn next_paralogy_index(&self) -> Option<usize> {
        self.next_paralogy_index
    }

    pub fn has_next_paralogy(&self) -> bool {
        self.next_paralogy_index.is_some()
    }

    pub fn set_next_paralogy_index(&mut self, index: Option<usize>) {
        self.next_paralogy_index = index;
    }

    /// Whether this run is the distinguished representative of its
    /// paralogy group.
    pub fn is_canonical_paralog(&self) -> bool {
        self.canonical_paralog
    }

    pub fn set_canonical_paralog(&mut self, canonical: bool) {
        self.canonical_paralog = canonical;
    }
}

/// Downward homology edge of a bottom run, one per child genome slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildLink {
    index: Option<usize>,
    reversed: bool,
}

impl ChildLink {
    /// Index of the homologous run in the child genome's top array.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn reversed(&self) -> bool {
        self.reversed
    }
}

/// One run of the bottom-segment array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BottomSegmentRecord {
    start: u64,
    length: u64,
    children: Vec<ChildLink>,
    top_parse_index: Option<usize>,
    top_parse_offset: u64,
}

impl BottomSegmentRecord {
    pub fn start_position(&self) -> u64 {
        self.start
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// Genome coordinate of the last base. Requires coordinates populated
    /// via `set_coordinates`; a zero-length record has no end.
    pub fn end_position(&self) -> u64 {
        self.start + self.length - 1
    }

    pub fn set_coordinates(&mut self, start: u64, length: u64) {
        self.start = start;
        self.length = length;
    }

    /// Number of child slots, one per child genome.
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn resize_children(&mut self, num_children: usize) {
        self.children.resize(num_children, ChildLink::default());
    }

    pub fn child(&self, slot: usize) -> Option<&ChildLink> {
        self.children.get(slot)
    }

    pub fn child_index(&self, slot: usize) -> Option<usize> {
        self.children.get(slot).and_then(|link| link.index)
    }

    pub fn has_child(&self, slot: usize) -> bool {
        self.child_index(slot).is_some()
    }

    pub fn set_child_index(&mut self, slot: usize, index: Option<usize>) {
        if let Some(link) = self.children.get_mut(slot) {
            link.index = index;
        }
    }

    pub fn child_reversed(&self, slot: usize) -> bool {
        self.children.get(slot).map(|link| link.reversed).unwrap_or(false)
    }

    pub fn set_child_reversed(&mut self, slot: usize, reversed: bool) {
        if let Some(link) = self.children.get_mut(slot) {
            link.reversed = reversed;
        }
    }

    /// Index of the same-genome top run covering this run's start.
    pub fn top_parse_index(&self) -> Option<usize> {
        self.top_parse_index
    }

    pub fn has_parse_up(&self) -> bool {
        self.top_parse_index.is_some()
    }

    pub fn set_top_parse_index(&mut self, index: Option<usize>) {
        self.top_parse_index = index;
    }

    /// Offset of this run's start within the parse-up top run.
    pub fn top_parse_offset(&self) -> u64 {
        self.top_parse_offset
    }

    pub fn set_top_parse_offset(&mut self, offset: u64) {
        self.top_parse_offset = offset;
    }
}

/// Shared read contract over top and bottom segment cursors.
///
/// Positional accessors are orientation-aware: for a reversed cursor,
/// `start_position` is the run's highest genome coordinate and
/// `end_position` its lowest. Interval tests order the endpoints first, so
/// they hold in genome-forward coordinates either way.
pub trait Segment {
    fn genome(&self) -> &Genome;

    fn array_index(&self) -> i64;

    fn is_reversed(&self) -> bool;

    /// Length after trim offsets are applied.
    fn length(&self) -> HalResult<u64>;

    fn start_position(&self) -> HalResult<u64>;

    fn end_position(&self) -> HalResult<u64>;

    /// Lowest genome coordinate covered, regardless of orientation.
    fn low_position(&self) -> HalResult<u64> {
        Ok(self.start_position()?.min(self.end_position()?))
    }

    /// Highest genome coordinate covered, regardless of orientation.
    fn high_position(&self) -> HalResult<u64> {
        Ok(self.start_position()?.max(self.end_position()?))
    }

    /// Resolves the owning sequence by binary search over the sorted table.
    fn sequence(&self) -> HalResult<&Sequence> {
        self.genome().sequence_at(self.low_position()?)
    }

    /// Appends exactly `length()` bases to `out`, reverse-complemented when
    /// the cursor is reversed. Delegates to a `DnaIterator`.
    fn get_string(&self, out: &mut String) -> HalResult<()> {
        let length = self.length()?;
        let mut dna = DnaIterator::new(self.genome(), self.start_position()?)?;
        dna.set_reversed(self.is_reversed());
        dna.read_string(out, length)
    }

    /// Entire segment lies left of the genome position.
    fn left_of(&self, position: u64) -> HalResult<bool> {
        Ok(self.high_position()? < position)
    }

    /// Entire segment lies right of the genome position.
    fn right_of(&self, position: u64) -> HalResult<bool> {
        Ok(self.low_position()? > position)
    }

    fn overlaps(&self, position: u64) -> HalResult<bool> {
        Ok(!self.left_of(position)? && !self.right_of(position)?)
    }
}

#[path = "segment_test.rs"]
mod segment_test;
