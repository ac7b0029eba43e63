//! Orientation-aware cursors over the segment run arrays.
//!
//! A cursor is a cheap value: (alignment reference, genome id, array index,
//! trim offsets, reversed flag). It never owns a record; dereferencing goes
//! through the genome's array handle every time. Stepping may park a cursor
//! one slot past either end of its array, after which dereference fails with
//! `InvalidIterator` until the cursor is stepped back in.
//!
//! Tree moves (`to_parent`, `to_child`) return a fresh cursor on the other
//! genome's array; parse moves (`to_parse_up`, `to_parse_down`) return a
//! fresh cursor on the other array of the same genome. The calling cursor is
//! never modified by a failed move.

use crate::alignment::Alignment;
use crate::error::{HalError, HalResult};
use crate::genome::{Genome, GenomeId};
use crate::segment::{BottomSegmentRecord, Segment, TopSegmentRecord};

/// Trim offsets and orientation shared by both cursor kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CursorState {
    index: i64,
    start_offset: u64,
    end_offset: u64,
    reversed: bool,
}

impl CursorState {
    fn at(index: usize) -> Self {
        CursorState {
            index: index as i64,
            start_offset: 0,
            end_offset: 0,
            reversed: false,
        }
    }

    /// Moves one slot in array order, inverting direction under reversal.
    /// Offsets reset on every move. Returns false when the cursor lands
    /// outside [0, limit).
    fn step(&mut self, toward_next: bool, limit: usize) -> bool {
        let forward = toward_next != self.reversed;
        let delta = if forward { 1 } else { -1 };
        self.index = (self.index + delta).clamp(-1, limit as i64);
        self.start_offset = 0;
        self.end_offset = 0;
        self.index >= 0 && self.index < limit as i64
    }

    fn in_bounds(&self, limit: usize) -> bool {
        self.index >= 0 && (self.index as usize) < limit
    }

    /// Logical length after trimming.
    fn length(&self, record_length: u64) -> u64 {
        record_length - self.start_offset - self.end_offset
    }

    /// Logical start coordinate: the highest covered coordinate when
    /// reversed, the lowest otherwise.
    fn start_position(&self, record_start: u64, record_length: u64) -> u64 {
        if self.reversed {
            record_start + record_length - 1 - self.start_offset
        } else {
            record_start + self.start_offset
        }
    }

    fn end_position(&self, record_start: u64, record_length: u64) -> u64 {
        let length = self.length(record_length);
        let start = self.start_position(record_start, record_length);
        if self.reversed {
            start - (length - 1)
        } else {
            start + (length - 1)
        }
    }

    fn slice(&mut self, start_offset: u64, end_offset: u64, record_length: u64, context: impl Fn() -> String) -> HalResult<()> {
        if start_offset + end_offset >= record_length {
            return Err(HalError::OutOfRange {
                context: context(),
                position: (start_offset + end_offset) as i64,
                limit: record_length,
            });
        }
        self.start_offset = start_offset;
        self.end_offset = end_offset;
        Ok(())
    }

    /// Flips orientation in place; the trim offsets trade places so the
    /// covered coordinate range is unchanged.
    fn reverse(&mut self) {
        self.reversed = !self.reversed;
        std::mem::swap(&mut self.start_offset, &mut self.end_offset);
    }
}

/// A zero-length record has no coordinates; only a freshly allocated record
/// that was never given `set_coordinates` looks like this, and tiling
/// validation rejects it outright.
fn require_populated(record_length: u64, genome: &Genome, index: i64) -> HalResult<()> {
    if record_length == 0 {
        return Err(HalError::CorruptTopology {
            genome: genome.name().to_string(),
            reason: format!("segment {index} has zero length"),
        });
    }
    Ok(())
}

/// Walks from a parse-link target to the run overlapping `position`.
///
/// The stored parse index is exact for untrimmed cursors; a trimmed cursor's
/// current coordinate may sit a few runs away, so we walk, bounded by the
/// array length. A walk that runs off the array or exhausts the bound means
/// the link or the tiling is corrupt.
fn seek_covering(
    position: u64,
    mut index: usize,
    count: usize,
    span_of: impl Fn(usize) -> HalResult<(u64, u64)>,
    genome_name: &str,
) -> HalResult<usize> {
    for _ in 0..=count {
        let (start, end) = span_of(index)?;
        if position < start {
            if index == 0 {
                break;
            }
            index -= 1;
        } else if position > end {
            if index + 1 >= count {
                break;
            }
            index += 1;
        } else {
            return Ok(index);
        }
    }
    Err(HalError::CorruptTopology {
        genome: genome_name.to_string(),
        reason: format!("parse link walk failed to reach position {position}"),
    })
}

/// Stepping cursor over a genome's top-segment array.
#[derive(Debug, Clone, Copy)]
pub struct TopSegmentIterator<'a> {
    alignment: &'a Alignment,
    genome: GenomeId,
    state: CursorState,
}

impl<'a> TopSegmentIterator<'a> {
    pub(crate) fn new(alignment: &'a Alignment, genome: GenomeId, index: usize) -> HalResult<Self> {
        let limit = alignment.genome(genome).num_top_segments();
        if index >= limit {
            return Err(HalError::InvalidIterator {
                context: format!("top segments of genome '{}'", alignment.genome(genome).name()),
                index: index as i64,
                limit: limit as u64,
            });
        }
        Ok(TopSegmentIterator {
            alignment,
            genome,
            state: CursorState::at(index),
        })
    }

    pub fn alignment(&self) -> &'a Alignment {
        self.alignment
    }

    pub fn genome(&self) -> &'a Genome {
        self.alignment.genome(self.genome)
    }

    pub fn start_offset(&self) -> u64 {
        self.state.start_offset
    }

    pub fn end_offset(&self) -> u64 {
        self.state.end_offset
    }

    /// Current record, or `InvalidIterator` if the cursor sits past an end.
    pub fn record(&self) -> HalResult<&'a TopSegmentRecord> {
        let genome = self.genome();
        let limit = genome.num_top_segments();
        if !self.state.in_bounds(limit) {
            return Err(HalError::InvalidIterator {
                context: format!("top segments of genome '{}'", genome.name()),
                index: self.state.index,
                limit: limit as u64,
            });
        }
        genome.top(self.state.index as usize)
    }

    /// Independent cursor at the same logical position.
    pub fn copy(&self) -> Self {
        *self
    }

    /// Steps toward higher logical coordinates (lower array indices when
    /// reversed). Trim offsets reset.
    pub fn to_next(&mut self) -> HalResult<()> {
        self.step(true)
    }

    pub fn to_prev(&mut self) -> HalResult<()> {
        self.step(false)
    }

    fn step(&mut self, toward_next: bool) -> HalResult<()> {
        let genome = self.genome();
        if !self.state.step(toward_next, genome.num_top_segments()) {
            return Err(HalError::OutOfRange {
                context: format!("top segments of genome '{}'", genome.name()),
                position: self.state.index,
                limit: genome.num_top_segments() as u64,
            });
        }
        Ok(())
    }

    /// Trims the cursor to a sub-range of the current record.
    pub fn slice(&mut self, start_offset: u64, end_offset: u64) -> HalResult<()> {
        let record_length = self.record()?.length();
        let genome_name = self.genome().name().to_string();
        self.state.slice(start_offset, end_offset, record_length, || {
            format!("slice of top segment in genome '{genome_name}'")
        })
    }

    /// Flips orientation in place.
    pub fn to_reverse(&mut self) {
        self.state.reverse();
    }

    /// Same alignment, same genome, and same array index. Deliberately
    /// ignores orientation and trim offsets; use `equals_exact` for a
    /// strict comparison.
    pub fn equals(&self, other: &TopSegmentIterator<'_>) -> bool {
        std::ptr::eq(self.alignment, other.alignment)
            && self.genome == other.genome
            && self.state.index == other.state.index
    }

    /// Strict equality: alignment, genome, index, offsets, and orientation.
    pub fn equals_exact(&self, other: &TopSegmentIterator<'_>) -> bool {
        std::ptr::eq(self.alignment, other.alignment)
            && self.genome == other.genome
            && self.state == other.state
    }

    // ---- tree navigation ----

    pub fn has_parent(&self) -> HalResult<bool> {
        Ok(self.genome().parent().is_some() && self.record()?.has_parent())
    }

    /// Cursor on the parent genome's bottom run homologous to this run.
    /// Orientation composes with the stored edge flag; trims reset.
    pub fn to_parent(&self) -> HalResult<BottomSegmentIterator<'a>> {
        let genome = self.genome();
        let record = self.record()?;
        let no_parent = || HalError::NoSuchParent {
            genome: genome.name().to_string(),
            index: self.state.index,
        };
        let parent_id = genome.parent().ok_or_else(no_parent)?;
        let parent_index = record.parent_index().ok_or_else(no_parent)?;
        let parent = self.alignment.genome(parent_id);
        if parent_index >= parent.num_bottom_segments() {
            return Err(HalError::CorruptTopology {
                genome: genome.name().to_string(),
                reason: format!(
                    "top segment {} points at bottom segment {parent_index} of '{}', which has only {}",
                    self.state.index,
                    parent.name(),
                    parent.num_bottom_segments()
                ),
            });
        }
        let mut state = CursorState::at(parent_index);
        state.reversed = self.state.reversed != record.parent_reversed();
        Ok(BottomSegmentIterator {
            alignment: self.alignment,
            genome: parent_id,
            state,
        })
    }

    // ---- parse navigation ----

    pub fn has_parse_down(&self) -> HalResult<bool> {
        Ok(self.record()?.has_parse_down())
    }

    /// Same-genome view switch: the bottom run covering this cursor's
    /// current start coordinate. Not a tree move.
    pub fn to_parse_down(&self) -> HalResult<BottomSegmentIterator<'a>> {
        let genome = self.genome();
        let record = self.record()?;
        let parse_index = record.bottom_parse_index().ok_or(HalError::NoSuchChild {
            genome: genome.name().to_string(),
            index: self.state.index,
            slot: 0,
        })?;
        let position = self.start_position()?;
        let count = genome.num_bottom_segments();
        let target = seek_covering(
            position,
            parse_index.min(count.saturating_sub(1)),
            count,
            |index| {
                let bottom = genome.bottom(index)?;
                Ok((bottom.start_position(), bottom.end_position()))
            },
            genome.name(),
        )?;
        let bottom = genome.bottom(target)?;
        let mut state = CursorState::at(target);
        state.reversed = self.state.reversed;
        state.start_offset = if state.reversed {
            bottom.end_position() - position
        } else {
            position - bottom.start_position()
        };
        Ok(BottomSegmentIterator {
            alignment: self.alignment,
            genome: self.genome,
            state,
        })
    }

    // ---- paralogy ----

    pub fn has_next_paralogy(&self) -> HalResult<bool> {
        Ok(self.record()?.has_next_paralogy())
    }

    pub fn is_canonical_paralog(&self) -> HalResult<bool> {
        Ok(self.record()?.is_canonical_paralog())
    }

    /// Steps to the next run of the paralogy cycle; orientation is kept and
    /// trims reset. Check `has_next_paralogy` first.
    pub fn to_next_paralogy(&mut self) -> HalResult<()> {
        let genome = self.genome();
        let record = self.record()?;
        let next = record.next_paralogy_index().ok_or_else(|| HalError::OutOfRange {
            context: format!(
                "paralogy cycle of top segment {} in genome '{}'",
                self.state.index,
                genome.name()
            ),
            position: self.state.index,
            limit: genome.num_top_segments() as u64,
        })?;
        if next >= genome.num_top_segments() {
            return Err(HalError::CorruptTopology {
                genome: genome.name().to_string(),
                reason: format!(
                    "paralogy link of top segment {} points at {next}, past {} segments",
                    self.state.index,
                    genome.num_top_segments()
                ),
            });
        }
        let reversed = self.state.reversed;
        self.state = CursorState::at(next);
        self.state.reversed = reversed;
        Ok(())
    }

    /// Size of this run's paralogy group. Bounded by the array length;
    /// a cycle that fails to close within the bound is corrupt.
    pub fn num_paralogs(&self) -> HalResult<usize> {
        let genome = self.genome();
        let record = self.record()?;
        let limit = genome.num_top_segments();
        let origin = self.state.index as usize;
        let mut current = match record.next_paralogy_index() {
            None => return Ok(1),
            Some(next) if next == origin => return Ok(1),
            Some(next) => next,
        };
        let mut count = 1usize;
        while current != origin {
            if count > limit {
                return Err(HalError::CorruptTopology {
                    genome: genome.name().to_string(),
                    reason: format!(
                        "paralogy cycle from top segment {origin} did not close within {limit} steps"
                    ),
                });
            }
            if current >= limit {
                return Err(HalError::CorruptTopology {
                    genome: genome.name().to_string(),
                    reason: format!("paralogy cycle from top segment {origin} left the array at {current}"),
                });
            }
            current = genome
                .top(current)?
                .next_paralogy_index()
                .ok_or_else(|| HalError::CorruptTopology {
                    genome: genome.name().to_string(),
                    reason: format!(
                        "paralogy cycle from top segment {origin} broke at segment {current}"
                    ),
                })?;
            count += 1;
        }
        Ok(count)
    }
}

impl<'a> Segment for TopSegmentIterator<'a> {
    fn genome(&self) -> &Genome {
        TopSegmentIterator::genome(self)
    }

    fn array_index(&self) -> i64 {
        self.state.index
    }

    fn is_reversed(&self) -> bool {
        self.state.reversed
    }

    fn length(&self) -> HalResult<u64> {
        Ok(self.state.length(self.record()?.length()))
    }

    fn start_position(&self) -> HalResult<u64> {
        let record = self.record()?;
        require_populated(record.length(), self.genome(), self.state.index)?;
        Ok(self.state.start_position(record.start_position(), record.length()))
    }

    fn end_position(&self) -> HalResult<u64> {
        let record = self.record()?;
        require_populated(record.length(), self.genome(), self.state.index)?;
        Ok(self.state.end_position(record.start_position(), record.length()))
    }
}

/// Stepping cursor over a genome's bottom-segment array.
#[derive(Debug, Clone, Copy)]
pub struct BottomSegmentIterator<'a> {
    alignment: &'a Alignment,
    genome: GenomeId,
    state: CursorState,
}

impl<'a> BottomSegmentIterator<'a> {
    pub(crate) fn new(alignment: &'a Alignment, genome: GenomeId, index: usize) -> HalResult<Self> {
        let limit = alignment.genome(genome).num_bottom_segments();
        if index >= limit {
            return Err(HalError::InvalidIterator {
                context: format!(
                    "bottom segments of genome '{}'",
                    alignment.genome(genome).name()
                ),
                index: index as i64,
                limit: limit as u64,
            });
        }
        Ok(BottomSegmentIterator {
            alignment,
            genome,
            state: CursorState::at(index),
        })
    }

    pub fn alignment(&self) -> &'a Alignment {
        self.alignment
    }

    pub fn genome(&self) -> &'a Genome {
        self.alignment.genome(self.genome)
    }

    pub fn start_offset(&self) -> u64 {
        self.state.start_offset
    }

    pub fn end_offset(&self) -> u64 {
        self.state.end_offset
    }

    /// Current record, or `InvalidIterator` if the cursor sits past an end.
    pub fn record(&self) -> HalResult<&'a BottomSegmentRecord> {
        let genome = self.genome();
        let limit = genome.num_bottom_segments();
        if !self.state.in_bounds(limit) {
            return Err(HalError::InvalidIterator {
                context: format!("bottom segments of genome '{}'", genome.name()),
                index: self.state.index,
                limit: limit as u64,
            });
        }
        genome.bottom(self.state.index as usize)
    }

    /// Independent cursor at the same logical position.
    pub fn copy(&self) -> Self {
        *self
    }

    pub fn to_next(&mut self) -> HalResult<()> {
        self.step(true)
    }

    pub fn to_prev(&mut self) -> HalResult<()> {
        self.step(false)
    }

    fn step(&mut self, toward_next: bool) -> HalResult<()> {
        let genome = self.genome();
        if !self.state.step(toward_next, genome.num_bottom_segments()) {
            return Err(HalError::OutOfRange {
                context: format!("bottom segments of genome '{}'", genome.name()),
                position: self.state.index,
                limit: genome.num_bottom_segments() as u64,
            });
        }
        Ok(())
    }

    /// Trims the cursor to a sub-range of the current record.
    pub fn slice(&mut self, start_offset: u64, end_offset: u64) -> HalResult<()> {
        let record_length = self.record()?.length();
        let genome_name = self.genome().name().to_string();
        self.state.slice(start_offset, end_offset, record_length, || {
            format!("slice of bottom segment in genome '{genome_name}'")
        })
    }

    /// Flips orientation in place.
    pub fn to_reverse(&mut self) {
        self.state.reverse();
    }

    /// Same alignment, same genome, and same array index. Deliberately
    /// ignores orientation and trim offsets; use `equals_exact` for a
    /// strict comparison.
    pub fn equals(&self, other: &BottomSegmentIterator<'_>) -> bool {
        std::ptr::eq(self.alignment, other.alignment)
            && self.genome == other.genome
            && self.state.index == other.state.index
    }

    /// Strict equality: alignment, genome, index, offsets, and orientation.
    pub fn equals_exact(&self, other: &BottomSegmentIterator<'_>) -> bool {
        std::ptr::eq(self.alignment, other.alignment)
            && self.genome == other.genome
            && self.state == other.state
    }

    // ---- tree navigation ----

    /// Number of child slots of this genome.
    pub fn num_children(&self) -> usize {
        self.genome().num_children()
    }

    pub fn has_child(&self, slot: usize) -> HalResult<bool> {
        Ok(self.record()?.has_child(slot))
    }

    /// Stored orientation of the homology edge into a child slot.
    pub fn child_reversed(&self, slot: usize) -> HalResult<bool> {
        let record = self.record()?;
        if slot >= record.num_children() {
            return Err(HalError::NoSuchChild {
                genome: self.genome().name().to_string(),
                index: self.state.index,
                slot,
            });
        }
        Ok(record.child_reversed(slot))
    }

    /// Cursor on the child genome's top run homologous to this run.
    /// Orientation composes with the stored edge flag; trims reset.
    pub fn to_child(&self, slot: usize) -> HalResult<TopSegmentIterator<'a>> {
        let genome = self.genome();
        let record = self.record()?;
        let no_child = || HalError::NoSuchChild {
            genome: genome.name().to_string(),
            index: self.state.index,
            slot,
        };
        let child_id = genome.child(slot).ok_or_else(no_child)?;
        let link = record.child(slot).ok_or_else(no_child)?;
        let child_index = link.index().ok_or_else(no_child)?;
        let child = self.alignment.genome(child_id);
        if child_index >= child.num_top_segments() {
            return Err(HalError::CorruptTopology {
                genome: genome.name().to_string(),
                reason: format!(
                    "bottom segment {} points at top segment {child_index} of '{}', which has only {}",
                    self.state.index,
                    child.name(),
                    child.num_top_segments()
                ),
            });
        }
        let mut state = CursorState::at(child_index);
        state.reversed = self.state.reversed != link.reversed();
        Ok(TopSegmentIterator {
            alignment: self.alignment,
            genome: child_id,
            state,
        })
    }

    // ---- parse navigation ----

    pub fn has_parse_up(&self) -> HalResult<bool> {
        Ok(self.record()?.has_parse_up())
    }

    /// Same-genome view switch: the top run covering this cursor's current
    /// start coordinate. Not a tree move.
    pub fn to_parse_up(&self) -> HalResult<TopSegmentIterator<'a>> {
        let genome = self.genome();
        let record = self.record()?;
        let parse_index = record.top_parse_index().ok_or(HalError::NoSuchParent {
            genome: genome.name().to_string(),
            index: self.state.index,
        })?;
        let position = self.start_position()?;
        let count = genome.num_top_segments();
        let target = seek_covering(
            position,
            parse_index.min(count.saturating_sub(1)),
            count,
            |index| {
                let top = genome.top(index)?;
                Ok((top.start_position(), top.end_position()))
            },
            genome.name(),
        )?;
        let top = genome.top(target)?;
        let mut state = CursorState::at(target);
        state.reversed = self.state.reversed;
        state.start_offset = if state.reversed {
            top.end_position() - position
        } else {
            position - top.start_position()
        };
        Ok(TopSegmentIterator {
            alignment: self.alignment,
            genome: self.genome,
            state,
        })
    }
}

impl<'a> Segment for BottomSegmentIterator<'a> {
    fn genome(&self) -> &Genome {
        BottomSegmentIterator::genome(self)
    }

    fn array_index(&self) -> i64 {
        self.state.index
    }

    fn is_reversed(&self) -> bool {
        self.state.reversed
    }

    fn length(&self) -> HalResult<u64> {
        Ok(self.state.length(self.record()?.length()))
    }

    fn start_position(&self) -> HalResult<u64> {
        let record = self.record()?;
        require_populated(record.length(), self.genome(), self.state.index)?;
        Ok(self.state.start_position(record.start_position(), record.length()))
    }

    fn end_position(&self) -> HalResult<u64> {
        let record = self.record()?;
        require_populated(record.length(), self.genome(), self.state.index)?;
        Ok(self.state.end_position(record.start_position(), record.length()))
    }
}
